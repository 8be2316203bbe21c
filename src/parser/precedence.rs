//! Binding powers for the Pratt parser (spec §4.2).

/// Binding power of an infix/postfix operator. Larger binds tighter.
pub fn infix_binding_power(op: &str) -> Option<(u8, u8)> {
    // (left binding power, right binding power); right < left means
    // left-associative, right > left means right-associative.
    let bp = match op {
        "." => 75,
        "[" => 80,
        "(" => 80,
        "{" => 80,
        "^" => 40,
        "*" | "/" | "%" => 60,
        "&" => 50,
        "+" | "-" => 50,
        "=" | "!=" | "<" | "<=" | ">" | ">=" | "in" => 40,
        "??" | "?:" => 40,
        "and" => 30,
        "or" => 25,
        "~>" => 40,
        "@" => 80,
        "#" => 80,
        ".." => 20,
        "?" => 20,
        ":=" => 10,
        _ => return None,
    };
    if op == ":=" {
        Some((bp, bp - 1))
    } else {
        Some((bp, bp + 1))
    }
}

/// Binding power of a prefix operator.
pub fn prefix_binding_power(op: &str) -> Option<u8> {
    match op {
        "-" => 70,
        "**" => 70,
        "%" => 70,
        _ => None,
    }
}
