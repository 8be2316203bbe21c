//! String functions (spec §4.9 "Strings").

use super::sync_fn;
use crate::value::{to_display_string, Frame, Value};
use base64::Engine;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Reserved characters `encodeUrlComponent` escapes (RFC 3986 unreserved
/// set is everything NOT in this set).
const COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'=')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b']');

/// `encodeUrl` only escapes characters invalid in a full URL, leaving
/// `:/?#[]@!$&'()*+,;=` untouched.
const URL: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'\\').add(b'^').add(b'`').add(b'{').add(b'|').add(b'}');

pub(super) fn register(frame: &Frame) {
    frame.bind("string", sync_fn("string", Some("xb?"), |input, args| {
        let value = args.into_iter().next().unwrap_or(input);
        Ok(to_display_string(&value))
    }));
    frame.bind("length", sync_fn("length", Some("-s"), |input, args| {
        let s = text_arg(input, args);
        Ok(Value::Number(s.chars().count() as f64))
    }));
    frame.bind("substring", sync_fn("substring", Some("-snn?"), |input, mut args| {
        let len = args.pop();
        let start = match args.pop() {
            Some(Value::Number(n)) => n as i64,
            _ => 0,
        };
        let s = text_arg(input, args);
        Ok(Value::String(substring(&s, start, match len { Some(Value::Number(n)) => Some(n as i64), _ => None })))
    }));
    frame.bind("substringBefore", sync_fn("substringBefore", Some("-ss"), |input, mut args| {
        let chars = match args.pop() {
            Some(Value::String(s)) => s,
            _ => return Ok(Value::String(String::new())),
        };
        let s = text_arg(input, args);
        Ok(Value::String(s.split_once(&chars).map(|(before, _)| before.to_string()).unwrap_or(s)))
    }));
    frame.bind("substringAfter", sync_fn("substringAfter", Some("-ss"), |input, mut args| {
        let chars = match args.pop() {
            Some(Value::String(s)) => s,
            _ => return Ok(Value::String(String::new())),
        };
        let s = text_arg(input, args);
        Ok(Value::String(s.split_once(&chars).map(|(_, after)| after.to_string()).unwrap_or(s)))
    }));
    frame.bind("uppercase", sync_fn("uppercase", Some("-s"), |input, args| Ok(Value::String(text_arg(input, args).to_uppercase()))));
    frame.bind("lowercase", sync_fn("lowercase", Some("-s"), |input, args| Ok(Value::String(text_arg(input, args).to_lowercase()))));
    frame.bind("trim", sync_fn("trim", Some("-s"), |input, args| {
        let collapsed = text_arg(input, args).split_whitespace().collect::<Vec<_>>().join(" ");
        Ok(Value::String(collapsed.trim().to_string()))
    }));
    frame.bind("contains", sync_fn("contains", Some("-sx"), |input, mut args| {
        let needle = args.pop();
        let haystack = text_arg(input, args);
        Ok(Value::Bool(match needle {
            Some(Value::String(s)) => haystack.contains(&s),
            Some(Value::Regex(r)) => r.regex.is_match(&haystack),
            _ => false,
        }))
    }));
    frame.bind("startsWith", sync_fn("startsWith", Some("-ss"), |input, mut args| {
        let prefix = match args.pop() {
            Some(Value::String(s)) => s,
            _ => return Ok(Value::Bool(false)),
        };
        Ok(Value::Bool(text_arg(input, args).starts_with(&prefix)))
    }));
    frame.bind("endsWith", sync_fn("endsWith", Some("-ss"), |input, mut args| {
        let suffix = match args.pop() {
            Some(Value::String(s)) => s,
            _ => return Ok(Value::Bool(false)),
        };
        Ok(Value::Bool(text_arg(input, args).ends_with(&suffix)))
    }));
    frame.bind("split", sync_fn("split", Some("-sxn?"), |input, mut args| {
        let limit = match args.pop() {
            Some(Value::Number(n)) => Some(n as usize),
            _ => None,
        };
        let separator = args.pop();
        let s = text_arg(input, args);
        let mut parts: Vec<Value> = match separator {
            Some(Value::String(sep)) if sep.is_empty() => s.chars().map(|c| Value::String(c.to_string())).collect(),
            Some(Value::String(sep)) => s.split(&sep as &str).map(|p| Value::String(p.to_string())).collect(),
            Some(Value::Regex(r)) => r.regex.split(&s).map(|p| Value::String(p.to_string())).collect(),
            _ => vec![Value::String(s)],
        };
        if let Some(limit) = limit {
            parts.truncate(limit);
        }
        Ok(Value::Array(parts))
    }));
    frame.bind("join", sync_fn("join", Some("a<s>s?"), |_, mut args| {
        let separator = match args.pop() {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        let items = super::items_of(args.into_iter().next().unwrap_or(Value::Undefined));
        let parts: Vec<String> = items
            .into_iter()
            .map(|v| match to_display_string(&v) {
                Value::String(s) => s,
                _ => String::new(),
            })
            .collect();
        Ok(Value::String(parts.join(&separator)))
    }));
    frame.bind("replace", sync_fn("replace", Some("-sxxn?"), |input, mut args| {
        args.pop();
        let replacement = args.pop();
        let pattern = args.pop();
        let s = text_arg(input, args);
        Ok(Value::String(replace(&s, pattern, replacement)))
    }));
    frame.bind("match", sync_fn("match", Some("-sxn?"), |input, mut args| {
        let limit = match args.pop() {
            Some(Value::Number(n)) => Some(n as usize),
            _ => None,
        };
        let pattern = args.pop();
        let s = text_arg(input, args);
        Ok(match pattern {
            Some(Value::Regex(r)) => {
                let mut matches: Vec<Value> = r
                    .regex
                    .find_iter(&s)
                    .map(|m| Value::String(m.as_str().to_string()))
                    .collect();
                if let Some(limit) = limit {
                    matches.truncate(limit);
                }
                if matches.is_empty() {
                    Value::Undefined
                } else {
                    Value::Array(matches)
                }
            }
            _ => Value::Undefined,
        })
    }));
    frame.bind("pad", sync_fn("pad", Some("-sns?"), |input, mut args| {
        let pad_char = match args.pop() {
            Some(Value::String(s)) if !s.is_empty() => s.chars().next().unwrap(),
            _ => ' ',
        };
        let width = match args.pop() {
            Some(Value::Number(n)) => n as i64,
            _ => 0,
        };
        let s = text_arg(input, args);
        Ok(Value::String(pad(&s, width, pad_char)))
    }));
    frame.bind("formatNumber", sync_fn("formatNumber", Some("-nso?"), |input, mut args| {
        args.pop();
        let picture = match args.pop() {
            Some(Value::String(s)) => s,
            _ => "#".to_string(),
        };
        let n = match args.pop().or(Some(input)) {
            Some(Value::Number(n)) => n,
            _ => return Ok(Value::Undefined),
        };
        Ok(Value::String(format_number_picture(n, &picture)))
    }));
    frame.bind("formatBase", sync_fn("formatBase", Some("-nn?"), |input, mut args| {
        let radix = match args.pop() {
            Some(Value::Number(n)) => n as u32,
            _ => 10,
        };
        let n = match args.pop().or(Some(input)) {
            Some(Value::Number(n)) => n as i64,
            _ => return Ok(Value::Undefined),
        };
        Ok(Value::String(format_radix(n, radix)))
    }));
    frame.bind("initCap", sync_fn("initCap", Some("-s"), |input, args| Ok(Value::String(init_cap(&text_arg(input, args), true)))));
    frame.bind("initCapOnce", sync_fn("initCapOnce", Some("-s"), |input, args| Ok(Value::String(init_cap(&text_arg(input, args), false)))));
    frame.bind("base64encode", sync_fn("base64encode", Some("-s"), |input, args| {
        Ok(Value::String(base64::engine::general_purpose::STANDARD.encode(text_arg(input, args))))
    }));
    frame.bind("base64decode", sync_fn("base64decode", Some("-s"), |input, args| {
        let decoded = base64::engine::general_purpose::STANDARD.decode(text_arg(input, args)).unwrap_or_default();
        Ok(Value::String(String::from_utf8_lossy(&decoded).into_owned()))
    }));
    frame.bind("encodeUrlComponent", sync_fn("encodeUrlComponent", Some("-s"), |input, args| {
        Ok(Value::String(utf8_percent_encode(&text_arg(input, args), COMPONENT).to_string()))
    }));
    frame.bind("encodeUrl", sync_fn("encodeUrl", Some("-s"), |input, args| {
        Ok(Value::String(utf8_percent_encode(&text_arg(input, args), URL).to_string()))
    }));
    frame.bind("decodeUrlComponent", sync_fn("decodeUrlComponent", Some("-s"), |input, args| {
        Ok(Value::String(percent_decode_str(&text_arg(input, args)).decode_utf8_lossy().into_owned()))
    }));
    frame.bind("decodeUrl", sync_fn("decodeUrl", Some("-s"), |input, args| {
        Ok(Value::String(percent_decode_str(&text_arg(input, args)).decode_utf8_lossy().into_owned()))
    }));
}

fn text_arg(input: Value, mut args: Vec<Value>) -> String {
    let value = if args.is_empty() { input } else { args.remove(0) };
    match to_display_string(&value) {
        Value::String(s) => s,
        _ => String::new(),
    }
}

fn substring(s: &str, start: i64, length: Option<i64>) -> String {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let start = if start < 0 { (len + start).max(0) } else { start.min(len) };
    let end = match length {
        Some(l) if l < 0 => start,
        Some(l) => (start + l).min(len),
        None => len,
    };
    if start >= end {
        return String::new();
    }
    chars[start as usize..end as usize].iter().collect()
}

fn replace(s: &str, pattern: Option<Value>, replacement: Option<Value>) -> String {
    let replacement_str = match &replacement {
        Some(Value::String(r)) => r.clone(),
        _ => String::new(),
    };
    match pattern {
        Some(Value::String(p)) if !p.is_empty() => s.replace(&p, &replacement_str),
        Some(Value::Regex(r)) => {
            if r.global {
                r.regex.replace_all(s, replacement_str.as_str()).into_owned()
            } else {
                r.regex.replace(s, replacement_str.as_str()).into_owned()
            }
        }
        _ => s.to_string(),
    }
}

fn pad(s: &str, width: i64, pad_char: char) -> String {
    let len = s.chars().count() as i64;
    let pad_len = (width.abs() - len).max(0) as usize;
    let filler: String = std::iter::repeat(pad_char).take(pad_len).collect();
    if width < 0 {
        format!("{filler}{s}")
    } else {
        format!("{s}{filler}")
    }
}

fn init_cap(s: &str, every_word: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = true;
    for ch in s.chars() {
        if capitalize_next && ch.is_alphabetic() {
            out.extend(ch.to_uppercase());
            capitalize_next = every_word;
        } else {
            out.push(ch);
        }
        if ch.is_whitespace() {
            capitalize_next = true;
        } else if !every_word {
            capitalize_next = false;
        }
    }
    out
}

fn format_radix(mut n: i64, radix: u32) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let negative = n < 0;
    if negative {
        n = -n;
    }
    let mut digits = Vec::new();
    let mut n = n as u64;
    while n > 0 {
        let digit = (n % radix as u64) as u32;
        digits.push(std::char::from_digit(digit, radix).unwrap());
        n /= radix as u64;
    }
    if negative {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

/// A pragmatic subset of the XPath/JSONata decimal-format picture
/// string: groups the integer part by `#`/`0` digit runs; does not
/// implement locale-specific grouping separators.
fn format_number_picture(n: f64, picture: &str) -> String {
    let decimals = picture.split('.').nth(1).map(|frac| frac.chars().filter(|c| *c == '0' || *c == '#').count()).unwrap_or(0);
    format!("{n:.decimals$}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::tests::test_frame;

    #[test]
    fn substring_handles_negative_start() {
        assert_eq!(substring("hello", -3, None), "llo");
    }

    #[test]
    fn pad_left_and_right() {
        assert_eq!(pad("1", 3, '0'), "100");
        assert_eq!(pad("1", -3, '0'), "001");
    }

    #[test]
    fn registers_core_string_functions() {
        let frame = test_frame();
        register(&frame);
        assert!(frame.lookup("substring").is_some());
        assert!(frame.lookup("base64encode").is_some());
    }
}
