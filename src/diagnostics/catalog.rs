//! Error code catalog: codes, severity bands, and message templates.
//!
//! Severity convention (spec'd by the policy engine): codes outside the
//! `F5xyy` family are always fatal (severity 0). `F5xyy` codes encode their
//! severity as the two-digit band `xy` (e.g. `F5320` has severity 32).

use std::fmt;

/// A single error code from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorCode {
    // Syntactic (lexer), always fatal
    S0101,
    S0102,
    S0103,
    S0104,
    S0105,
    S0106,
    S0302,
    // Syntactic (parser), always fatal
    S0207,
    S0211,
    S0500,

    // Type/runtime errors, always fatal
    T0410,
    T0411,
    T0412,
    T1005,
    T2007,
    T2008,

    // Dynamic/semantic errors, always fatal
    D1009,
    D2014,
    D3120,
    D3121,

    // FLASH syntactic errors, fatal
    F1017,
    F1021,
    F1100,
    F1101,
    F1102,
    F1103,
    F1104,
    F1105,
    F1106,
    F1107,
    F1108,
    F1109,
    F1110,

    // FLASH semantic-parse errors, fatal unless recover=true
    F2002,
    F2004,
    F2007,

    // FLASH evaluation sanity-check failures, fatal
    F3001,

    // Policy-governed FLASH errors, severity = band after F5
    F5110,
    F5111,
    F5112,
    F5113,
    F5114,
    F5120,
    F5121,
    F5122,
    F5123,
    F5130,
    F5131,
    F5140,
    F5310,
    F5311,
    F5320,
    F5330,
    F5331,
    F5340,
    F5341,
    F5342,
    F5343,
    F5500,
    F5600,

    /// An application-defined code not in the static catalog.
    Custom(&'static str),
}

impl ErrorCode {
    /// The code's string representation, e.g. `"F5120"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::S0101 => "S0101",
            ErrorCode::S0102 => "S0102",
            ErrorCode::S0103 => "S0103",
            ErrorCode::S0104 => "S0104",
            ErrorCode::S0105 => "S0105",
            ErrorCode::S0106 => "S0106",
            ErrorCode::S0302 => "S0302",
            ErrorCode::S0207 => "S0207",
            ErrorCode::S0211 => "S0211",
            ErrorCode::S0500 => "S0500",
            ErrorCode::T0410 => "T0410",
            ErrorCode::T0411 => "T0411",
            ErrorCode::T0412 => "T0412",
            ErrorCode::T1005 => "T1005",
            ErrorCode::T2007 => "T2007",
            ErrorCode::T2008 => "T2008",
            ErrorCode::D1009 => "D1009",
            ErrorCode::D2014 => "D2014",
            ErrorCode::D3120 => "D3120",
            ErrorCode::D3121 => "D3121",
            ErrorCode::F1017 => "F1017",
            ErrorCode::F1021 => "F1021",
            ErrorCode::F1100 => "F1100",
            ErrorCode::F1101 => "F1101",
            ErrorCode::F1102 => "F1102",
            ErrorCode::F1103 => "F1103",
            ErrorCode::F1104 => "F1104",
            ErrorCode::F1105 => "F1105",
            ErrorCode::F1106 => "F1106",
            ErrorCode::F1107 => "F1107",
            ErrorCode::F1108 => "F1108",
            ErrorCode::F1109 => "F1109",
            ErrorCode::F1110 => "F1110",
            ErrorCode::F2002 => "F2002",
            ErrorCode::F2004 => "F2004",
            ErrorCode::F2007 => "F2007",
            ErrorCode::F3001 => "F3001",
            ErrorCode::F5110 => "F5110",
            ErrorCode::F5111 => "F5111",
            ErrorCode::F5112 => "F5112",
            ErrorCode::F5113 => "F5113",
            ErrorCode::F5114 => "F5114",
            ErrorCode::F5120 => "F5120",
            ErrorCode::F5121 => "F5121",
            ErrorCode::F5122 => "F5122",
            ErrorCode::F5123 => "F5123",
            ErrorCode::F5130 => "F5130",
            ErrorCode::F5131 => "F5131",
            ErrorCode::F5140 => "F5140",
            ErrorCode::F5310 => "F5310",
            ErrorCode::F5311 => "F5311",
            ErrorCode::F5320 => "F5320",
            ErrorCode::F5330 => "F5330",
            ErrorCode::F5331 => "F5331",
            ErrorCode::F5340 => "F5340",
            ErrorCode::F5341 => "F5341",
            ErrorCode::F5342 => "F5342",
            ErrorCode::F5343 => "F5343",
            ErrorCode::F5500 => "F5500",
            ErrorCode::F5600 => "F5600",
            ErrorCode::Custom(s) => s,
        }
    }

    /// Numeric severity. Everything outside `F5xyy` is fatal (0); `F5xyy`
    /// codes use the two-digit band after the `F5` prefix.
    pub fn severity(&self) -> i32 {
        let s = self.as_str();
        if let Some(band) = s.strip_prefix("F5") {
            if band.len() == 3 {
                if let Ok(full) = band.parse::<i32>() {
                    return full / 10;
                }
            }
        }
        0
    }

    /// Human-readable severity band name, derived from the numeric severity.
    pub fn level_name(&self) -> &'static str {
        match self.severity() {
            s if s < 10 => "error",
            10..=19 => "invalid",
            20..=29 => "error",
            30..=39 => "warning",
            40..=49 => "notice",
            50..=59 => "info",
            _ => "debug",
        }
    }

    /// Message template for this code. Placeholders: `{{field}}` is
    /// substituted with the JSON-stringified insert value, `{{{field}}}`
    /// with the raw string.
    pub fn message_template(&self) -> &'static str {
        match self {
            ErrorCode::S0101 => "Unterminated string literal",
            ErrorCode::S0102 => "Number out of range: {{{token}}}",
            ErrorCode::S0103 => "Unsupported escape sequence: \\{{{char}}}",
            ErrorCode::S0104 => "The escape sequence \\u must be followed by 4 hex digits",
            ErrorCode::S0105 => "Unterminated quoted name",
            ErrorCode::S0106 => "Unterminated comment",
            ErrorCode::S0302 => "Unterminated regular expression",
            ErrorCode::S0207 => "Unexpected end of expression",
            ErrorCode::S0211 => "The symbol {{{token}}} cannot be used as a unary operator",
            ErrorCode::S0500 => "Attempted to evaluate an expression containing syntax error(s)",
            ErrorCode::T0410 => "Argument {{index}} of function {{{function}}} does not match function signature",
            ErrorCode::T0411 => "Context value is not a compatible type with argument {{index}} of function {{{function}}}",
            ErrorCode::T0412 => "Argument {{index}} of function {{{function}}} must be an array of {{{type}}}",
            ErrorCode::T1005 => "Attempted to invoke a non-function. Did you mean ${{{name}}}?",
            ErrorCode::T2007 => "Cannot compare values of different types for sorting",
            ErrorCode::T2008 => "Sort terms must be of type string or number",
            ErrorCode::D1009 => "Multiple keys in an object evaluate to the same key: {{{key}}}",
            ErrorCode::D2014 => "The size of the sequence allocated by the range operator (..) must not exceed 10,000,000",
            ErrorCode::D3120 => "Syntax error in expression passed to $eval: {{{message}}}",
            ErrorCode::D3121 => "Runtime error in expression passed to $eval: {{{message}}}",
            ErrorCode::F1017 => "Unexpected indentation: expected {{expected}}, got {{actual}}",
            ErrorCode::F1021 => "Mixed-odd indentation is not allowed",
            ErrorCode::F1100 => "Unmatched closing bracket {{{token}}}",
            ErrorCode::F1101 => "Missing comma between array elements",
            ErrorCode::F1102 => "Stray colon inside array literal",
            ErrorCode::F1103 => "Duplicate comma in argument list",
            ErrorCode::F1104 => "Expected identifier in flash path",
            ErrorCode::F1105 => "Flash path must be written on a single line",
            ErrorCode::F1106 => "Flash path must not start with '$'",
            ErrorCode::F1107 => "Flash path must not end with '='",
            ErrorCode::F1108 => "Expected 'InstanceOf:' at the same indentation as 'Instance:'",
            ErrorCode::F1109 => "Expected a slice name, number, or range inside '[...]'",
            ErrorCode::F1110 => "Unexpected token inside flash block",
            ErrorCode::F2002 => "Element {{{path}}} not found on type {{{type}}}",
            ErrorCode::F2004 => "Element {{{path}}} has multiple types; use one of: {{{candidates}}}",
            ErrorCode::F2007 => "Element {{{path}}} has no type information",
            ErrorCode::F3001 => "Internal error: malformed FLASH AST node at {{{path}}}",
            ErrorCode::F5110 => "Value {{{value}}} does not match the expected pattern for {{{type}}}",
            ErrorCode::F5111 => "Value {{{value}}} is not a valid calendar date for {{{type}}}",
            ErrorCode::F5112 => "Value {{{value}}} must contain at least one non-whitespace character",
            ErrorCode::F5113 => "Code value {{{value}}} must not have leading, trailing, or consecutive whitespace",
            ErrorCode::F5114 => "Value exceeds maximum length of {{maxLength}}",
            ErrorCode::F5120 => "Required binding violated: code not found in value set {{{valueSet}}}",
            ErrorCode::F5121 => "Required binding violated: Coding not found in value set {{{valueSet}}}",
            ErrorCode::F5122 => "Required binding violated: Quantity not found in value set {{{valueSet}}}",
            ErrorCode::F5123 => "Required binding violated: no coding in CodeableConcept found in value set {{{valueSet}}}",
            ErrorCode::F5130 => "Mandatory element {{{path}}} is missing",
            ErrorCode::F5131 => "Element {{{path}}} is forbidden (max = 0)",
            ErrorCode::F5140 => "Mandatory slice {{{slice}}} of {{{path}}} could not be generated",
            ErrorCode::F5310 => "Could not verify required binding for {{{path}}}: value set expansion unavailable",
            ErrorCode::F5311 => "Could not verify required binding for {{{path}}}: value set not fully expanded",
            ErrorCode::F5320 => "{{{message}}}",
            ErrorCode::F5330 => "Could not verify extensible binding for {{{path}}}: value set expansion unavailable",
            ErrorCode::F5331 => "Could not verify extensible binding for {{{path}}}: value set not fully expanded",
            ErrorCode::F5340 => "Extensible binding violated: code not found in value set {{{valueSet}}}",
            ErrorCode::F5341 => "Extensible binding violated: Coding not found in value set {{{valueSet}}}",
            ErrorCode::F5342 => "Extensible binding violated: Quantity not found in value set {{{valueSet}}}",
            ErrorCode::F5343 => "Extensible binding violated: no coding in CodeableConcept found in value set {{{valueSet}}}",
            ErrorCode::F5500 => "{{{message}}}",
            ErrorCode::F5600 => "{{{message}}}",
            ErrorCode::Custom(_) => "{{{message}}}",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Substitute `{{field}}` (JSON-stringified) and `{{{field}}}` (raw)
/// placeholders in a template using the given inserts.
pub fn render_template(template: &str, inserts: &std::collections::HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if template[i..].starts_with("{{{") {
            if let Some(end) = template[i + 3..].find("}}}") {
                let field = &template[i + 3..i + 3 + end];
                if let Some(val) = inserts.get(field) {
                    out.push_str(val);
                } else {
                    out.push_str(&format!("{{{{{{{field}}}}}}}"));
                }
                i += 3 + end + 3;
                continue;
            }
        }
        if template[i..].starts_with("{{") {
            if let Some(end) = template[i + 2..].find("}}") {
                let field = &template[i + 2..i + 2 + end];
                if let Some(val) = inserts.get(field) {
                    let json = serde_json::to_string(val).unwrap_or_else(|_| val.clone());
                    out.push_str(&json);
                } else {
                    out.push_str(&format!("{{{{{field}}}}}"));
                }
                i += 2 + end + 2;
                continue;
            }
        }
        let ch = template[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_codes_have_zero_severity() {
        assert_eq!(ErrorCode::S0101.severity(), 0);
        assert_eq!(ErrorCode::T0410.severity(), 0);
        assert_eq!(ErrorCode::F2002.severity(), 0);
    }

    #[test]
    fn f5_codes_derive_severity_from_band() {
        assert_eq!(ErrorCode::F5320.severity(), 32);
        assert_eq!(ErrorCode::F5130.severity(), 13);
        assert_eq!(ErrorCode::F5110.severity(), 11);
    }

    #[test]
    fn level_names_match_bands() {
        assert_eq!(ErrorCode::F5130.level_name(), "invalid");
        assert_eq!(ErrorCode::F5320.level_name(), "warning");
        assert_eq!(ErrorCode::F5500.level_name(), "info");
        assert_eq!(ErrorCode::F5600.level_name(), "debug");
        assert_eq!(ErrorCode::S0101.level_name(), "error");
    }

    #[test]
    fn template_substitution_handles_both_placeholder_forms() {
        let mut inserts = std::collections::HashMap::new();
        inserts.insert("path".to_string(), "Patient.name".to_string());
        inserts.insert("value".to_string(), "hi \"there\"".to_string());
        let rendered = render_template("at {{{path}}}: {{value}}", &inserts);
        assert_eq!(rendered, "at Patient.name: \"hi \\\"there\\\"\"");
    }
}
