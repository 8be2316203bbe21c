//! Human/JSON rendering of diagnostic collections, following the shape of
//! the teacher's `diagnostics/formatter.rs`.

use super::diagnostic::Diagnostic;

/// Output format for rendering diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// One line per diagnostic, no color.
    Plain,
    /// Multi-line, source-context-friendly rendering.
    Pretty,
    /// A JSON array of diagnostic objects.
    Json,
}

/// Renders diagnostics for display.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiagnosticFormatter;

impl DiagnosticFormatter {
    /// Render a slice of diagnostics in the requested format.
    pub fn format(diagnostics: &[Diagnostic], format: Format) -> String {
        match format {
            Format::Plain => diagnostics
                .iter()
                .map(|d| format!("{} [{}] {}", d.code, d.level, d.message))
                .collect::<Vec<_>>()
                .join("\n"),
            Format::Pretty => diagnostics
                .iter()
                .map(|d| {
                    let mut lines = vec![format!(
                        "{} ({}) at line {}, offset {}",
                        d.code, d.level, d.position.line, d.position.offset
                    )];
                    lines.push(format!("  {}", d.message));
                    if let Some(parent) = &d.fhir_parent {
                        if let Some(element) = &d.fhir_element {
                            lines.push(format!("  in {parent} -> {element}"));
                        }
                    }
                    lines.join("\n")
                })
                .collect::<Vec<_>>()
                .join("\n\n"),
            Format::Json => serde_json::to_string_pretty(diagnostics).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::catalog::ErrorCode;
    use std::collections::HashMap;

    #[test]
    fn plain_format_has_one_line_per_diagnostic() {
        let diags = vec![
            Diagnostic::new(ErrorCode::F5130, Default::default(), "exec", 0, &HashMap::new()),
            Diagnostic::new(ErrorCode::F5131, Default::default(), "exec", 0, &HashMap::new()),
        ];
        let rendered = DiagnosticFormatter::format(&diags, Format::Plain);
        assert_eq!(rendered.lines().count(), 2);
    }
}
