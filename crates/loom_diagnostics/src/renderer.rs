//! Diagnostic rendering for terminal output.

use crate::diagnostic::Diagnostic;
use crate::label::LabelStyle;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// error[E101]: I/O tile 'io' placed away from the device perimeter
///   --> (1, 1) io
///    = note: ...
///    = help: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in the header.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let head = format!("{}[{}]", diag.severity, diag.code);
        if !self.color {
            return head;
        }
        let color = diag.severity.ansi_color();
        format!("\x1b[1;{color}m{head}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}: {}\n", self.header(diag), diag.message));

        if !diag.location.is_device() {
            out.push_str(&format!("  --> {}\n", diag.location));
        }

        for label in &diag.labels {
            let marker = match label.style {
                LabelStyle::Primary => '^',
                LabelStyle::Secondary => '-',
            };
            out.push_str(&format!(
                "   {marker} {}: {}\n",
                label.location, label.message
            ));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }

        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use crate::label::Label;
    use crate::location::Location;
    use loom_common::Coord;

    #[test]
    fn render_error_with_location() {
        let code = DiagnosticCode::new(Category::Error, 101);
        let diag = Diagnostic::error(
            code,
            "I/O tile 'io' placed away from the device perimeter",
            Location::at(Coord::new(1, 1), "io"),
        );
        let output = TerminalRenderer::new(false).render(&diag);
        assert!(output.starts_with("error[E101]: I/O tile 'io'"));
        assert!(output.contains("--> (1, 1) io"));
    }

    #[test]
    fn render_warning_with_notes() {
        let code = DiagnosticCode::new(Category::Warning, 301);
        let diag = Diagnostic::warning(code, "3 duplicate edge insertions", Location::DEVICE)
            .with_note("duplicates were dropped")
            .with_help("check the switch block pattern");
        let output = TerminalRenderer::new(false).render(&diag);
        assert!(output.contains("warning[W301]: 3 duplicate edge insertions"));
        assert!(!output.contains("-->"));
        assert!(output.contains("= note: duplicates were dropped"));
        assert!(output.contains("= help: check the switch block pattern"));
    }

    #[test]
    fn render_labels() {
        let code = DiagnosticCode::new(Category::Error, 104);
        let diag = Diagnostic::error(code, "conflict", Location::at(Coord::new(2, 2), "sb"))
            .with_label(Label::secondary(
                Location::at(Coord::new(0, 0), "sb"),
                "first representative",
            ));
        let output = TerminalRenderer::new(false).render(&diag);
        assert!(output.contains("- (0, 0) sb: first representative"));
    }

    #[test]
    fn render_colored_header() {
        let code = DiagnosticCode::new(Category::Note, 401);
        let diag = Diagnostic::note(code, "summary", Location::DEVICE);
        let output = TerminalRenderer::new(true).render(&diag);
        assert!(output.contains("\x1b[1;36mnote[N401]\x1b[0m: summary"));
    }
}
