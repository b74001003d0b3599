//! Diagnostic severity, derived from the code category.

use crate::code::Category;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is. Ordered `Note < Warning < Error`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// A summary or report.
    Note,
    /// A condition worth reviewing that does not stop construction.
    Warning,
    /// A problem that aborts construction.
    Error,
}

impl Severity {
    /// Returns `true` for [`Severity::Error`].
    pub fn is_error(self) -> bool {
        self == Severity::Error
    }

    /// SGR color code used by the terminal renderer.
    pub fn ansi_color(self) -> &'static str {
        match self {
            Severity::Error => "31",
            Severity::Warning => "33",
            Severity::Note => "36",
        }
    }
}

impl From<Category> for Severity {
    fn from(category: Category) -> Self {
        match category {
            Category::Error => Severity::Error,
            Category::Warning => Severity::Warning,
            Category::Note => Severity::Note,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}
