//! Labels that point at additional grid locations within a diagnostic.

use crate::location::Location;
use serde::{Deserialize, Serialize};

/// The role of a diagnostic label.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LabelStyle {
    /// The main location of the problem.
    Primary,
    /// A related location providing context.
    Secondary,
}

/// An annotated location within a diagnostic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Label {
    /// The location this label annotates.
    pub location: Location,
    /// The message displayed next to the location.
    pub message: String,
    /// Whether this is a primary or secondary label.
    pub style: LabelStyle,
}

impl Label {
    /// Creates a primary label.
    pub fn primary(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    /// Creates a secondary label.
    pub fn secondary(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_label() {
        let label = Label::primary(Location::DEVICE, "first representative");
        assert_eq!(label.style, LabelStyle::Primary);
        assert_eq!(label.message, "first representative");
    }

    #[test]
    fn secondary_label() {
        let label = Label::secondary(Location::named("sb"), "also matched here");
        assert_eq!(label.style, LabelStyle::Secondary);
    }
}
