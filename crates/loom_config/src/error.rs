//! Error types for fabric description loading and validation.

use loom_arch::ArchError;

/// Errors that can occur when loading or validating a `fabric.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the description.
    #[error("failed to read fabric description: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse fabric description: {0}")]
    ParseError(String),

    /// A name used as a reference does not exist in its catalog.
    #[error("{context} references unknown {kind} '{name}'")]
    UnknownReference {
        /// The catalog searched (`switch`, `tile type`, ...).
        kind: &'static str,
        /// The missing name.
        name: String,
        /// What holds the reference.
        context: String,
    },

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The resolved architecture is inconsistent.
    #[error("invalid architecture: {0}")]
    Arch(#[from] ArchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_reference() {
        let err = ConfigError::UnknownReference {
            kind: "switch",
            name: "mux9".into(),
            context: "segment 'L4'".into(),
        };
        assert_eq!(format!("{err}"), "segment 'L4' references unknown switch 'mux9'");
    }

    #[test]
    fn display_missing_field() {
        let err = ConfigError::MissingField("name".to_string());
        assert_eq!(format!("{err}"), "missing required field: name");
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError("duplicate switch 'mux0'".to_string());
        assert_eq!(format!("{err}"), "validation error: duplicate switch 'mux0'");
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        assert!(format!("{err}").starts_with("failed to read fabric description:"));
    }

    #[test]
    fn arch_error_converts() {
        let err: ConfigError = ArchError::Empty("segments").into();
        assert_eq!(
            format!("{err}"),
            "invalid architecture: architecture declares no segments"
        );
    }
}
