//! Error types for the CLI

use comparar::ComparError;
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Comparison library error
    #[error("{0}")]
    Comparar(#[from] ComparError),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Process exit code: 1 when images differ, 2 when the comparison failed
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Comparar(e) if e.is_mismatch() => 1,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            CliError::invalid_argument("--bounds").to_string(),
            "Invalid argument: --bounds"
        );
    }

    #[test]
    fn test_library_error_passes_message_through() {
        let err = CliError::from(ComparError::NoBaselineFound {
            name: "shot.png".into(),
        });
        assert_eq!(err.to_string(), "No baseline found for shot.png");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_config_failure_comes_from_library() {
        let err = CliError::from(ComparError::config("Unsupported configuration format"));
        assert!(matches!(err, CliError::Comparar(ComparError::Config { .. })));
        assert_eq!(
            err.to_string(),
            "Configuration error: Unsupported configuration format"
        );
        assert_eq!(err.exit_code(), 2);
    }
}
