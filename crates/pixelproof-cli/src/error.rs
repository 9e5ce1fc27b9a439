//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Missing or conflicting flags
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// The test run finished with failures
    #[error("Test run failed with exit code {code}")]
    TestsFailed {
        /// Exit code of the test process
        code: i32,
    },

    /// A comparison scored below its threshold
    #[error("Similarity {similarity:.1}% is below the {threshold:.1}% threshold")]
    BelowThreshold {
        /// Similarity percentage
        similarity: f64,
        /// Threshold percentage
        threshold: f64,
    },

    /// Feature not compiled in
    #[error("{feature} support not enabled. Rebuild with --features {feature}")]
    FeatureDisabled {
        /// Cargo feature name
        feature: &'static str,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Pixelproof library error
    #[error("{0}")]
    Proof(#[from] pixelproof::ProofError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Process exit code for this error
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::TestsFailed { code } => u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1),
            _ => 1,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
    }

    #[test]
    fn test_invalid_argument_error() {
        let err = CliError::invalid_argument("--component is required");
        assert!(err.to_string().contains("Invalid argument"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_tests_failed_exit_code() {
        assert_eq!(CliError::TestsFailed { code: 101 }.exit_code(), 101);
        assert_eq!(CliError::TestsFailed { code: -1 }.exit_code(), 1);
        assert_eq!(CliError::TestsFailed { code: 0 }.exit_code(), 1);
    }

    #[test]
    fn test_below_threshold_message() {
        let err = CliError::BelowThreshold {
            similarity: 72.34,
            threshold: 80.0,
        };
        assert_eq!(
            err.to_string(),
            "Similarity 72.3% is below the 80.0% threshold"
        );
    }

    #[test]
    fn test_proof_error_from() {
        let err: CliError = pixelproof::ProofError::MissingFeedback.into();
        assert!(err.to_string().contains("feedback"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }
}
