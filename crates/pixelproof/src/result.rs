//! Result and error types for Pixelproof.

use thiserror::Error;

/// Result type for Pixelproof operations
pub type ProofResult<T> = Result<T, ProofError>;

/// Errors that can occur in Pixelproof
#[derive(Debug, Error)]
pub enum ProofError {
    /// DOM element could not be located
    #[error("Element not found: {locator}")]
    ElementNotFound {
        /// Locator that matched nothing
        locator: String,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        waited_for: String,
    },

    /// Malformed color or specification string
    #[error("Parse error: {message}")]
    Parse {
        /// Error message
        message: String,
    },

    /// Image comparison could not run (missing file, undecodable image)
    #[error("Comparison unavailable: {message}")]
    ComparisonUnavailable {
        /// Error message
        message: String,
    },

    /// Live value outside the tolerance of the design specification
    #[error("Design validation failed: {message}")]
    Validation {
        /// Error message
        message: String,
    },

    /// Rejection attempted without feedback
    #[error("Rejecting a review requires non-empty feedback")]
    MissingFeedback,

    /// No screenshot matches the component
    #[error("No screenshots found for {component} in {dir}")]
    NoScreenshotFound {
        /// Component name
        component: String,
        /// Directory that was searched
        dir: String,
    },

    /// Review operation on a component that has no checklist
    #[error("No review checklist exists for {component}")]
    ChecklistNotFound {
        /// Component name
        component: String,
    },

    /// Review state machine violation
    #[error("Cannot {action} a review that is already {status}")]
    InvalidTransition {
        /// Attempted action
        action: String,
        /// Current status
        status: String,
    },

    /// Per-component lock is held elsewhere
    #[error("{component} is locked by another process ({path})")]
    Locked {
        /// Component name
        component: String,
        /// Lock file path
        path: String,
    },

    /// Design specification document is invalid
    #[error("Design specification error: {message}")]
    Spec {
        /// Error message
        message: String,
    },

    /// Configuration value is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Browser driver reported a failure
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Image processing error (decoding, resizing, encoding)
    #[error("Image processing failed: {message}")]
    ImageProcessing {
        /// Error message
        message: String,
    },

    /// Vector rasterizer failed
    #[error("Rasterization failed: {message}")]
    Rasterize {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProofError {
    /// Create a parse error
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a specification error
    #[must_use]
    pub fn spec(message: impl Into<String>) -> Self {
        Self::Spec {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create an unavailable-comparison error
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::ComparisonUnavailable {
            message: message.into(),
        }
    }

    /// Create an image processing error
    #[must_use]
    pub fn image(message: impl Into<String>) -> Self {
        Self::ImageProcessing {
            message: message.into(),
        }
    }

    /// Whether the error means "feature not present" rather than "wrong".
    ///
    /// Missing elements, expired waits and unavailable comparisons are
    /// reported as skips; everything else fails.
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::Timeout { .. } | Self::ComparisonUnavailable { .. }
        )
    }
}
