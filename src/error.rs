//! Error handling for the vocoder library
//!
//! All failure conditions are precondition violations detectable before any
//! synthesis work begins, so validation happens once at the entry point and
//! a failed call leaves the caller's output buffer untouched.

#![allow(missing_docs)]

use std::fmt;
use thiserror::Error;

/// Result type alias for vocoder operations
pub type Result<T> = std::result::Result<T, VocoderError>;

/// Error type for vocoder decode operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VocoderError {
    /// Invalid decoder configuration
    #[error("Invalid vocoder configuration: {details}")]
    InvalidConfig { details: String },

    /// A per-frame input array has the wrong length
    #[error("Invalid dimension for {field}: expected {expected}, got {actual}")]
    InvalidDimension {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Caller-supplied output buffer disagrees with the computed length
    #[error("Output length mismatch: synthesis produces {required} samples, buffer holds {actual}")]
    LengthMismatch { required: usize, actual: usize },
}

impl VocoderError {
    /// Create a new invalid configuration error
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig {
            details: details.into(),
        }
    }

    /// Create a new invalid dimension error
    pub fn invalid_dimension(field: &'static str, expected: usize, actual: usize) -> Self {
        Self::InvalidDimension {
            field,
            expected,
            actual,
        }
    }

    /// Create a new length mismatch error
    pub fn length_mismatch(required: usize, actual: usize) -> Self {
        Self::LengthMismatch { required, actual }
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfig { .. } => ErrorCategory::Configuration,
            Self::InvalidDimension { .. } => ErrorCategory::Input,
            Self::LengthMismatch { .. } => ErrorCategory::Buffer,
        }
    }
}

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Decoder configuration errors
    Configuration,
    /// Per-frame input array errors
    Input,
    /// Output buffer errors
    Buffer,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Input => write!(f, "Input"),
            Self::Buffer => write!(f, "Buffer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = VocoderError::invalid_config("fft_size must be even");
        assert!(matches!(err, VocoderError::InvalidConfig { .. }));
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            VocoderError::invalid_dimension("f0", 10, 0).category(),
            ErrorCategory::Input
        );
        assert_eq!(
            VocoderError::length_mismatch(1601, 1600).category(),
            ErrorCategory::Buffer
        );
    }

    #[test]
    fn test_error_display() {
        let err = VocoderError::invalid_dimension("spectral_envelope", 2570, 2560);
        let display = format!("{}", err);
        assert!(display.contains("spectral_envelope"));
        assert!(display.contains("expected 2570"));
        assert!(display.contains("got 2560"));

        let err = VocoderError::length_mismatch(1601, 1600);
        let display = format!("{}", err);
        assert!(display.contains("1601"));
        assert!(display.contains("1600"));
    }
}
