//! Error types for bundle authors

use thiserror::Error;

/// Errors that bundles can return
#[derive(Error, Debug)]
pub enum BundleError {
    /// Class not present in this build
    #[error("Unknown class: {0}")]
    UnknownClass(String),

    /// Method not present on the class
    #[error("Unknown method: {class}.{method}")]
    UnknownMethod { class: String, method: String },

    /// Construct call on a class without a public constructor
    #[error("Class {0} has no public constructor")]
    NotConstructible(String),

    /// Wrong number of arguments
    #[error("Expected {expected} arguments, got {got}")]
    Arity { expected: usize, got: usize },

    /// Argument with the wrong shape or type
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Catalog entry the host cannot index
    #[error("Malformed class entry: {0}")]
    Malformed(String),

    /// Failure inside the native library
    #[error("Native call failed: {0}")]
    Native(String),

    /// Custom error with message
    #[error("{0}")]
    Custom(String),
}

impl BundleError {
    /// Create a custom error with a message
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Create a native-failure error
    pub fn native(message: impl Into<String>) -> Self {
        Self::Native(message.into())
    }

    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let unknown = BundleError::UnknownClass("core.Image".to_string());
        assert_eq!(unknown.to_string(), "Unknown class: core.Image");

        let method = BundleError::UnknownMethod {
            class: "filters.Blur".to_string(),
            method: "sharpen".to_string(),
        };
        assert_eq!(method.to_string(), "Unknown method: filters.Blur.sharpen");

        let arity = BundleError::Arity {
            expected: 2,
            got: 3,
        };
        assert!(arity.to_string().contains("2"));
        assert!(arity.to_string().contains("3"));
    }

    #[test]
    fn test_helper_constructors() {
        let err = BundleError::custom("test");
        assert!(matches!(err, BundleError::Custom(_)));

        let err = BundleError::native("cv::resize failed");
        assert!(matches!(err, BundleError::Native(_)));

        let err = BundleError::invalid_argument("expected integer");
        assert!(matches!(err, BundleError::InvalidArgument(_)));
    }

    #[test]
    fn test_not_constructible_display() {
        let err = BundleError::NotConstructible("core.Runtime".to_string());
        assert!(err.to_string().contains("core.Runtime"));
    }
}
