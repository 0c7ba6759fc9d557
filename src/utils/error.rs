//! Error Handling Module
//!
//! Defines custom error types for the cats-vs-dogs library.
//! Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for cats-vs-dogs operations
#[derive(Error, Debug)]
pub enum CatsDogsError {
    /// Error loading or decoding an image
    #[error("Failed to load image at '{0}': {1}")]
    ImageLoad(PathBuf, String),

    /// Error with dataset operations
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Error with model operations (save, load, forward)
    #[error("Model error: {0}")]
    Model(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

/// Convenience Result type for cats-vs-dogs operations
pub type Result<T> = std::result::Result<T, CatsDogsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatsDogsError::ImageLoad(PathBuf::from("cat.jpg"), "truncated".to_string());
        assert_eq!(err.to_string(), "Failed to load image at 'cat.jpg': truncated");

        let err = CatsDogsError::Dataset("no samples".to_string());
        assert_eq!(err.to_string(), "Dataset error: no samples");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CatsDogsError = io.into();
        assert!(matches!(err, CatsDogsError::Io(_)));
    }
}
