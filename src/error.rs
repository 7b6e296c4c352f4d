//! Error types for image loading, saving and filtering.

use std::io;
use thiserror::Error;

/// Error type for every fallible image operation.
#[derive(Debug, Error)]
pub enum ImageError {
    /// File could not be opened, read or written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Bad signature, unsupported bit depth or compression, truncated data.
    #[error("format error: {0}")]
    Format(String),

    /// Pixel or kernel storage could not be reserved.
    #[error("allocation failed: {0}")]
    Allocation(String),

    /// Filter parameter missing, unparsable or outside its domain.
    #[error("invalid parameter: {0}")]
    Validation(String),

    /// Width or height is not positive.
    #[error("invalid dimensions: {0}")]
    Dimension(String),

    /// No filter registered under this name.
    #[error("unknown filter: {0}")]
    UnknownFilter(String),
}

/// Result type for image operations.
pub type ImageResult<T> = Result<T, ImageError>;
