//! Common error types for LMS

use thiserror::Error;

/// Common result type for LMS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the LMS binaries
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
