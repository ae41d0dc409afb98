//! Common error types used throughout marquee.
//!
//! This module provides a unified error type that covers common failure cases
//! such as not found, unauthorized access, database errors, and invalid input.

/// Common error type for marquee.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity was not found.
    #[error("{0} not found")]
    NotFound(String),

    /// The caller is not authenticated.
    #[error("Unauthorized")]
    Unauthorized,

    /// A database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input was provided.
    #[error("{0}")]
    InvalidInput(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new NotFound error naming the missing entity.
    pub fn not_found<S: Into<String>>(entity: S) -> Self {
        Self::NotFound(entity.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status code this error maps to.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            Error::Unauthorized => 401,
            Error::InvalidInput(_) => 400,
            Error::Database(_) | Error::Io(_) | Error::Internal(_) => 500,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
