//! Error types for the symdex library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`SymdexError`] enum. Failures are always local to one job or one search
//! call; nothing in here is meant to bring the host process down.
//!
//! # Examples
//!
//! ```
//! use symdex::error::{SymdexError, Result};
//!
//! fn compile(pattern: &str) -> Result<()> {
//!     if pattern.is_empty() {
//!         return Err(SymdexError::invalid_pattern("empty pattern"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(compile("").is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for symdex operations.
#[derive(Error, Debug)]
pub enum SymdexError {
    /// I/O errors outside the index store (reading documents, config files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Persistence failure inside the index store. The in-memory state of the
    /// store is left unchanged when this is returned.
    #[error("Store I/O error: {0}")]
    StoreIo(String),

    /// A job's `execute` failed or panicked.
    #[error("Job execution error: {0}")]
    JobExecution(String),

    /// A malformed query pattern, reported before any collector callback.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// A container was not reachable during a scan. Searches skip it.
    #[error("Container unavailable: {0}")]
    ContainerUnavailable(String),

    /// Search requested with `CancelIfNotReady` while indexing is pending.
    #[error("Index not ready: {0}")]
    NotReady(String),

    /// The scheduler thread has been shut down.
    #[error("Scheduler stopped: {0}")]
    SchedulerStopped(String),

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Segment encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with SymdexError.
pub type Result<T> = std::result::Result<T, SymdexError>;

impl From<bincode::Error> for SymdexError {
    fn from(err: bincode::Error) -> Self {
        SymdexError::Serialization(err.to_string())
    }
}

impl SymdexError {
    /// Create a new store I/O error.
    pub fn store_io<S: Into<String>>(msg: S) -> Self {
        SymdexError::StoreIo(msg.into())
    }

    /// Create a new job execution error.
    pub fn job<S: Into<String>>(msg: S) -> Self {
        SymdexError::JobExecution(msg.into())
    }

    /// Create a new invalid pattern error.
    pub fn invalid_pattern<S: Into<String>>(msg: S) -> Self {
        SymdexError::InvalidPattern(msg.into())
    }

    /// Create a new container unavailable error.
    pub fn container_unavailable<S: Into<String>>(msg: S) -> Self {
        SymdexError::ContainerUnavailable(msg.into())
    }

    /// Create a new not-ready error.
    pub fn not_ready<S: Into<String>>(msg: S) -> Self {
        SymdexError::NotReady(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SymdexError::Config(msg.into())
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        SymdexError::InvalidOperation(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        SymdexError::Serialization(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SymdexError::Other(msg.into())
    }

    /// Whether this is a persistence failure of the index store.
    pub fn is_store_io(&self) -> bool {
        matches!(self, SymdexError::StoreIo(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = SymdexError::store_io("disk full");
        assert_eq!(error.to_string(), "Store I/O error: disk full");
        assert!(error.is_store_io());

        let error = SymdexError::invalid_pattern("empty pattern");
        assert_eq!(error.to_string(), "Invalid pattern: empty pattern");
        assert!(!error.is_store_io());

        let error = SymdexError::container_unavailable("/p1");
        assert_eq!(error.to_string(), "Container unavailable: /p1");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = SymdexError::from(io_error);

        match error {
            SymdexError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
