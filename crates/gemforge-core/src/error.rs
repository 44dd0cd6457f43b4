//! Common error type definitions.

use std::time::Duration;

use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// This type is commonly used as a source error in structured error types,
/// providing a way to wrap any error that implements the standard `Error`
/// trait while maintaining Send and Sync bounds for multi-threaded contexts.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of errors that can occur across gemforge crates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input validation failed (a bad job payload, a malformed config file).
    InvalidInput,
    /// A lookup addressed an id or name the registry/store doesn't hold.
    NotFound,
    /// Configuration error.
    Configuration,
    /// Operation timed out.
    Timeout,
    /// Component is temporarily unavailable (pool exhausted, worker dead).
    Unavailable,
    /// Serialization/deserialization error.
    Serialization,
    /// Internal error with no more specific classification.
    Internal,
    /// Unknown error occurred.
    Unknown,
}

/// A structured error type used across gemforge crates.
#[derive(Debug, Error)]
#[error("{kind:?}{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a new invalid input error.
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Creates a new not found error.
    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    /// Creates a new configuration error.
    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    /// Creates a new timeout error.
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout)
    }

    /// Creates a new unavailable error.
    pub fn unavailable() -> Self {
        Self::new(ErrorKind::Unavailable)
    }

    /// Creates a new serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Creates a new internal error.
    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal)
    }

    /// Creates a new unknown error.
    pub fn unknown() -> Self {
        Self::new(ErrorKind::Unknown)
    }

    /// Returns true if this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout | ErrorKind::Unavailable)
    }

    /// Returns the recommended retry delay for this error, if any.
    pub fn retry_delay(&self) -> Option<Duration> {
        match self.kind {
            ErrorKind::Unavailable => Some(Duration::from_secs(5)),
            ErrorKind::Timeout => Some(Duration::from_secs(1)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_kinds_carry_a_delay() {
        assert!(Error::timeout().is_retryable());
        assert!(Error::unavailable().is_retryable());
        assert!(Error::timeout().retry_delay().is_some());
        assert!(!Error::invalid_input().is_retryable());
        assert!(Error::invalid_input().retry_delay().is_none());
    }

    #[test]
    fn display_includes_message() {
        let err = Error::not_found().with_message("job abc123");
        assert_eq!(err.to_string(), "NotFound: job abc123");
    }
}
