//! Common result and error types for the classfold workspace.

/// The standard result type for fallible internal operations.
///
/// `Err` indicates a broken internal invariant (a bug in classfold), not a
/// problem with the user's files. Recoverable conditions such as a failed
/// naming call or an unreadable cache file are handled where they occur.
pub type ClassfoldResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in classfold, not a user input problem.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
