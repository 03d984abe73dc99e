//! Error types for a rewrite run.

use std::path::PathBuf;

use classfold_cache::CacheError;
use classfold_common::InternalError;

/// Errors that end a run.
///
/// Any of these aborts the whole run: the write buffer is not flushed and
/// the change cache is not saved, so disk state and cache stay consistent.
/// Naming-service failures never appear here; they fall back to hashed names.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A source file or directory could not be read, or an output could not be written.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The utility table could not be loaded.
    #[error("failed to load utility table {path}: {reason}")]
    Utilities {
        /// The utility table path.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Saving the change cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A broken internal invariant.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
