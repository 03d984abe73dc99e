//! Persistent change detection for incremental rewriting.
//!
//! This crate records, per source file, the content hash seen before a
//! rewrite and the hash of the content classfold wrote back. A file whose
//! current content matches either hash is considered unmodified, so a re-run
//! over already converted output is a no-op.

#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod hasher;
pub mod manifest;

pub use cache::ChangeCache;
pub use error::CacheError;
pub use hasher::{ChangeSet, SourceHasher};
pub use manifest::{CacheEntry, CacheManifest, ALGORITHM_TAG};
