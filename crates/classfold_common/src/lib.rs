//! Shared foundational types used across the classfold workspace.
//!
//! This crate provides content hashing for change detection and name
//! disambiguation, plus the common internal result type.

#![warn(missing_docs)]

pub mod hash;
pub mod result;

pub use hash::{short_hash, ContentHash, ParseHashError, SHORT_HASH_LEN};
pub use result::{ClassfoldResult, InternalError};
