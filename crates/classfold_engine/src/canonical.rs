//! Class-list canonicalization.
//!
//! A [`CanonicalKey`] is the identity used for deduplication everywhere else:
//! occurrences are grouped by it, names are assigned per key, and CSS is
//! generated once per key.

use serde::Serialize;
use std::fmt;

/// Normalized form of a class-list string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Returns the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalKey({:?})", self.0)
    }
}

/// Computes the canonical key of `class_string`.
///
/// When `order_matters` is false, tokens are split on whitespace, sorted
/// lexicographically and joined with single spaces, so any permutation of
/// the same tokens yields the same key. Repeated tokens are kept. When
/// `order_matters` is true the string is used unchanged.
pub fn canonical_key(class_string: &str, order_matters: bool) -> CanonicalKey {
    if order_matters {
        return CanonicalKey(class_string.to_string());
    }
    let mut tokens: Vec<&str> = class_string.split_whitespace().collect();
    tokens.sort_unstable();
    CanonicalKey(tokens.join(" "))
}
