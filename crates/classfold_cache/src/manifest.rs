//! On-disk cache manifest: one entry per rewritten source file.
//!
//! The manifest is a single JSON object keyed by file path (relative to the
//! scan root, `/` separated). Keys are kept in a `BTreeMap` so the saved file
//! has a stable order and diffs cleanly under version control.

use std::collections::BTreeMap;
use std::path::Path;

use classfold_common::ContentHash;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Tag written into every entry naming the digest that produced its hashes.
pub const ALGORITHM_TAG: &str = "classfold/xxh3-128";

/// Cache state for a single source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Hash of the file content before classfold rewrote it.
    pub hash: ContentHash,

    /// Hash of the content classfold wrote back.
    #[serde(rename = "hashModified")]
    pub hash_modified: ContentHash,

    /// Unix time in milliseconds at which the entry was recorded.
    pub modified: u64,

    /// Digest algorithm tag, see [`ALGORITHM_TAG`].
    pub algorithm: String,
}

impl CacheEntry {
    /// Returns `true` if `hash` matches either recorded hash.
    pub fn matches(&self, hash: &ContentHash) -> bool {
        self.hash == *hash || self.hash_modified == *hash
    }
}

/// All cache entries, serialized as a bare JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheManifest {
    /// Per-file entries keyed by normalized relative path.
    pub entries: BTreeMap<String, CacheEntry>,
}

impl CacheManifest {
    /// Creates a new, empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the manifest from `path`, returning `None` if the file doesn't
    /// exist or can't be parsed.
    pub fn load(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Saves the manifest to `path` as pretty-printed JSON.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let mut json =
            serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;
        json.push('\n');
        std::fs::write(path, json).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
