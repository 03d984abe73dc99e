//! Source file hashing and change detection.
//!
//! Computes content hashes for source files and compares them against the
//! cache manifest to identify which files are new, modified, deleted,
//! or unchanged since the last run.

use std::collections::BTreeMap;
use std::path::Path;

use classfold_common::ContentHash;
use serde::Serialize;

use crate::error::CacheError;
use crate::manifest::CacheManifest;

/// Result of comparing current source file hashes against the cache manifest.
///
/// A file counts as unchanged when its hash matches either the pre-rewrite
/// or the post-rewrite hash recorded for it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChangeSet {
    /// Files that are not present in the cache manifest.
    pub new_files: Vec<String>,

    /// Files whose content hash matches neither recorded hash.
    pub modified_files: Vec<String>,

    /// Files present in the manifest but not in the current file set.
    pub deleted_files: Vec<String>,

    /// Files whose content hash matches a recorded hash.
    pub unchanged_files: Vec<String>,
}

impl ChangeSet {
    /// Returns `true` if there are no changes (no new, modified, or deleted files).
    pub fn is_empty(&self) -> bool {
        self.new_files.is_empty() && self.modified_files.is_empty() && self.deleted_files.is_empty()
    }

    /// Returns the total number of files that need reprocessing (new + modified).
    pub fn dirty_count(&self) -> usize {
        self.new_files.len() + self.modified_files.len()
    }
}

/// Utility for computing content hashes of source files and detecting changes.
pub struct SourceHasher;

impl SourceHasher {
    /// Reads a file and returns its content hash.
    pub fn hash_file(path: &Path) -> Result<ContentHash, CacheError> {
        let content = std::fs::read(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(ContentHash::from_bytes(&content))
    }

    /// Computes content hashes for `(key, path)` pairs.
    ///
    /// Files that cannot be read are skipped; they will appear as deleted
    /// in the change set.
    pub fn hash_files<'a, I>(files: I) -> BTreeMap<String, ContentHash>
    where
        I: IntoIterator<Item = (&'a str, &'a Path)>,
    {
        let mut hashes = BTreeMap::new();
        for (key, path) in files {
            if let Ok(hash) = Self::hash_file(path) {
                hashes.insert(key.to_string(), hash);
            }
        }
        hashes
    }

    /// Compares current file hashes against the cache manifest.
    ///
    /// Output lists are sorted by key.
    pub fn detect_changes(
        current_hashes: &BTreeMap<String, ContentHash>,
        manifest: &CacheManifest,
    ) -> ChangeSet {
        let mut cs = ChangeSet::default();

        for (key, hash) in current_hashes {
            match manifest.entries.get(key) {
                Some(entry) if entry.matches(hash) => cs.unchanged_files.push(key.clone()),
                Some(_) => cs.modified_files.push(key.clone()),
                None => cs.new_files.push(key.clone()),
            }
        }

        cs.deleted_files = manifest
            .entries
            .keys()
            .filter(|k| !current_hashes.contains_key(*k))
            .cloned()
            .collect();

        cs
    }
}
