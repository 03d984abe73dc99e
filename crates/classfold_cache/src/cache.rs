//! High-level change cache.
//!
//! `ChangeCache` ties the manifest and the source hasher together into the
//! gate used by the rewrite pipeline: it is loaded once at run start, asked
//! whether each file needs processing, updated as files are rewritten, and
//! saved once at run end.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use classfold_common::ContentHash;

use crate::error::CacheError;
use crate::hasher::{ChangeSet, SourceHasher};
use crate::manifest::{CacheEntry, CacheManifest, ALGORITHM_TAG};

/// Persistent file → hash mapping deciding skip-vs-process per file.
///
/// All reads are fail-safe: a missing or corrupt cache file results in an
/// empty cache, so every file is processed again.
#[derive(Debug, Clone)]
pub struct ChangeCache {
    /// Location of the cache file on disk.
    path: PathBuf,

    /// Entries loaded from disk plus any recorded during this run.
    manifest: CacheManifest,
}

impl ChangeCache {
    /// Loads the cache file at `path`, or starts empty.
    ///
    /// Never fails. A corrupt file is reported as a warning and ignored; it
    /// is overwritten by the next [`save`](Self::save).
    pub fn load(path: &Path) -> Self {
        let manifest = if path.exists() {
            CacheManifest::load(path).unwrap_or_else(|| {
                tracing::warn!(
                    path = %path.display(),
                    "failed to load cache file, starting with an empty one"
                );
                CacheManifest::new()
            })
        } else {
            tracing::info!(path = %path.display(), "no cache file yet, starting fresh");
            CacheManifest::new()
        };

        Self {
            path: path.to_path_buf(),
            manifest,
        }
    }

    /// Returns `true` if `file` must be processed.
    ///
    /// That is the case when the file has no entry, or when the digest of
    /// `content` matches neither the recorded original nor the recorded
    /// rewritten hash.
    pub fn is_modified(&self, file: &str, content: &str) -> bool {
        match self.manifest.entries.get(file) {
            Some(entry) => !entry.matches(&ContentHash::from_str_content(content)),
            None => true,
        }
    }

    /// Records that `file` was read as `original` and written back as `modified`.
    pub fn record(&mut self, file: &str, original: &str, modified: &str) {
        self.manifest.entries.insert(
            file.to_string(),
            CacheEntry {
                hash: ContentHash::from_str_content(original),
                hash_modified: ContentHash::from_str_content(modified),
                modified: unix_millis(),
                algorithm: ALGORITHM_TAG.to_string(),
            },
        );
    }

    /// Drops the entry for `file`, if any.
    pub fn forget(&mut self, file: &str) -> Option<CacheEntry> {
        self.manifest.entries.remove(file)
    }

    /// Returns the entry recorded for `file`.
    pub fn entry(&self, file: &str) -> Option<&CacheEntry> {
        self.manifest.entries.get(file)
    }

    /// Classifies `(key, path)` pairs into new, modified, unchanged, and deleted.
    pub fn detect_changes(&self, files: &[(String, PathBuf)]) -> ChangeSet {
        let hashes =
            SourceHasher::hash_files(files.iter().map(|(key, path)| (key.as_str(), path.as_path())));
        SourceHasher::detect_changes(&hashes, &self.manifest)
    }

    /// Persists the cache to its file.
    pub fn save(&self) -> Result<(), CacheError> {
        self.manifest.save(&self.path)
    }

    /// Returns the path the cache is saved to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a reference to the current manifest.
    pub fn manifest(&self) -> &CacheManifest {
        &self.manifest
    }

    /// Returns the number of files with an entry.
    pub fn len(&self) -> usize {
        self.manifest.entries.len()
    }

    /// Returns `true` if no file has an entry.
    pub fn is_empty(&self) -> bool {
        self.manifest.entries.is_empty()
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
