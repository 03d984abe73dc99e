//! Run-scoped index of class-string occurrences.
//!
//! Every occurrence found during a run is stored once; per-file lookups
//! return positions into that list. Offsets refer to the
//! file content as read during this run, so the index is never persisted.

use std::collections::{HashMap, HashSet};

use crate::canonical::CanonicalKey;

/// One concrete appearance of a class-list string at a file position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Cache key of the file (path relative to the scan root).
    pub file: String,
    /// The class string exactly as it appears in the file.
    pub class_string: String,
    /// Canonical key of `class_string`.
    pub key: CanonicalKey,
    /// Byte offset of the class string in the original content.
    pub offset: usize,
    /// Byte length of the class string in the original content.
    pub length: usize,
    /// Element carrying the attribute, if the scanner reported one.
    pub tag: Option<String>,
}

/// All occurrences accumulated during one run.
#[derive(Debug, Default)]
pub struct OccurrenceIndex {
    occurrences: Vec<Occurrence>,
    known_keys: HashSet<CanonicalKey>,
    by_file: HashMap<String, Vec<usize>>,
    key_order: Vec<CanonicalKey>,
}

impl OccurrenceIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an occurrence to the list for its file.
    pub fn accumulate(&mut self, occurrence: Occurrence) {
        let position = self.occurrences.len();
        if self.known_keys.insert(occurrence.key.clone()) {
            self.key_order.push(occurrence.key.clone());
        }
        self.by_file
            .entry(occurrence.file.clone())
            .or_default()
            .push(position);
        self.occurrences.push(occurrence);
    }

    /// Returns the occurrences in `file`, sorted ascending by original offset.
    pub fn for_file(&self, file: &str) -> Vec<&Occurrence> {
        let mut list: Vec<&Occurrence> = self
            .by_file
            .get(file)
            .into_iter()
            .flatten()
            .map(|&i| &self.occurrences[i])
            .collect();
        list.sort_by_key(|o| o.offset);
        list
    }

    /// Returns the distinct keys occurring in `file`, in first-encounter order.
    pub fn keys_in_file(&self, file: &str) -> Vec<&CanonicalKey> {
        let mut keys: Vec<&CanonicalKey> = Vec::new();
        for &i in self.by_file.get(file).into_iter().flatten() {
            let key = &self.occurrences[i].key;
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Returns every distinct key, in the order it was first seen this run.
    pub fn keys(&self) -> &[CanonicalKey] {
        &self.key_order
    }

    /// Returns the total number of occurrences.
    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    /// Returns `true` if nothing has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}
