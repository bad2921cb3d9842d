//! The in-memory caches (spec.md §3, §9): owned by a single `process_paths`
//! invocation, never instance fields of a long-lived processor. Keeping
//! them local makes "empty at end of call" (spec.md §8 invariant 1) trivial
//! to check and test.

use std::collections::{HashMap, HashSet};

use crate::record::RecordCacheEntry;

/// `records_cache` + `subdirs_cache`, keyed by directory key (lowercased
/// under case-insensitive matching, original-case otherwise — see
/// `MatchingMode::key`).
#[derive(Default)]
pub struct Caches {
    /// dir_key -> (file_key -> cache entry)
    records: HashMap<String, HashMap<String, RecordCacheEntry>>,
    /// dir_key -> distinct first-level subdirectory names below it, in
    /// original casing (may hold several casings of one logical name).
    subdirs: HashMap<String, HashSet<String>>,
}

impl Caches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_dir(&self, dir_key: &str) -> bool {
        self.records.contains_key(dir_key)
    }

    pub fn has_subdirs(&self, dir_key: &str) -> bool {
        self.subdirs.contains_key(dir_key)
    }

    pub fn set_records(&mut self, dir_key: &str, entries: HashMap<String, RecordCacheEntry>) {
        self.records.insert(dir_key.to_string(), entries);
    }

    pub fn set_subdirs(&mut self, dir_key: &str, names: HashSet<String>) {
        self.subdirs.insert(dir_key.to_string(), names);
    }

    pub fn records(&self, dir_key: &str) -> Option<&HashMap<String, RecordCacheEntry>> {
        self.records.get(dir_key)
    }

    pub fn records_mut(&mut self, dir_key: &str) -> Option<&mut HashMap<String, RecordCacheEntry>> {
        self.records.get_mut(dir_key)
    }

    pub fn subdirs(&self, dir_key: &str) -> Option<&HashSet<String>> {
        self.subdirs.get(dir_key)
    }

    pub fn subdirs_mut(&mut self, dir_key: &str) -> Option<&mut HashSet<String>> {
        self.subdirs.get_mut(dir_key)
    }

    /// Look up a single file's cache entry in directory `dir_key` by file
    /// key, if that directory's cache is populated.
    pub fn lookup_file(&self, dir_key: &str, file_key: &str) -> Option<&RecordCacheEntry> {
        self.records.get(dir_key).and_then(|m| m.get(file_key))
    }

    /// Discard the caches for directory `dir_key` (both maps). Called on
    /// `process_directory` exit, on every path including error paths.
    pub fn discard(&mut self, dir_key: &str) {
        self.records.remove(dir_key);
        self.subdirs.remove(dir_key);
    }

    /// True once both maps are empty — the postcondition spec.md §8
    /// invariant 1 requires at the end of a top-level `process_paths` call.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.subdirs.is_empty()
    }
}
