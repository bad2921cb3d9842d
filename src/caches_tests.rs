use crate::caches::*;
use crate::record::Record;
use std::collections::{HashMap, HashSet};

#[test]
fn fresh_caches_are_empty() {
    let caches = Caches::new();
    assert!(caches.is_empty());
}

#[test]
fn discard_removes_both_maps_for_that_key() {
    let mut caches = Caches::new();
    caches.set_records("d", HashMap::new());
    caches.set_subdirs("d", HashSet::new());
    assert!(!caches.is_empty());

    caches.discard("d");
    assert!(caches.is_empty());
}

#[test]
fn parent_and_child_caches_coexist() {
    let mut caches = Caches::new();
    caches.set_records("parent", HashMap::new());
    caches.set_records("parent/child", HashMap::new());
    assert!(caches.has_dir("parent"));
    assert!(caches.has_dir("parent/child"));

    caches.discard("parent/child");
    assert!(caches.has_dir("parent"));
    assert!(!caches.has_dir("parent/child"));
}

#[test]
fn lookup_file_finds_entry_by_keys() {
    let mut caches = Caches::new();
    let mut m = HashMap::new();
    m.insert(
        "aa".to_string(),
        crate::record::RecordCacheEntry::new(1, Record::new("d", "aa", "hash")),
    );
    caches.set_records("d", m);
    assert!(caches.lookup_file("d", "aa").is_some());
    assert!(caches.lookup_file("d", "bb").is_none());
    assert!(caches.lookup_file("other", "aa").is_none());
}
