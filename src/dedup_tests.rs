use crate::dedup::*;
use crate::matching_mode::MatchingMode;
use crate::record::Record;
use crate::record_store::RecordStore;
use crate::sqlite_store::SqliteStore;
use std::collections::HashSet;

#[test]
fn single_row_needs_no_dedup() {
    let store = SqliteStore::open_in_memory("file", "sha256", false).unwrap();
    let fid = store.insert(&Record::new("d", "bb", "h")).unwrap();
    let rows = vec![(fid, Record::new("d", "bb", "h"))];
    let on_disk: HashSet<_> = ["bb".to_string()].into_iter().collect();

    let resolved = dedup_records(&store, "d", rows, &on_disk, MatchingMode::InsensitiveSensitive).unwrap();
    assert_eq!(resolved.len(), 1);
    assert!(resolved.contains_key("bb"));
}

#[test]
fn collision_keeps_on_disk_casing_and_deletes_rest() {
    let store = SqliteStore::open_in_memory("file", "sha256", false).unwrap();
    let fid_bb = store.insert(&Record::new("d", "bb", "h")).unwrap();
    let fid_bb2 = store.insert(&Record::new("d", "bB", "h")).unwrap();
    let fid_bb3 = store.insert(&Record::new("D", "BB", "h")).unwrap();

    let rows = vec![
        (fid_bb, Record::new("d", "bb", "h")),
        (fid_bb2, Record::new("d", "bB", "h")),
        (fid_bb3, Record::new("D", "BB", "h")),
    ];
    let on_disk: HashSet<_> = ["bb".to_string()].into_iter().collect();

    let resolved = dedup_records(&store, "d", rows, &on_disk, MatchingMode::InsensitiveSensitive).unwrap();
    assert_eq!(resolved.len(), 1);
    let winner = &resolved["bb"];
    assert_eq!(winner.fid, fid_bb);
    assert_eq!(winner.record.filename, "bb");

    // The losers were actually deleted from the store.
    let remaining = store.fetch_dir_records("d", MatchingMode::InsensitiveSensitive).unwrap();
    assert_eq!(remaining.len(), 1);
}

#[test]
fn no_on_disk_match_keeps_first_seen() {
    let store = SqliteStore::open_in_memory("file", "sha256", false).unwrap();
    let fid1 = store.insert(&Record::new("d", "XX", "h")).unwrap();
    let fid2 = store.insert(&Record::new("d", "xx", "h")).unwrap();
    let rows = vec![(fid1, Record::new("d", "XX", "h")), (fid2, Record::new("d", "xx", "h"))];
    let on_disk: HashSet<_> = ["yy".to_string()].into_iter().collect();

    let resolved = dedup_records(&store, "d", rows, &on_disk, MatchingMode::InsensitiveSensitive).unwrap();
    assert_eq!(resolved.len(), 1);
    let key = MatchingMode::InsensitiveSensitive.key("XX");
    assert_eq!(resolved[&key].fid, fid1);
}
