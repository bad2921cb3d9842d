//! Deduplication Routine (spec.md §4.5): resolves rows that came back from
//! the store for what should be a single logical `(dir, filename)` pair,
//! when the filesystem is case-insensitive but the database is not.

use std::collections::{HashMap, HashSet};

use anyhow::Result;

use crate::matching_mode::MatchingMode;
use crate::record::{Record, RecordCacheEntry};
use crate::record_store::RecordStore;

/// Resolve `rows` (all already scoped to one directory, or to one
/// `(dir, filename)` lookup) into a `file_key -> RecordCacheEntry` map,
/// deleting any row that collides with another under the active mode.
///
/// `dir_rel` is the on-disk directory's exact casing; `on_disk_names` is
/// the exact casing of every entry actually present in that directory
/// (for a single-file lookup this is just `{filename}`). Per spec.md §4.5,
/// the winner of a collision is the row whose `(dir, filename)` exactly
/// matches these on-disk values; if neither side matches, the first row
/// seen (in store-return order) wins.
pub fn dedup_records(
    store: &dyn RecordStore,
    dir_rel: &str,
    rows: Vec<(i64, Record)>,
    on_disk_names: &HashSet<String>,
    mode: MatchingMode,
) -> Result<HashMap<String, RecordCacheEntry>> {
    let mut groups: HashMap<String, Vec<(i64, Record)>> = HashMap::new();
    for (fid, record) in rows {
        let key = mode.key(&record.filename);
        groups.entry(key).or_default().push((fid, record));
    }

    let mut resolved = HashMap::new();

    for (file_key, mut candidates) in groups {
        if candidates.len() == 1 {
            let (fid, record) = candidates.remove(0);
            resolved.insert(file_key, RecordCacheEntry::new(fid, record));
            continue;
        }

        let winner_idx = candidates
            .iter()
            .position(|(_, r)| r.dir == dir_rel && on_disk_names.contains(&r.filename))
            .unwrap_or(0);

        let (winner_fid, winner_record) = candidates[winner_idx].clone();

        for (idx, (fid, record)) in candidates.iter().enumerate() {
            if idx == winner_idx {
                continue;
            }
            store.delete_by_fid(*fid)?;
            tracing::warn!(
                "Removed record for '{}' because another record for '{}' exists. \
                 These records are duplicate because the file system is apparently case insensitive.",
                record.rel_path(),
                winner_record.rel_path(),
            );
        }

        resolved.insert(file_key, RecordCacheEntry::new(winner_fid, winner_record));
    }

    Ok(resolved)
}
