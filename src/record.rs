//! The persistent `Record` and the ephemeral `RecordCacheEntry` (spec.md §3).

/// A single indexed file. `dir` is relative to the allowed root (`""` for
/// the root itself), always `/`-separated, never beginning or ending with
/// `/` and never containing `.`/`..` segments. `filename` is a basename
/// only. `hash` is non-empty lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub dir: String,
    pub filename: String,
    pub hash: String,
}

impl Record {
    pub fn new(dir: impl Into<String>, filename: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            filename: filename.into(),
            hash: hash.into(),
        }
    }

    /// The relative path `dir/filename` (or just `filename` when `dir` is
    /// the root), used throughout the C1-C4 log messages.
    pub fn rel_path(&self) -> String {
        if self.dir.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.dir, self.filename)
        }
    }
}

/// A row fetched from the store, plus its assigned `fid`. Carries the
/// *original-case* `dir`/`filename` as stored, even when the cache it lives
/// in is keyed in lowercase for case-insensitive matching (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCacheEntry {
    pub fid: i64,
    pub record: Record,
}

impl RecordCacheEntry {
    pub fn new(fid: i64, record: Record) -> Self {
        Self { fid, record }
    }
}
