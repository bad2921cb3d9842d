//! `MatchingMode` — the single source of truth for every case-sensitivity
//! decision in the engine (spec.md §4.3, §9).
//!
//! The reconciled design from spec.md §9 consolidates the scattered
//! `if insensitive_fs || insensitive_db` checks into one policy object.
//! Everything downstream (cache keys, SQL equality, LIKE dialect,
//! deduplication) asks this type, never the raw booleans directly.

/// The (filesystem, database) case-sensitivity pair. There are exactly four
/// combinations; each is a distinct variant rather than a pair of bools so
/// `match` exhaustiveness catches missing cases at compile time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchingMode {
    /// Sensitive filesystem, sensitive database.
    SensitiveSensitive,
    /// Sensitive filesystem, insensitive database.
    SensitiveInsensitive,
    /// Insensitive filesystem, sensitive database.
    InsensitiveSensitive,
    /// Insensitive filesystem, insensitive database.
    InsensitiveInsensitive,
}

impl MatchingMode {
    pub fn new(insensitive_fs: bool, insensitive_db: bool) -> Self {
        match (insensitive_fs, insensitive_db) {
            (false, false) => MatchingMode::SensitiveSensitive,
            (false, true) => MatchingMode::SensitiveInsensitive,
            (true, false) => MatchingMode::InsensitiveSensitive,
            (true, true) => MatchingMode::InsensitiveInsensitive,
        }
    }

    pub fn insensitive_fs(self) -> bool {
        matches!(
            self,
            MatchingMode::InsensitiveSensitive | MatchingMode::InsensitiveInsensitive
        )
    }

    pub fn insensitive_db(self) -> bool {
        matches!(
            self,
            MatchingMode::SensitiveInsensitive | MatchingMode::InsensitiveInsensitive
        )
    }

    /// `case_insensitive_matching` in spec.md §4.3: true if either side is
    /// insensitive. Drives cache-key lowercasing and diffing.
    pub fn case_insensitive_matching(self) -> bool {
        self.insensitive_fs() || self.insensitive_db()
    }

    /// `need_sql_lowering` in spec.md §4.3: true only when the filesystem is
    /// insensitive but the database is not — the only combination where the
    /// DB's own collation can't be trusted to do the matching for us.
    pub fn need_sql_lowering(self) -> bool {
        self.insensitive_fs() && !self.insensitive_db()
    }

    /// True when the same on-disk name can appear in the store under more
    /// than one casing and must be collapsed to one winner (spec.md §4.5).
    /// This is exactly the "insensitive FS, sensitive DB" combination: a
    /// sensitive DB can hold `bb`/`bB`/`BB` as distinct rows even though the
    /// filesystem can only ever have one of them.
    pub fn needs_dedup(self) -> bool {
        matches!(self, MatchingMode::InsensitiveSensitive)
    }

    /// Whether values destined for a `LOWER(...)`-wrapped SQL comparison
    /// must themselves be lowercased before binding (spec.md §4.3).
    pub fn must_lower_values(self) -> bool {
        self.need_sql_lowering()
    }

    /// The cache key for a path component: lowercased under any
    /// case-insensitive matching mode, original casing otherwise.
    pub fn key(self, name: &str) -> String {
        if self.case_insensitive_matching() {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }

    /// True if two path components should be considered the same key.
    pub fn keys_equal(self, a: &str, b: &str) -> bool {
        self.key(a) == self.key(b)
    }
}
