//! Record Store contract (spec.md §4.3): the case-aware operations every
//! backend must provide, plus the `SqlDialect` abstraction that isolates
//! the LIKE/collation differences between database kinds (spec.md §9:
//! "no inheritance-based polymorphism for database variants... an injected
//! Store interface with three back-end implementations").

use crate::matching_mode::MatchingMode;
use crate::record::Record;
use anyhow::Result;

/// Operations a backing store must expose. Every method that selects or
/// matches on `dir`/`filename` takes the active `MatchingMode` so the
/// implementation can choose plain equality, `LOWER(...)` wrapping, or the
/// database's own collation, per spec.md §4.3.
pub trait RecordStore {
    /// All records whose `dir` equals `dir_key`, case-aware per `mode`.
    /// Returns `(fid, Record)` pairs in the original stored casing.
    fn fetch_dir_records(&self, dir_key: &str, mode: MatchingMode) -> Result<Vec<(i64, Record)>>;

    /// Distinct first-level subdirectory names appearing in stored `dir`
    /// values strictly below `dir_key` (`""` for the root). May contain
    /// several casings of the same logical name when the DB is
    /// case-sensitive; never contains `""`.
    fn fetch_subdir_names(&self, dir_key: &str, mode: MatchingMode) -> Result<Vec<String>>;

    /// All rows matching `(dir, filename)`, case-aware per `mode`. May
    /// return more than one row when the database is case-sensitive but the
    /// filesystem is not (duplicates requiring deduplication).
    fn fetch_one(&self, dir: &str, filename: &str, mode: MatchingMode) -> Result<Vec<(i64, Record)>>;

    /// Insert a new row, returning its assigned `fid`.
    fn insert(&self, record: &Record) -> Result<i64>;

    /// Overwrite the row identified by `fid` with `record`.
    fn update(&self, fid: i64, record: &Record) -> Result<()>;

    /// Delete the row identified by `fid`. Returns the number of rows
    /// actually deleted (should be 0 or 1; spec.md §4.4 C4 logs a warning
    /// when this is anything other than 1).
    fn delete_by_fid(&self, fid: i64) -> Result<u64>;

    /// Delete rows `(dir_key, name)` for each `name` in `names`, case-aware
    /// per `mode`. Returns the number of rows deleted.
    fn delete_files_in_dir(&self, dir_key: &str, names: &[String], mode: MatchingMode) -> Result<u64>;

    /// Delete rows whose `dir` equals `dir_prefix` or begins with
    /// `dir_prefix + "/"`, case-aware per `mode`. Returns the number of rows
    /// deleted.
    fn delete_subtree(&self, dir_prefix: &str, mode: MatchingMode) -> Result<u64>;

    /// Apply any connection-wide case-sensitivity setup the backend needs
    /// (e.g. SQLite's `PRAGMA case_sensitive_like`). Called once per
    /// `process_paths` call. Default no-op for backends with no such knob.
    fn configure_case_sensitivity(&self, _mode: MatchingMode) -> Result<()> {
        Ok(())
    }
}

/// Encodes the LIKE/collation table from spec.md §4.3 as pure
/// string-building logic — no I/O, so it's unit-testable without a live
/// connection to the database kind it describes.
pub trait SqlDialect {
    /// `col = value` (or database-appropriate equivalent) for the active
    /// mode. `need_sql_lowering` wraps both sides in `LOWER(...)`.
    fn eq_clause(&self, column: &str, mode: MatchingMode) -> String {
        if mode.need_sql_lowering() {
            format!("LOWER({column}) = LOWER(?)")
        } else {
            format!("{column} = ?")
        }
    }

    /// The LIKE operator/collation wrapper to use for a range predicate
    /// (e.g. `dir LIKE 'prefix/%'`) under the active mode.
    fn like_clause(&self, column: &str, mode: MatchingMode) -> String;

    /// Escape `%`, `_`, `\` in a value that will be used as a LIKE pattern
    /// operand (not as a literal match — callers append their own `%`).
    fn escape_like_value(&self, value: &str) -> String {
        value.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
    }
}

pub struct MySqlDialect;

impl SqlDialect for MySqlDialect {
    fn like_clause(&self, column: &str, mode: MatchingMode) -> String {
        if mode.need_sql_lowering() {
            format!("{column} COLLATE utf8mb4_general_ci LIKE ? ESCAPE '\\\\'")
        } else {
            format!("{column} LIKE ? ESCAPE '\\\\'")
        }
    }
}

pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn like_clause(&self, column: &str, mode: MatchingMode) -> String {
        if mode.need_sql_lowering() {
            format!("{column} ILIKE ? ESCAPE '\\\\'")
        } else {
            format!("{column} LIKE ? ESCAPE '\\\\'")
        }
    }
}

/// SQLite has no per-statement case-insensitive LIKE/collation switch —
/// `case_sensitive_like` is connection-wide, set once via
/// `RecordStore::configure_case_sensitivity` (spec.md §6.2). The clause
/// itself is always plain `LIKE`.
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn like_clause(&self, column: &str, _mode: MatchingMode) -> String {
        format!("{column} LIKE ? ESCAPE '\\\\'")
    }
}
