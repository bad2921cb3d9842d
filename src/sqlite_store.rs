//! SQLite-backed `RecordStore` (spec.md §4.3, §6.2). The only backend this
//! crate concretely implements — grounded directly on `toolchain_db.rs`'s
//! `rusqlite` usage (see DESIGN.md for why MySQL-like/PostgreSQL-like
//! backends stay at the `SqlDialect` (string-building) level only).

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::matching_mode::MatchingMode;
use crate::record::Record;
use crate::record_store::{RecordStore, SqlDialect, SqliteDialect};

pub struct SqliteStore {
    conn: Connection,
    table: String,
    hash_field: String,
    dialect: SqliteDialect,
}

impl SqliteStore {
    /// Open (creating if absent) the database at `path`, and create the
    /// `file` table (spec.md §6.2) if it doesn't exist yet. `table` and
    /// `hash_field` are assumed already validated as safe SQL identifiers
    /// by `IndexerConfig::new` (spec.md §6.1) — they are spliced into
    /// statement text here because column/table names cannot be bound as
    /// `?` parameters.
    pub fn open(path: &Path, table: &str, hash_field: &str, case_insensitive_database: bool) -> Result<Self> {
        let conn = Connection::open(path).context("opening sqlite database")?;
        let collate = if case_insensitive_database { " COLLATE NOCASE" } else { "" };

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    fid INTEGER PRIMARY KEY AUTOINCREMENT,
                    dir TEXT NOT NULL{collate},
                    filename TEXT NOT NULL{collate},
                    {hash_field} TEXT NOT NULL,
                    UNIQUE(dir, filename) ON CONFLICT ABORT
                )"
            ),
            [],
        )
        .context("creating file table")?;

        conn.execute(
            &format!("CREATE INDEX IF NOT EXISTS idx_{table}_{hash_field} ON {table}({hash_field})"),
            [],
        )
        .context("creating hash index")?;

        Ok(Self {
            conn,
            table: table.to_string(),
            hash_field: hash_field.to_string(),
            dialect: SqliteDialect,
        })
    }

    #[cfg(test)]
    pub fn open_in_memory(table: &str, hash_field: &str, case_insensitive_database: bool) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let collate = if case_insensitive_database { " COLLATE NOCASE" } else { "" };
        conn.execute(
            &format!(
                "CREATE TABLE {table} (
                    fid INTEGER PRIMARY KEY AUTOINCREMENT,
                    dir TEXT NOT NULL{collate},
                    filename TEXT NOT NULL{collate},
                    {hash_field} TEXT NOT NULL,
                    UNIQUE(dir, filename) ON CONFLICT ABORT
                )"
            ),
            [],
        )?;
        Ok(Self {
            conn,
            table: table.to_string(),
            hash_field: hash_field.to_string(),
            dialect: SqliteDialect,
        })
    }

    fn lowered(&self, mode: MatchingMode, value: &str) -> String {
        if mode.must_lower_values() {
            value.to_lowercase()
        } else {
            value.to_string()
        }
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<(i64, Record)> {
        Ok((
            row.get(0)?,
            Record::new(row.get::<_, String>(1)?, row.get::<_, String>(2)?, row.get::<_, String>(3)?),
        ))
    }
}

impl RecordStore for SqliteStore {
    fn fetch_dir_records(&self, dir_key: &str, mode: MatchingMode) -> Result<Vec<(i64, Record)>> {
        let clause = self.dialect.eq_clause("dir", mode);
        let sql = format!(
            "SELECT fid, dir, filename, {h} FROM {t} WHERE {clause}",
            h = self.hash_field,
            t = self.table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let value = self.lowered(mode, dir_key);
        let rows = stmt.query_map(params![value], Self::row_to_record)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    fn fetch_subdir_names(&self, dir_key: &str, mode: MatchingMode) -> Result<Vec<String>> {
        let like_clause = self.dialect.like_clause("dir", mode);
        let sql = format!("SELECT dir FROM {t} WHERE {like_clause}", t = self.table);
        let prefix = if dir_key.is_empty() {
            String::new()
        } else {
            format!("{}/", dir_key)
        };
        let pattern = format!("{}%", self.dialect.escape_like_value(&prefix));
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![pattern], |row| row.get::<_, String>(0))?;

        let mut names = std::collections::HashSet::new();
        for r in rows {
            let dir = r?;
            if dir.len() <= prefix.len() {
                continue;
            }
            // Case-aware prefix check: the LIKE predicate may be collation
            // driven, so re-verify in Rust before slicing.
            let matches_prefix = if mode.case_insensitive_matching() {
                dir.to_lowercase().starts_with(&prefix.to_lowercase())
            } else {
                dir.starts_with(&prefix)
            };
            if !matches_prefix {
                continue;
            }
            let rest = &dir[prefix.len()..];
            let first_segment = rest.split('/').next().unwrap_or(rest);
            if !first_segment.is_empty() {
                names.insert(first_segment.to_string());
            }
        }
        Ok(names.into_iter().collect())
    }

    fn fetch_one(&self, dir: &str, filename: &str, mode: MatchingMode) -> Result<Vec<(i64, Record)>> {
        let dir_clause = self.dialect.eq_clause("dir", mode);
        let file_clause = self.dialect.eq_clause("filename", mode);
        let sql = format!(
            "SELECT fid, dir, filename, {h} FROM {t} WHERE {dir_clause} AND {file_clause}",
            h = self.hash_field,
            t = self.table
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let dir_v = self.lowered(mode, dir);
        let file_v = self.lowered(mode, filename);
        let rows = stmt.query_map(params![dir_v, file_v], Self::row_to_record)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    fn insert(&self, record: &Record) -> Result<i64> {
        self.conn.execute(
            &format!("INSERT INTO {t} (dir, filename, {h}) VALUES (?1, ?2, ?3)", t = self.table, h = self.hash_field),
            params![record.dir, record.filename, record.hash],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(&self, fid: i64, record: &Record) -> Result<()> {
        self.conn.execute(
            &format!(
                "UPDATE {t} SET dir = ?1, filename = ?2, {h} = ?3 WHERE fid = ?4",
                t = self.table,
                h = self.hash_field
            ),
            params![record.dir, record.filename, record.hash, fid],
        )?;
        Ok(())
    }

    fn delete_by_fid(&self, fid: i64) -> Result<u64> {
        let n = self.conn.execute(&format!("DELETE FROM {t} WHERE fid = ?1", t = self.table), params![fid])?;
        Ok(n as u64)
    }

    fn delete_files_in_dir(&self, dir_key: &str, names: &[String], mode: MatchingMode) -> Result<u64> {
        if names.is_empty() {
            return Ok(0);
        }
        let dir_clause = self.dialect.eq_clause("dir", mode);
        let file_clause = self.dialect.eq_clause("filename", mode);
        let mut total = 0u64;
        // One statement per name keeps parameter binding simple and avoids
        // building a dynamic IN-list; this runs only over the (small)
        // nonexistent-file set identified by C1, not the whole directory.
        for name in names {
            let sql = format!(
                "DELETE FROM {t} WHERE {dir_clause} AND {file_clause}",
                t = self.table
            );
            let n = self.conn.execute(
                &sql,
                params![self.lowered(mode, dir_key), self.lowered(mode, name)],
            )?;
            total += n as u64;
        }
        Ok(total)
    }

    fn delete_subtree(&self, dir_prefix: &str, mode: MatchingMode) -> Result<u64> {
        let eq_clause = self.dialect.eq_clause("dir", mode);
        let like_clause = self.dialect.like_clause("dir", mode);
        let sql = format!("DELETE FROM {t} WHERE {eq_clause} OR {like_clause}", t = self.table);
        let pattern = format!("{}%", self.dialect.escape_like_value(&format!("{dir_prefix}/")));
        let n = self.conn.execute(&sql, params![self.lowered(mode, dir_prefix), pattern])?;
        Ok(n as u64)
    }

    fn configure_case_sensitivity(&self, mode: MatchingMode) -> Result<()> {
        let sensitive_sensitive = !mode.insensitive_fs() && !mode.insensitive_db();
        let value = if sensitive_sensitive { "ON" } else { "OFF" };
        self.conn.execute_batch(&format!("PRAGMA case_sensitive_like = {value};"))?;
        Ok(())
    }
}
