//! Config Surface (spec.md §6): an immutable, validated-at-construction
//! bag of options. Kept independent of `clap` so the library is embeddable
//! without pulling in a CLI-argument dependency (only the `fidx` binary,
//! in `src/cli.rs`, depends on `clap`).

use anyhow::{bail, Result};
use camino::{Utf8Path, Utf8PathBuf};

#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub allowed_base_directory: Utf8PathBuf,
    pub base_directory: Option<Utf8PathBuf>,
    pub table: String,
    pub cache_fields: Vec<String>,
    pub hash_algo: String,
    pub case_insensitive_database: bool,
    pub case_insensitive_filesystem: bool,
    pub reindex_all: bool,
    pub remove_nonexistent_from_index: bool,
    pub process_symlinks: bool,
    pub sort_directory_entries: bool,
}

impl IndexerConfig {
    /// Grounded on spec.md §6's defaults: `case_insensitive_database`
    /// defaults `true`, everything else defaults `false`/empty except
    /// `table` (`"file"`), `cache_fields` (`["sha256"]`), and `hash_algo`
    /// (`"sha256"`).
    pub fn new(allowed_base_directory: Utf8PathBuf) -> Result<Self> {
        Self {
            allowed_base_directory,
            base_directory: None,
            table: "file".to_string(),
            cache_fields: vec!["sha256".to_string()],
            hash_algo: "sha256".to_string(),
            case_insensitive_database: true,
            case_insensitive_filesystem: false,
            reindex_all: false,
            remove_nonexistent_from_index: false,
            process_symlinks: false,
            sort_directory_entries: false,
        }
        .validated()
    }

    /// The configured hash column name — the first element of
    /// `cache_fields`, per spec.md §3/§6.
    pub fn hash_field(&self) -> &str {
        &self.cache_fields[0]
    }

    pub fn with_base_directory(mut self, base_directory: Utf8PathBuf) -> Result<Self> {
        self.base_directory = Some(base_directory);
        self.validated()
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Result<Self> {
        self.table = table.into();
        self.validated()
    }

    pub fn with_cache_fields(mut self, cache_fields: Vec<String>) -> Result<Self> {
        self.cache_fields = cache_fields;
        self.validated()
    }

    pub fn with_hash_algo(mut self, hash_algo: impl Into<String>) -> Result<Self> {
        self.hash_algo = hash_algo.into();
        self.validated()
    }

    pub fn with_case_insensitive_database(mut self, v: bool) -> Self {
        self.case_insensitive_database = v;
        self
    }

    pub fn with_case_insensitive_filesystem(mut self, v: bool) -> Self {
        self.case_insensitive_filesystem = v;
        self
    }

    pub fn with_reindex_all(mut self, v: bool) -> Self {
        self.reindex_all = v;
        self
    }

    pub fn with_remove_nonexistent_from_index(mut self, v: bool) -> Self {
        self.remove_nonexistent_from_index = v;
        self
    }

    pub fn with_process_symlinks(mut self, v: bool) -> Self {
        self.process_symlinks = v;
        self
    }

    pub fn with_sort_directory_entries(mut self, v: bool) -> Self {
        self.sort_directory_entries = v;
        self
    }

    fn validated(self) -> Result<Self> {
        if !self.allowed_base_directory.is_absolute() {
            bail!("allowed_base_directory must be absolute: '{}'", self.allowed_base_directory);
        }
        if !self.allowed_base_directory.as_std_path().is_dir() {
            bail!("allowed_base_directory does not exist or is not a directory: '{}'", self.allowed_base_directory);
        }
        if let Some(base) = &self.base_directory {
            if !base.is_absolute() {
                bail!("base_directory must be absolute: '{}'", base);
            }
        }
        if self.cache_fields.is_empty() {
            bail!("cache_fields must be non-empty");
        }
        for field in &self.cache_fields {
            check_sql_identifier(field)?;
        }
        check_sql_identifier(&self.table)?;
        if self.hash_algo != "sha256" {
            bail!("unsupported hash_algo '{}': only 'sha256' is implemented", self.hash_algo);
        }
        Ok(self)
    }

    pub fn base_directory(&self) -> Option<&Utf8Path> {
        self.base_directory.as_deref()
    }
}

/// Reject anything that isn't a safe bare SQL identifier. `table` and
/// `cache_fields` entries are spliced directly into statement text in
/// `sqlite_store.rs` (column/table names can't be bound as `?`
/// parameters), so this is the only guard against SQL injection through
/// configuration.
fn check_sql_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let first_ok = chars.next().map(|c| c.is_ascii_alphabetic() || c == '_').unwrap_or(false);
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if name.is_empty() || !first_ok || !rest_ok {
        bail!("'{name}' is not a valid SQL identifier");
    }
    Ok(())
}
