//! CLI surface (spec.md §6.5 ambient addition): argument parsing and the
//! merge between an optional JSON config file and explicit flags. Grounded
//! on `install_toolchains.rs`'s `clap::Parser` derive usage.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use crate::config::IndexerConfig;
use crate::logging::{LogFormat, LogLevel};

#[derive(Parser, Debug)]
#[command(name = "fidx", version, about = "Reconcile a file-index database against a directory tree")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk the given paths and reconcile them against the index database.
    Index(IndexArgs),
}

#[derive(Args, Debug)]
pub struct IndexArgs {
    /// Paths to index, each must resolve inside the allowed base directory.
    pub paths: Vec<String>,

    /// Directory every indexed path must resolve inside.
    #[arg(long)]
    pub allowed_base: Utf8PathBuf,

    /// Path to the SQLite database file.
    #[arg(long)]
    pub db: Utf8PathBuf,

    /// Optional JSON file supplying defaults for any flag below; explicit
    /// flags on the command line take precedence over its contents.
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    #[arg(long)]
    pub table: Option<String>,

    #[arg(long = "hash-algo")]
    pub hash_algo: Option<String>,

    #[arg(long = "case-insensitive-database")]
    pub case_insensitive_database: bool,

    #[arg(long = "case-insensitive-filesystem")]
    pub case_insensitive_filesystem: bool,

    #[arg(long = "reindex-all")]
    pub reindex_all: bool,

    #[arg(long = "remove-nonexistent-from-index")]
    pub remove_nonexistent_from_index: bool,

    #[arg(long = "process-symlinks")]
    pub process_symlinks: bool,

    #[arg(long = "sort-directory-entries")]
    pub sort_directory_entries: bool,

    #[arg(long = "log-level", default_value = "info")]
    pub log_level: LogLevel,

    #[arg(long = "log-format", default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Mirrors `IndexArgs`' overridable fields, all optional, for the
/// `--config` JSON file (spec.md §6.5).
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileOverrides {
    pub table: Option<String>,
    pub hash_algo: Option<String>,
    pub case_insensitive_database: Option<bool>,
    pub case_insensitive_filesystem: Option<bool>,
    pub reindex_all: Option<bool>,
    pub remove_nonexistent_from_index: Option<bool>,
    pub process_symlinks: Option<bool>,
    pub sort_directory_entries: Option<bool>,
}

impl IndexArgs {
    /// Build the validated engine config: load `--config` (if given) for
    /// defaults, then apply explicit CLI flags on top. A boolean CLI flag
    /// is a one-way switch — passing it turns the option on regardless of
    /// what the config file says; omitting it falls back to the file, then
    /// to `IndexerConfig`'s own default.
    pub fn build_config(&self) -> Result<IndexerConfig> {
        let overrides = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path.as_std_path())
                    .with_context(|| format!("reading config file '{path}'"))?;
                serde_json::from_str::<FileOverrides>(&text).with_context(|| format!("parsing config file '{path}'"))?
            }
            None => FileOverrides::default(),
        };

        let mut config = IndexerConfig::new(self.allowed_base.clone())?;

        if let Some(table) = self.table.clone().or(overrides.table) {
            config = config.with_table(table)?;
        }
        if let Some(hash_algo) = self.hash_algo.clone().or(overrides.hash_algo) {
            config = config.with_hash_algo(hash_algo)?;
        }

        // `case_insensitive_database` is the one flag whose `IndexerConfig`
        // default is `true` (spec.md §6), so unlike the other switches below
        // we can't unconditionally OR in `false` when neither the flag nor
        // the config file mention it — that would clobber the default.
        // Apply it only when something actually asked for a value.
        match (self.case_insensitive_database, overrides.case_insensitive_database) {
            (true, _) => config = config.with_case_insensitive_database(true),
            (false, Some(v)) => config = config.with_case_insensitive_database(v),
            (false, None) => {}
        }
        config = config.with_case_insensitive_filesystem(
            self.case_insensitive_filesystem || overrides.case_insensitive_filesystem.unwrap_or(false),
        );
        config = config.with_reindex_all(self.reindex_all || overrides.reindex_all.unwrap_or(false));
        config = config.with_remove_nonexistent_from_index(
            self.remove_nonexistent_from_index || overrides.remove_nonexistent_from_index.unwrap_or(false),
        );
        config = config.with_process_symlinks(self.process_symlinks || overrides.process_symlinks.unwrap_or(false));
        config = config
            .with_sort_directory_entries(self.sort_directory_entries || overrides.sort_directory_entries.unwrap_or(false));

        Ok(config)
    }
}
