//! Reconciliation Engine (spec.md §4.2-§4.4): walks the requested paths,
//! runs the four consistency checks, and applies the per-file insert /
//! update / skip decision. Grounded on `toolchain_db.rs`'s
//! cache-then-compare pattern and `fs_tree_hasher.rs`'s recursive
//! directory traversal, fused into the single component spec.md's data
//! flow diagram describes.

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Context, Result};
use camino::Utf8Path;
use itertools::Itertools;

use crate::caches::Caches;
use crate::config::IndexerConfig;
use crate::dedup;
use crate::hash;
use crate::matching_mode::MatchingMode;
use crate::path_validator::{self, slash_fix};
use crate::record::{Record, RecordCacheEntry};
use crate::record_store::RecordStore;
use crate::stats::Stats;
use crate::walker;

/// The result of one top-level `process_paths` call.
pub struct Outcome {
    /// `false` if any input path failed validation; when `false`, nothing
    /// was walked or reconciled (spec.md §7).
    pub completed: bool,
    pub stats: Stats,
}

pub struct Engine<'a> {
    config: &'a IndexerConfig,
    store: &'a dyn RecordStore,
    allowed_base: camino::Utf8PathBuf,
}

impl<'a> Engine<'a> {
    pub fn new(config: &'a IndexerConfig, store: &'a dyn RecordStore) -> Result<Self> {
        let canon = std::fs::canonicalize(config.allowed_base_directory.as_std_path())
            .context("canonicalizing allowed_base_directory")?;
        let allowed_base = camino::Utf8PathBuf::from_path_buf(canon)
            .map_err(|_| anyhow!("allowed_base_directory is not valid UTF-8"))?;
        Ok(Self { config, store, allowed_base })
    }

    fn mode(&self) -> MatchingMode {
        MatchingMode::new(self.config.case_insensitive_filesystem, self.config.case_insensitive_database)
    }

    /// Validate and reconcile every path in `paths` against the index.
    /// Validation happens for all inputs up front: if any path is invalid,
    /// one error is logged per bad input and the whole call returns without
    /// touching the filesystem or the store (spec.md §7).
    pub fn process_paths<S: AsRef<str>>(&self, paths: &[S]) -> Result<Outcome> {
        let mode = self.mode();
        self.store.configure_case_sensitivity(mode)?;

        let mut resolved = Vec::with_capacity(paths.len());
        let mut any_invalid = false;
        for raw in paths {
            let raw = raw.as_ref();
            match path_validator::validate(raw, &self.config.allowed_base_directory, self.config.base_directory(), true) {
                Ok(r) => resolved.push(r),
                Err(e) => {
                    tracing::error!("{e}");
                    any_invalid = true;
                }
            }
        }

        if any_invalid {
            return Ok(Outcome { completed: false, stats: Stats::new() });
        }

        let mut stats = Stats::new();
        let mut caches = Caches::new();

        for r in &resolved {
            if let Some(line) = &r.debug_line {
                tracing::debug!("{line}");
            }
            self.process_file_or_dir(&r.canonical, &mut caches, &mut stats, mode)?;
        }

        stats.log_summary();
        debug_assert!(caches.is_empty(), "caches must be released by the time process_paths returns");

        Ok(Outcome { completed: true, stats })
    }

    /// Split an absolute path below `allowed_base` into `(dir, basename)`,
    /// both `/`-separated and relative to the root. `("", "")` for the root
    /// itself.
    fn split_rel(&self, abs: &Utf8Path) -> Result<(String, String)> {
        let rel = pathdiff::diff_paths(abs.as_std_path(), self.allowed_base.as_std_path())
            .ok_or_else(|| anyhow!("'{abs}' is not relative to the allowed base directory"))?;
        let rel = camino::Utf8PathBuf::from_path_buf(rel).map_err(|_| anyhow!("'{abs}' is not valid UTF-8"))?;
        let rel_str = slash_fix(rel.as_str());

        if rel_str == "." || rel_str.is_empty() {
            return Ok((String::new(), String::new()));
        }
        match rel_str.rsplit_once('/') {
            Some((dir, filename)) => Ok((dir.to_string(), filename.to_string())),
            None => Ok((String::new(), rel_str)),
        }
    }

    fn process_file_or_dir(&self, abs: &Utf8Path, caches: &mut Caches, stats: &mut Stats, mode: MatchingMode) -> Result<()> {
        let symlink_meta = std::fs::symlink_metadata(abs.as_std_path())
            .with_context(|| format!("reading metadata for '{abs}'"))?;

        if symlink_meta.is_symlink() && !self.config.process_symlinks {
            tracing::error!("'{abs}' is a symlink; this is not supported.");
            stats.symlinks_skipped += 1;
            return Ok(());
        }

        let is_dir = if symlink_meta.is_symlink() {
            std::fs::metadata(abs.as_std_path()).map(|m| m.is_dir()).unwrap_or(false)
        } else {
            symlink_meta.is_dir()
        };

        if is_dir {
            self.process_directory(abs, caches, stats, mode)
        } else {
            self.process_file(abs, caches, stats, mode)
        }
    }

    // ---- directories ----------------------------------------------------

    fn process_directory(&self, abs: &Utf8Path, caches: &mut Caches, stats: &mut Stats, mode: MatchingMode) -> Result<()> {
        let (parent_dir_rel, basename) = self.split_rel(abs)?;
        let d_rel = if basename.is_empty() {
            String::new()
        } else if parent_dir_rel.is_empty() {
            basename.clone()
        } else {
            format!("{parent_dir_rel}/{basename}")
        };
        let d_key = mode.key(&d_rel);

        let result = self.process_directory_body(abs, &parent_dir_rel, &basename, &d_rel, &d_key, caches, stats, mode);

        // Cache release is unconditional: it must happen whether the body
        // above returned Ok or propagated a fatal error (spec.md §5).
        if !caches.has_dir(&d_key) || !caches.has_subdirs(&d_key) {
            tracing::warn!("cache invariant violated on exit from directory '{d_rel}'");
        }
        caches.discard(&d_key);

        result
    }

    #[allow(clippy::too_many_arguments)]
    fn process_directory_body(
        &self,
        abs: &Utf8Path,
        parent_dir_rel: &str,
        basename: &str,
        d_rel: &str,
        d_key: &str,
        caches: &mut Caches,
        stats: &mut Stats,
        mode: MatchingMode,
    ) -> Result<()> {
        if !basename.is_empty() {
            self.check_c4(parent_dir_rel, basename, caches, mode)?;
        }

        let children = self.read_directory(abs, d_rel, d_key, caches, mode)?;

        for name in &children {
            let child_abs = abs.join(name);
            self.process_file_or_dir(&child_abs, caches, stats, mode)?;
        }

        Ok(())
    }

    /// Read `abs`'s entries, populate its records/subdirs caches, run
    /// checks C1 and C2, and return the (possibly deduplicated, possibly
    /// sorted) child names to recurse into.
    fn read_directory(&self, abs: &Utf8Path, d_rel: &str, d_key: &str, caches: &mut Caches, mode: MatchingMode) -> Result<Vec<String>> {
        let mut entries = walker::read_entries(abs, self.config.process_symlinks)
            .with_context(|| format!("reading directory '{abs}'"))?;

        if self.config.sort_directory_entries {
            entries.sort_by(|a, b| a.name.cmp(&b.name));
        }

        let mut final_entries = Vec::with_capacity(entries.len());
        if mode == MatchingMode::SensitiveInsensitive {
            let mut seen: HashMap<String, String> = HashMap::new();
            for entry in entries {
                let key = entry.name.to_lowercase();
                if let Some(kept) = seen.get(&key) {
                    tracing::warn!(
                        "Directory '{d_rel}' contains entries for both '{kept}' and '{}'; these cannot both be indexed in a case insensitive database. Skipping the latter entry.",
                        entry.name,
                    );
                    continue;
                }
                seen.insert(key, entry.name.clone());
                final_entries.push(entry);
            }
        } else {
            final_entries = entries;
        }

        let on_disk_names: HashSet<String> = final_entries.iter().map(|e| e.name.clone()).collect();
        let on_disk_keys: HashSet<String> = final_entries.iter().map(|e| mode.key(&e.name)).collect();

        let rows = self.store.fetch_dir_records(d_key, mode)?;
        let records_map = if mode.needs_dedup() {
            dedup::dedup_records(self.store, d_rel, rows, &on_disk_names, mode)?
        } else {
            rows.into_iter().map(|(fid, r)| (mode.key(&r.filename), RecordCacheEntry::new(fid, r))).collect()
        };
        caches.set_records(d_key, records_map);

        let subdir_names = self.store.fetch_subdir_names(d_key, mode)?;
        caches.set_subdirs(d_key, subdir_names.into_iter().collect());

        self.check_c1(d_rel, d_key, &on_disk_keys, caches, mode)?;
        self.check_c2(d_rel, d_key, &on_disk_keys, caches, mode)?;

        Ok(final_entries.into_iter().map(|e| e.name).collect())
    }

    /// C1 — indexed records for files no longer present in the directory.
    fn check_c1(&self, d_rel: &str, d_key: &str, on_disk_keys: &HashSet<String>, caches: &mut Caches, mode: MatchingMode) -> Result<()> {
        let Some(map) = caches.records(d_key) else { return Ok(()) };

        let mut missing: Vec<(String, String)> = map
            .iter()
            .filter(|(k, _)| !on_disk_keys.contains(*k))
            .map(|(k, entry)| (k.clone(), entry.record.filename.clone()))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort_by(|a, b| a.1.cmp(&b.1));

        let names: Vec<String> = missing.iter().map(|(_, name)| name.clone()).collect();
        let list = names.iter().join(", ");

        if self.config.remove_nonexistent_from_index {
            let n = self.store.delete_files_in_dir(d_key, &names, mode)?;
            tracing::info!("Removed {n} indexed record(s) for nonexistent files in directory '{d_rel}': {list}.");
            if let Some(map) = caches.records_mut(d_key) {
                for (k, _) in &missing {
                    map.remove(k);
                }
            }
        } else {
            tracing::warn!("Indexed records exist for the following nonexistent files in directory '{d_rel}': {list}.");
        }
        Ok(())
    }

    /// C2 — indexed records under subdirectories no longer present. A
    /// cached subdir name that now matches *any* on-disk entry, file or
    /// directory, is left alone here: if it's now a file, that's C3's job
    /// (checked when the file itself is visited), and flagging it here too
    /// would produce a contradictory "nonexistent subdirectory" message
    /// alongside C3's correct one.
    fn check_c2(&self, d_rel: &str, d_key: &str, on_disk_keys: &HashSet<String>, caches: &mut Caches, mode: MatchingMode) -> Result<()> {
        let Some(subdirs) = caches.subdirs(d_key).cloned() else { return Ok(()) };

        let mut groups: HashMap<String, Vec<String>> = HashMap::new();
        for name in &subdirs {
            let key = mode.key(name);
            if on_disk_keys.contains(&key) {
                continue;
            }
            groups.entry(key).or_default().push(name.clone());
        }
        if groups.is_empty() {
            return Ok(());
        }

        if self.config.remove_nonexistent_from_index {
            let mut group_list: Vec<Vec<String>> = groups
                .into_values()
                .map(|mut casings| {
                    casings.sort();
                    casings
                })
                .collect();
            group_list.sort_by(|a, b| a[0].cmp(&b[0]));
            for casings in &group_list {
                let smallest = &casings[0];
                let subtree = if d_rel.is_empty() { smallest.clone() } else { format!("{d_rel}/{smallest}") };
                let n = self.store.delete_subtree(&subtree, mode)?;
                tracing::info!("Removed {n} indexed record(s) for file(s) in (subdirectories of) nonexistent directory '{subtree}'.");
            }
            if let Some(cached_subdirs) = caches.subdirs_mut(d_key) {
                for casings in &group_list {
                    for name in casings {
                        cached_subdirs.remove(name);
                    }
                }
            }
        } else {
            let mut all: Vec<String> = groups.into_values().flatten().collect();
            all.sort();
            let list = all.iter().join(", ");
            tracing::warn!("Indexed records exist for files in the following nonexistent subdirectories of directory '{d_rel}': {list}.");
        }
        Ok(())
    }

    /// C3 — `F`'s basename collides with an indexed former-directory path,
    /// checked against `F`'s parent's subdirs cache.
    fn check_c3(&self, dir_rel: &str, filename: &str, caches: &Caches, mode: MatchingMode) -> Result<()> {
        let parent_key = mode.key(dir_rel);
        let Some(subdirs) = caches.subdirs(&parent_key) else { return Ok(()) };

        let filename_key = mode.key(filename);
        if !subdirs.iter().any(|name| mode.key(name) == filename_key) {
            return Ok(());
        }

        let f_rel = if dir_rel.is_empty() { filename.to_string() } else { format!("{dir_rel}/{filename}") };

        if self.config.remove_nonexistent_from_index {
            let n = self.store.delete_subtree(&f_rel, mode)?;
            tracing::info!("Removed {n} indexed record(s) for file(s) in (subdirectories of) nonexistent directory '{f_rel}'.");
        } else {
            tracing::warn!("Indexed records exist with '{f_rel}' (which is a file) as nonexistent base directory.");
        }
        Ok(())
    }

    /// C4 — `D`'s basename collides with an indexed former-file record,
    /// checked against `D`'s parent's records cache.
    fn check_c4(&self, parent_dir_rel: &str, basename: &str, caches: &mut Caches, mode: MatchingMode) -> Result<()> {
        let parent_key = mode.key(parent_dir_rel);
        let Some(entry) = caches.records(&parent_key).and_then(|m| m.get(&mode.key(basename)).cloned()) else {
            return Ok(());
        };

        let file_rel = entry.record.rel_path();

        if self.config.remove_nonexistent_from_index {
            let n = self.store.delete_by_fid(entry.fid)?;
            if n == 1 {
                tracing::info!("Removed indexed record for file '{file_rel}' which actually matches a directory.");
            } else {
                tracing::warn!("Received strange value {n} while trying to remove indexed record for file '{file_rel}'.");
            }
            if let Some(map) = caches.records_mut(&parent_key) {
                map.remove(&mode.key(basename));
            }
        } else {
            tracing::warn!("Indexed record exists for file '{file_rel}', which actually matches a directory.");
        }
        Ok(())
    }

    // ---- files ------------------------------------------------------

    fn process_file(&self, abs: &Utf8Path, caches: &mut Caches, stats: &mut Stats, mode: MatchingMode) -> Result<()> {
        let (dir_rel, filename) = self.split_rel(abs)?;
        self.check_c3(&dir_rel, &filename, caches, mode)?;

        let dir_key = mode.key(&dir_rel);
        let file_key = mode.key(&filename);
        let provisional = !caches.has_dir(&dir_key);

        if provisional {
            let rows = self.store.fetch_one(&dir_rel, &filename, mode)?;
            let entries = if mode.needs_dedup() {
                let on_disk: HashSet<String> = [filename.clone()].into_iter().collect();
                dedup::dedup_records(self.store, &dir_rel, rows, &on_disk, mode)?
            } else {
                rows.into_iter().map(|(fid, r)| (mode.key(&r.filename), RecordCacheEntry::new(fid, r))).collect()
            };
            caches.set_records(&dir_key, entries);
        }

        let result = self.process_file_body(abs, &dir_rel, &filename, &dir_key, &file_key, caches, stats, mode);

        if provisional {
            caches.discard(&dir_key);
        }

        result
    }

    #[allow(clippy::too_many_arguments)]
    fn process_file_body(
        &self,
        abs: &Utf8Path,
        dir_rel: &str,
        filename: &str,
        dir_key: &str,
        file_key: &str,
        caches: &mut Caches,
        stats: &mut Stats,
        mode: MatchingMode,
    ) -> Result<()> {
        let cached = caches.lookup_file(dir_key, file_key).cloned();

        if cached.is_none() || self.config.reindex_all {
            let hashed = hash::hash_file(abs.as_std_path(), &self.config.hash_algo);
            let fresh_hash = match hashed {
                Ok(h) => h,
                Err(_) => {
                    tracing::error!("sha1_file error processing {abs}!?");
                    stats.errors += 1;
                    return Ok(());
                }
            };
            let fresh = Record::new(dir_rel.to_string(), filename.to_string(), fresh_hash);

            match cached {
                None => match self.store.insert(&fresh) {
                    Ok(fid) => {
                        stats.new += 1;
                        if let Some(map) = caches.records_mut(dir_key) {
                            map.insert(file_key.to_string(), RecordCacheEntry::new(fid, fresh));
                        }
                    }
                    Err(e) => {
                        tracing::error!(
                            "failed to insert record for '{}': {e} (hint: check that case_insensitive_database matches the database's actual collation)",
                            fresh.rel_path(),
                        );
                        stats.errors += 1;
                    }
                },
                Some(entry) => {
                    if Self::records_equal(&fresh, &entry.record, self.config.reindex_all) {
                        stats.equal += 1;
                    } else {
                        self.store.update(entry.fid, &fresh).map_err(|e| {
                            crate::anyhow_loc!("failed to update record for '{}' (fid {}): {e}", fresh.rel_path(), entry.fid)
                        })?;
                        stats.updated += 1;
                        if let Some(map) = caches.records_mut(dir_key) {
                            map.insert(file_key.to_string(), RecordCacheEntry::new(entry.fid, fresh));
                        }
                    }
                }
            }
        } else {
            stats.skipped += 1;
        }

        Ok(())
    }

    /// The Equality Rule (spec.md §4.4): records differ on a hash mismatch,
    /// or, under `reindex_all`, on a `dir`/`filename` casing mismatch even
    /// with an identical hash.
    fn records_equal(fresh: &Record, cached: &Record, reindex_all: bool) -> bool {
        if fresh.hash != cached.hash {
            return false;
        }
        if reindex_all && (fresh.dir != cached.dir || fresh.filename != cached.filename) {
            return false;
        }
        true
    }
}
