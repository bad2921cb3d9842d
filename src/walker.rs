//! Directory Walker (spec.md §4.2): the low-level, per-entry filesystem
//! classification the Reconciliation Engine drives. Grounded on
//! `fs_tree_hasher.rs::discover_symlinks_recursive`'s hand-rolled
//! `std::fs::read_dir` + `symlink_metadata` recursion — used there (and
//! here) instead of a generic recursive-walk crate precisely because each
//! entry needs its own symlink/directory decision, not a blanket
//! depth-first visit.

use camino::Utf8Path;

/// One raw directory entry: its bare name and whether the engine should
/// treat it as a directory for traversal purposes. A symlink pointing at a
/// directory counts as a directory only when `process_symlinks` is true;
/// otherwise it is reported as a non-directory so the caller's symlink
/// check (spec.md §4.2) fires instead of a silent recursion into the link.
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
}

/// Read `dir`'s immediate children, excluding `.` and `..`. Does not sort;
/// callers that want deterministic order apply `sort_directory_entries`
/// themselves.
pub fn read_entries(dir: &Utf8Path, process_symlinks: bool) -> std::io::Result<Vec<Entry>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir.as_std_path())? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == "." || name == ".." {
            continue;
        }
        let child = dir.join(&name);
        let is_dir = entry_is_directory(&child, process_symlinks);
        out.push(Entry { name, is_dir });
    }
    Ok(out)
}

/// True if `path` is itself a symlink (not following it).
pub fn is_symlink(path: &Utf8Path) -> bool {
    std::fs::symlink_metadata(path.as_std_path())
        .map(|m| m.is_symlink())
        .unwrap_or(false)
}

/// Whether `path` should be recursed into as a directory: a real directory
/// always counts; a symlink counts only when `process_symlinks` is true and
/// it resolves to a directory.
pub fn entry_is_directory(path: &Utf8Path, process_symlinks: bool) -> bool {
    match std::fs::symlink_metadata(path.as_std_path()) {
        Ok(meta) if meta.is_symlink() => {
            if !process_symlinks {
                return false;
            }
            std::fs::metadata(path.as_std_path()).map(|m| m.is_dir()).unwrap_or(false)
        }
        Ok(meta) => meta.is_dir(),
        Err(_) => false,
    }
}
