//! Path Validator (spec.md §4.1): normalizes user-supplied paths to
//! absolute canonical form and enforces containment in the allowed root.

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// Why a path was rejected. The validator never panics or raises — every
/// rejection reaches the caller as one of these variants, logged once at
/// `error` level by the caller and folded into a `false` return from
/// `process_paths` (spec.md §4.1, §7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path (or its parent, when `check_existence` is false) does not
    /// exist.
    NotFound(String),
    /// Stripping a trailing `/` exposed something that is not a directory.
    NotADirectory(String),
    /// The resolved path is neither equal to nor strictly below the
    /// allowed root.
    NotInAllowedBase(String),
    /// The path could not be canonicalized (I/O error other than "not
    /// found", or non-UTF-8 content).
    Unreadable(String),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::NotFound(p) => write!(f, "'{p}' does not exist"),
            PathError::NotADirectory(p) => write!(f, "'{p}' is not a directory"),
            PathError::NotInAllowedBase(p) => {
                write!(f, "'{p}' is not inside the allowed base directory")
            }
            PathError::Unreadable(p) => write!(f, "'{p}' could not be resolved: unreadable"),
        }
    }
}

impl std::error::Error for PathError {}

/// Emitted alongside a successfully resolved relative path, for the debug
/// line spec.md §4.1 requires when a non-trivial relative path is resolved.
pub struct Resolved {
    pub canonical: Utf8PathBuf,
    /// Present when the input was a relative path other than `.`/`./X`,
    /// carrying the text for the `Processing '<input>' as '<resolved>'.`
    /// debug line.
    pub debug_line: Option<String>,
}

/// Validate `path` against `allowed_base`, resolving relative inputs
/// against `base_directory` (or the process working directory if `None`).
///
/// `check_existence`: when true the resolved path itself must exist; when
/// false only its parent directory must exist and be a directory (used for
/// files about to be created, not a case this engine exercises directly but
/// kept as part of the validator's contract per spec.md §4.1).
pub fn validate(
    path: &str,
    allowed_base: &Utf8Path,
    base_directory: Option<&Utf8Path>,
    check_existence: bool,
) -> Result<Resolved, PathError> {
    let trivial_relative = path == "." || path.starts_with("./");

    let candidate = Utf8PathBuf::from(path.replace('\\', "/"));

    let joined = if candidate.is_absolute() {
        candidate.clone()
    } else {
        let base = base_directory
            .map(|b| b.to_path_buf())
            .or_else(|| {
                std::env::current_dir()
                    .ok()
                    .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
            })
            .unwrap_or_else(|| Utf8PathBuf::from("."));
        base.join(&candidate)
    };

    // Strip a trailing slash unless the path is root.
    let stripped = {
        let s = joined.as_str();
        if s.len() > 1 && s.ends_with('/') {
            Utf8PathBuf::from(s.trim_end_matches('/'))
        } else {
            joined.clone()
        }
    };

    let existed_before_strip = joined.as_str() != stripped.as_str();

    let canonical = canonicalize_tolerant(&stripped, check_existence)?;

    if existed_before_strip {
        // The original had a trailing slash: whatever it resolves to must
        // be a directory.
        if let Ok(meta) = std::fs::symlink_metadata(canonical.as_std_path()) {
            if !meta.is_dir() {
                return Err(PathError::NotADirectory(path.to_string()));
            }
        }
    }

    let allowed_canon = std::fs::canonicalize(allowed_base.as_std_path())
        .map_err(|_| PathError::NotInAllowedBase(path.to_string()))?;
    let allowed_canon = Utf8PathBuf::from_path_buf(allowed_canon)
        .map_err(|_| PathError::Unreadable(path.to_string()))?;

    if canonical != allowed_canon && !canonical.as_str().starts_with(&format!("{allowed_canon}/")) {
        return Err(PathError::NotInAllowedBase(path.to_string()));
    }

    let debug_line = if trivial_relative || candidate.is_absolute() {
        None
    } else {
        Some(format!("Processing '{path}' as '{canonical}'."))
    };

    Ok(Resolved { canonical, debug_line })
}

/// Normalize path separators to `/`, so relative paths split out of a
/// canonical path are stable across platforms (spec.md §3: `dir` is always
/// `/`-separated).
pub fn slash_fix(s: &str) -> String {
    s.replace('\\', "/")
}

/// Canonicalize `path`, keeping a symlink's own basename: the parent is
/// canonicalized but the final component is re-appended verbatim, so the
/// engine indexes the link's name rather than following it into the
/// target's name (spec.md §4.1).
fn canonicalize_tolerant(path: &Utf8Path, check_existence: bool) -> Result<Utf8PathBuf, PathError> {
    let is_symlink = std::fs::symlink_metadata(path.as_std_path())
        .map(|m| m.is_symlink())
        .unwrap_or(false);

    if is_symlink {
        let parent = path.parent().unwrap_or(Utf8Path::new("/"));
        let file_name = path.file_name().ok_or_else(|| PathError::Unreadable(path.to_string()))?;
        let canonical_parent = std::fs::canonicalize(parent.as_std_path())
            .map_err(|_| PathError::NotFound(path.to_string()))?;
        let canonical_parent = Utf8PathBuf::from_path_buf(canonical_parent)
            .map_err(|_| PathError::Unreadable(path.to_string()))?;
        return Ok(canonical_parent.join(file_name));
    }

    match std::fs::canonicalize(path.as_std_path()) {
        Ok(p) => Utf8PathBuf::from_path_buf(p).map_err(|_| PathError::Unreadable(path.to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if check_existence {
                return Err(PathError::NotFound(path.to_string()));
            }
            // Only the parent needs to exist and be a directory.
            let parent = path.parent().ok_or_else(|| PathError::NotFound(path.to_string()))?;
            let canonical_parent = std::fs::canonicalize(parent.as_std_path())
                .map_err(|_| PathError::NotFound(path.to_string()))?;
            if !canonical_parent.is_dir() {
                return Err(PathError::NotADirectory(path.to_string()));
            }
            let canonical_parent = Utf8PathBuf::from_path_buf(canonical_parent)
                .map_err(|_| PathError::Unreadable(path.to_string()))?;
            let file_name = path.file_name().ok_or_else(|| PathError::NotFound(path.to_string()))?;
            Ok(canonical_parent.join(file_name))
        }
        Err(_) => Err(PathError::Unreadable(path.to_string())),
    }
}
