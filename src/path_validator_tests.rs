use crate::path_validator::*;
use camino::{Utf8Path, Utf8PathBuf};

fn mk_root() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

#[test]
fn dot_is_trivial_and_has_no_debug_line() {
    let root = mk_root();
    let base = Utf8Path::from_path(root.path()).unwrap();
    let resolved = validate(".", base, Some(base), true).unwrap();
    assert!(resolved.debug_line.is_none());
}

#[test]
fn relative_path_emits_debug_line() {
    let root = mk_root();
    let base = Utf8Path::from_path(root.path()).unwrap();
    std::fs::create_dir(root.path().join("sub")).unwrap();
    let resolved = validate("sub", base, Some(base), true).unwrap();
    assert!(resolved.debug_line.is_some());
    assert!(resolved.debug_line.unwrap().starts_with("Processing 'sub' as"));
}

#[test]
fn outside_allowed_base_is_rejected() {
    let root = mk_root();
    let outside = mk_root();
    let base = Utf8Path::from_path(root.path()).unwrap();
    let outside_path = outside.path().to_str().unwrap();
    let err = validate(outside_path, base, Some(base), true).unwrap_err();
    assert!(matches!(err, PathError::NotInAllowedBase(_)));
}

#[test]
fn nonexistent_path_is_rejected_when_existence_required() {
    let root = mk_root();
    let base = Utf8Path::from_path(root.path()).unwrap();
    let err = validate("missing", base, Some(base), true).unwrap_err();
    assert!(matches!(err, PathError::NotFound(_)));
}

#[test]
fn root_itself_is_allowed() {
    let root = mk_root();
    let base = Utf8Path::from_path(root.path()).unwrap();
    let root_str = root.path().to_str().unwrap();
    let resolved = validate(root_str, base, Some(base), true).unwrap();
    let expected = Utf8PathBuf::from_path_buf(std::fs::canonicalize(root.path()).unwrap()).unwrap();
    assert_eq!(resolved.canonical, expected);
}

#[cfg(unix)]
#[test]
fn symlink_keeps_its_own_basename() {
    let root = mk_root();
    let base = Utf8Path::from_path(root.path()).unwrap();
    std::fs::write(root.path().join("target.txt"), b"hi").unwrap();
    std::os::unix::fs::symlink(root.path().join("target.txt"), root.path().join("link.txt")).unwrap();

    let link_path = root.path().join("link.txt");
    let resolved = validate(link_path.to_str().unwrap(), base, Some(base), true).unwrap();
    assert_eq!(resolved.canonical.file_name(), Some("link.txt"));
}
