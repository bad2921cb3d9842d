use crate::hash::*;

#[test]
fn empty_file_hashes_to_the_well_known_sha256_empty_digest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty");
    std::fs::write(&path, b"").unwrap();

    let h = hash_file(&path, "sha256").unwrap();
    assert_eq!(h, "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
}

#[test]
fn identical_content_hashes_identically() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    std::fs::write(&a, b"same bytes").unwrap();
    std::fs::write(&b, b"same bytes").unwrap();

    assert_eq!(hash_file(&a, "sha256").unwrap(), hash_file(&b, "sha256").unwrap());
}

#[test]
fn unsupported_algo_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("f");
    std::fs::write(&path, b"x").unwrap();

    assert!(hash_file(&path, "md5").is_err());
}
