use crate::config::*;
use camino::Utf8PathBuf;

fn tmp_base() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}

#[test]
fn defaults_match_spec_table() {
    let (_guard, base) = tmp_base();
    let cfg = IndexerConfig::new(base).unwrap();
    assert_eq!(cfg.table, "file");
    assert_eq!(cfg.cache_fields, vec!["sha256".to_string()]);
    assert_eq!(cfg.hash_algo, "sha256");
    assert!(cfg.case_insensitive_database);
    assert!(!cfg.case_insensitive_filesystem);
    assert!(!cfg.reindex_all);
    assert!(!cfg.remove_nonexistent_from_index);
    assert!(!cfg.process_symlinks);
    assert!(!cfg.sort_directory_entries);
}

#[test]
fn relative_allowed_base_is_rejected() {
    let err = IndexerConfig::new(Utf8PathBuf::from("relative/path"));
    assert!(err.is_err());
}

#[test]
fn nonexistent_allowed_base_is_rejected() {
    let (_guard, base) = tmp_base();
    let err = IndexerConfig::new(base.join("does-not-exist"));
    assert!(err.is_err());
}

#[test]
fn empty_cache_fields_is_rejected() {
    let (_guard, base) = tmp_base();
    let cfg = IndexerConfig::new(base).unwrap();
    assert!(cfg.with_cache_fields(vec![]).is_err());
}

#[test]
fn sql_injection_attempt_in_table_name_is_rejected() {
    let (_guard, base) = tmp_base();
    let cfg = IndexerConfig::new(base).unwrap();
    assert!(cfg.with_table("file; DROP TABLE file;--").is_err());
}

#[test]
fn unsupported_hash_algo_is_rejected() {
    let (_guard, base) = tmp_base();
    let cfg = IndexerConfig::new(base).unwrap();
    assert!(cfg.with_hash_algo("md5").is_err());
}

#[test]
fn hash_field_is_first_cache_field() {
    let (_guard, base) = tmp_base();
    let cfg = IndexerConfig::new(base)
        .unwrap()
        .with_cache_fields(vec!["sha256".to_string(), "extra".to_string()])
        .unwrap();
    assert_eq!(cfg.hash_field(), "sha256");
}
