use crate::cli::*;
use camino::Utf8PathBuf;

#[test]
fn parses_minimal_index_invocation() {
    let cli = Cli::parse_from(["fidx", "index", "--allowed-base", "/tmp", "--db", "/tmp/x.db", "/tmp/a"]);
    match cli.command {
        Command::Index(args) => {
            assert_eq!(args.paths, vec!["/tmp/a".to_string()]);
            assert_eq!(args.allowed_base, Utf8PathBuf::from("/tmp"));
            assert!(!args.reindex_all);
        }
    }
}

#[test]
fn file_overrides_deserialize_partially() {
    let overrides: FileOverrides = serde_json::from_str(r#"{"reindex_all": true}"#).unwrap();
    assert_eq!(overrides.reindex_all, Some(true));
    assert_eq!(overrides.table, None);
}

fn tmp_base() -> (tempfile::TempDir, Utf8PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    (dir, path)
}

#[test]
fn build_config_leaves_case_insensitive_database_default_when_flag_omitted() {
    let (_guard, base) = tmp_base();
    let cli = Cli::parse_from(["fidx", "index", "--allowed-base", base.as_str(), "--db", "x.db", "a"]);
    let Command::Index(args) = cli.command;
    let config = args.build_config().unwrap();
    assert!(config.case_insensitive_database, "omitting the flag must keep IndexerConfig::new's default of true");
}

#[test]
fn build_config_honors_explicit_case_insensitive_database_flag() {
    let (_guard, base) = tmp_base();
    let cli = Cli::parse_from([
        "fidx",
        "index",
        "--allowed-base",
        base.as_str(),
        "--db",
        "x.db",
        "--case-insensitive-database",
        "a",
    ]);
    let Command::Index(args) = cli.command;
    let config = args.build_config().unwrap();
    assert!(config.case_insensitive_database);
}

#[test]
fn build_config_honors_config_file_disabling_case_insensitive_database() {
    let (_guard, base) = tmp_base();
    let config_path = base.join("fidx.json");
    std::fs::write(config_path.as_std_path(), r#"{"case_insensitive_database": false}"#).unwrap();

    let cli = Cli::parse_from([
        "fidx",
        "index",
        "--allowed-base",
        base.as_str(),
        "--db",
        "x.db",
        "--config",
        config_path.as_str(),
        "a",
    ]);
    let Command::Index(args) = cli.command;
    let config = args.build_config().unwrap();
    assert!(!config.case_insensitive_database);
}
