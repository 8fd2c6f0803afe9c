use assert_matches::assert_matches;

use enzyme_link::config::{ConfigLoader, DEFAULT_CHUNK_SIZE};
use enzyme_link::error::LinkError;

#[test]
fn explicit_config_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("enzlink.json");
    std::fs::write(&path, r#"{ "data_dir": "scratch", "chunk_size": 25 }"#).unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.data_dir, "scratch");
    assert_eq!(resolved.chunk_size, 25);
    assert_eq!(resolved.enzyme_dat(), "scratch/raw/enzyme.dat");
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    let err = ConfigLoader::resolve(Some("/nonexistent/enzlink.json")).unwrap_err();
    assert_matches!(err, LinkError::ConfigRead(_));
}

#[test]
fn invalid_json_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("enzlink.json");
    std::fs::write(&path, "{ data_dir: nope").unwrap();

    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, LinkError::ConfigParse(_));
}

#[test]
fn absent_default_config_falls_back_to_defaults() {
    let resolved = ConfigLoader::resolve(None).unwrap();
    assert_eq!(resolved.chunk_size, DEFAULT_CHUNK_SIZE);
    assert_eq!(resolved.enzyme_raw(), "data/processed/enzyme_raw.tsv");
}
