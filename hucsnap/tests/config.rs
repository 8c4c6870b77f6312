use std::{fs, path::PathBuf, time::Duration};
use tempfile::{Builder, TempDir};

use hucsnap::config::{ConfigError, HucsnapConfig};

fn temp_dir() -> TempDir {
    Builder::new()
        .prefix("hucsnap_config_test_")
        .tempdir()
        .expect("create temp dir")
}

/// Create a file with the given content in the provided directory.
fn create_file(dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(filename);
    fs::write(&file_path, content).expect("write test file");
    file_path
}

// --- Test default configuration loading ---

#[test]
fn test_config_load_defaults() {
    let temp_dir = temp_dir();
    let empty_toml_path = create_file(&temp_dir, "empty.toml", "");

    let config = HucsnapConfig::load(Some(&empty_toml_path)).expect("Should load default config");
    assert_eq!(
        config.snapshot.balances(),
        PathBuf::from("snapshot-balances.json")
    );
    assert_eq!(
        config.snapshot.output(),
        PathBuf::from("processed-snapshot.json")
    );
    assert_eq!(
        config.snapshot.exchange_rate().unwrap().to_string(),
        "0.23338000"
    );
    assert_eq!(config.successor.address_version(), 28);
    assert_eq!(config.successor.secret_key_version(), 130);
    assert_eq!(config.claim.label(), "huc-snapshot");
    assert_eq!(config.rpc.timeout(), Duration::from_secs(30));
}

#[test]
fn test_config_load_no_file() {
    let config = HucsnapConfig::load(None).expect("Should load default config");
    assert_eq!(config.snapshot.exchange_rate, None);
    assert_eq!(config.claim.label(), "huc-snapshot");
}

// --- Test TOML file loading ---

#[test]
fn test_deserialize_full_valid_config() {
    let temp_dir = temp_dir();

    let toml_content = r#"
[snapshot]
balances = "in/balances.json"
output = "out/processed.json"
exchange_rate = "0.5"

[successor]
address_version = 111
secret_key_version = 239

[claim]
label = "claimed"

[rpc]
timeout = 120
"#;

    let toml_path = create_file(&temp_dir, "test.toml", toml_content);
    let config = HucsnapConfig::load(Some(&toml_path)).expect("Should load config from TOML");

    assert_eq!(config.snapshot.balances(), PathBuf::from("in/balances.json"));
    assert_eq!(config.snapshot.output(), PathBuf::from("out/processed.json"));
    assert_eq!(config.snapshot.exchange_rate().unwrap().to_string(), "0.5");
    assert_eq!(config.successor.address_version(), 111);
    assert_eq!(config.successor.secret_key_version(), 239);
    assert_eq!(config.claim.label(), "claimed");
    assert_eq!(config.rpc.timeout().as_secs(), 120);
}

#[test]
fn test_partial_config_keeps_other_defaults() {
    let temp_dir = temp_dir();
    let toml_path = create_file(&temp_dir, "test.toml", "[claim]\nlabel = \"mine\"\n");

    let config = HucsnapConfig::load(Some(&toml_path)).expect("Should load config");
    assert_eq!(config.claim.label(), "mine");
    assert_eq!(config.successor.address_version(), 28);
    assert_eq!(config.rpc.timeout().as_secs(), 30);
}

// --- Test error cases ---

#[test]
fn test_invalid_toml_file() {
    let temp_dir = temp_dir();
    let toml_path = create_file(&temp_dir, "invalid.toml", "invalid toml content [[[");

    let result = HucsnapConfig::load(Some(&toml_path));
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_missing_required_file() {
    let non_existent_path = PathBuf::from("/non/existent/path/config.toml");

    let result = HucsnapConfig::load(Some(&non_existent_path));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_unknown_field_errors() {
    let temp_dir = temp_dir();
    let toml_path = create_file(&temp_dir, "test.toml", "[snapshot]\nrate = \"0.5\"\n");

    let result = HucsnapConfig::load(Some(&toml_path));
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_invalid_exchange_rate_errors() {
    let temp_dir = temp_dir();

    for rate in ["0", "-1", "0.000000001", "one"] {
        let toml_path = create_file(
            &temp_dir,
            "test.toml",
            &format!("[snapshot]\nexchange_rate = \"{rate}\"\n"),
        );

        match HucsnapConfig::load(Some(&toml_path)) {
            Err(ConfigError::InvalidExchangeRate(r)) => assert_eq!(r, rate),
            other => panic!("Expected invalid rate error for {rate}, got {other:?}"),
        }
    }
}
