use beacon_core::config::*;
use beacon_core::errors::{BeaconError, ConfigError};

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = BeaconConfig::from_toml("").unwrap();

    assert_eq!(config.transport.endpoint_url, defaults::DEFAULT_ENDPOINT_URL);
    assert_eq!(config.transport.max_post_length, 8_192);
    assert_eq!(config.transport.timeout_secs, 30);

    assert_eq!(config.rate_limit.initial_tokens, 60);
    assert_eq!(config.rate_limit.max_tokens, 500);
    assert_eq!(config.rate_limit.fill_rate_per_ms, 0.0005);

    assert_eq!(config.settings.default_sample_rate, 100);
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.json);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[transport]
endpoint_url = "https://collect.example.test/hit"
max_post_length = 2048

[rate_limit]
initial_tokens = 5
max_tokens = 10
"#;
    let config = BeaconConfig::from_toml(toml).unwrap();
    assert_eq!(config.transport.endpoint_url, "https://collect.example.test/hit");
    assert_eq!(config.transport.max_post_length, 2048);
    assert_eq!(config.transport.timeout_secs, 30);
    assert_eq!(config.rate_limit.initial_tokens, 5);
    assert_eq!(config.rate_limit.fill_rate_per_ms, 0.0005);
}

#[test]
fn config_rejects_invalid_values() {
    let cases = [
        "[rate_limit]\ninitial_tokens = 11\nmax_tokens = 10",
        "[rate_limit]\nfill_rate_per_ms = 0.0",
        "[transport]\nmax_post_length = 0",
        "[settings]\ndefault_sample_rate = 0",
        "[settings]\ndefault_sample_rate = 101",
    ];
    for toml in cases {
        let err = BeaconConfig::from_toml(toml).unwrap_err();
        assert!(
            matches!(err, BeaconError::Config(ConfigError::Invalid { .. })),
            "expected invalid config for {toml:?}, got {err:?}"
        );
    }
}

#[test]
fn config_reports_parse_errors() {
    let err = BeaconConfig::from_toml("[transport\n").unwrap_err();
    assert!(matches!(err, BeaconError::Config(ConfigError::Parse { .. })));
}

#[test]
fn config_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beacon.toml");
    std::fs::write(&path, "[logging]\nlevel = \"debug\"\njson = false\n").unwrap();

    let config = BeaconConfig::load(&path).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert!(!config.logging.json);

    let missing = BeaconConfig::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(missing, BeaconError::Config(ConfigError::Io { .. })));
}
