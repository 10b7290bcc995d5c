//! Tests for configuration loading

use parkwatch::config::Config;
use serial_test::serial;
use std::io::Write;

#[test]
fn test_config_file_exists() {
    let config_path = std::path::Path::new("config.toml");
    assert!(
        config_path.exists(),
        "config.toml should exist in project root"
    );
}

#[test]
fn test_shipped_config_parses_and_validates() {
    let config = Config::from_file(std::path::Path::new("config.toml")).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.facilities.len(), 9);
    assert_eq!(config.schedule.timezone, "Europe/Paris");
}

#[test]
fn test_partial_file_falls_back_to_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[schedule]
interval_secs = 120
warmup_secs = 120
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();

    // The overridden knobs
    assert_eq!(config.schedule.interval_secs, 120);
    assert_eq!(config.schedule.warmup_secs, 120);

    // Everything else is default, including the built-in facilities
    assert_eq!(config.fetch.timeout_secs, 5);
    assert_eq!(config.facilities.len(), 9);
    assert_eq!(config.facilities[0].name, "Bellegarde");
}

#[test]
fn test_explicit_facilities_replace_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[[facilities]]
name = "Hôtel de Ville"
base_url = "https://parkings.example.fr/"
page_id = 42
capacity = 250
"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.facilities.len(), 1);
    assert_eq!(config.facilities[0].name, "Hôtel de Ville");
    assert_eq!(config.facilities[0].page_id, 42);
    assert!(config.facilities[0].coordinates().is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_is_an_error() {
    let result = Config::from_file(std::path::Path::new("/nonexistent/parkwatch.toml"));
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_env_overrides() {
    std::env::set_var("PARKWATCH_INTERVAL_SECS", "120");
    std::env::set_var("PARKWATCH_TIMEZONE", "Europe/Madrid");
    std::env::set_var("PARKWATCH_DATA_DIR", "/var/lib/parkwatch");

    let config = Config::from_env().unwrap();

    std::env::remove_var("PARKWATCH_INTERVAL_SECS");
    std::env::remove_var("PARKWATCH_TIMEZONE");
    std::env::remove_var("PARKWATCH_DATA_DIR");

    assert_eq!(config.schedule.interval_secs, 120);
    assert_eq!(config.schedule.timezone, "Europe/Madrid");
    assert_eq!(
        config.store.data_dir,
        std::path::PathBuf::from("/var/lib/parkwatch")
    );
    assert_eq!(config.timezone().unwrap(), chrono_tz::Europe::Madrid);
}

#[test]
#[serial]
fn test_env_defaults_when_unset() {
    std::env::remove_var("PARKWATCH_INTERVAL_SECS");

    let config = Config::from_env().unwrap();
    assert_eq!(config.schedule.interval_secs, 600);
    assert_eq!(config.facilities.len(), 9);
}
