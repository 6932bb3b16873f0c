//! Tests for configuration loading.

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use slot_booking::{Config, ConfigError};

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_google_primary_calendar() {
    let config = Config::default();
    assert_eq!(config.calendar_id, "primary");
    assert_eq!(config.api_base_url, "https://www.googleapis.com/calendar/v3");
    assert_eq!(config.access_token, None);
    assert_eq!(config.retry_policy().max_attempts, 3);
    assert_eq!(config.retry_policy().backoff_unit, Duration::from_secs(1));
    assert_eq!(config.timeout(), Duration::from_secs(30));
}

#[test]
fn toml_overrides_selected_fields() {
    let config = Config::from_toml_str(
        r#"
        calendar_id = "team@example.com"
        max_attempts = 5
        backoff_ms = 250
        "#,
    )
    .unwrap();

    assert_eq!(config.calendar_id, "team@example.com");
    assert_eq!(config.max_attempts, 5);
    assert_eq!(config.retry_policy().backoff_unit, Duration::from_millis(250));
    assert_eq!(config.timeout_secs, 30);
}

#[test]
fn unknown_toml_keys_are_rejected() {
    let err = Config::from_toml_str("calender_id = \"typo\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn environment_overrides_file_values() {
    let mut config = Config::from_toml_str("calendar_id = \"file\"\ntimeout_secs = 10").unwrap();

    config
        .apply_env(env(&[
            ("SLOT_CALENDAR_ID", "env"),
            ("SLOT_ACCESS_TOKEN", "secret"),
            ("SLOT_MAX_ATTEMPTS", "2"),
        ]))
        .unwrap();

    assert_eq!(config.calendar_id, "env");
    assert_eq!(config.access_token.as_deref(), Some("secret"));
    assert_eq!(config.max_attempts, 2);
    assert_eq!(config.timeout_secs, 10);
    assert!(!format!("{:?}", config).contains("secret"));
}

#[test]
fn malformed_numeric_variable_is_reported() {
    let mut config = Config::default();

    let err = config
        .apply_env(env(&[("SLOT_BACKOFF_MS", "soon")]))
        .unwrap_err();

    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "SLOT_BACKOFF_MS"));
}

#[test]
fn load_reads_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "api_base_url = \"http://127.0.0.1:9999\"").unwrap();

    let config = Config::load(Some(file.path())).unwrap();

    // Environment may still override, but this variable is not set by the test suite.
    if std::env::var("SLOT_API_BASE_URL").is_err() {
        assert_eq!(config.api_base_url, "http://127.0.0.1:9999");
    }
}

#[test]
fn load_reports_missing_file() {
    let err = Config::load(Some(std::path::Path::new("/nonexistent/slot.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
