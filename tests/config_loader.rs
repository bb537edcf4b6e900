mod common;

use std::time::Duration;

use common::temp_config;
use statebridge::bridge::{BridgeSettings, DispatchPolicy};
use statebridge::config::{Config, ConfigError, DispatchPolicyKind};
use statebridge::reducers::VisibleId;
use statebridge::view_store::BootstrapMode;

/// Test that Config::default() produces the documented values.
#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.bridge.push_capacity, 64);
    assert_eq!(config.bridge.request_timeout_ms, 1000);
    assert_eq!(config.bridge.dispatch_policy, DispatchPolicyKind::AllowAll);
    assert!(config.bridge.allowed_intents.is_empty());
    assert_eq!(config.view.bootstrap, BootstrapMode::GetState);
    assert_eq!(config.startup.visible, vec![VisibleId::Index, VisibleId::Tray]);
    assert!(config.validate().is_ok());
}

/// Test that Config::config_path() returns a path ending with the expected filename.
#[test]
fn test_config_path_ends_with_expected() {
    let path = Config::config_path();
    assert!(path.ends_with("statebridge/config.toml"));
}

/// A missing file means defaults.
#[test]
fn test_missing_file_loads_defaults() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let config = Config::load_from(&temp_dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

/// An empty file means defaults, section by section.
#[test]
fn test_empty_file_loads_defaults() {
    let (_dir, path) = temp_config("");
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

/// Every section is read from TOML.
#[test]
fn test_full_config_is_parsed() {
    let (_dir, path) = temp_config(
        r#"
[bridge]
push_capacity = 8
request_timeout_ms = 250
dispatch_policy = "allow_list"
allowed_intents = ["INCREMENT", "TO_DO:ADD"]

[view]
bootstrap = "sentinel_dispatch"

[startup]
visible = ["tray", "add-to-do/vanilla"]
"#,
    );
    let config = Config::load_from(&path).unwrap();

    assert_eq!(config.bridge.push_capacity, 8);
    assert_eq!(config.view.bootstrap, BootstrapMode::SentinelDispatch);
    assert_eq!(
        config.startup.visible,
        vec![VisibleId::Tray, VisibleId::AddToDoVanilla]
    );

    let settings = BridgeSettings::from(&config.bridge);
    assert_eq!(settings.request_timeout, Duration::from_millis(250));
    match settings.policy {
        DispatchPolicy::AllowList(allowed) => {
            assert!(allowed.contains("INCREMENT"));
            assert!(allowed.contains("TO_DO:ADD"));
            assert_eq!(allowed.len(), 2);
        }
        other => panic!("expected allow list, got {other:?}"),
    }
}

/// Partial sections keep defaults for the missing keys.
#[test]
fn test_partial_section_keeps_defaults() {
    let (_dir, path) = temp_config("[bridge]\npush_capacity = 3\n");
    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.bridge.push_capacity, 3);
    assert_eq!(config.bridge.request_timeout_ms, 1000);
    assert_eq!(config.startup.visible, vec![VisibleId::Index, VisibleId::Tray]);
}

/// Syntax errors and unknown values are parse errors.
#[test]
fn test_parse_errors() {
    let (_dir, path) = temp_config("[bridge\npush_capacity = 3\n");
    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::ParseError { .. })
    ));

    let (_dir, path) = temp_config("[startup]\nvisible = [\"settings\"]\n");
    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::ParseError { .. })
    ));

    let (_dir, path) = temp_config("[bridge]\ndispatch_policy = \"deny_all\"\n");
    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::ParseError { .. })
    ));
}

/// Zero capacity or timeout is rejected.
#[test]
fn test_validation_rejects_zero_values() {
    let (_dir, path) = temp_config("[bridge]\npush_capacity = 0\n");
    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::ValidationError { .. })
    ));

    let mut config = Config::default();
    config.bridge.request_timeout_ms = 0;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("request_timeout_ms"));
}

/// An allow-list without entries would reject every view.
#[test]
fn test_validation_rejects_empty_allow_list() {
    let (_dir, path) = temp_config("[bridge]\ndispatch_policy = \"allow_list\"\n");
    match Config::load_from(&path) {
        Err(ConfigError::ValidationError { message }) => {
            assert!(message.contains("allowed_intents"))
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

/// A directory where the file should be is a read error.
#[test]
fn test_unreadable_path_is_read_error() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    assert!(matches!(
        Config::load_from(temp_dir.path()),
        Err(ConfigError::ReadError { .. })
    ));
}
