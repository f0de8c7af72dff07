// Unit tests for environment-driven configuration and the log policy.

use crate::config::{
    BridgeConfig, DEFAULT_DEV_PORT, ENV_INSPECTOR, ENV_PORT, ENV_RESOURCE_DIR, EPHEMERAL_PORT,
    LogPolicy,
};
use crate::error::config::ConfigError;

use std::env;
use std::path::PathBuf;

use serial_test::serial;

fn clear_bridge_env() {
    unsafe {
        env::remove_var(ENV_PORT);
        env::remove_var(ENV_INSPECTOR);
        env::remove_var(ENV_RESOURCE_DIR);
    }
}

/// **VALUE**: Verifies the port defaults split on production: fixed dev
/// port versus an OS-assigned ephemeral port.
///
/// **WHY THIS MATTERS**: Development clients connect to a known port;
/// production relies on the logged ephemeral port. Swapping the two
/// breaks both flows.
#[test]
#[serial]
fn given_no_port_env_when_resolved_then_defaults_split_on_production() {
    clear_bridge_env();

    let dev = BridgeConfig::from_env_with_production(false);
    assert_eq!(dev.port, DEFAULT_DEV_PORT);
    assert!(!dev.production);

    let prod = BridgeConfig::from_env_with_production(true);
    assert_eq!(prod.port, EPHEMERAL_PORT);
    assert!(prod.production);
}

/// **VALUE**: Verifies an explicit port variable overrides both defaults
/// and an unparseable one falls back.
#[test]
#[serial]
fn given_port_env_when_resolved_then_override_or_fallback() {
    clear_bridge_env();

    unsafe { env::set_var(ENV_PORT, "4500") };
    assert_eq!(BridgeConfig::from_env_with_production(true).port, 4500);

    unsafe { env::set_var(ENV_PORT, "not-a-port") };
    assert_eq!(
        BridgeConfig::from_env_with_production(false).port,
        DEFAULT_DEV_PORT
    );

    clear_bridge_env();
}

/// **VALUE**: Verifies the inspector flag is numeric truthiness: any
/// non-zero integer enables it, zero and garbage do not.
#[test]
#[serial]
fn given_inspector_env_when_resolved_then_nonzero_enables() {
    clear_bridge_env();

    assert!(!BridgeConfig::from_env_with_production(false).inspector);

    unsafe { env::set_var(ENV_INSPECTOR, "1") };
    assert!(BridgeConfig::from_env_with_production(false).inspector);

    unsafe { env::set_var(ENV_INSPECTOR, "0") };
    assert!(!BridgeConfig::from_env_with_production(false).inspector);

    unsafe { env::set_var(ENV_INSPECTOR, "yes") };
    assert!(!BridgeConfig::from_env_with_production(false).inspector);

    clear_bridge_env();
}

/// **VALUE**: Verifies an explicit resource directory wins over the
/// executable-relative fallback.
#[test]
#[serial]
fn given_resource_dir_env_when_resolved_then_used_verbatim() {
    clear_bridge_env();

    unsafe { env::set_var(ENV_RESOURCE_DIR, "/opt/bridge/resources") };
    let config = BridgeConfig::from_env_with_production(false);
    assert_eq!(config.resource_dir, PathBuf::from("/opt/bridge/resources"));

    clear_bridge_env();
}

/// **VALUE**: Verifies the default policy suppresses logging-API
/// traffic and nothing else.
///
/// **BUG THIS CATCHES**: Would catch prefix matching applied to the raw
/// event name instead of the api portion after `ns-`.
#[test]
fn given_default_policy_when_matched_then_only_logger_api_suppressed() {
    let policy = LogPolicy::default();

    assert!(policy.is_suppressed("ns-LoggerApi-7"));
    assert!(policy.is_suppressed("ns-LoggerApi-7-register"));
    assert!(!policy.is_suppressed("ns-ChatApi-7"));
    assert!(!policy.is_suppressed("LoggerApi-7"));
}

/// **VALUE**: Verifies policy loading: missing file means defaults, a
/// present file replaces them, and an invalid file is a parse error.
#[test]
fn given_policy_file_states_when_loaded_then_default_replace_or_error() {
    let dir = tempfile::tempdir().expect("temp config dir");

    let missing = LogPolicy::load(dir.path()).expect("missing file should default");
    assert_eq!(missing.suppressed_api_prefixes, vec!["LoggerApi".to_string()]);

    let path = dir.path().join("log_policy.json");
    std::fs::write(&path, r#"{"suppressed_api_prefixes":["NoisyApi"]}"#).expect("write policy");
    let loaded = LogPolicy::load(dir.path()).expect("valid file should load");
    assert!(loaded.is_suppressed("ns-NoisyApi-3"));
    assert!(!loaded.is_suppressed("ns-LoggerApi-3"));

    std::fs::write(&path, "{broken").expect("write policy");
    assert!(matches!(
        LogPolicy::load(dir.path()),
        Err(ConfigError::ParseError { .. })
    ));
}
