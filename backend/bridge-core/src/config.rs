//! Bridge configuration and the per-window logging policy.

use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::env;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

pub const ENV_PORT: &str = "HOSTBRIDGE_PORT";
pub const ENV_INSPECTOR: &str = "HOSTBRIDGE_INSPECTOR";
pub const ENV_RESOURCE_DIR: &str = "HOSTBRIDGE_RESOURCE_DIR";

/// Fixed development port.
pub const DEFAULT_DEV_PORT: u16 = 15321;
/// Port 0 asks the OS for a free port; the bound port is then logged
/// so the launching process can pick it up.
pub const EPHEMERAL_PORT: u16 = 0;

const POLICY_FILE_NAME: &str = "log_policy.json";
const DEFAULT_SUPPRESSED_API: &str = "LoggerApi";

/// Runtime configuration of the bridge.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Listening port; [`EPHEMERAL_PORT`] selects a free one.
    pub port: u16,
    /// Inspector mode: windows render normally and unclassified
    /// internal traffic is re-exposed as `Log` frames.
    pub inspector: bool,
    /// Production mode enables the idle-exit policy.
    pub production: bool,
    /// Directory holding the platform codec binary.
    pub resource_dir: PathBuf,
}

impl BridgeConfig {
    /// Resolve configuration from the process environment.
    ///
    /// Production follows the build profile: release builds default to
    /// production behavior (ephemeral port, idle exit).
    pub fn from_env() -> Self {
        Self::from_env_with_production(!cfg!(debug_assertions))
    }

    pub fn from_env_with_production(production: bool) -> Self {
        dotenvy::dotenv().ok();

        let port = env::var(ENV_PORT)
            .ok()
            .and_then(|raw| raw.parse::<u16>().ok())
            .unwrap_or(if production {
                EPHEMERAL_PORT
            } else {
                DEFAULT_DEV_PORT
            });

        let inspector = env::var(ENV_INSPECTOR)
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .map(|flag| flag != 0)
            .unwrap_or(false);

        let resource_dir = env::var(ENV_RESOURCE_DIR)
            .map(PathBuf::from)
            .ok()
            .or_else(|| {
                env::current_exe()
                    .ok()
                    .and_then(|exe| exe.parent().map(Path::to_path_buf))
            })
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            port,
            inspector,
            production,
            resource_dir,
        }
    }
}

/// Per-window logging policy: which internal APIs are dropped from the
/// taps instead of forwarded or re-exposed.
///
/// Prefixes match against the api portion of internal event names, so
/// `LoggerApi` suppresses `ns-LoggerApi*` traffic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogPolicy {
    #[serde(default = "default_suppressed_api_prefixes")]
    pub suppressed_api_prefixes: Vec<String>,
}

impl Default for LogPolicy {
    fn default() -> Self {
        Self {
            suppressed_api_prefixes: default_suppressed_api_prefixes(),
        }
    }
}

fn default_suppressed_api_prefixes() -> Vec<String> {
    vec![DEFAULT_SUPPRESSED_API.to_string()]
}

impl LogPolicy {
    /// Load the policy from `{config_dir}/log_policy.json`.
    ///
    /// A missing file yields the default policy; a present but
    /// unreadable or invalid file is an error.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let policy_path = config_dir.join(POLICY_FILE_NAME);

        if !policy_path.exists() {
            info!(
                "Log policy not found at {}, using defaults",
                policy_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&policy_path).map_err(|e| {
            warn!("Failed to read log policy: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::caller(),
                path: policy_path.clone(),
                source: e,
            }
        })?;

        let policy: LogPolicy = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse log policy: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::caller(),
                path: policy_path.clone(),
                reason: e.to_string(),
            }
        })?;

        info!("Log policy loaded from {}", policy_path.display());
        Ok(policy)
    }

    /// Whether an internal event name targets a suppressed logging API.
    pub fn is_suppressed(&self, event_name: &str) -> bool {
        let Some(api) = event_name.strip_prefix(crate::translate::EVENT_PREFIX) else {
            return false;
        };
        self.suppressed_api_prefixes
            .iter()
            .any(|prefix| api.starts_with(prefix.as_str()))
    }
}
