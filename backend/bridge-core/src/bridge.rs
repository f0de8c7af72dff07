//! Bridge installation: the host-facing entry point.

use crate::config::{BridgeConfig, LogPolicy};
use crate::error::CoreError;
use crate::gate::LoginGate;
use crate::rpc::server::{IdleExitHook, ServerContext, start_rpc_server};
use crate::rpc::sessions::SessionRegistry;
use crate::window::WindowManager;

use std::sync::Arc;

use log::info;

/// The installed bridge.
///
/// Owns the session registry and window manager; the RPC server runs
/// in background tasks for the lifetime of the process. Hosts create
/// windows through [`Bridge::windows`].
pub struct Bridge {
    config: BridgeConfig,
    sessions: SessionRegistry,
    windows: WindowManager,
    port: u16,
}

impl Bridge {
    /// Install the bridge with the default idle-exit behavior
    /// (terminate the process).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Rpc`] if the listening port cannot be bound.
    pub async fn install(config: BridgeConfig, policy: LogPolicy) -> Result<Self, CoreError> {
        Self::install_with_exit_hook(config, policy, Arc::new(|| std::process::exit(0))).await
    }

    /// Install with a custom idle-exit hook. Used by tests and by hosts
    /// that need teardown beyond a bare process exit.
    pub async fn install_with_exit_hook(
        config: BridgeConfig,
        policy: LogPolicy,
        exit_hook: IdleExitHook,
    ) -> Result<Self, CoreError> {
        let sessions = SessionRegistry::new();
        let gate = LoginGate::new();
        let windows = WindowManager::new(config.inspector, policy, sessions.clone(), gate);

        let context = ServerContext {
            sessions: sessions.clone(),
            windows: windows.clone(),
            resource_dir: config.resource_dir.clone(),
            production: config.production,
            exit_hook,
        };
        let port = start_rpc_server(config.port, context).await?;

        // The launching process reads the port from this line when an
        // ephemeral port was requested.
        info!("Bridge remote port: {port}");

        Ok(Self {
            config,
            sessions,
            windows,
            port,
        })
    }

    pub fn windows(&self) -> &WindowManager {
        &self.windows
    }

    pub fn gate(&self) -> &LoginGate {
        self.windows.gate()
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The actually bound listening port.
    pub fn port(&self) -> u16 {
        self.port
    }
}
