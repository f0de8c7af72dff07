// Prevents additional console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use bridge_host::error::HostError;
use bridge_host::logger;

use bridge_core::Bridge;
use bridge_core::config::{BridgeConfig, LogPolicy};

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::path::PathBuf;

use log::info;

const APP_DIR_NAME: &str = "hostbridge";

/// Per-user application directory holding logs and the log policy.
fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[tokio::main]
async fn main() -> Result<(), HostError> {
    let app_dir = app_data_dir();
    let log_dir = app_dir.join("logs");

    // Ensure log directory exists
    create_dir_all(&log_dir).map_err(|e| HostError::Host {
        message: format!("Failed to create log directory: {}", e),
        location: ErrorLocation::caller(),
    })?;

    // Logging must be live before anything else can fail.
    logger::install(&log_dir)?;

    info!("Bridge host starting");
    info!("Log directory: {}", log_dir.display());

    let config = BridgeConfig::from_env();
    let policy = LogPolicy::load(&app_dir).map_err(bridge_core::error::CoreError::from)?;

    let bridge = Bridge::install(config, policy).await?;
    info!("Bridge installed on port {}", bridge.port());

    // The bridge runs in background tasks; hold the process open until
    // interrupted. Production idle exit may terminate it earlier.
    tokio::signal::ctrl_c().await.map_err(|e| HostError::Host {
        message: format!("Failed to wait for shutdown signal: {}", e),
        location: ErrorLocation::caller(),
    })?;
    info!("Bridge host shutting down");

    Ok(())
}
