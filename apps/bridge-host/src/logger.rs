//! Log setup for the host process.
//!
//! One fern dispatch fans out to a colored stdout stream and a plain
//! file under the per-user log directory. The level comes from the
//! `HOSTBRIDGE_LOG` environment variable when set, otherwise it
//! defaults by build profile.

use crate::error::HostError;

use common::ErrorLocation;

use std::env;
use std::io::stdout;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339_seconds;
use log::{LevelFilter, warn};

static INSTALLED: AtomicBool = AtomicBool::new(false);

const LOG_FILE_NAME: &str = "hostbridge.log";

/// Environment variable overriding the log level, e.g. `HOSTBRIDGE_LOG=trace`.
const LEVEL_ENV_VAR: &str = "HOSTBRIDGE_LOG";

#[cfg(debug_assertions)]
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

/// Resolve the effective level filter.
///
/// An unparseable `HOSTBRIDGE_LOG` value falls back to the build
/// default rather than failing startup.
pub(crate) fn level_filter() -> LevelFilter {
    env::var(LEVEL_ENV_VAR)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_LEVEL)
}

/// Install the process-wide logger, writing to stdout and to
/// `hostbridge.log` inside `log_dir`.
///
/// The log facade only accepts one logger per process, so repeat calls
/// warn and return `Ok` without touching the installed dispatch.
///
/// # Errors
///
/// Returns [`HostError::Host`] when the log file cannot be opened or
/// the dispatch cannot be registered.
pub fn install(log_dir: &Path) -> Result<(), HostError> {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        warn!("Logger already installed");
        return Ok(());
    }

    let log_file = fern::log_file(log_dir.join(LOG_FILE_NAME)).map_err(|e| HostError::Host {
        message: format!("Failed to open log file: {e}"),
        location: ErrorLocation::caller(),
    })?;

    let colors = ColoredLevelConfig::new()
        .trace(Magenta)
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red);

    let to_stdout = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{timestamp} {level:<5} {target} {message}",
                timestamp = format_rfc3339_seconds(SystemTime::now()),
                level = colors.color(record.level()),
                target = record.target(),
            ))
        })
        .chain(stdout());

    let to_file = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{timestamp} {level:<5} {target} {message}",
                timestamp = format_rfc3339_seconds(SystemTime::now()),
                level = record.level(),
                target = record.target(),
            ))
        })
        .chain(log_file);

    Dispatch::new()
        .level(level_filter())
        .chain(to_stdout)
        .chain(to_file)
        .apply()
        .map_err(|e| HostError::Host {
            message: format!("Failed to install logger: {e}"),
            location: ErrorLocation::caller(),
        })
}
