use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use thiserror::Error;
use tracing_subscriber::EnvFilter;

const LOG_STEM: &str = "ezr";
const MAX_LOG_BYTES: u64 = 1_000_000;
const MAX_ARCHIVES: usize = 5;
const DEFAULT_FILTER: &str = "info";
pub const LOG_FILTER_ENV: &str = "EZR_LOG";

static PANIC_HOOK: Once = Once::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to install subscriber: {0}")]
    Subscriber(String),
}

pub fn logs_dir() -> PathBuf {
    crate::config::app_data_dir().join("logs")
}

fn live_log(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("{LOG_STEM}.log"))
}

/// `ezr.1.log` is the newest archive, `ezr.5.log` the oldest kept.
fn archive(log_dir: &Path, generation: usize) -> PathBuf {
    log_dir.join(format!("{LOG_STEM}.{generation}.log"))
}

/// Installs the global tracing subscriber, appending to `<log_dir>/ezr.log`.
/// The filter comes from `EZR_LOG` and defaults to `info`.
pub fn init(log_dir: &Path) -> Result<PathBuf, LoggingError> {
    fs::create_dir_all(log_dir)?;
    rotate_if_needed(log_dir)?;

    let log_path = live_log(log_dir);
    let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|error| LoggingError::Subscriber(error.to_string()))?;

    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(panic = %info, "core panicked");
            previous(info);
        }));
    });

    Ok(log_path)
}

/// Shifts archives up one generation once the live log reaches the size cap.
fn rotate_if_needed(log_dir: &Path) -> Result<(), std::io::Error> {
    let live = live_log(log_dir);
    let size = match fs::metadata(&live) {
        Ok(meta) => meta.len(),
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(()),
        Err(error) => return Err(error),
    };
    if size < MAX_LOG_BYTES {
        return Ok(());
    }

    remove_if_present(&archive(log_dir, MAX_ARCHIVES))?;
    for generation in (1..MAX_ARCHIVES).rev() {
        let from = archive(log_dir, generation);
        if from.exists() {
            fs::rename(&from, archive(log_dir, generation + 1))?;
        }
    }
    fs::rename(&live, archive(log_dir, 1))
}

fn remove_if_present(path: &Path) -> Result<(), std::io::Error> {
    match fs::remove_file(path) {
        Err(error) if error.kind() != ErrorKind::NotFound => Err(error),
        _ => Ok(()),
    }
}
