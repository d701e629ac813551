//! File logging. The terminal belongs to the UI, so everything goes to a
//! log file through a non-blocking appender.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{Error, Result};

const DEFAULT_FILTER: &str = "info,tasklist=debug";
const DEFAULT_FILE_NAME: &str = "tasklist.log";

/// Directory and file name the appender writes to.
fn log_target(log_path: &Path) -> (PathBuf, &OsStr) {
    let dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let file_name = log_path
        .file_name()
        .unwrap_or_else(|| OsStr::new(DEFAULT_FILE_NAME));
    (dir, file_name)
}

/// Install the global subscriber. Keep the returned guard alive until exit
/// or buffered lines are lost.
pub fn init(log_path: &Path) -> Result<WorkerGuard> {
    let (dir, file_name) = log_target(log_path);
    std::fs::create_dir_all(&dir)?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()
        .map_err(|e| Error::config(format!("logging already initialised: {e}")))?;
    Ok(guard)
}
