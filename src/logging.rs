//! Logging infrastructure for csvscrub.
//!
//! Structured, multi-target logging with daily file rotation. Logs go to
//! the console and to rotating files under the deployment's logs
//! directory.
//!
//! Two log files are written:
//!
//! - `csvscrub.log`: all levels
//! - `error.log`: warnings and errors only, for quick triage of a batch
//!   directory after an unattended run
//!
//! ## Usage
//!
//! ```no_run
//! use csvscrub::{config, logging};
//!
//! // Initialize once at startup
//! let paths = config::Paths::from_env();
//! logging::init(&paths.logs_dir).expect("Failed to initialize logging");
//!
//! // Use tracing macros throughout the app
//! tracing::info!("run started");
//! ```

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter, Layer as _,
};

/// Initializes the logging system with console and file output.
///
/// Both files rotate daily, keeping 10 old files. The default level is
/// `info`; override with `RUST_LOG`.
///
/// # Errors
///
/// Returns error if the log directory cannot be created or a file
/// appender fails to build.
pub fn init(logs_dir: &Path) -> Result<()> {
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)
            .with_context(|| format!("Failed to create log directory: {}", logs_dir.display()))?;
    }

    let all_logs_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix("csvscrub")
        .filename_suffix("log")
        .build(logs_dir)
        .context("Failed to create all-logs file appender")?;

    let error_logs_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(10)
        .filename_prefix("error")
        .filename_suffix("log")
        .build(logs_dir)
        .context("Failed to create error-logs file appender")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(true)
        .with_file(true)
        .pretty();

    let all_logs_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(all_logs_appender);

    let error_logs_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(error_logs_appender)
        .with_filter(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .init();

    tracing::info!("Logging initialized, log directory: {}", logs_dir.display());

    Ok(())
}

/// Path of today's all-levels log file.
pub fn current_log_path(logs_dir: &Path) -> PathBuf {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    logs_dir.join(format!("csvscrub.{today}.log"))
}

/// Path of today's error log file.
pub fn current_error_log_path(logs_dir: &Path) -> PathBuf {
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    logs_dir.join(format!("error.{today}.log"))
}
