use crate::storage::data_dir;
use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_LEVEL_ENV: &str = "ROADMAP_LOG_LEVEL";

/// Send `tracing` output to a fresh file under the data directory. Nothing is
/// written to the terminal, so the TUI stays clean.
pub fn init_logging() -> Result<PathBuf> {
    let log_dir = log_directory()?;
    fs::create_dir_all(&log_dir).with_context(|| format!("creating {:?}", log_dir))?;

    let log_file_path = log_file_path(&log_dir);
    let file = fs::File::create(&log_file_path)
        .with_context(|| format!("creating {:?}", log_file_path))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    // lives for the whole process
    std::mem::forget(guard);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(build_log_filter(std::env::var(LOG_LEVEL_ENV).ok().as_deref()))
        .with(file_layer)
        .try_init()
        .context("installing log subscriber")?;

    tracing::info!("logging to {}", log_file_path.display());
    Ok(log_file_path)
}

fn build_log_filter(raw: Option<&str>) -> EnvFilter {
    EnvFilter::new(log_directive(raw))
}

fn log_directive(raw: Option<&str>) -> String {
    let level = raw.and_then(normalize_log_level).unwrap_or("warn");
    format!("{level},roadmap={level}")
}

fn normalize_log_level(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

pub fn log_directory() -> Result<PathBuf> {
    Ok(data_dir()?.join("logs"))
}

pub fn log_file_path(log_dir: &Path) -> PathBuf {
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    log_dir.join(format!("roadmap-{}.log", timestamp))
}
