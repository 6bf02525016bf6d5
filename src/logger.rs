//! Diagnostics logging via tracing-subscriber.
//!
//! This is the developer-facing log (request timings, provider errors,
//! config summary). The per-session conversation record lives in
//! [`crate::session::transcript`] and never goes through here.
//!
//! Call [`init`] once in `main`, after config is resolved.

use std::env;
use std::path::Path;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::AppError;

/// Initialise the global tracing subscriber.
///
/// `level` accepts standard level strings (`"error"` … `"trace"`) or a full
/// `EnvFilter` directive. A non-empty `RUST_LOG` takes precedence over it.
///
/// With `log_file` set, output is appended there (no ANSI colours) so the
/// interactive console stays clean; otherwise it goes to stderr.
pub fn init(level: &str, log_file: Option<&Path>) -> Result<(), AppError> {
    let rust_log = env::var("RUST_LOG").ok();
    let filter = build_filter(level, rust_log.as_deref())?;

    let (writer, ansi) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Logger(format!("cannot create log dir '{}': {e}", parent.display()))
                })?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    AppError::Logger(format!("failed to open log file '{}': {e}", path.display()))
                })?;
            (BoxMakeWriter::new(file), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(())
}

/// `rust_log` (when non-empty) wins over `level`; a malformed winner is an
/// error rather than a silent fallback.
fn build_filter(level: &str, rust_log: Option<&str>) -> Result<EnvFilter, AppError> {
    match rust_log.map(str::trim).filter(|v| !v.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| AppError::Logger(format!("invalid RUST_LOG '{directives}': {e}"))),
        None => {
            let level = level.trim();
            if level.is_empty() {
                return Err(AppError::Logger("log level must not be empty".into()));
            }
            EnvFilter::try_new(level)
                .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))
        }
    }
}
