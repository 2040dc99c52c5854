//! One-time `tracing` initialization for the `cli` composition root (§B
//! "Logging"), gated behind the `tracing-init` feature so crates that only
//! need `tracing::*` macros don't pull in a subscriber.
//!
//! Mirrors the teacher's split between a plain console formatter and an
//! optional file sink, minus the teacher's custom span-id formatter (no
//! request spans cross the gateway's connection tasks the way they do in
//! the teacher's graph executor).

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum TracingInitError {
    #[error("create log directory: {0}")]
    CreateDir(std::io::Error),
    #[error("set global subscriber: {0}")]
    SetGlobal(#[from] tracing_subscriber::util::TryInitError),
}

/// Installs a global subscriber: `RUST_LOG` (default `"info"`) filters both
/// sinks. When `PI_LOG_DIR` is set, logs additionally roll daily into that
/// directory via a non-blocking writer; the returned guard must be kept
/// alive for the process lifetime or buffered lines are dropped on exit.
pub fn init() -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, TracingInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match std::env::var("PI_LOG_DIR") {
        Ok(dir) => {
            std::fs::create_dir_all(&dir).map_err(TracingInitError::CreateDir)?;
            let file_appender = tracing_appender::rolling::daily(&dir, "pi-gateway.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(non_blocking)
                .try_init()?;
            Ok(Some(guard))
        }
        Err(_) => {
            tracing_subscriber::fmt().with_env_filter(filter).try_init()?;
            Ok(None)
        }
    }
}
