//! Tracing setup.
//!
//! Logs go to the systemd journal on Linux when it is reachable, otherwise to
//! a daily rolling file. The terminal itself is owned by the UI, so nothing is
//! ever written to stdout.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default directory for the file backend.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("glimpses")
        .join("logs")
}

/// Install the global subscriber. Call once at startup.
///
/// The filter comes from `GLIMPSES_LOG` (for example `GLIMPSES_LOG=debug` or
/// `GLIMPSES_LOG=glimpses::lightbox=trace`) and defaults to `info`.
pub fn init(log_dir: Option<PathBuf>) -> Result<()> {
    let env_filter = EnvFilter::try_from_env("GLIMPSES_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(target_os = "linux")]
    {
        if let Ok(journald_layer) = tracing_journald::layer() {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(journald_layer.with_syslog_identifier("glimpses".to_string()))
                .init();

            tracing::info!("Logging to journald");
            return Ok(());
        }
    }

    let log_dir = log_dir.unwrap_or_else(default_log_dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "glimpses.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The writer flushes until the guard drops, so it lives for the process
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> = std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!(dir = %log_dir.display(), "Logging to file");
    Ok(())
}
