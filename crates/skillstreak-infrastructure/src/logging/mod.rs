//! Process-wide logging
//!
//! Two sinks share one `tracing` registry:
//! - a daily-rotated file under the log directory, one JSON object per line
//! - colored human-readable stdout, debug builds only
//!
//! `log` macros used elsewhere in the workspace are forwarded through `tracing-log`,
//! so both macro families end up in the same sinks. `RUST_LOG` overrides the
//! default filters.

use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

pub const LOG_FILE_PREFIX: &str = "skillstreak.log";

static INSTALLED: OnceLock<Result<(), String>> = OnceLock::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. Only the first call installs; concurrent and
/// later calls wait for it and return its outcome.
pub fn init_logger(log_dir: PathBuf) -> anyhow::Result<()> {
    INSTALLED
        .get_or_init(|| install(&log_dir).map_err(|e| format!("{:#}", e)))
        .clone()
        .map_err(anyhow::Error::msg)
}

fn install(log_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let _ = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init();

    let file_appender = rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let json_layer = fmt::layer()
        .with_writer(non_blocking)
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_timer(fmt::time::ChronoLocal::new(
            "%Y-%m-%dT%H:%M:%S%.3f%:z".to_string(),
        ))
        .with_filter(file_filter());

    let stdout_layer = if cfg!(debug_assertions) {
        Some(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                ))
                .with_filter(stdout_filter()),
        )
    } else {
        None
    };

    let subscriber = Registry::default().with(json_layer).with(stdout_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    let _ = FILE_GUARD.set(guard);

    tracing::info!(
        target: "skillstreak::logging",
        log_dir = %log_dir.display(),
        version = env!("CARGO_PKG_VERSION"),
        profile = if cfg!(debug_assertions) { "debug" } else { "release" },
        "Logger initialized"
    );

    Ok(())
}

fn file_filter() -> EnvFilter {
    let default_level = if cfg!(debug_assertions) {
        "info,skillstreak=debug"
    } else {
        "warn,skillstreak=info"
    };

    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn stdout_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,skillstreak=debug,sqlx=warn"))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Default log directory: `<data dir>/logs`
pub fn default_log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}
