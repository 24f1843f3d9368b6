//! Logging system configuration and initialization
//!
//! Non-blocking file logging into `logs/scraper.log` with an optional
//! console layer. The CLI runs file-only so stdout stays reserved for
//! its human-readable progress text.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use once_cell::sync::Lazy;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

pub use crate::infrastructure::config::LoggingConfig;

// Keeps the non-blocking writer's worker alive for the process lifetime
static LOG_GUARDS: Lazy<Mutex<Vec<tracing_appender::non_blocking::WorkerGuard>>> =
    Lazy::new(|| Mutex::new(Vec::new()));

const LOG_FILE_NAME: &str = "scraper.log";

struct UtcTimeFormatter;

impl FormatTime for UtcTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Get the log directory relative to the working directory.
pub fn get_log_directory() -> PathBuf {
    PathBuf::from("logs")
}

fn build_env_filter(level: &str) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let mut filter = EnvFilter::new(level);
            // Dependency internals stay quiet unless RUST_LOG overrides
            for directive in ["reqwest=warn", "hyper=warn", "html5ever=error", "selectors=error"] {
                if let Ok(d) = directive.parse() {
                    filter = filter.add_directive(d);
                }
            }
            filter
        }
    }
}

/// Initialize the logging system.
///
/// `console` adds a stdout layer on top of the configured file output;
/// the CLI passes `false` so its log stream is file-only.
pub fn init_logging(config: &LoggingConfig, console: bool) -> Result<()> {
    let registry = Registry::default().with(build_env_filter(&config.level));

    match (config.file_output, console) {
        (true, true) => {
            let (file_writer, guard) = file_writer()?;
            let file_layer = fmt::Layer::new()
                .with_writer(file_writer)
                .with_timer(UtcTimeFormatter)
                .with_target(false)
                .with_ansi(false);
            let console_layer = fmt::Layer::new()
                .with_writer(std::io::stdout)
                .with_timer(UtcTimeFormatter)
                .with_target(false);

            LOG_GUARDS.lock().unwrap().push(guard);
            registry.with(file_layer).with(console_layer).init();
        }
        (true, false) => {
            let (file_writer, guard) = file_writer()?;
            let file_layer = fmt::Layer::new()
                .with_writer(file_writer)
                .with_timer(UtcTimeFormatter)
                .with_target(false)
                .with_ansi(false);

            LOG_GUARDS.lock().unwrap().push(guard);
            registry.with(file_layer).init();
        }
        (false, true) => {
            let console_layer = fmt::Layer::new()
                .with_writer(std::io::stdout)
                .with_timer(UtcTimeFormatter)
                .with_target(false);
            registry.with(console_layer).init();
        }
        (false, false) => {
            return Err(anyhow!("No logging output configured"));
        }
    }

    tracing::info!("Logging system initialized (level: {})", config.level);
    Ok(())
}

fn file_writer() -> Result<(
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
)> {
    let log_dir = get_log_directory();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {log_dir:?}"))?;

    let appender = rolling::never(&log_dir, LOG_FILE_NAME);
    Ok(non_blocking(appender))
}
