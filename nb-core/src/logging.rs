//! Structured logging setup using the `tracing` ecosystem.
//!
//! Console output always goes to stderr so `--format json` output on stdout
//! stays machine-readable.

use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling;

use crate::constants::TOOL_NAME;
use crate::error::{NbError, NbResult};

/// Install the global subscriber: compact console output on stderr plus a
/// daily-rotated file in `log_dir`, written as JSON when `json_output` is set.
///
/// `level` accepts anything `EnvFilter` does (`"debug"`, `"nb_apps=trace"`);
/// unparsable filters fall back to `info`. Keep the returned guard alive for
/// as long as file logging is wanted.
pub fn init_logging(level: &str, log_dir: &Path, json_output: bool) -> NbResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let (writer, guard) =
        tracing_appender::non_blocking(rolling::daily(log_dir, format!("{TOOL_NAME}.log")));

    let json_file = json_output.then(|| {
        fmt::layer()
            .json()
            .with_writer(writer.clone())
            .with_current_span(false)
            .with_thread_ids(true)
    });
    let text_file = (!json_output).then(|| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
    });

    tracing_subscriber::registry()
        .with(filter_for(level))
        .with(console_layer())
        .with(json_file)
        .with(text_file)
        .try_init()
        .map_err(|e| NbError::Internal(format!("failed to install tracing subscriber: {e}")))?;

    tracing::debug!(filter = level, dir = %log_dir.display(), json_output, "logging initialized");

    Ok(LogGuard {
        dir: log_dir.to_path_buf(),
        _guard: guard,
    })
}

/// Keeps the background log writer running; dropping it flushes the file.
pub struct LogGuard {
    dir: PathBuf,
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

impl LogGuard {
    /// Directory the rotated log files are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn console_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer().with_writer(std::io::stderr).compact()
}

/// Initialize a minimal console-only logger for testing or simple CLI usage.
pub fn init_console_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter_for(level))
        .with(console_layer())
        .try_init();
}
