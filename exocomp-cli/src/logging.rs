//! Console and daily-file logging.
//!
//! Library crates log through the `log` facade; `try_init` installs the
//! `tracing-log` bridge so those records reach the same layers.

use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoLocal};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const TIMESTAMP_FORMAT: &str = "[%Y-%m-%d %H:%M:%S]";

/// Filter directives used when `RUST_LOG` is unset.
///
/// `--verbose` lowers the threshold to `debug`; `--debug` additionally traces
/// every request the Wikibase client makes.
pub fn filter_directives(configured: &str, verbose: bool, debug: bool) -> String {
    let mut directives = if verbose {
        "debug".to_string()
    } else {
        configured.to_string()
    };
    if debug {
        directives.push_str(",exocomp_wikibase=trace");
    }
    directives
}

/// Install the global subscriber. Keep the returned guard alive until exit so
/// buffered file lines are flushed.
pub fn init(dir: &Path, directives: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("could not create log directory {}", dir.display()))?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter '{directives}'"))?,
    };

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("exocomp")
        .filename_suffix("log")
        .build(dir)
        .with_context(|| format!("could not open log file in {}", dir.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let console = fmt::layer()
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .with_writer(std::io::stdout);
    let file = fmt::layer()
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(false)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .context("logging was already initialized")?;

    Ok(guard)
}
