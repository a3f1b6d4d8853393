//! Logging subsystem
//!
//! Day-keyed file logging with tracing integration, plus the background
//! rotation/retention service that keeps the log directory bounded.

mod retention;
mod rotation;
mod writer;

pub use retention::{
    format_file_size, list_log_files, LogFileEntry, LogFileMeta, RetentionPolicy,
};
pub use rotation::RotationScheduler;
pub use writer::{file_date, is_log_file_name, log_file_name, LogLevel, LogWriter};

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install the global tracing subscriber writing through `writer`
///
/// Every tracing event is appended to the active log file and mirrored to
/// stdout. Must be called once, before the first tracing call.
pub fn init_tracing(writer: &LogWriter) -> Result<()> {
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer.clone())
        .with_ansi(false)
        .with_target(true);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pawhaven=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()?;

    Ok(())
}
