//! Day-keyed log file writer
//!
//! Owns the active log file for the process. Files are named
//! `pawhaven_<YYYY-MM-DD>.log` inside the configured log directory; the
//! rotation scheduler asks the writer to swap to a new file when the
//! calendar day changes. The writer doubles as a `MakeWriter` so tracing
//! output lands in the active file, mirrored to stdout.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate, Utc};
use tracing_subscriber::fmt::MakeWriter;

/// Fixed prefix for all log files
pub const LOG_FILE_PREFIX: &str = "pawhaven";

/// Fixed suffix for all log files
pub const LOG_FILE_SUFFIX: &str = ".log";

const LINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// File name for the log file covering `date`
pub fn log_file_name(date: NaiveDate) -> String {
    format!("{}_{}{}", LOG_FILE_PREFIX, date.format("%Y-%m-%d"), LOG_FILE_SUFFIX)
}

/// Whether `name` matches the log file naming pattern
///
/// Only files matching this pattern are touched by the retention sweep.
pub fn is_log_file_name(name: &str) -> bool {
    name.len() > LOG_FILE_PREFIX.len() + 1 + LOG_FILE_SUFFIX.len()
        && name.starts_with(LOG_FILE_PREFIX)
        && name.as_bytes()[LOG_FILE_PREFIX.len()] == b'_'
        && name.ends_with(LOG_FILE_SUFFIX)
}

/// Date encoded in a log file name, if the name parses
pub fn file_date(name: &str) -> Option<NaiveDate> {
    let date_part = name
        .strip_prefix(LOG_FILE_PREFIX)?
        .strip_prefix('_')?
        .strip_suffix(LOG_FILE_SUFFIX)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Severity tag for an explicitly written log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

/// The currently open log file
struct ActiveLog {
    file: File,
    path: PathBuf,
}

impl ActiveLog {
    fn open(logs_dir: &Path, date: NaiveDate) -> Result<Self> {
        fs::create_dir_all(logs_dir).context("Failed to create log directory")?;
        let path = logs_dir.join(log_file_name(date));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        Ok(Self { file, path })
    }

    /// Date encoded in this handle's file name
    fn date(&self) -> Option<NaiveDate> {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(file_date)
    }
}

/// Writer for the active log file
///
/// Cheap to clone; all clones share the same active handle. Writes from
/// concurrent tasks are serialized on an internal lock, so each line is
/// appended atomically with respect to other writers and to rotation.
#[derive(Clone)]
pub struct LogWriter {
    logs_dir: PathBuf,
    active: Arc<Mutex<Option<ActiveLog>>>,
}

impl LogWriter {
    /// Create a writer for `logs_dir` without touching the filesystem
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Directory this writer appends into
    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Open today's log file and install it as the active handle
    ///
    /// Creates the log directory if absent. Replaces (and closes) any
    /// previously active handle. Called once at startup and once per
    /// rotation; failures propagate so the caller can decide whether to
    /// proceed without file logging.
    pub fn initialize(&self) -> Result<()> {
        let active = ActiveLog::open(&self.logs_dir, Local::now().date_naive())?;
        let mut guard = self
            .active
            .lock()
            .map_err(|_| anyhow!("log writer lock poisoned"))?;
        if let Some(mut old) = guard.take() {
            let _ = old.file.flush();
        }
        *guard = Some(active);
        Ok(())
    }

    /// Append a formatted line for `message` at `level`
    ///
    /// The line is mirrored to stdout; a failure writing to either sink is
    /// swallowed and does not affect the other.
    pub fn write(&self, level: LogLevel, message: &str) {
        let line = format!(
            "{} [{}] {}\n",
            Utc::now().format(LINE_TIMESTAMP_FORMAT),
            level.as_str(),
            message
        );
        self.append(line.as_bytes());
    }

    /// Swap to a new file if the calendar day has changed
    ///
    /// Compares the active file's name-encoded date against today and
    /// reopens when they differ. Returns whether a rotation happened. With
    /// no active handle (writer never initialized, or closed), this opens
    /// today's file lazily.
    pub fn rotate_if_needed(&self) -> Result<bool> {
        let today = Local::now().date_naive();
        let mut guard = self
            .active
            .lock()
            .map_err(|_| anyhow!("log writer lock poisoned"))?;
        match guard.as_ref().and_then(ActiveLog::date) {
            Some(date) if date == today => Ok(false),
            _ => {
                if let Some(mut old) = guard.take() {
                    let _ = old.file.flush();
                }
                *guard = Some(ActiveLog::open(&self.logs_dir, today)?);
                Ok(true)
            }
        }
    }

    /// Flush and release the active handle; safe to call repeatedly
    pub fn close(&self) {
        if let Ok(mut guard) = self.active.lock() {
            if let Some(mut active) = guard.take() {
                let _ = active.file.flush();
            }
        }
    }

    /// Path of the active log file, if one is open
    pub fn active_path(&self) -> Option<PathBuf> {
        self.active
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|a| a.path.clone()))
    }

    /// Append raw bytes to the active file and mirror them to stdout
    fn append(&self, buf: &[u8]) {
        if let Ok(mut guard) = self.active.lock() {
            if let Some(active) = guard.as_mut() {
                let _ = active.file.write_all(buf);
                let _ = active.file.flush();
            }
        }
        let _ = std::io::stdout().write_all(buf);
    }
}

/// Per-event writer handed to the tracing fmt layer
pub struct LogSink {
    writer: LogWriter,
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogSink;

    fn make_writer(&'a self) -> Self::Writer {
        LogSink {
            writer: self.clone(),
        }
    }
}
