//! Log file retention
//!
//! Policy-driven cleanup of historical log files: prune by age and by count,
//! and list what remains for the admin API. Deletion is best-effort; one
//! file failing to delete never aborts the rest of the sweep.

use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::writer::is_log_file_name;

/// Age and count limits applied by a sweep
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Files modified longer ago than this are deleted
    pub max_age: Duration,
    /// At most this many files survive a sweep
    pub max_count: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(30 * 24 * 60 * 60),
            max_count: 50,
        }
    }
}

/// Filesystem metadata for one candidate log file
#[derive(Debug, Clone)]
pub struct LogFileMeta {
    pub name: String,
    pub size: u64,
    pub modified_at: SystemTime,
}

/// One entry in the externally reported log file listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFileEntry {
    pub name: String,
    pub size: u64,
    pub modified_at: DateTime<Utc>,
    pub size_formatted: String,
}

/// Scan the log directory for files matching the log naming pattern
///
/// Non-recursive. A directory that does not exist yet yields an empty list;
/// any other read error propagates. Entries whose metadata cannot be read
/// are skipped.
pub fn list_candidates(logs_dir: &Path) -> io::Result<Vec<LogFileMeta>> {
    let entries = match std::fs::read_dir(logs_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => continue,
        };
        if !is_log_file_name(&name) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let Ok(modified_at) = metadata.modified() else {
            continue;
        };
        candidates.push(LogFileMeta {
            name,
            size: metadata.len(),
            modified_at,
        });
    }
    Ok(candidates)
}

/// Pick the file names a sweep should delete
///
/// The deletion set is the union of files older than `max_age` and, when the
/// candidate count exceeds `max_count`, the oldest `count - max_count`
/// files. A file picked by both rules appears once. Ordering ties on
/// modification time break by name ascending so repeated sweeps over the
/// same tree are reproducible.
pub fn select_for_deletion(
    candidates: &[LogFileMeta],
    now: SystemTime,
    policy: &RetentionPolicy,
) -> Vec<String> {
    let mut selected: Vec<String> = Vec::new();
    let mut selected_set: HashSet<&str> = HashSet::new();

    for file in candidates {
        let age = now
            .duration_since(file.modified_at)
            .unwrap_or(Duration::ZERO);
        if age > policy.max_age {
            selected.push(file.name.clone());
            selected_set.insert(file.name.as_str());
        }
    }

    if candidates.len() > policy.max_count {
        let mut oldest_first: Vec<&LogFileMeta> = candidates.iter().collect();
        oldest_first.sort_by(|a, b| {
            a.modified_at
                .cmp(&b.modified_at)
                .then_with(|| a.name.cmp(&b.name))
        });

        let excess = candidates.len() - policy.max_count;
        for file in oldest_first.iter().take(excess) {
            if !selected_set.contains(file.name.as_str()) {
                selected.push(file.name.clone());
            }
        }
    }

    selected
}

/// Delete log files according to `policy`, returning how many were removed
///
/// Per-file delete failures are logged and skipped; only the initial
/// directory scan can fail the sweep as a whole.
pub fn sweep(logs_dir: &Path, policy: &RetentionPolicy) -> io::Result<usize> {
    let candidates = list_candidates(logs_dir)?;
    let doomed = select_for_deletion(&candidates, SystemTime::now(), policy);

    let mut deleted = 0;
    for name in doomed {
        let path = logs_dir.join(&name);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted old log file: {name}");
                deleted += 1;
            }
            Err(e) => warn!("Failed to delete old log file {name}: {e}"),
        }
    }
    Ok(deleted)
}

/// List log files for external reporting, newest first
pub fn list_log_files(logs_dir: &Path) -> io::Result<Vec<LogFileEntry>> {
    let mut candidates = list_candidates(logs_dir)?;
    candidates.sort_by(|a, b| {
        b.modified_at
            .cmp(&a.modified_at)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(candidates
        .into_iter()
        .map(|f| LogFileEntry {
            size_formatted: format_file_size(f.size),
            modified_at: DateTime::<Utc>::from(f.modified_at),
            name: f.name,
            size: f.size,
        })
        .collect())
}

/// Human-readable file size with binary prefixes
///
/// Below 1024 bytes the exact count is shown; above, one decimal place with
/// the largest fitting unit ("1.0 KB", "2.3 MB", ...).
pub fn format_file_size(size: u64) -> String {
    const UNIT: u64 = 1024;
    if size < UNIT {
        return format!("{size} B");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = size / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let prefix = ['K', 'M', 'G', 'T', 'P', 'E'][exp];
    format!("{:.1} {}B", size as f64 / div as f64, prefix)
}
