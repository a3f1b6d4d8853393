//! Background log rotation service
//!
//! A single worker task owns the housekeeping loop: on every tick it asks
//! the writer to rotate at the day boundary, then runs a retention sweep.
//! The service is either stopped or running; `start` and `stop` are
//! idempotent, and `stop` does not return until the worker has exited, so
//! no tick can begin after it completes.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use super::retention::{self, LogFileEntry, RetentionPolicy};
use super::writer::LogWriter;

enum State {
    Stopped,
    Running {
        shutdown_tx: oneshot::Sender<()>,
        handle: JoinHandle<()>,
    },
}

/// Periodic log rotation and retention service
pub struct RotationScheduler {
    writer: LogWriter,
    policy: RetentionPolicy,
    tick_interval: Duration,
    state: Mutex<State>,
    completed_ticks: Arc<AtomicU64>,
}

impl RotationScheduler {
    pub fn new(writer: LogWriter, policy: RetentionPolicy, tick_interval: Duration) -> Self {
        Self {
            writer,
            policy,
            tick_interval,
            state: Mutex::new(State::Stopped),
            completed_ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Launch the background worker; no-op if already running
    ///
    /// Returns as soon as the worker is spawned. The worker runs one
    /// retention sweep immediately (before its first timer wait), then
    /// rotates and sweeps once per tick interval. Errors inside a tick are
    /// logged and the loop keeps running.
    pub fn start(&self) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if matches!(*state, State::Running { .. }) {
            debug!("Log rotation service already running");
            return;
        }

        info!("Starting log rotation service");
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let worker = Worker {
            writer: self.writer.clone(),
            logs_dir: self.writer.logs_dir().to_path_buf(),
            policy: self.policy.clone(),
            tick_interval: self.tick_interval,
            completed_ticks: Arc::clone(&self.completed_ticks),
        };
        let handle = tokio::spawn(worker.run(shutdown_rx));
        *state = State::Running {
            shutdown_tx,
            handle,
        };
    }

    /// Stop the background worker and wait for it to exit
    ///
    /// Safe to call if never started. An in-flight tick is never
    /// interrupted; this waits for it to finish. After `stop` returns, no
    /// further rotation or sweep will run.
    pub async fn stop(&self) {
        let previous = {
            let Ok(mut state) = self.state.lock() else {
                return;
            };
            std::mem::replace(&mut *state, State::Stopped)
        };
        let State::Running {
            shutdown_tx,
            handle,
        } = previous
        else {
            return;
        };

        info!("Stopping log rotation service");
        let _ = shutdown_tx.send(());
        if let Err(e) = handle.await {
            error!("Log rotation worker panicked: {e}");
        }
    }

    /// Whether the background worker is currently running
    pub fn is_running(&self) -> bool {
        self.state
            .lock()
            .map(|state| matches!(*state, State::Running { .. }))
            .unwrap_or(false)
    }

    /// Number of housekeeping ticks completed since construction
    pub fn completed_ticks(&self) -> u64 {
        self.completed_ticks.load(Ordering::Relaxed)
    }

    /// List log files on disk, newest first, for external reporting
    pub fn log_files(&self) -> io::Result<Vec<LogFileEntry>> {
        retention::list_log_files(self.writer.logs_dir())
    }
}

struct Worker {
    writer: LogWriter,
    logs_dir: PathBuf,
    policy: RetentionPolicy,
    tick_interval: Duration,
    completed_ticks: Arc<AtomicU64>,
}

impl Worker {
    async fn run(self, mut shutdown_rx: oneshot::Receiver<()>) {
        // Initial sweep so startup always begins with a clean slate
        self.sweep();

        let mut timer = interval_at(Instant::now() + self.tick_interval, self.tick_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("Log rotation service stopped");
                    return;
                }
                _ = timer.tick() => {
                    self.tick();
                }
            }
        }
    }

    fn tick(&self) {
        match self.writer.rotate_if_needed() {
            Ok(true) => info!("Rotated log file at day boundary"),
            Ok(false) => {}
            Err(e) => error!("Failed to rotate log file: {e:#}"),
        }
        self.sweep();
        self.completed_ticks.fetch_add(1, Ordering::Relaxed);
    }

    fn sweep(&self) {
        match retention::sweep(&self.logs_dir, &self.policy) {
            Ok(0) => {}
            Ok(deleted) => info!("Retention sweep deleted {deleted} log file(s)"),
            Err(e) => error!("Retention sweep failed: {e}"),
        }
    }
}
