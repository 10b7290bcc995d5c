//! Sweep scheduling and refresh coordination
//!
//! The scheduler owns the collector, the snapshot store, and the single
//! sweep guard. It runs sweeps from two paths:
//!
//! - A background loop: optional warm-up delay, then sweep, publish, sleep
//!   for the configured interval, forever
//! - On-demand refreshes from callers, which run a sweep synchronously and
//!   return the freshly published snapshot
//!
//! Both paths contend for one `Mutex`, so at most one sweep is in flight at
//! any instant regardless of who triggered it. A refresh arriving while a
//! background sweep runs blocks until that sweep finishes, then runs its
//! own. Sweeps are never cancelled mid-flight; `stop` waits for the guard
//! before tearing the loop down.
//!
//! On a cold start (no recoverable snapshot on disk) one sweep runs
//! synchronously before `start` returns, so the very first reader never
//! observes an empty store. Exactly one scheduler exists per process; the
//! durable store assumes a single writer.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::collector::{Collector, Fetcher};
use crate::config::Config;
use crate::error::Error;
use crate::models::Snapshot;
use crate::store::SnapshotStore;

/// Coordinates background sweeps and on-demand refreshes
pub struct Scheduler {
    /// Sweep runner, shared with the background task
    collector: Arc<Collector>,

    /// Snapshot store, shared with the background task and any reader
    store: Arc<SnapshotStore>,

    /// The single sweep-in-flight guard
    sweep_gate: Arc<Mutex<()>>,

    /// Time between background sweeps
    interval: Duration,

    /// Delay before the first background sweep
    warmup: Duration,

    /// Handle of the running background loop
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    /// Create a scheduler; the background loop starts on [`start`](Self::start)
    pub fn new(
        collector: Collector,
        store: Arc<SnapshotStore>,
        interval: Duration,
        warmup: Duration,
    ) -> Self {
        Self {
            collector: Arc::new(collector),
            store,
            sweep_gate: Arc::new(Mutex::new(())),
            interval,
            warmup,
            task: Mutex::new(None),
        }
    }

    /// Build a scheduler from validated configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for invalid configuration and `Error::Fetch`
    /// when the HTTP client cannot be created
    pub fn from_config(config: &Config) -> crate::error::Result<Self> {
        config.validate().map_err(|e| Error::config(e.to_string()))?;

        let fetcher = Fetcher::new(&config.fetch)?;
        let collector = Collector::new(config.facilities.clone(), fetcher);
        let store = Arc::new(SnapshotStore::with_dir(&config.store.data_dir));

        Ok(Self::new(
            collector,
            store,
            config.sweep_interval(),
            config.warmup(),
        ))
    }

    /// Handle to the snapshot store for read-only consumers
    pub fn store(&self) -> Arc<SnapshotStore> {
        Arc::clone(&self.store)
    }

    /// Recover durable state, seed the store if needed, and start the
    /// background loop
    ///
    /// When no snapshot can be recovered from disk, one sweep runs
    /// synchronously before this returns.
    pub async fn start(&self) {
        let mut task = self.task.lock().await;
        if task.is_some() {
            tracing::warn!("scheduler already running");
            return;
        }

        self.store.load().await;
        if self.store.read().await.is_none() {
            tracing::info!("no recoverable snapshot, seeding store before first read");
            self.refresh().await;
        }

        let collector = Arc::clone(&self.collector);
        let store = Arc::clone(&self.store);
        let gate = Arc::clone(&self.sweep_gate);
        let interval = self.interval;
        let warmup = self.warmup;

        *task = Some(tokio::spawn(async move {
            if !warmup.is_zero() {
                tracing::debug!(warmup_secs = warmup.as_secs(), "warm-up before first sweep");
                tokio::time::sleep(warmup).await;
            }

            loop {
                {
                    let _guard = gate.lock().await;
                    let snapshot = collector.run_sweep().await;
                    if let Err(e) = store.publish(snapshot).await {
                        tracing::warn!(error = %e, "snapshot not persisted, keeping in-memory state");
                    }
                }

                tokio::time::sleep(interval).await;
            }
        }));

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            warmup_secs = self.warmup.as_secs(),
            "background sweep loop started"
        );
    }

    /// Run one sweep now and return the freshly published snapshot
    ///
    /// Blocks while another sweep is in flight, then runs its own; two
    /// overlapping sweeps are impossible by construction.
    pub async fn refresh(&self) -> Snapshot {
        let _guard = self.sweep_gate.lock().await;
        let snapshot = self.collector.run_sweep().await;
        if let Err(e) = self.store.publish(snapshot.clone()).await {
            tracing::warn!(error = %e, "snapshot not persisted, keeping in-memory state");
        }
        snapshot
    }

    /// Latest published snapshot, without triggering any work
    pub async fn snapshot(&self) -> Option<Snapshot> {
        self.store.read().await
    }

    /// Whether the background loop is running
    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }

    /// Stop the background loop
    ///
    /// Waits for any in-flight sweep to finish publishing, then tears the
    /// loop down; the store keeps its last published snapshot.
    pub async fn stop(&self) {
        let mut task = self.task.lock().await;
        let _guard = self.sweep_gate.lock().await;
        if let Some(task) = task.take() {
            task.abort();
            tracing::info!("background sweep loop stopped");
        }
    }
}
