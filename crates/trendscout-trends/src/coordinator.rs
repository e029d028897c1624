//! Single-flight pipeline runs with lock-free reads of the latest snapshot.
//!
//! The published snapshot lives behind an [`ArcSwapOption`]: readers take an
//! `Arc` of whatever is current and never wait on a run. Runs are guarded by
//! an atomic latch. A trigger that finds the latch held is dropped, not
//! queued, so a burst of triggers collapses into the one run already going.
//!
//! There is no timeout on a run. A collector that never returns keeps the
//! latch held forever while reads keep serving the last good snapshot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use serde::Serialize;
use trendscout_core::Snapshot;

use crate::pipeline::Pipeline;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Published { run_id: u64, listings: usize },
    /// Another run held the latch; nothing was done.
    Skipped,
    /// The previous snapshot, if any, is still published.
    Failed { error: String },
}

#[derive(Debug, Clone)]
pub enum SnapshotView {
    NotReady,
    Ready(Arc<Snapshot>),
}

#[derive(Debug, Clone, Serialize)]
pub struct CoordinatorStatus {
    pub running: bool,
    pub ready: bool,
    pub run_id: Option<u64>,
    pub published_at: Option<DateTime<Utc>>,
    pub listings: Option<usize>,
    pub last_run_started_at: Option<DateTime<Utc>>,
    /// Error of the most recent run, cleared by the next success.
    pub last_error: Option<String>,
}

pub struct SnapshotCoordinator {
    pipeline: Pipeline,
    published: ArcSwapOption<Snapshot>,
    running: Arc<AtomicBool>,
    last_run_started_at: ArcSwapOption<DateTime<Utc>>,
    last_error: ArcSwapOption<String>,
}

impl SnapshotCoordinator {
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            published: ArcSwapOption::empty(),
            running: Arc::new(AtomicBool::new(false)),
            last_run_started_at: ArcSwapOption::empty(),
            last_error: ArcSwapOption::empty(),
        }
    }

    /// Current snapshot, without waiting on any in-flight run.
    #[must_use]
    pub fn read(&self) -> SnapshotView {
        self.published
            .load_full()
            .map_or(SnapshotView::NotReady, SnapshotView::Ready)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn status(&self) -> CoordinatorStatus {
        let snapshot = self.published.load_full();
        CoordinatorStatus {
            running: self.is_running(),
            ready: snapshot.is_some(),
            run_id: snapshot.as_ref().map(|s| s.run_id),
            published_at: snapshot.as_ref().map(|s| s.published_at),
            listings: snapshot.as_ref().map(|s| s.len()),
            last_run_started_at: self.last_run_started_at.load_full().map(|t| *t),
            last_error: self.last_error.load_full().map(|e| e.as_ref().clone()),
        }
    }

    /// Run the pipeline now unless a run is already in progress.
    pub async fn trigger_run(&self) -> RunOutcome {
        let Some(latch) = RunLatch::acquire(&self.running) else {
            tracing::info!("run already in progress; trigger dropped");
            return RunOutcome::Skipped;
        };
        self.run_holding(latch).await
    }

    /// Start a run on a background task. Returns `false`, without spawning,
    /// when a run is already in progress.
    pub fn spawn_run(self: &Arc<Self>) -> bool {
        let Some(latch) = RunLatch::acquire(&self.running) else {
            tracing::info!("run already in progress; trigger dropped");
            return false;
        };

        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            coordinator.run_holding(latch).await;
        });
        true
    }

    async fn run_holding(&self, _latch: RunLatch) -> RunOutcome {
        self.last_run_started_at.store(Some(Arc::new(Utc::now())));
        tracing::info!(collectors = self.pipeline.collector_count(), "run started");

        match self.pipeline.run().await {
            Ok(listings) => {
                let run_id = self
                    .published
                    .load_full()
                    .map_or(1, |prev| prev.run_id + 1);
                let snapshot = Snapshot::new(run_id, listings);
                let count = snapshot.len();

                self.published.store(Some(Arc::new(snapshot)));
                self.last_error.store(None);
                tracing::info!(run_id, listings = count, "snapshot published");

                RunOutcome::Published {
                    run_id,
                    listings: count,
                }
            }
            Err(e) => {
                let error = e.to_string();
                tracing::error!(error = %error, "run failed; keeping previous snapshot");
                self.last_error.store(Some(Arc::new(error.clone())));
                RunOutcome::Failed { error }
            }
        }
    }
}

/// Held for the whole of a run. Dropping it, on any exit path including a
/// panic unwinding through the pipeline, clears the running flag.
struct RunLatch {
    flag: Arc<AtomicBool>,
}

impl RunLatch {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for RunLatch {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
