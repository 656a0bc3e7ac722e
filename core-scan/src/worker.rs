//! # Scan Worker
//!
//! The single consumer of the scan queue.
//!
//! ## State Machine
//!
//! ```text
//! Idle --wake--> Draining --(no waiting job)--> Idle
//!                    |
//!                    +--(job table error)--> Recovering --retry delay--> Draining
//! ```
//!
//! While draining, the worker takes the oldest waiting job, marks it
//! `Processing`, hands it to the [`ScanProcessor`] and deletes it afterwards,
//! whether the pass succeeded or failed. Failed scans are logged and not
//! retried. Courses are reconciled strictly one at a time.
//!
//! A job row that cannot be removed is retried with backoff. If it still
//! cannot be removed the drain stops and the next one starts by putting
//! every `Processing` row back to `Waiting`, so the course is rescanned
//! instead of staying blocked. `run` schedules that next drain itself.
//!
//! Cancellation is observed between jobs only; a pass that has started runs
//! to completion.

use async_trait::async_trait;
use bridge_traits::Clock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{Result, ScanError};
use crate::repository::{ScanJob, ScanJobRepository};
use crate::scanner::ScanReport;

/// Delete attempts for a finished job before the drain gives up on it
pub const DELETE_ATTEMPTS: u32 = 3;

/// Wait before the second delete attempt; doubled for each further one
const DELETE_BACKOFF: Duration = Duration::from_millis(50);

const DEFAULT_RECOVERY_DELAY: Duration = Duration::from_secs(5);

/// Runs the reconciliation pass for one job
#[async_trait]
pub trait ScanProcessor: Send + Sync {
    async fn process(&self, job: &ScanJob) -> Result<ScanReport>;
}

/// Sequential consumer created by [`ScanQueue::new`](crate::queue::ScanQueue::new)
pub struct ScanWorker {
    jobs: Arc<dyn ScanJobRepository>,
    clock: Arc<dyn Clock>,
    wake: mpsc::Receiver<()>,
    /// Set when `Processing` rows may be stale; starts set to recover from a crash
    recovery_pending: AtomicBool,
    recovery_delay: Duration,
}

impl ScanWorker {
    pub(crate) fn new(
        jobs: Arc<dyn ScanJobRepository>,
        clock: Arc<dyn Clock>,
        wake: mpsc::Receiver<()>,
    ) -> Self {
        Self {
            jobs,
            clock,
            wake,
            recovery_pending: AtomicBool::new(true),
            recovery_delay: DEFAULT_RECOVERY_DELAY,
        }
    }

    /// How long `run` waits before draining again after a job table error
    pub fn with_recovery_delay(mut self, delay: Duration) -> Self {
        self.recovery_delay = delay;
        self
    }

    /// Process jobs until `shutdown` is cancelled or every queue handle is dropped.
    pub async fn run(
        mut self,
        processor: Arc<dyn ScanProcessor>,
        shutdown: CancellationToken,
    ) -> Result<()> {
        info!("Scan worker started");

        loop {
            self.drain(processor.as_ref(), &shutdown).await;
            let retry = self.recovery_pending.load(Ordering::SeqCst);

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.recovery_delay), if retry => {
                    debug!("Retrying interrupted scan drain");
                }
                wake = self.wake.recv() => {
                    if wake.is_none() {
                        debug!("All scan queue handles dropped");
                        break;
                    }
                }
            }
        }

        info!("Scan worker stopped");
        Ok(())
    }

    /// Process waiting jobs until none is left; returns how many were handled.
    pub async fn drain(
        &self,
        processor: &dyn ScanProcessor,
        shutdown: &CancellationToken,
    ) -> usize {
        if self.recovery_pending.swap(false, Ordering::SeqCst) && !self.recover().await {
            return 0;
        }

        let mut handled = 0;

        while !shutdown.is_cancelled() {
            let job = match self.jobs.next_waiting().await {
                Ok(Some(job)) => job,
                Ok(None) => break,
                Err(e) => {
                    error!("Failed to fetch next scan job: {}", e);
                    self.recovery_pending.store(true, Ordering::SeqCst);
                    break;
                }
            };

            if let Err(e) = self.process_job(processor, &job).await {
                error!(
                    job_id = %job.id,
                    course_id = %job.course_id,
                    "Scan job bookkeeping failed: {}",
                    e
                );
                self.recovery_pending.store(true, Ordering::SeqCst);
                break;
            }
            handled += 1;
        }

        handled
    }

    /// Put `Processing` rows back to `Waiting`; `false` if the table is still failing.
    async fn recover(&self) -> bool {
        match self
            .jobs
            .reset_processing(self.clock.unix_timestamp())
            .await
        {
            Ok(0) => true,
            Ok(requeued) => {
                warn!(requeued, "Re-queued scan jobs left in processing");
                true
            }
            Err(e) => {
                error!("Failed to re-queue interrupted scan jobs: {}", e);
                self.recovery_pending.store(true, Ordering::SeqCst);
                false
            }
        }
    }

    #[instrument(skip(self, processor, job), fields(job_id = %job.id, course_id = %job.course_id))]
    async fn process_job(&self, processor: &dyn ScanProcessor, job: &ScanJob) -> Result<()> {
        self.jobs
            .mark_processing(job.id, self.clock.unix_timestamp())
            .await?;

        match processor.process(job).await {
            Ok(report) => info!(
                assets_added = report.assets_added,
                assets_removed = report.assets_removed,
                attachments_added = report.attachments_added,
                attachments_removed = report.attachments_removed,
                orphans_dropped = report.orphans_dropped,
                card = ?report.card_path,
                "Course scan completed"
            ),
            Err(e @ ScanError::CourseNotFound { .. }) | Err(e @ ScanError::Unavailable { .. }) => {
                warn!("Course scan skipped: {}", e)
            }
            Err(e) => error!("Course scan failed: {}", e),
        }

        self.remove_job(job).await
    }

    async fn remove_job(&self, job: &ScanJob) -> Result<()> {
        let mut backoff = DELETE_BACKOFF;
        let mut attempt = 1;

        loop {
            match self.jobs.delete(job.id).await {
                Ok(true) => return Ok(()),
                Ok(false) => {
                    debug!("Scan job already removed");
                    return Ok(());
                }
                Err(e) if attempt < DELETE_ATTEMPTS => {
                    warn!(attempt, "Failed to remove scan job, retrying: {}", e);
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
