//! # Scan Queue
//!
//! Admission control for scan requests.
//!
//! ## Overview
//!
//! `ScanQueue::add` turns a scan request into a durable [`ScanJob`] and wakes
//! the worker. A course has at most one job at a time: the storage layer
//! enforces uniqueness on the course, so concurrent `add` calls for the same
//! course create exactly one job and the others return `None`.
//!
//! The wake signal is a capacity-1 channel. Several `add` calls between two
//! worker passes collapse into a single wake-up; the worker re-polls storage
//! until no job is left, so no request is missed.
//!
//! ## Usage
//!
//! ```ignore
//! let (queue, worker) = ScanQueue::new(jobs, courses, clock);
//! tokio::spawn(worker.run(scanner, shutdown.clone()));
//!
//! if let Some(job) = queue.add(&course_id).await? {
//!     info!(job_id = %job.id, "Scan queued");
//! }
//! ```

use bridge_traits::Clock;
use core_library::repositories::CourseRepository;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::{Result, ScanError};
use crate::repository::{ScanJob, ScanJobRepository, ScanStatus};
use crate::worker::ScanWorker;

/// Handle used by request handlers to queue scans
#[derive(Clone)]
pub struct ScanQueue {
    jobs: Arc<dyn ScanJobRepository>,
    courses: Arc<dyn CourseRepository>,
    clock: Arc<dyn Clock>,
    wake: mpsc::Sender<()>,
}

impl ScanQueue {
    /// Create the queue and the single worker that drains it
    pub fn new(
        jobs: Arc<dyn ScanJobRepository>,
        courses: Arc<dyn CourseRepository>,
        clock: Arc<dyn Clock>,
    ) -> (Self, ScanWorker) {
        let (wake, wake_rx) = mpsc::channel(1);
        let worker = ScanWorker::new(jobs.clone(), clock.clone(), wake_rx);

        (
            Self {
                jobs,
                courses,
                clock,
                wake,
            },
            worker,
        )
    }

    /// Queue a scan for `course_id`.
    ///
    /// # Returns
    /// - `Ok(Some(job))` if a new job was created
    /// - `Ok(None)` if the course already has a waiting or running job
    ///
    /// # Errors
    /// [`ScanError::CourseNotFound`] if the course does not exist.
    pub async fn add(&self, course_id: &str) -> Result<Option<ScanJob>> {
        if self.courses.find_by_id(course_id).await?.is_none() {
            return Err(ScanError::CourseNotFound {
                course_id: course_id.to_string(),
            });
        }

        let job = ScanJob::new(course_id, self.clock.unix_timestamp());
        if !self.jobs.create_if_absent(&job).await? {
            debug!(course_id = %course_id, "Scan already queued, skipping");
            return Ok(None);
        }

        info!(job_id = %job.id, course_id = %course_id, "Queued course scan");
        self.wake_worker();

        Ok(Some(job))
    }

    /// Current scan status of a course, `None` when nothing is queued
    pub async fn status(&self, course_id: &str) -> Result<Option<ScanStatus>> {
        Ok(self
            .jobs
            .find_by_course(course_id)
            .await?
            .map(|job| job.status))
    }

    fn wake_worker(&self) {
        // A full channel already holds a pending wake; a closed one means the
        // worker has stopped and the job waits for the next start.
        if self.wake.try_send(()).is_err() {
            debug!("Worker wake already pending or worker stopped");
        }
    }
}
