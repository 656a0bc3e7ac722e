//! Course availability
//!
//! A course is available while its root directory exists. The updater only
//! ever flips a course to unavailable; a successful scan marks it available
//! again.

use bridge_traits::{Clock, FileSystemAccess};
use core_library::repositories::CourseRepository;
use core_library::Course;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Outcome of one sweep over every course
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepStats {
    pub checked: usize,
    pub marked_unavailable: usize,
    pub failed: usize,
}

pub struct AvailabilityUpdater {
    courses: Arc<dyn CourseRepository>,
    fs: Arc<dyn FileSystemAccess>,
    clock: Arc<dyn Clock>,
}

impl AvailabilityUpdater {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        fs: Arc<dyn FileSystemAccess>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { courses, fs, clock }
    }

    /// Probe the course root and persist `available = false` if it is gone
    /// and the course was still marked available.
    ///
    /// Returns whether the root exists. `course` is updated in place.
    pub async fn refresh(&self, course: &mut Course) -> Result<bool> {
        let exists = self.fs.exists(Path::new(&course.path)).await?;

        if !exists && course.available {
            course.available = false;
            course.updated_at = self.clock.unix_timestamp();
            self.courses.update(course).await?;
            info!(course_id = %course.id, path = %course.path, "Course marked unavailable");
        }

        Ok(exists)
    }

    /// Refresh every course. Failures on one course are logged and do not stop the sweep.
    pub async fn sweep(&self) -> Result<SweepStats> {
        let mut stats = SweepStats::default();

        for mut course in self.courses.list().await? {
            stats.checked += 1;
            let was_available = course.available;

            match self.refresh(&mut course).await {
                Ok(_) if was_available && !course.available => stats.marked_unavailable += 1,
                Ok(_) => {}
                Err(e) => {
                    stats.failed += 1;
                    warn!(course_id = %course.id, "Availability check failed: {}", e);
                }
            }
        }

        debug!(
            checked = stats.checked,
            marked_unavailable = stats.marked_unavailable,
            failed = stats.failed,
            "Availability sweep finished"
        );

        Ok(stats)
    }

    /// Sweep every `interval` until `shutdown` is cancelled.
    pub async fn run_periodic(&self, interval: Duration, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(interval_secs = interval.as_secs(), "Availability sweep started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep().await {
                        warn!("Availability sweep failed: {}", e);
                    }
                }
            }
        }

        info!("Availability sweep stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockFs;
    use bridge_traits::error::BridgeError;
    use bridge_traits::FixedClock;
    use core_library::create_test_pool;
    use core_library::repositories::SqliteCourseRepository;

    async fn setup(fs: MockFs) -> (AvailabilityUpdater, Arc<SqliteCourseRepository>) {
        let pool = create_test_pool().await.unwrap();
        let courses = Arc::new(SqliteCourseRepository::new(pool));
        let updater = AvailabilityUpdater::new(
            courses.clone(),
            Arc::new(fs),
            Arc::new(FixedClock::at_timestamp(500)),
        );
        (updater, courses)
    }

    async fn insert(courses: &SqliteCourseRepository, path: &str, available: bool) -> Course {
        let mut course = Course::new("Course".to_string(), path.to_string(), 10);
        course.available = available;
        courses.insert(&course).await.unwrap();
        course
    }

    #[tokio::test]
    async fn test_refresh_marks_missing_course_unavailable() {
        let mut fs = MockFs::new();
        fs.expect_exists().returning(|_| Ok(false));
        let (updater, courses) = setup(fs).await;
        let mut course = insert(&courses, "/gone", true).await;

        assert!(!updater.refresh(&mut course).await.unwrap());
        assert!(!course.available);

        let stored = courses.find_by_id(&course.id).await.unwrap().unwrap();
        assert!(!stored.available);
        assert_eq!(stored.updated_at, 500);
    }

    #[tokio::test]
    async fn test_refresh_skips_write_when_already_unavailable() {
        let mut fs = MockFs::new();
        fs.expect_exists().returning(|_| Ok(false));
        let (updater, courses) = setup(fs).await;
        let mut course = insert(&courses, "/gone", false).await;
        let before = course.updated_at;

        updater.refresh(&mut course).await.unwrap();

        let stored = courses.find_by_id(&course.id).await.unwrap().unwrap();
        assert_eq!(stored.updated_at, before);
    }

    #[tokio::test]
    async fn test_refresh_never_marks_available() {
        let mut fs = MockFs::new();
        fs.expect_exists().returning(|_| Ok(true));
        let (updater, courses) = setup(fs).await;
        let mut course = insert(&courses, "/here", false).await;

        assert!(updater.refresh(&mut course).await.unwrap());
        assert!(!course.available);
    }

    #[tokio::test]
    async fn test_sweep_counts_and_continues_past_errors() {
        let mut fs = MockFs::new();
        fs.expect_exists().returning(|path| match path.to_str() {
            Some("/here") => Ok(true),
            Some("/broken") => Err(BridgeError::OperationFailed("denied".into())),
            _ => Ok(false),
        });
        let (updater, courses) = setup(fs).await;
        insert(&courses, "/here", true).await;
        insert(&courses, "/broken", true).await;
        insert(&courses, "/gone", true).await;
        insert(&courses, "/gone-already", false).await;

        let stats = updater.sweep().await.unwrap();
        assert_eq!(
            stats,
            SweepStats {
                checked: 4,
                marked_unavailable: 1,
                failed: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_run_periodic_stops_on_cancel() {
        let mut fs = MockFs::new();
        fs.expect_exists().returning(|_| Ok(false));
        let (updater, courses) = setup(fs).await;
        let course = insert(&courses, "/gone", true).await;

        let updater = Arc::new(updater);
        let token = CancellationToken::new();
        let handle = tokio::spawn({
            let updater = updater.clone();
            let token = token.clone();
            async move { updater.run_periodic(Duration::from_millis(20), token).await }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();
        handle.await.unwrap();

        let stored = courses.find_by_id(&course.id).await.unwrap().unwrap();
        assert!(!stored.available);
    }
}
