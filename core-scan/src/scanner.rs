//! # Course Scanner
//!
//! One reconciliation pass over a course.
//!
//! ## Pipeline
//!
//! 1. Load the course and probe its root; a missing root marks the course
//!    unavailable and aborts without touching assets or attachments
//! 2. Walk the tree (root + one chapter level)
//! 3. Detect the card and elect one asset per (chapter, prefix) slot
//! 4. Diff assets against the library by path and apply inserts and deletes
//! 5. Re-read attachments, which may have been removed along with their
//!    asset, then diff and apply them
//! 6. Save card path and availability on the course
//!
//! Steps are not wrapped in a transaction. A failure leaves whatever was
//! already applied, and the next scan converges from there.

use async_trait::async_trait;
use bridge_traits::{Clock, FileSystemAccess};
use core_library::repositories::{AssetRepository, AttachmentRepository, CourseRepository};
use core_library::{Asset, Attachment};
use core_runtime::config::ScanSettings;
use core_runtime::logging::strip_path;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::availability::AvailabilityUpdater;
use crate::card::detect_card;
use crate::error::{Result, ScanError};
use crate::reconciler::{reconcile, Diff};
use crate::repository::ScanJob;
use crate::resolver::{resolve, SlotKey};
use crate::walker::walk_course;
use crate::worker::ScanProcessor;

/// What one scan pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub assets_added: usize,
    pub assets_removed: usize,
    pub attachments_added: usize,
    pub attachments_removed: usize,
    /// Attachments skipped because no asset shares their slot
    pub orphans_dropped: usize,
    /// Files ignored because their names carry no numeric prefix
    pub files_ignored: usize,
    pub card_path: Option<String>,
}

impl ScanReport {
    /// Whether the pass inserted or deleted anything
    pub fn has_changes(&self) -> bool {
        self.assets_added + self.assets_removed + self.attachments_added + self.attachments_removed
            > 0
    }
}

/// Everything the scanner reads and writes
#[derive(Clone)]
pub struct ScannerDependencies {
    pub courses: Arc<dyn CourseRepository>,
    pub assets: Arc<dyn AssetRepository>,
    pub attachments: Arc<dyn AttachmentRepository>,
    pub file_system: Arc<dyn FileSystemAccess>,
    pub clock: Arc<dyn Clock>,
}

/// Reconciles a course's assets and attachments with its directory tree
pub struct CourseScanner {
    deps: ScannerDependencies,
    availability: AvailabilityUpdater,
    settings: ScanSettings,
}

impl CourseScanner {
    pub fn new(deps: ScannerDependencies, settings: ScanSettings) -> Self {
        let availability = AvailabilityUpdater::new(
            deps.courses.clone(),
            deps.file_system.clone(),
            deps.clock.clone(),
        );
        Self {
            deps,
            availability,
            settings,
        }
    }

    /// Run one reconciliation pass for `course_id`.
    ///
    /// # Errors
    /// - [`ScanError::CourseNotFound`] if the course no longer exists
    /// - [`ScanError::Unavailable`] if its root path is missing
    /// - [`ScanError::Filesystem`] / [`ScanError::Library`] on I/O or persistence failures
    #[instrument(skip_all, fields(course_id = %course_id))]
    pub async fn scan(&self, course_id: &str) -> Result<ScanReport> {
        let mut course = self
            .deps
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| ScanError::CourseNotFound {
                course_id: course_id.to_string(),
            })?;

        if !self.availability.refresh(&mut course).await? {
            return Err(ScanError::Unavailable {
                course_id: course.id,
                path: course.path,
            });
        }

        let root = Path::new(&course.path);
        let files = walk_course(
            self.deps.file_system.as_ref(),
            root,
            self.settings.max_depth,
        )
        .await?;

        let card_path = detect_card(&files, &self.settings.card_extensions)
            .map(|card| card.path_string());
        if let Some(card) = &card_path {
            debug!(card = %strip_path(card), "Detected course card");
        }

        let now = self.deps.clock.unix_timestamp();
        let resolution = resolve(&course.id, &files, now);

        let mut report = ScanReport {
            orphans_dropped: resolution.orphans_dropped,
            files_ignored: resolution.ignored,
            card_path: card_path.clone(),
            ..Default::default()
        };

        let persisted_assets = self.deps.assets.list_for_course(&course.id).await?;
        let asset_diff = reconcile(persisted_assets, resolution.assets);
        self.apply_assets(&asset_diff).await?;
        report.assets_added = asset_diff.to_insert.len();
        report.assets_removed = asset_diff.to_delete.len();

        let owners: HashMap<SlotKey, &str> = asset_diff
            .retained()
            .map(|asset| (SlotKey::new(asset.chapter.as_str(), asset.prefix), asset.id.as_str()))
            .collect();

        let fresh_attachments: Vec<Attachment> = resolution
            .attachments
            .into_iter()
            .filter_map(|pending| {
                let owner = owners.get(&pending.slot)?;
                Some(Attachment::new(
                    course.id.clone(),
                    owner.to_string(),
                    pending.title,
                    pending.path,
                    now,
                ))
            })
            .collect();

        // Read after asset deletes so attachments removed by cascade are not
        // mistaken for still-present rows.
        let persisted_attachments = self.deps.attachments.list_for_course(&course.id).await?;
        let attachment_diff = reconcile(persisted_attachments, fresh_attachments);
        self.apply_attachments(&attachment_diff).await?;
        report.attachments_added = attachment_diff.to_insert.len();
        report.attachments_removed = attachment_diff.to_delete.len();

        course.card_path = card_path;
        course.available = true;
        course.updated_at = now;
        self.deps.courses.update(&course).await?;

        debug!(changed = report.has_changes(), "Scan pass applied");

        Ok(report)
    }

    async fn apply_assets(&self, diff: &Diff<Asset>) -> Result<()> {
        for asset in &diff.to_delete {
            self.deps.assets.delete(&asset.id).await?;
        }
        for asset in &diff.to_insert {
            self.deps.assets.insert(asset).await?;
        }
        Ok(())
    }

    async fn apply_attachments(&self, diff: &Diff<Attachment>) -> Result<()> {
        for attachment in &diff.to_delete {
            self.deps.attachments.delete(&attachment.id).await?;
        }
        for attachment in &diff.to_insert {
            self.deps.attachments.insert(attachment).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ScanProcessor for CourseScanner {
    async fn process(&self, job: &ScanJob) -> Result<ScanReport> {
        self.scan(&job.course_id).await
    }
}
