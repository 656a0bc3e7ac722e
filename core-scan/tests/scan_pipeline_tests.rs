//! Integration tests for the scan pipeline
//!
//! These tests build real course trees on disk and drive the full pipeline
//! through `TokioFileSystem` and an in-memory SQLite library:
//! - Example course layout and card detection
//! - Idempotent rescans and convergence on added/removed files
//! - Slot priority regardless of discovery order
//! - Queue admission and worker draining

use bridge_desktop::TokioFileSystem;
use bridge_traits::FixedClock;
use core_library::repositories::{
    AssetRepository, AttachmentRepository, CourseRepository, SqliteAssetRepository,
    SqliteAttachmentRepository, SqliteCourseRepository,
};
use core_library::{create_test_pool, Asset, AssetType, Attachment, Course};
use core_runtime::config::ScanSettings;
use core_scan::{
    CourseScanner, ScanError, ScanQueue, ScanStatus, ScannerDependencies,
    SqliteScanJobRepository,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Fixture
// ============================================================================

struct Library {
    dir: TempDir,
    course: Course,
    deps: ScannerDependencies,
    scanner: Arc<CourseScanner>,
    jobs: Arc<SqliteScanJobRepository>,
}

impl Library {
    async fn new(files: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        for file in files {
            touch(dir.path(), file);
        }

        let pool = create_test_pool().await.unwrap();
        let courses = Arc::new(SqliteCourseRepository::new(pool.clone()));
        let course = Course::new(
            "Course".to_string(),
            dir.path().to_string_lossy().into_owned(),
            1_700_000_000,
        );
        courses.insert(&course).await.unwrap();

        let jobs = Arc::new(SqliteScanJobRepository::new(pool.clone()));
        jobs.initialize().await.unwrap();

        let deps = ScannerDependencies {
            courses,
            assets: Arc::new(SqliteAssetRepository::new(pool.clone())),
            attachments: Arc::new(SqliteAttachmentRepository::new(pool)),
            file_system: Arc::new(TokioFileSystem::new()),
            clock: Arc::new(FixedClock::at_timestamp(1_700_000_000)),
        };
        let scanner = Arc::new(CourseScanner::new(deps.clone(), ScanSettings::default()));

        Self {
            dir,
            course,
            deps,
            scanner,
            jobs,
        }
    }

    fn path(&self, relative: &str) -> String {
        self.dir.path().join(relative).to_string_lossy().into_owned()
    }

    async fn assets(&self) -> Vec<Asset> {
        self.deps
            .assets
            .list_for_course(&self.course.id)
            .await
            .unwrap()
    }

    async fn attachments(&self) -> Vec<Attachment> {
        self.deps
            .attachments
            .list_for_course(&self.course.id)
            .await
            .unwrap()
    }

    async fn course(&self) -> Course {
        self.deps
            .courses
            .find_by_id(&self.course.id)
            .await
            .unwrap()
            .unwrap()
    }
}

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"x").unwrap();
}

fn asset_ids(assets: &[Asset]) -> Vec<(String, String)> {
    let mut pairs: Vec<_> = assets
        .iter()
        .map(|a| (a.path.clone(), a.id.clone()))
        .collect();
    pairs.sort();
    pairs
}

fn attachment_ids(attachments: &[Attachment]) -> Vec<(String, String)> {
    let mut pairs: Vec<_> = attachments
        .iter()
        .map(|a| (a.path.clone(), a.id.clone()))
        .collect();
    pairs.sort();
    pairs
}

// ============================================================================
// Pipeline
// ============================================================================

#[tokio::test]
async fn test_example_course() {
    let lib = Library::new(&["01 intro.mp4", "01 slides.pdf", "02 notes.txt", "card.png"]).await;

    lib.scanner.scan(&lib.course.id).await.unwrap();

    let assets = lib.assets().await;
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].prefix, 1);
    assert_eq!(assets[0].asset_type, AssetType::Video);
    assert_eq!(assets[0].path, lib.path("01 intro.mp4"));
    assert_eq!(assets[0].chapter, "");

    let attachments = lib.attachments().await;
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].path, lib.path("01 slides.pdf"));
    assert_eq!(attachments[0].asset_id, assets[0].id);

    let course = lib.course().await;
    assert_eq!(course.card_path, Some(lib.path("card.png")));
    assert!(course.available);
}

#[tokio::test]
async fn test_rescan_is_idempotent() {
    let lib = Library::new(&[
        "01 intro.mp4",
        "01 intro.html",
        "01 Basics/01 setup.mp4",
        "01 Basics/01 setup.zip",
        "01 Basics/02 quiz.pdf",
    ])
    .await;

    lib.scanner.scan(&lib.course.id).await.unwrap();
    let assets_before = lib.assets().await;
    let attachments_before = lib.attachments().await;

    let report = lib.scanner.scan(&lib.course.id).await.unwrap();
    assert!(!report.has_changes());

    assert_eq!(lib.assets().await, assets_before);
    assert_eq!(lib.attachments().await, attachments_before);
}

#[tokio::test]
async fn test_added_file_converges() {
    let lib = Library::new(&["01 intro.mp4", "01 notes.txt"]).await;
    lib.scanner.scan(&lib.course.id).await.unwrap();
    let assets_before = asset_ids(&lib.assets().await);
    let attachments_before = attachment_ids(&lib.attachments().await);

    touch(lib.dir.path(), "02 next.mp4");
    let report = lib.scanner.scan(&lib.course.id).await.unwrap();
    assert_eq!(report.assets_added, 1);
    assert_eq!(report.assets_removed, 0);
    assert_eq!(report.attachments_added + report.attachments_removed, 0);

    let assets_after = asset_ids(&lib.assets().await);
    assert_eq!(assets_after.len(), 2);
    for existing in &assets_before {
        assert!(assets_after.contains(existing));
    }
    assert_eq!(
        attachment_ids(&lib.attachments().await),
        attachments_before
    );
}

#[tokio::test]
async fn test_removed_file_converges() {
    let lib = Library::new(&["01 intro.mp4", "01 notes.txt", "02 next.mp4"]).await;
    lib.scanner.scan(&lib.course.id).await.unwrap();
    let intro = lib
        .assets()
        .await
        .into_iter()
        .find(|a| a.prefix == 1)
        .unwrap();

    fs::remove_file(lib.dir.path().join("01 notes.txt")).unwrap();
    let report = lib.scanner.scan(&lib.course.id).await.unwrap();
    assert_eq!(report.attachments_removed, 1);
    assert_eq!(report.assets_added + report.assets_removed, 0);

    let assets = lib.assets().await;
    assert_eq!(assets.len(), 2);
    assert!(assets.contains(&intro));
    assert!(lib.attachments().await.is_empty());
}

#[tokio::test]
async fn test_priority_video_html_pdf() {
    let lib = Library::new(&[
        "Chapter/05 lesson.pdf",
        "Chapter/05 lesson.html",
        "Chapter/05 lesson.mp4",
    ])
    .await;

    lib.scanner.scan(&lib.course.id).await.unwrap();

    let assets = lib.assets().await;
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].asset_type, AssetType::Video);
    assert_eq!(assets[0].chapter, "Chapter");

    let attachments = lib.attachments().await;
    let mut titles: Vec<_> = attachments.iter().map(|a| a.title.as_str()).collect();
    titles.sort();
    assert_eq!(titles, vec!["05 lesson.html", "05 lesson.pdf"]);
    assert!(attachments.iter().all(|a| a.asset_id == assets[0].id));
}

#[tokio::test]
async fn test_orphan_attachments_are_not_persisted() {
    let lib = Library::new(&["03 notes.txt", "03 README", "Extra/04 code.zip"]).await;

    let report = lib.scanner.scan(&lib.course.id).await.unwrap();
    assert_eq!(report.orphans_dropped, 3);
    assert!(lib.assets().await.is_empty());
    assert!(lib.attachments().await.is_empty());
}

#[tokio::test]
async fn test_card_is_unique_and_root_only() {
    let lib = Library::new(&["card.png", "card.jpg", "01 Intro/card.jpg", "01 a.mp4"]).await;

    lib.scanner.scan(&lib.course.id).await.unwrap();
    assert_eq!(lib.course().await.card_path, Some(lib.path("card.jpg")));

    let nested_only = Library::new(&["01 Intro/card.jpg"]).await;
    nested_only
        .scanner
        .scan(&nested_only.course.id)
        .await
        .unwrap();
    assert_eq!(nested_only.course().await.card_path, None);
}

#[tokio::test]
async fn test_files_below_chapter_level_are_ignored() {
    let lib = Library::new(&["01 a.mp4", "Part/02 b.mp4", "Part/Deep/03 c.mp4"]).await;

    lib.scanner.scan(&lib.course.id).await.unwrap();

    let mut paths: Vec<_> = lib.assets().await.into_iter().map(|a| a.path).collect();
    paths.sort();
    let mut expected = vec![lib.path("01 a.mp4"), lib.path("Part/02 b.mp4")];
    expected.sort();
    assert_eq!(paths, expected);
}

#[tokio::test]
async fn test_missing_root_marks_unavailable_and_keeps_records() {
    let lib = Library::new(&["01 intro.mp4", "01 notes.txt"]).await;
    lib.scanner.scan(&lib.course.id).await.unwrap();

    let course_dir = lib.dir.path().to_path_buf();
    fs::remove_dir_all(&course_dir).unwrap();

    let result = lib.scanner.scan(&lib.course.id).await;
    assert!(matches!(result, Err(ScanError::Unavailable { .. })));
    assert_eq!(lib.assets().await.len(), 1);
    assert_eq!(lib.attachments().await.len(), 1);
    assert!(!lib.course().await.available);

    // Restoring the directory makes the next scan mark it available again
    touch(&course_dir, "01 intro.mp4");
    lib.scanner.scan(&lib.course.id).await.unwrap();
    assert!(lib.course().await.available);
}

// ============================================================================
// Queue + Worker
// ============================================================================

#[tokio::test]
async fn test_queue_admission_and_worker_drain() {
    let lib = Library::new(&["01 intro.mp4"]).await;
    let (queue, worker) = ScanQueue::new(
        lib.jobs.clone(),
        lib.deps.courses.clone(),
        lib.deps.clock.clone(),
    );

    assert!(queue.add(&lib.course.id).await.unwrap().is_some());
    assert!(queue.add(&lib.course.id).await.unwrap().is_none());
    assert_eq!(
        queue.status(&lib.course.id).await.unwrap(),
        Some(ScanStatus::Waiting)
    );

    let token = CancellationToken::new();
    let handle = tokio::spawn(worker.run(lib.scanner.clone(), token.clone()));

    for _ in 0..200 {
        if queue.status(&lib.course.id).await.unwrap().is_none() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(queue.status(&lib.course.id).await.unwrap(), None);
    assert_eq!(lib.assets().await.len(), 1);

    token.cancel();
    handle.await.unwrap().unwrap();
}
