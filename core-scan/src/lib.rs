//! # Course Scan Engine
//!
//! Keeps the library's record of a course in step with its directory tree.
//!
//! ## Overview
//!
//! A scan request goes through a durable, per-course deduplicated queue and is
//! handled by a single worker, one course at a time. Each pass:
//! - Walks the course root and its immediate subdirectories (chapters)
//! - Classifies files by name into asset candidates and attachments
//! - Elects one asset per (chapter, prefix) slot, Video > HTML > PDF
//! - Diffs the result against the library by path and applies the changes
//!
//! ## Components
//!
//! - **Walker** (`walker`): Flat file listing with chapter labels
//! - **Classifier** (`classifier`): Filename grammar and extension kinds
//! - **Card Detector** (`card`): Course cover image at the root
//! - **Priority Resolver** (`resolver`): Slot grouping and asset election
//! - **Reconciler** (`reconciler`): Generic path-keyed diff
//! - **Scan Queue** (`queue`) and **Worker** (`worker`): Admission and draining
//! - **Scanner** (`scanner`): The full pass, run by the worker
//! - **Availability** (`availability`): Root-path probing and periodic sweep

pub mod availability;
pub mod card;
pub mod classifier;
pub mod error;
pub mod queue;
pub mod reconciler;
pub mod repository;
pub mod resolver;
pub mod scanner;
pub mod walker;
pub mod worker;

#[cfg(test)]
mod test_support;

pub use availability::{AvailabilityUpdater, SweepStats};
pub use classifier::{classify_extension, parse_file_name, FileKind, ParsedName};
pub use error::{Result, ScanError};
pub use queue::ScanQueue;
pub use reconciler::{reconcile, Diff, Reconcilable};
pub use repository::{ScanJob, ScanJobId, ScanJobRepository, ScanStatus, SqliteScanJobRepository};
pub use resolver::{resolve, Resolution, SlotKey, SlottedAttachment};
pub use scanner::{CourseScanner, ScanReport, ScannerDependencies};
pub use walker::{walk_course, ScannedFile};
pub use worker::{ScanProcessor, ScanWorker};
