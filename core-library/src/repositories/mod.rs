//! # Repository Pattern Implementation
//!
//! Repository traits and SQLite implementations for course library data access.
//!
//! ## Architecture
//!
//! - Traits define the interface for each repository so the scan engine can be
//!   tested against fakes
//! - SQLite implementations use `sqlx` against a shared `SqlitePool`
//! - All operations return `Result<T>` for error handling
//!
//! ## Available Repositories
//!
//! - `CourseRepository` - Courses and their availability/card state
//! - `AssetRepository` - Primary files per (chapter, prefix) slot
//! - `AttachmentRepository` - Supporting files owned by an asset

pub mod asset;
pub mod attachment;
pub mod course;

pub use asset::{AssetRepository, SqliteAssetRepository};
pub use attachment::{AttachmentRepository, SqliteAttachmentRepository};
pub use course::{CourseRepository, SqliteCourseRepository};
