use bridge_traits::error::BridgeError;
use core_library::LibraryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Course {course_id} not found")]
    CourseNotFound { course_id: String },

    #[error("Course {course_id} is unavailable: root path {path} does not exist")]
    Unavailable { course_id: String, path: String },

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] BridgeError),

    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    #[error("Invalid scan job ID: {0}")]
    InvalidJobId(String),

    #[error("Invalid scan status: {0}")]
    InvalidStatus(String),

    /// Scan job table failures
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
