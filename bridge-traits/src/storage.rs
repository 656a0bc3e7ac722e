//! Storage Abstractions
//!
//! Provides the platform-agnostic filesystem trait the scan engine walks
//! course directories through.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// File system access trait
///
/// Abstracts the two filesystem operations the course scanner needs so the
/// engine can be driven by a real disk, a sandboxed host directory, or an
/// in-memory fake in tests.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn course_files(fs: &dyn FileSystemAccess, root: &Path) -> Result<Vec<PathBuf>> {
///     if !fs.exists(root).await? {
///         return Ok(Vec::new());
///     }
///     fs.list_files_flat(root, 2).await
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// List every regular file under `root`, descending at most `max_depth`
    /// levels (1 = files directly in `root`, 2 = also files one directory below).
    ///
    /// Directories themselves are never returned. Symbolic links count as the
    /// file or directory they point to and keep their own path; dangling links
    /// are skipped. Entries are returned in
    /// lexicographic order by file name within each directory so callers that
    /// pick "the first match" behave the same on every platform.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::PathNotFound`](crate::error::BridgeError::PathNotFound)
    /// if `root` does not exist, or an I/O error if any directory cannot be read.
    async fn list_files_flat(&self, root: &Path, max_depth: usize) -> Result<Vec<PathBuf>>;
}
