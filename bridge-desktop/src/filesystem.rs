//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::FileSystemAccess,
};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Tokio-based file system implementation
///
/// - `exists` probes with `tokio::fs::try_exists`
/// - `list_files_flat` runs a bounded `walkdir` traversal on the blocking pool.
///   Symbolic links are followed and reported under their own path; links whose
///   target is missing are skipped.
#[derive(Debug, Clone, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    pub fn new() -> Self {
        Self
    }

    fn map_walk_error(root: &Path, e: walkdir::Error) -> BridgeError {
        match e.into_io_error() {
            Some(io) if io.kind() == std::io::ErrorKind::NotFound => {
                BridgeError::PathNotFound(root.to_path_buf())
            }
            Some(io) => BridgeError::Io(io),
            None => BridgeError::OperationFailed(format!(
                "filesystem loop detected under {}",
                root.display()
            )),
        }
    }

    fn is_dangling(e: &walkdir::Error) -> bool {
        e.io_error()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
            && e.path().is_some_and(|p| p.is_symlink())
    }

    fn walk(root: &Path, max_depth: usize) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() > 0 && Self::is_dangling(&e) => {
                    debug!(path = ?e.path(), "Skipping dangling symlink");
                    continue;
                }
                Err(e) => return Err(Self::map_walk_error(root, e)),
            };
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(fs::try_exists(path).await?)
    }

    async fn list_files_flat(&self, root: &Path, max_depth: usize) -> Result<Vec<PathBuf>> {
        if !fs::try_exists(root).await? {
            return Err(BridgeError::PathNotFound(root.to_path_buf()));
        }

        let owned_root = root.to_path_buf();
        let files = tokio::task::spawn_blocking(move || Self::walk(&owned_root, max_depth))
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("directory walk panicked: {}", e)))??;

        debug!(root = ?root, max_depth, count = files.len(), "Listed course files");
        Ok(files)
    }
}
