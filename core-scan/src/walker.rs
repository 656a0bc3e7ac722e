//! Directory walker
//!
//! Flattens a course tree into the files the scanner looks at: files directly
//! in the course root, and files one directory below it. The directory a file
//! sits in becomes its chapter.

use bridge_traits::FileSystemAccess;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;

/// A file discovered under a course root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Full path of the file
    pub path: PathBuf,
    /// Bare file name, directory stripped
    pub file_name: String,
    /// Immediate subdirectory below the root; empty for root-level files
    pub chapter: String,
}

impl ScannedFile {
    /// Build a scanned file from a path under `root`.
    ///
    /// Returns `None` for paths that are not below `root` or whose names are
    /// not valid UTF-8.
    pub fn from_path(root: &Path, path: PathBuf) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        let file_name = relative.file_name()?.to_str()?.to_string();

        let chapter = match relative.parent() {
            Some(parent) if parent.as_os_str().is_empty() => String::new(),
            Some(parent) => parent.file_name()?.to_str()?.to_string(),
            None => String::new(),
        };

        Some(Self {
            path,
            file_name,
            chapter,
        })
    }

    pub fn is_root_level(&self) -> bool {
        self.chapter.is_empty()
    }

    /// Path as stored in the library
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// List the files under `root` down to `max_depth` levels, in the order the
/// filesystem collaborator returns them.
pub async fn walk_course(
    fs: &dyn FileSystemAccess,
    root: &Path,
    max_depth: usize,
) -> Result<Vec<ScannedFile>> {
    let paths = fs.list_files_flat(root, max_depth).await?;
    let total = paths.len();

    let files: Vec<ScannedFile> = paths
        .into_iter()
        .filter_map(|path| ScannedFile::from_path(root, path))
        .collect();

    debug!(
        root = %root.display(),
        discovered = total,
        usable = files.len(),
        "Walked course directory"
    );

    Ok(files)
}
