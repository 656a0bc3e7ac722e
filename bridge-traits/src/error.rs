use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// Course root (or another probed path) is gone
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("File system operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
