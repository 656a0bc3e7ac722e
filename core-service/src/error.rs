use thiserror::Error;

/// Everything a [`CoreService`](crate::CoreService) call can fail with.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),

    #[error("Scan error: {0}")]
    Scan(#[from] core_scan::ScanError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
