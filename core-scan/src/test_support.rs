//! Shared fakes for unit tests

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::FileSystemAccess;
use mockall::mock;
use std::path::{Path, PathBuf};

mock! {
    pub Fs {}

    #[async_trait]
    impl FileSystemAccess for Fs {
        async fn exists(&self, path: &Path) -> BridgeResult<bool>;
        async fn list_files_flat(&self, root: &Path, max_depth: usize) -> BridgeResult<Vec<PathBuf>>;
    }
}
