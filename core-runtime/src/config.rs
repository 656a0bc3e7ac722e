//! Startup configuration.
//!
//! [`CoreConfig::builder`] collects the database path, the host file system
//! (injected as `TokioFileSystem` under `desktop-shims`), an optional clock and
//! the [`ScanSettings`]. `build()` validates everything up front so a bad depth or
//! an empty card list fails at startup rather than on the first scan.
//!
//! ```ignore
//! let config = CoreConfig::builder()
//!     .database_path("/var/lib/courses/library.db")
//!     .scan_settings(
//!         ScanSettings::default().with_availability_sweep_interval(Some(Duration::from_secs(60))),
//!     )
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{Clock, FileSystemAccess, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Deepest directory level the scanner descends into (root files + one chapter level).
pub const MAX_SCAN_DEPTH: usize = 2;

/// Image extensions accepted for a course card when none are configured.
pub const DEFAULT_CARD_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "tiff"];

/// Settings for the scan engine and the availability sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    /// How many directory levels below a course root are walked (1 or 2)
    pub max_depth: usize,

    /// Period of the background availability sweep; `None` disables it
    pub availability_sweep_interval: Option<Duration>,

    /// Lower-case image extensions recognised for `card.<ext>` files
    pub card_extensions: Vec<String>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_depth: MAX_SCAN_DEPTH,
            availability_sweep_interval: Some(Duration::from_secs(300)),
            card_extensions: DEFAULT_CARD_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl ScanSettings {
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_availability_sweep_interval(mut self, interval: Option<Duration>) -> Self {
        self.availability_sweep_interval = interval;
        self
    }

    pub fn with_card_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.card_extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Validates the scan settings.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 || self.max_depth > MAX_SCAN_DEPTH {
            return Err(Error::Config(format!(
                "Scan depth must be between 1 and {}, got {}",
                MAX_SCAN_DEPTH, self.max_depth
            )));
        }

        if self.card_extensions.is_empty() {
            return Err(Error::Config(
                "At least one card image extension is required".to_string(),
            ));
        }

        if let Some(interval) = self.availability_sweep_interval {
            if interval.is_zero() {
                return Err(Error::Config(
                    "Availability sweep interval must be greater than zero. \
                     Use None to disable the sweep."
                        .to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[derive(Clone)]
pub struct CoreConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// File system access abstraction
    pub file_system: Arc<dyn FileSystemAccess>,

    /// Time source for course timestamps
    pub clock: Arc<dyn Clock>,

    /// Scan engine settings
    pub scan: ScanSettings,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("database_path", &self.database_path)
            .field("file_system", &"FileSystemAccess { ... }")
            .field("clock", &"Clock { ... }")
            .field("scan", &self.scan)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }

        self.scan.validate()
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_file_system() -> Result<Arc<dyn FileSystemAccess>> {
    use bridge_desktop::TokioFileSystem;

    Ok(Arc::new(TokioFileSystem::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_file_system() -> Result<Arc<dyn FileSystemAccess>> {
    Err(Error::CapabilityMissing {
        capability: "FileSystemAccess".to_string(),
        message: "FileSystemAccess implementation is required to walk course directories. \
                 Desktop: enable the 'desktop-shims' feature to use TokioFileSystem. \
                 Other hosts: inject an adapter with .file_system()."
            .to_string(),
    })
}

#[derive(Default)]
pub struct CoreConfigBuilder {
    database_path: Option<PathBuf>,
    file_system: Option<Arc<dyn FileSystemAccess>>,
    clock: Option<Arc<dyn Clock>>,
    scan: Option<ScanSettings>,
}

impl CoreConfigBuilder {
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn file_system(mut self, fs: Arc<dyn FileSystemAccess>) -> Self {
        self.file_system = Some(fs);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn scan_settings(mut self, settings: ScanSettings) -> Self {
        self.scan = Some(settings);
        self
    }

    pub fn build(self) -> Result<CoreConfig> {
        let database_path = self.database_path.ok_or_else(|| {
            Error::Config("Database path is required. Use .database_path() to set it.".to_string())
        })?;

        let file_system = match self.file_system {
            Some(fs) => fs,
            None => provide_default_file_system()?,
        };

        let config = CoreConfig {
            database_path,
            file_system,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            scan: self.scan.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};

    struct NullFileSystem;

    #[async_trait]
    impl FileSystemAccess for NullFileSystem {
        async fn exists(&self, _path: &Path) -> bridge_traits::error::Result<bool> {
            Ok(false)
        }

        async fn list_files_flat(
            &self,
            _root: &Path,
            _max_depth: usize,
        ) -> bridge_traits::error::Result<Vec<PathBuf>> {
            Ok(Vec::new())
        }
    }

    fn builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .database_path("/tmp/courses.db")
            .file_system(Arc::new(NullFileSystem))
    }

    #[test]
    fn test_build_with_defaults() {
        let config = builder().build().unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/courses.db"));
        assert_eq!(config.scan.max_depth, 2);
        assert_eq!(
            config.scan.availability_sweep_interval,
            Some(Duration::from_secs(300))
        );
        assert!(config.scan.card_extensions.contains(&"png".to_string()));
    }

    #[test]
    fn test_missing_database_path() {
        let result = CoreConfig::builder()
            .file_system(Arc::new(NullFileSystem))
            .build();

        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("Database path")));
    }

    #[test]
    fn test_empty_database_path() {
        let result = builder().database_path("").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_file_system_without_shims() {
        let result = CoreConfig::builder().database_path("/tmp/courses.db").build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "FileSystemAccess");
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_desktop_shims_inject_file_system() {
        let result = CoreConfig::builder().database_path("/tmp/courses.db").build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_rejects_deep_scan() {
        let result = builder()
            .scan_settings(ScanSettings::default().with_max_depth(3))
            .build();
        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("depth")));

        let result = builder()
            .scan_settings(ScanSettings::default().with_max_depth(0))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_zero_sweep_interval() {
        let result = builder()
            .scan_settings(
                ScanSettings::default().with_availability_sweep_interval(Some(Duration::ZERO)),
            )
            .build();
        assert!(result.is_err());

        let disabled = builder()
            .scan_settings(ScanSettings::default().with_availability_sweep_interval(None))
            .build()
            .unwrap();
        assert_eq!(disabled.scan.availability_sweep_interval, None);
    }

    #[test]
    fn test_card_extensions_are_normalised() {
        let settings = ScanSettings::default().with_card_extensions([".PNG", "Jpg"]);
        assert_eq!(settings.card_extensions, vec!["png", "jpg"]);

        let empty = ScanSettings::default().with_card_extensions(Vec::<String>::new());
        assert!(empty.validate().is_err());
    }
}
