//! Capabilities the course library needs from its host.
//!
//! - [`FileSystemAccess`](storage::FileSystemAccess): probe course roots and list their files
//! - [`Clock`](time::Clock): timestamps for course rows and scan jobs
//! - [`LoggerSink`](time::LoggerSink): optional mirror of engine log events
//!
//! Implementations are shared between the scan worker, the availability sweep
//! and request handlers, hence the `Send + Sync` bounds. Host failures are
//! reported as [`BridgeError`].

pub mod error;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use storage::FileSystemAccess;
pub use time::{Clock, ConsoleLogger, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
