//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop and server hosts
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `FileSystemAccess` using `tokio::fs` for probes and `walkdir` (on the
//!   blocking pool) for course directory listings
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::TokioFileSystem;
//! use bridge_traits::FileSystemAccess;
//!
//! #[tokio::main]
//! async fn main() {
//!     let fs = TokioFileSystem::new();
//!     let files = fs.list_files_flat("/courses/rust-101".as_ref(), 2).await.unwrap();
//! }
//! ```

mod filesystem;

pub use filesystem::TokioFileSystem;
