//! Process-wide setup shared by the library crates: the validated
//! [`CoreConfig`](config::CoreConfig) and `tracing` initialisation.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
