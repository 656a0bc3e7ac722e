use thiserror::Error;

/// Startup errors raised while assembling a [`CoreConfig`](crate::config::CoreConfig).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No {capability} provided: {message}")]
    CapabilityMissing { capability: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
