use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity_type} {id} does not exist")]
    NotFound { entity_type: String, id: String },

    /// A row failed validation before it reached SQLite
    #[error("Invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("Schema migration failed: {0}")]
    Migration(String),
}

pub type Result<T> = std::result::Result<T, LibraryError>;
