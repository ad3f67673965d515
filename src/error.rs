use thiserror::Error;

/// Failures raised by the persistence layer. Callers treat these as opaque
/// internal errors; nothing here is retried.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Corrupt row in {table}: {reason}")]
    Corrupt { table: &'static str, reason: String },
}

/// Errors surfaced by journal operations
#[derive(Error, Debug)]
pub enum BreathError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl BreathError {
    /// Process exit code used by the CLI for each error kind
    pub fn exit_code(&self) -> i32 {
        match self {
            BreathError::Storage(_) => 1,
            BreathError::Validation(_) => 2,
            BreathError::NotFound { .. } => 3,
            BreathError::InvalidSession(_) => 4,
        }
    }
}

pub type Result<T, E = BreathError> = std::result::Result<T, E>;
