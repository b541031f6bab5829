use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored timestamp '{0}' is not valid")]
    InvalidTimestamp(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
