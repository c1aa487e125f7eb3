use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("filesystem error: {0}")]
    Fs(#[from] std::io::Error),

    #[error("state serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("blob {0} not found")]
    BlobNotFound(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
