use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("image blob not found: {0}")]
    BlobNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(i64),

    #[error("uuid already exists: {0}")]
    DuplicateUuid(String),

    #[error("email already exists: {0}")]
    DuplicateEmail(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
