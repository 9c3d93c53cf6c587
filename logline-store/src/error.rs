use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store not initialized")]
    NotInitialized,

    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
