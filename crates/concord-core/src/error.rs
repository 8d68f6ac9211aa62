use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid desired set: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
