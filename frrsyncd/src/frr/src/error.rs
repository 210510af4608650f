use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid address {0}")]
    InvalidAddress(String),

    #[error("failed to apply configuration: {0}")]
    Apply(String),

    #[error("std::io::Error")]
    StdIo(#[from] std::io::Error),

    #[error("SerializationError: {0}")]
    Serialization(#[source] serde_json::Error),
}
