//! Retrieval error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("External search failed: {0}")]
    External(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
