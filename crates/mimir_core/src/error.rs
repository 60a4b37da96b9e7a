//! Error types for Mimir.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MimirError {
    #[error("Knowledge base error: {0}")]
    Knowledge(String),

    #[error("Transcript error: {0}")]
    Transcript(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
