//! Error handling and custom error types
//!
//! Provides unified error handling across the harness using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Breed {0} is not in the catalog")]
    UnknownBreed(String),

    #[error("Schema mismatch: {0}")]
    Schema(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("{service} API error (status {status}): {body}")]
    Transport {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid image URL: {0}")]
    InvalidImageUrl(String),
}

pub type Result<T> = std::result::Result<T, Error>;
