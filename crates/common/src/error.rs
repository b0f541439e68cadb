//! Error types for AutoTest

use thiserror::Error;

/// Result type alias using AutoTest Error
pub type Result<T> = std::result::Result<T, Error>;

/// AutoTest storage and model errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Report error: {0}")]
    Report(#[from] csv::Error),

    #[error("Invalid site name: {0:?}")]
    InvalidSiteName(String),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Corrupt test-case file {path}: {reason}")]
    CorruptProfile { path: String, reason: String },

    #[error("Corrupt report file {path}: {reason}")]
    CorruptReport { path: String, reason: String },
}
