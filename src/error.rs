//! Error types for orgdeck operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while driving a presentation.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[cfg(feature = "cli")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
