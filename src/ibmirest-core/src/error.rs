use std::path::PathBuf;

/// Errors raised by local processing: configuration, table conversion,
/// JSON extraction and file export.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON to table conversion failed: {0}")]
    Conversion(String),

    #[error("Invalid path expression '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Path '{0}' not found in JSON document")]
    PathNotFound(String),

    #[error("Value at '{path}' is not a valid {expected}")]
    TypeMismatch { path: String, expected: &'static str },

    #[error("File already exists: {}", .0.display())]
    FileExists(PathBuf),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
