use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for foldpack operations
pub type Result<T> = std::result::Result<T, FoldpackError>;

/// Unified error type for all foldpack operations
#[derive(Debug, Error)]
pub enum FoldpackError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // Builder errors
    #[error("Path too long: {path} is {length} bytes (max {max})")]
    PathTooLong {
        path: String,
        length: usize,
        max: usize,
    },

    #[error("Too many files: archive holds at most {max} entries")]
    TooManyFiles { max: usize },

    #[error("Invalid length: {0}")]
    Length(String),

    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    // Archive errors
    #[error("Invalid archive format: {0}")]
    Format(String),

    #[error("Compression failed: {0}")]
    Compression(String),

    #[error("Entry index {index} out of range (archive has {count} entries)")]
    IndexOutOfRange { index: usize, count: usize },

    // Extraction errors
    #[error("Output directory already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Refusing to extract unsafe path: {0}")]
    UnsafePath(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("TOML error: {0}")]
    Toml(String),
}

impl FoldpackError {
    /// Shorthand for a malformed-archive error
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        FoldpackError::Format(msg.into())
    }
}

impl From<toml::de::Error> for FoldpackError {
    fn from(err: toml::de::Error) -> Self {
        FoldpackError::Toml(err.to_string())
    }
}
