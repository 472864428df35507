//! Error type shared by the library modules.
//!
//! Nothing inside a fix run is fatal: the pipeline catches these, logs them
//! through the run log and keeps going. The binary only turns configuration
//! errors into a non-zero exit.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebfixError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot walk {}: {message}", path.display())]
    Walk { path: PathBuf, message: String },

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("metrics source failed: {0}")]
    Source(String),

    #[error("responder failed: {0}")]
    Responder(String),
}

impl WebfixError {
    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WebfixError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, WebfixError>;
