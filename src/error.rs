// Error types for the converter.

use std::path::PathBuf;
use thiserror::Error;

// Fatal errors. Literal-level problems never show up here; they fall back
// to a safe rendering and are only counted in the summary.
#[derive(Error, Debug)]
pub enum ConvertError {
    // Reading the dump or writing the script failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Profile file is not valid JSON for a dialect profile
    #[error("Invalid profile {path}: {source}")]
    Profile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // Summary report could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}

// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
