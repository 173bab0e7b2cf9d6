use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to the command line.
///
/// Rewrite rules never fail; only reading configuration and reading or
/// writing files can.
#[derive(Error, Debug)]
pub enum RefactorError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no such path: {}", .0.display())]
    MissingPath(PathBuf),
}

impl RefactorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RefactorError>;
