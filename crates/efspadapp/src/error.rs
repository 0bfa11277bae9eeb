use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PadError {
    #[error("Cannot measure {}: {source}", .path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot modify {}: {source}", .path.display())]
    Mutation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{phase} phase exceeded its {}s budget", .budget.as_secs())]
    Timeout {
        phase: &'static str,
        budget: Duration,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl PadError {
    pub fn probe(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PadError::Probe {
            path: path.into(),
            source,
        }
    }

    pub fn mutation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PadError::Mutation {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PadError>;
