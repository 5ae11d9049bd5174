use std::path::PathBuf;

use thiserror::Error;

/// Agent-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Warehouse(#[from] devpulse_core::WarehouseError),

    #[error(transparent)]
    Metrics(#[from] prometheus::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AgentError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigRead { .. } | Self::ConfigParse { .. } => 2,
            Self::Warehouse(_) => 3,
            Self::Metrics(_) | Self::Io(_) => 10,
        }
    }
}
