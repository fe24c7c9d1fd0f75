//! Error types for HFDV Session

use std::path::PathBuf;
use thiserror::Error;

/// Session setup error types.
///
/// Only construction and configuration can fail; per-frame transmit and
/// receive calls report degraded conditions through the validity verdict.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid mode configuration: {msg}")]
    InvalidConfig { msg: String },

    #[error("Physical layer carries {actual} symbols per frame, frame geometry needs {expected}")]
    ModemMismatch { expected: usize, actual: usize },

    #[error("Failed to read config file {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file {path:?}: {source}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Frame error: {0}")]
    Frame(#[from] hfdv_frame::FrameError),

    #[error("Modem error: {0}")]
    Modem(#[from] hfdv_modem::ModemError),
}

/// Result type for HFDV Session operations
pub type Result<T> = std::result::Result<T, SessionError>;
