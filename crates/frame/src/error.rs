//! Error types for HFDV Frame

use thiserror::Error;

/// Frame processing error types
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Invalid frame format: {msg}")]
    InvalidFormat { msg: String },

    #[error("Frame size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Frame geometry mismatch: {uw_bits} UW + {text_bits} text + {coded_bits} coded bits != {frame_bits} bits per frame")]
    GeometryMismatch {
        uw_bits: usize,
        text_bits: usize,
        coded_bits: usize,
        frame_bits: usize,
    },

    #[error("Invalid FEC parameters: {msg}")]
    InvalidFecParameters { msg: String },

    #[error("Interleaving error: {msg}")]
    InterleavingError { msg: String },

    #[error("Core error: {0}")]
    Core(#[from] hfdv_core::CoreError),
}

/// Result type for HFDV Frame operations
pub type Result<T> = std::result::Result<T, FrameError>;
