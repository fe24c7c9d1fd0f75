//! Error types for HFDV Codecs

use thiserror::Error;

/// Codec error types
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Character {ch:?} has no Varicode representation")]
    UnsupportedCharacter { ch: char },
}

/// Result type for HFDV codec operations
pub type Result<T> = std::result::Result<T, CodecError>;
