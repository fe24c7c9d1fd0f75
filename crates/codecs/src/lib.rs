//! HFDV Codecs - text side-channel coding
//!
//! Every physical frame carries a handful of unprotected text bits. Text is
//! sent one character at a time using Varicode, whose codewords never contain
//! two consecutive zeros so `00` marks the character boundary.

pub mod varicode;
pub mod error;

pub use error::{CodecError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        varicode::{Varicode, VaricodeDecoder, VaricodeEncoder},
        error::{CodecError, Result},
    };
}
