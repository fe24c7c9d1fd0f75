//! HFDV Core - sample types and DSP primitives
//!
//! This crate provides the complex sample type, an FFT wrapper, output
//! amplitude scaling and clipping, and the bit-level helpers shared by
//! the framing and session crates.

pub mod bits;
pub mod buffer;
pub mod clip;
pub mod fft;
pub mod error;

pub use error::{CoreError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        bits::{count_errors, pack_bits, unpack_bits, TestFrameGenerator},
        buffer::Complex,
        clip::{clip_peaks, scale_samples},
        fft::{FftConfig, FftProcessor},
        error::{CoreError, Result},
    };
}
