//! HFDV Frame - framing, FEC, and interleaving
//!
//! This crate fixes the physical frame layout, provides the LDPC code
//! used to protect payload bits, the golden-prime interleaver spread across
//! several physical frames, QPSK soft demapping to log-likelihood ratios,
//! and the rolling window of received symbols the receiver deinterleaves.

pub mod geometry;
pub mod ldpc;
pub mod interleave;
pub mod qpsk;
pub mod frame;
pub mod window;
pub mod error;

pub use error::{FrameError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        geometry::{FrameGeometry, BITS_PER_SYMBOL},
        ldpc::{DecodeOutcome, FecDecoder, FecEncoder, LdpcCode},
        interleave::{GoldenPrimeInterleaver, Interleaver},
        qpsk::{qpsk_demod, qpsk_map_bits, symbols_to_bits, symbols_to_llrs},
        frame::{FrameLayout, ModemFrame},
        window::InterleaveWindow,
        error::{FrameError, Result},
    };
}
