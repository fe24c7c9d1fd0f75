//! Fixed frame sizes derived from the mode configuration

use crate::{FrameError, Result};
use serde::{Deserialize, Serialize};

/// QPSK carries two bits per symbol
pub const BITS_PER_SYMBOL: usize = 2;

/// Immutable per-session frame sizes.
///
/// A physical frame carries `uw_bits` unique-word bits, `text_bits` text
/// side-channel bits and `coded_bits_per_frame` LDPC coded bits, in that
/// order. `interleave_frames` physical frames are interleaved together and
/// decoded as one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub bits_per_frame: usize,
    pub data_bits_per_frame: usize,
    pub ldpc_data_bits_per_frame: usize,
    pub parity_bits: usize,
    pub coded_bits_per_frame: usize,
    pub coded_symbols_per_frame: usize,
    pub uw_bits: usize,
    pub text_bits: usize,
    pub interleave_frames: usize,
}

impl FrameGeometry {
    /// Build and validate a geometry
    pub fn new(
        bits_per_frame: usize,
        data_bits_per_frame: usize,
        ldpc_data_bits_per_frame: usize,
        parity_bits: usize,
        uw_bits: usize,
        text_bits: usize,
        interleave_frames: usize,
    ) -> Result<Self> {
        if interleave_frames == 0 {
            return Err(FrameError::InvalidFormat {
                msg: "At least one frame must be interleaved".to_string(),
            });
        }

        if data_bits_per_frame == 0 || parity_bits == 0 {
            return Err(FrameError::InvalidFecParameters {
                msg: format!(
                    "Data and parity bits must be non-zero: data={}, parity={}",
                    data_bits_per_frame, parity_bits
                ),
            });
        }

        if ldpc_data_bits_per_frame < data_bits_per_frame {
            return Err(FrameError::InvalidFecParameters {
                msg: format!(
                    "Code carries {} data bits, frame needs {}",
                    ldpc_data_bits_per_frame, data_bits_per_frame
                ),
            });
        }

        let coded_bits_per_frame = data_bits_per_frame + parity_bits;

        for (name, bits) in [
            ("unique word", uw_bits),
            ("text", text_bits),
            ("coded", coded_bits_per_frame),
        ] {
            if bits % BITS_PER_SYMBOL != 0 {
                return Err(FrameError::InvalidFormat {
                    msg: format!("{} bit count {} is not a whole number of symbols", name, bits),
                });
            }
        }

        if uw_bits + text_bits + coded_bits_per_frame != bits_per_frame {
            return Err(FrameError::GeometryMismatch {
                uw_bits,
                text_bits,
                coded_bits: coded_bits_per_frame,
                frame_bits: bits_per_frame,
            });
        }

        Ok(Self {
            bits_per_frame,
            data_bits_per_frame,
            ldpc_data_bits_per_frame,
            parity_bits,
            coded_bits_per_frame,
            coded_symbols_per_frame: coded_bits_per_frame / BITS_PER_SYMBOL,
            uw_bits,
            text_bits,
            interleave_frames,
        })
    }

    /// Data positions of the code that are filled with known bits
    pub fn unused_data_bits(&self) -> usize {
        self.ldpc_data_bits_per_frame - self.data_bits_per_frame
    }

    /// Full LDPC codeword length, including unused data positions
    pub fn ldpc_coded_bits_per_frame(&self) -> usize {
        self.ldpc_data_bits_per_frame + self.parity_bits
    }

    pub fn symbols_per_frame(&self) -> usize {
        self.bits_per_frame / BITS_PER_SYMBOL
    }

    pub fn uw_symbols(&self) -> usize {
        self.uw_bits / BITS_PER_SYMBOL
    }

    pub fn text_symbols(&self) -> usize {
        self.text_bits / BITS_PER_SYMBOL
    }

    /// Symbols held by the interleave window
    pub fn window_symbols(&self) -> usize {
        self.interleave_frames * self.coded_symbols_per_frame
    }

    /// Payload bits consumed by one transmit call
    pub fn payload_bits_per_batch(&self) -> usize {
        self.interleave_frames * self.data_bits_per_frame
    }

    /// Text bit slots filled by one transmit call
    pub fn text_bits_per_batch(&self) -> usize {
        self.interleave_frames * self.text_bits
    }

    /// Whether the geometry invariant holds
    pub fn is_consistent(&self) -> bool {
        self.uw_bits + self.text_bits + self.coded_bits_per_frame == self.bits_per_frame
    }
}
