//! FEC pipeline for one sub-frame
//!
//! When the LDPC code has more data positions than a frame carries, the
//! spare positions are filled with known `1` bits on transmit and never
//! sent. The receiver reinserts them as near-certain LLRs, which makes the
//! shortened code stronger than the full one.

use crate::{Result, SessionError};
use hfdv_core::buffer::Complex;
use hfdv_frame::geometry::FrameGeometry;
use hfdv_frame::ldpc::{DecodeOutcome, FecDecoder, FecEncoder, LdpcCode};
use hfdv_frame::qpsk::symbols_to_llrs;

/// LLR given to the known padding bits (certainly 1)
pub const PADDING_LLR: f64 = -100.0;

#[derive(Debug, Clone)]
pub struct FecPipeline {
    code: LdpcCode,
    geometry: FrameGeometry,
}

impl FecPipeline {
    pub fn new(code: LdpcCode, geometry: FrameGeometry) -> Result<Self> {
        if code.data_bits() != geometry.ldpc_data_bits_per_frame
            || code.parity_bits() != geometry.parity_bits
        {
            return Err(SessionError::InvalidConfig {
                msg: format!(
                    "LDPC code ({} data, {} parity) does not match frame geometry ({} data, {} parity)",
                    code.data_bits(),
                    code.parity_bits(),
                    geometry.ldpc_data_bits_per_frame,
                    geometry.parity_bits
                ),
            });
        }
        Ok(Self { code, geometry })
    }

    pub fn parity_checks(&self) -> usize {
        self.code.parity_checks()
    }

    /// Encode one frame of payload bits into the bits actually transmitted:
    /// the payload followed by all parity bits.
    pub fn encode_frame(&self, payload: &[u8]) -> Vec<u8> {
        let g = &self.geometry;
        let mut data = vec![1u8; g.ldpc_data_bits_per_frame];
        for (d, &p) in data.iter_mut().zip(payload.iter().take(g.data_bits_per_frame)) {
            *d = p & 1;
        }
        if payload.len() < g.data_bits_per_frame {
            data[payload.len()..g.data_bits_per_frame].fill(0);
        }

        let codeword = self.code.encode(&data);
        let mut coded = Vec::with_capacity(g.coded_bits_per_frame);
        coded.extend_from_slice(&codeword[..g.data_bits_per_frame]);
        coded.extend_from_slice(&codeword[g.ldpc_data_bits_per_frame..]);
        coded
    }

    /// Expand received LLRs to the full codeword, reinserting padding
    pub fn pad_llrs(&self, llrs: &[f64]) -> Vec<f64> {
        let g = &self.geometry;
        let unused = g.unused_data_bits();
        let mut full = Vec::with_capacity(g.ldpc_coded_bits_per_frame());
        let llr = |i: usize| llrs.get(i).copied().unwrap_or(0.0);

        full.extend((0..g.data_bits_per_frame).map(llr));
        full.extend(std::iter::repeat(PADDING_LLR).take(unused));
        full.extend((g.ldpc_data_bits_per_frame..g.ldpc_coded_bits_per_frame()).map(|i| llr(i - unused)));
        full
    }

    /// Decode one sub-frame of symbols and amplitudes.
    ///
    /// The returned data bits are trimmed to the frame payload.
    pub fn decode_subframe(
        &self,
        symbols: &[Complex],
        amps: &[f64],
        esno: f64,
        mean_amp: f64,
    ) -> DecodeOutcome {
        let llrs = symbols_to_llrs(symbols, amps, esno, mean_amp);
        let mut outcome = if self.geometry.unused_data_bits() == 0 {
            self.code.decode(&llrs)
        } else {
            self.code.decode(&self.pad_llrs(&llrs))
        };
        outcome.data_bits.truncate(self.geometry.data_bits_per_frame);
        outcome
    }
}
