//! Receive statistics

use serde::Serialize;

/// Running bit error totals for a receive session.
///
/// Unique word errors are always counted as raw errors; payload errors are
/// only measurable in test-frame mode where the payload is known.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub frames: u64,
    pub decodes: u64,
    pub total_bits: u64,
    pub total_bit_errors: u64,
    pub total_bits_coded: u64,
    pub total_bit_errors_coded: u64,
}

impl Statistics {
    /// Uncoded bit error rate
    pub fn raw_ber(&self) -> f64 {
        ratio(self.total_bit_errors, self.total_bits)
    }

    /// Bit error rate after FEC
    pub fn coded_ber(&self) -> f64 {
        ratio(self.total_bit_errors_coded, self.total_bits_coded)
    }
}

fn ratio(errors: u64, bits: u64) -> f64 {
    if bits == 0 {
        0.0
    } else {
        errors as f64 / bits as f64
    }
}
