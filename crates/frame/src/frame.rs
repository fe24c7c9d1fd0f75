//! Physical modem frame layout
//!
//! A physical frame is `symbols_per_frame` QPSK symbols: the unique word
//! first, then the text side-channel bits, then the coded payload symbols.
//! Unique word and text bits are not FEC protected and are hard decided on
//! receive; payload symbols are passed on with their reliabilities.

use crate::geometry::FrameGeometry;
use crate::qpsk::{qpsk_map_bits, symbols_to_bits};
use hfdv_core::buffer::Complex;

/// One received physical frame, split into its fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModemFrame {
    pub uw_bits: Vec<u8>,
    pub text_bits: Vec<u8>,
    pub payload_symbols: Vec<Complex>,
    pub payload_amps: Vec<f64>,
}

/// Assembles and disassembles physical frames for one geometry
#[derive(Debug, Clone)]
pub struct FrameLayout {
    geometry: FrameGeometry,
}

impl FrameLayout {
    pub fn new(geometry: FrameGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    /// Build the symbol sequence of one physical frame.
    ///
    /// Short inputs are zero filled and long inputs truncated so the frame
    /// always has exactly `symbols_per_frame` symbols.
    pub fn assemble(&self, uw_bits: &[u8], text_bits: &[u8], payload: &[Complex]) -> Vec<Complex> {
        let g = &self.geometry;
        let mut symbols = Vec::with_capacity(g.symbols_per_frame());

        let mut uw = qpsk_map_bits(&fit(uw_bits, g.uw_bits, 0));
        let mut text = qpsk_map_bits(&fit(text_bits, g.text_bits, 0));
        uw.truncate(g.uw_symbols());
        text.truncate(g.text_symbols());
        symbols.extend(uw);
        symbols.extend(text);
        symbols.extend(fit(payload, g.coded_symbols_per_frame, Complex::ZERO));

        symbols
    }

    /// Split demodulated symbols and amplitudes into frame fields
    pub fn disassemble(&self, symbols: &[Complex], amps: &[f64]) -> ModemFrame {
        let g = &self.geometry;
        let symbols = fit(symbols, g.symbols_per_frame(), Complex::ZERO);
        let amps = fit(amps, g.symbols_per_frame(), 0.0);

        let text_start = g.uw_symbols();
        let payload_start = text_start + g.text_symbols();

        ModemFrame {
            uw_bits: symbols_to_bits(&symbols[..text_start]),
            text_bits: symbols_to_bits(&symbols[text_start..payload_start]),
            payload_symbols: symbols[payload_start..].to_vec(),
            payload_amps: amps[payload_start..].to_vec(),
        }
    }
}

fn fit<T: Copy>(data: &[T], len: usize, fill: T) -> Vec<T> {
    let mut v: Vec<T> = data.iter().copied().take(len).collect();
    v.resize(len, fill);
    v
}
