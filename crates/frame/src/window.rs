//! Sliding window of received payload symbols
//!
//! Holds the coded payload symbols and amplitudes of the most recent
//! `interleave_frames` physical frames, oldest first.

use crate::geometry::FrameGeometry;
use crate::interleave::GoldenPrimeInterleaver;
use hfdv_core::buffer::Complex;

#[derive(Debug, Clone)]
pub struct InterleaveWindow {
    symbols: Vec<Complex>,
    amps: Vec<f64>,
    frame_symbols: usize,
}

impl InterleaveWindow {
    pub fn new(geometry: &FrameGeometry) -> Self {
        let len = geometry.window_symbols();
        Self {
            symbols: vec![Complex::ZERO; len],
            amps: vec![0.0; len],
            frame_symbols: geometry.coded_symbols_per_frame,
        }
    }

    /// Shift out the oldest frame and append the newest one.
    ///
    /// Input shorter than one frame is zero filled, longer input is truncated.
    pub fn push_frame(&mut self, symbols: &[Complex], amps: &[f64]) {
        let n = self.frame_symbols;
        let tail = self.symbols.len() - n;

        self.symbols.copy_within(n.., 0);
        self.amps.copy_within(n.., 0);

        for i in 0..n {
            self.symbols[tail + i] = symbols.get(i).copied().unwrap_or(Complex::ZERO);
            self.amps[tail + i] = amps.get(i).copied().unwrap_or(0.0);
        }
    }

    /// Deinterleave the whole window into the output buffers
    pub fn deinterleaved(
        &self,
        interleaver: &GoldenPrimeInterleaver,
        out_symbols: &mut [Complex],
        out_amps: &mut [f64],
    ) {
        interleaver.deinterleave_into(&self.symbols, out_symbols);
        interleaver.deinterleave_into(&self.amps, out_amps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interleave::Interleaver;
    use quickcheck_macros::quickcheck;

    fn geometry(depth: usize) -> FrameGeometry {
        FrameGeometry::new(36, 8, 8, 8, 16, 4, depth).unwrap()
    }

    /// Symbols and amplitudes of frame `index` (0 = oldest)
    fn frame(window: &InterleaveWindow, index: usize) -> (&[Complex], &[f64]) {
        let start = index * window.frame_symbols;
        let end = start + window.frame_symbols;
        (&window.symbols[start..end], &window.amps[start..end])
    }

    fn frame_of(value: f64) -> Vec<Complex> {
        vec![Complex::new(value, 0.0); 8]
    }

    #[test]
    fn test_push_shifts_oldest_out() {
        let mut window = InterleaveWindow::new(&geometry(3));
        for v in 1..=4 {
            window.push_frame(&frame_of(v as f64), &[v as f64; 8]);
        }

        assert_eq!(frame(&window, 0).0[0].real, 2.0);
        assert_eq!(frame(&window, 1).0[0].real, 3.0);
        assert_eq!(frame(&window, 2).0[0].real, 4.0);
        assert_eq!(frame(&window, 2).1[7], 4.0);
    }

    #[test]
    fn test_short_frame_zero_filled() {
        let mut window = InterleaveWindow::new(&geometry(1));
        window.push_frame(&frame_of(1.0)[..3], &[1.0; 3]);
        let (symbols, amps) = frame(&window, 0);
        assert_eq!(symbols[2].real, 1.0);
        assert_eq!(symbols[3], Complex::ZERO);
        assert_eq!(amps[7], 0.0);
    }

    #[test]
    fn test_deinterleaved_window() {
        let g = geometry(2);
        let interleaver = GoldenPrimeInterleaver::new(g.window_symbols()).unwrap();
        let data: Vec<Complex> = (0..16).map(|i| Complex::new(i as f64, 0.0)).collect();
        let amps: Vec<f64> = (0..16).map(|i| i as f64).collect();
        let tx = interleaver.interleave(&data).unwrap();
        let tx_amps = interleaver.interleave(&amps).unwrap();

        let mut window = InterleaveWindow::new(&g);
        window.push_frame(&tx[..8], &tx_amps[..8]);
        window.push_frame(&tx[8..], &tx_amps[8..]);

        let mut out = vec![Complex::ZERO; 16];
        let mut out_amps = vec![0.0; 16];
        window.deinterleaved(&interleaver, &mut out, &mut out_amps);
        assert_eq!(out, data);
        assert_eq!(out_amps, amps);
    }

    #[quickcheck]
    fn prop_window_length_is_fixed(depth: u8, lens: Vec<u8>) -> bool {
        let depth = (depth as usize % 8) + 1;
        let g = geometry(depth);
        let mut window = InterleaveWindow::new(&g);
        for len in lens {
            let n = len as usize % 20;
            window.push_frame(&vec![Complex::ONE; n], &vec![1.0; n]);
            let len = window.symbols.len();
            if len != depth * g.coded_symbols_per_frame || window.amps.len() != len {
                return false;
            }
        }
        true
    }
}
