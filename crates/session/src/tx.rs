//! Transmit frame assembler

use crate::config::ModeConfig;
use crate::fec::FecPipeline;
use crate::text_io::TextSource;
use crate::{Result, SessionError};
use hfdv_codecs::varicode::VaricodeEncoder;
use hfdv_core::bits::{unpack_bits, TestFrameGenerator};
use hfdv_core::buffer::Complex;
use hfdv_core::clip::{clip_peaks, scale_samples};
use hfdv_frame::frame::FrameLayout;
use hfdv_frame::geometry::FrameGeometry;
use hfdv_frame::interleave::GoldenPrimeInterleaver;
use hfdv_frame::qpsk::qpsk_map_bits;
use hfdv_modem::common::Modulator;
use hfdv_modem::ofdm::OfdmModulator;
use tracing::{debug, info};

/// Builds `interleave_frames` physical frames per call from payload bits,
/// the unique word and text side-channel bits.
pub struct Transmitter<M: Modulator = OfdmModulator> {
    config: ModeConfig,
    geometry: FrameGeometry,
    fec: FecPipeline,
    interleaver: GoldenPrimeInterleaver,
    layout: FrameLayout,
    modulator: M,
    text_encoder: VaricodeEncoder,
    text_source: Option<Box<dyn TextSource>>,
    test_payload: Vec<u8>,
    batch: Vec<Complex>,
    interleaved: Vec<Complex>,
}

impl Transmitter<OfdmModulator> {
    /// Create a transmitter using the reference OFDM modulator
    pub fn new(config: ModeConfig) -> Result<Self> {
        let modulator = OfdmModulator::new(config.ofdm_config()?)?;
        Self::with_modulator(config, modulator)
    }
}

impl<M: Modulator> Transmitter<M> {
    pub fn with_modulator(config: ModeConfig, modulator: M) -> Result<Self> {
        config.validate()?;
        let geometry = config.geometry()?;
        if modulator.symbols_per_frame() != geometry.symbols_per_frame() {
            return Err(SessionError::ModemMismatch {
                expected: geometry.symbols_per_frame(),
                actual: modulator.symbols_per_frame(),
            });
        }

        let fec = FecPipeline::new(config.ldpc_code()?, geometry)?;
        let interleaver = GoldenPrimeInterleaver::new(geometry.window_symbols())?;
        let window = geometry.window_symbols();

        info!(
            "Transmitter: {} frames of {} bits, {} payload bits per call",
            geometry.interleave_frames,
            geometry.bits_per_frame,
            geometry.payload_bits_per_batch()
        );

        Ok(Self {
            test_payload: TestFrameGenerator::payload(geometry.data_bits_per_frame),
            layout: FrameLayout::new(geometry),
            config,
            geometry,
            fec,
            interleaver,
            modulator,
            text_encoder: VaricodeEncoder::new(),
            text_source: None,
            batch: vec![Complex::ZERO; window],
            interleaved: vec![Complex::ZERO; window],
        })
    }

    /// Install the character source for the text channel
    pub fn set_text_source<S: TextSource + 'static>(&mut self, source: S) {
        self.text_source = Some(Box::new(source));
    }

    /// Stop sending text; slots already encoded still go out
    pub fn clear_text_source(&mut self) {
        self.text_source = None;
    }

    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    /// Payload bits consumed by each [`transmit`](Self::transmit) call
    pub fn payload_bits_per_call(&self) -> usize {
        self.geometry.payload_bits_per_batch()
    }

    /// Packed payload bytes consumed by each call
    pub fn payload_bytes_per_call(&self) -> usize {
        self.payload_bits_per_call().div_ceil(8)
    }

    /// Samples produced by each call
    pub fn samples_per_call(&self) -> usize {
        self.geometry.interleave_frames * self.modulator.samples_per_frame()
    }

    /// Transmit one batch from MSB-first packed payload bytes
    pub fn transmit(&mut self, payload: &[u8]) -> Vec<Complex> {
        let bits = unpack_bits(payload, self.payload_bits_per_call());
        self.transmit_bits(&bits)
    }

    /// Transmit one batch from one-bit-per-byte payload.
    ///
    /// In test-frame mode the payload is ignored and the known test
    /// pattern is sent in every frame.
    pub fn transmit_bits(&mut self, payload: &[u8]) -> Vec<Complex> {
        let g = self.geometry;
        let depth = g.interleave_frames;

        let mut text_bits = vec![0u8; g.text_bits_per_batch()];
        let source = &mut self.text_source;
        self.text_encoder
            .fill(&mut text_bits, || source.as_mut().and_then(|s| s.next_char()));

        let cs = g.coded_symbols_per_frame;
        for j in 0..depth {
            let frame_payload = if self.config.test_frames {
                &self.test_payload[..]
            } else {
                let start = (j * g.data_bits_per_frame).min(payload.len());
                let end = ((j + 1) * g.data_bits_per_frame).min(payload.len());
                &payload[start..end]
            };
            let coded = self.fec.encode_frame(frame_payload);
            for (dst, sym) in self.batch[j * cs..(j + 1) * cs].iter_mut().zip(qpsk_map_bits(&coded)) {
                *dst = sym;
            }
        }

        self.interleaver.interleave_into(&self.batch, &mut self.interleaved);

        let mut samples = Vec::with_capacity(self.samples_per_call());
        for j in 0..depth {
            let text = &text_bits[j * g.text_bits..(j + 1) * g.text_bits];
            let symbols = self.layout.assemble(
                &self.config.unique_word,
                text,
                &self.interleaved[j * cs..(j + 1) * cs],
            );
            samples.extend(self.modulator.modulate_frame(&symbols));
        }

        scale_samples(&mut samples, self.config.amp_scale);
        if self.config.clip {
            let clipped = clip_peaks(&mut samples, self.config.clip_level);
            if clipped > 0 {
                debug!("Clipped {} of {} samples", clipped, samples.len());
            }
        }

        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_length() {
        let config = ModeConfig {
            interleave_frames: 2,
            ..ModeConfig::default()
        };
        let mut tx = Transmitter::new(config).unwrap();
        assert_eq!(tx.payload_bits_per_call(), 624);
        assert_eq!(tx.payload_bytes_per_call(), 78);
        assert_eq!(tx.samples_per_call(), 1280);

        let samples = tx.transmit(&vec![0u8; 78]);
        assert_eq!(samples.len(), 1280);
        assert!(samples.iter().all(|s| s.magnitude().is_finite()));
    }

    #[test]
    fn test_clipping_limits_peaks() {
        let config = ModeConfig {
            clip: true,
            clip_level: 0.2,
            ..ModeConfig::default()
        };
        let mut tx = Transmitter::new(config).unwrap();
        let samples = tx.transmit(&[0xA5; 39]);
        assert!(samples.iter().all(|s| s.magnitude() <= 0.2 + 1e-12));
    }

    #[test]
    fn test_text_source_called_only_when_idle() {
        use std::cell::Cell;
        use std::rc::Rc;

        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut tx = Transmitter::new(ModeConfig::default()).unwrap();
        tx.set_text_source(move || {
            counter.set(counter.get() + 1);
            Some('e')
        });

        // 'e' is "11" plus "00", exactly one frame of 4 text bits
        for _ in 0..3 {
            tx.transmit(&[0; 39]);
        }
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_test_frames_ignore_payload() {
        let config = ModeConfig {
            test_frames: true,
            ..ModeConfig::default()
        };
        let mut a = Transmitter::new(config.clone()).unwrap();
        let mut b = Transmitter::new(config).unwrap();
        assert_eq!(a.transmit(&[0x00; 39]), b.transmit(&[0xFF; 39]));
    }
}
