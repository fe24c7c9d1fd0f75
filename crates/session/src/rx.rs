//! Receive synchronization and deinterleave engine
//!
//! One [`Receiver::receive`] call consumes one physical frame of samples
//! (`nin` of them). While the physical layer is in trial or synced the frame
//! is demodulated, its payload symbols are pushed into the interleave
//! window, and a full window is FEC decoded whenever the interleaver sync
//! machine says it holds an aligned batch.

use crate::config::ModeConfig;
use crate::fec::FecPipeline;
use crate::interleaver_sync::{InterleaverState, InterleaverSync};
use crate::stats::Statistics;
use crate::text_io::TextSink;
use crate::validity::{decide, DecisionInputs, SquelchPolicy, Validity};
use crate::{Result, SessionError};
use hfdv_codecs::varicode::VaricodeDecoder;
use hfdv_core::bits::{count_errors, pack_bits, TestFrameGenerator};
use hfdv_core::buffer::Complex;
use hfdv_frame::frame::FrameLayout;
use hfdv_frame::geometry::FrameGeometry;
use hfdv_frame::interleave::GoldenPrimeInterleaver;
use hfdv_frame::qpsk::symbols_to_bits;
use hfdv_frame::window::InterleaveWindow;
use hfdv_modem::common::{DemodStats, Demodulator};
use hfdv_modem::ofdm::OfdmDemodulator;
use hfdv_modem::sync::SyncState;
use tracing::{debug, info};

/// Result of one receive call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxOutcome {
    /// Output samples the caller should produce
    pub nout: usize,
    pub validity: Validity,
}

/// Per-call decoder figures, reported in the diagnostic line
#[derive(Debug, Clone, Copy, Default)]
struct FrameReport {
    raw_errors: usize,
    coded_errors: usize,
    iterations: usize,
    parity_checks_passed: usize,
    decoded: bool,
}

pub struct Receiver<D: Demodulator = OfdmDemodulator> {
    config: ModeConfig,
    geometry: FrameGeometry,
    fec: FecPipeline,
    interleaver: GoldenPrimeInterleaver,
    layout: FrameLayout,
    demod: D,
    window: InterleaveWindow,
    deint_symbols: Vec<Complex>,
    deint_amps: Vec<f64>,
    interleaver_sync: InterleaverSync,
    text_decoder: VaricodeDecoder,
    text_sink: Option<Box<dyn TextSink>>,
    squelch: SquelchPolicy,
    esno_override: Option<f64>,
    snr_est_db: f64,
    stats: Statistics,
    decoded_bits: Vec<u8>,
    test_payload: Vec<u8>,
    test_coded_bits: Vec<u8>,
}

impl Receiver<OfdmDemodulator> {
    /// Create a receiver using the reference OFDM demodulator
    pub fn new(config: ModeConfig) -> Result<Self> {
        let demod = OfdmDemodulator::new(config.ofdm_config()?, config.sync_thresholds())?;
        Self::with_demodulator(config, demod)
    }
}

impl<D: Demodulator> Receiver<D> {
    pub fn with_demodulator(config: ModeConfig, demod: D) -> Result<Self> {
        config.validate()?;
        let geometry = config.geometry()?;
        if demod.symbols_per_frame() != geometry.symbols_per_frame() {
            return Err(SessionError::ModemMismatch {
                expected: geometry.symbols_per_frame(),
                actual: demod.symbols_per_frame(),
            });
        }

        let fec = FecPipeline::new(config.ldpc_code()?, geometry)?;
        let interleaver = GoldenPrimeInterleaver::new(geometry.window_symbols())?;
        let test_payload = TestFrameGenerator::payload(geometry.data_bits_per_frame);
        let test_coded_bits = fec.encode_frame(&test_payload);

        Ok(Self {
            squelch: SquelchPolicy {
                enabled: config.squelch_enabled,
                snr_threshold_db: config.squelch_snr_db,
            },
            window: InterleaveWindow::new(&geometry),
            deint_symbols: vec![Complex::ZERO; geometry.window_symbols()],
            deint_amps: vec![0.0; geometry.window_symbols()],
            decoded_bits: vec![0; geometry.payload_bits_per_batch()],
            layout: FrameLayout::new(geometry),
            config,
            geometry,
            fec,
            interleaver,
            demod,
            interleaver_sync: InterleaverSync::new(),
            text_decoder: VaricodeDecoder::new(),
            text_sink: None,
            esno_override: None,
            snr_est_db: 0.0,
            stats: Statistics::default(),
            test_payload,
            test_coded_bits,
        })
    }

    /// Install the sink for decoded text characters
    pub fn set_text_sink<S: TextSink + 'static>(&mut self, sink: S) {
        self.text_sink = Some(Box::new(sink));
    }

    pub fn clear_text_sink(&mut self) {
        self.text_sink = None;
    }

    /// Override the Es/No used for LLRs; `None` restores the configured value
    pub fn set_esno(&mut self, esno: Option<f64>) {
        self.esno_override = esno.filter(|e| *e > 0.0);
    }

    pub fn esno(&self) -> f64 {
        self.esno_override.unwrap_or(self.config.esno)
    }

    pub fn set_squelch(&mut self, enabled: bool) {
        self.squelch.enabled = enabled;
    }

    /// Force the physical and interleaver sync machines back to search
    pub fn unsync(&mut self) {
        debug!("Manual unsync");
        self.demod.unsync();
        self.interleaver_sync = self.interleaver_sync.reset();
    }

    /// Samples expected by the next receive call
    pub fn nin(&self) -> usize {
        self.demod.nin()
    }

    pub fn geometry(&self) -> &FrameGeometry {
        &self.geometry
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn demod_stats(&self) -> DemodStats {
        self.demod.stats()
    }

    pub fn sync_state(&self) -> SyncState {
        self.demod.sync_state()
    }

    pub fn interleaver_state(&self) -> InterleaverState {
        self.interleaver_sync.state
    }

    pub fn snr_est_db(&self) -> f64 {
        self.snr_est_db
    }

    /// Payload bits from the most recent full-window decode, one per byte
    pub fn decoded_bits(&self) -> &[u8] {
        &self.decoded_bits
    }

    /// Payload from the most recent decode, packed MSB first
    pub fn decoded_bytes(&self) -> Vec<u8> {
        pack_bits(&self.decoded_bits)
    }

    /// Process one frame of samples
    pub fn receive(&mut self, samples: &[Complex]) -> RxOutcome {
        let mut report = FrameReport::default();
        let mut uw_errors = 0;

        if self.demod.sync_state() == SyncState::Search {
            self.demod.sync_search(samples);
        }

        let demodulating = self.demod.sync_state().is_demodulating();
        if demodulating {
            uw_errors = self.process_frame(samples, &mut report);
        }

        self.demod.advance_sync(uw_errors);
        if demodulating {
            self.interleaver_sync = self.interleaver_sync.tick();
        }
        let state = self.demod.sync_state();
        if state == SyncState::Search {
            if self.interleaver_sync.state == InterleaverState::Synced {
                debug!("Interleaver sync lost with modem sync");
            }
            self.interleaver_sync = self.interleaver_sync.reset();
        }

        let validity = decide(
            &DecisionInputs {
                state,
                parity_checks_passed: report.parity_checks_passed,
                parity_checks: self.fec.parity_checks(),
                snr_db: self.snr_est_db,
            },
            &self.squelch,
        );

        let nout = match validity {
            Validity::PassThrough => samples.len(),
            Validity::Muted => 0,
            _ if report.decoded => self.config.speech_samples_per_decode,
            _ => 0,
        };

        self.log_frame(&report, validity, nout);
        self.stats.frames += 1;

        RxOutcome { nout, validity }
    }

    /// Demodulate one frame and run the window, decode and text steps.
    /// Returns the unique word error count.
    fn process_frame(&mut self, samples: &[Complex], report: &mut FrameReport) -> usize {
        let g = self.geometry;
        assert_eq!(
            g.uw_bits + g.text_bits + g.coded_bits_per_frame,
            g.bits_per_frame,
            "frame geometry does not add up"
        );

        let demod_frame = self.demod.demodulate_frame(samples);
        let demod_stats = self.demod.stats();
        self.snr_est_db = demod_stats.snr_est_db;
        let mean_amp = demod_stats.mean_amp;
        let esno = self.esno();

        let frame = self.layout.disassemble(&demod_frame.symbols, &demod_frame.amps);

        self.window.push_frame(&frame.payload_symbols, &frame.payload_amps);
        self.window
            .deinterleaved(&self.interleaver, &mut self.deint_symbols, &mut self.deint_amps);

        let depth = g.interleave_frames;
        if self.interleaver_sync.wants_trial(depth) {
            self.alignment_trial(esno, mean_amp, report);
        }

        if self.interleaver_sync.window_ready(depth) {
            self.interleaver_sync = self.interleaver_sync.consume();
            self.decode_window(esno, mean_amp, report);
        }

        for &bit in &frame.text_bits {
            if let Some(ch) = self.text_decoder.push_bit(bit) {
                debug!("Text character {:?}", ch);
                if let Some(sink) = self.text_sink.as_mut() {
                    sink.put_char(ch);
                }
            }
        }

        let uw_errors = count_errors(&self.config.unique_word, &frame.uw_bits);
        self.stats.total_bit_errors += uw_errors as u64;
        self.stats.total_bits += g.uw_bits as u64;
        uw_errors
    }

    /// Try the oldest sub-frame of the window as the start of a batch
    fn alignment_trial(&mut self, esno: f64, mean_amp: f64, report: &mut FrameReport) {
        let cs = self.geometry.coded_symbols_per_frame;
        let outcome = self.fec.decode_subframe(
            &self.deint_symbols[..cs],
            &self.deint_amps[..cs],
            esno,
            mean_amp,
        );
        report.iterations = outcome.iterations;
        report.parity_checks_passed = outcome.parity_checks_passed;

        let mut aligned = outcome.parity_checks_passed == self.fec.parity_checks();
        if self.config.test_frames {
            report.coded_errors = count_errors(&self.test_payload, &outcome.data_bits);
            aligned |= report.coded_errors == 0;
        }

        if aligned {
            debug!("Interleaver synced after {} frames", self.interleaver_sync.absorbed + 1);
        }
        self.interleaver_sync = self
            .interleaver_sync
            .after_trial(aligned, self.geometry.interleave_frames);
    }

    /// FEC decode every sub-frame of an aligned window
    fn decode_window(&mut self, esno: f64, mean_amp: f64, report: &mut FrameReport) {
        let g = self.geometry;
        let cs = g.coded_symbols_per_frame;
        let depth = g.interleave_frames;

        if self.config.test_frames {
            report.raw_errors = self
                .deint_symbols
                .chunks(cs)
                .map(|sub| count_errors(&self.test_coded_bits, &symbols_to_bits(sub)))
                .sum();
            self.stats.total_bit_errors += report.raw_errors as u64;
            self.stats.total_bits += (g.coded_bits_per_frame * depth) as u64;
        }

        for j in 0..depth {
            let range = j * cs..(j + 1) * cs;
            let outcome = self.fec.decode_subframe(
                &self.deint_symbols[range.clone()],
                &self.deint_amps[range],
                esno,
                mean_amp,
            );
            report.iterations = outcome.iterations;
            report.parity_checks_passed = outcome.parity_checks_passed;

            if self.config.test_frames {
                report.coded_errors = count_errors(&self.test_payload, &outcome.data_bits);
                self.stats.total_bit_errors_coded += report.coded_errors as u64;
                self.stats.total_bits_coded += g.data_bits_per_frame as u64;
            } else {
                let n = g.data_bits_per_frame;
                self.decoded_bits[j * n..(j + 1) * n].copy_from_slice(&outcome.data_bits);
            }
        }

        self.stats.decodes += 1;
        report.decoded = true;
    }

    /// One diagnostic line per call, gated by the verbosity level
    fn log_frame(&self, report: &FrameReport, validity: Validity, nout: usize) {
        let ds = self.demod.stats();
        let verbose = self.config.verbose;
        if !((verbose == 1 && ds.last_sync_state == SyncState::Search) || verbose >= 2) {
            return;
        }

        info!(
            "{:3} st: {:<6} euw: {:2} {:1} f: {:5.1} pbw: {} snr: {:4.1} {:2} eraw: {:3} ecdd: {:3} iter: {:3} pcc: {:3} vld: {:2}, nout: {:4}",
            self.stats.frames,
            ds.last_sync_state.name(),
            ds.uw_errors,
            ds.sync_counter,
            ds.foff_est_hz,
            ds.phase_bandwidth,
            self.snr_est_db,
            self.interleaver_sync.frame_count,
            report.raw_errors,
            report.coded_errors,
            report.iterations,
            report.parity_checks_passed,
            validity.code(),
            nout
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hfdv_modem::ofdm::OfdmConfig;
    use hfdv_modem::sync::SyncThresholds;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_silence_passes_through() {
        let mut rx = Receiver::new(ModeConfig::default()).unwrap();
        let samples = vec![Complex::ZERO; rx.nin()];

        let outcome = rx.receive(&samples);
        assert_eq!(outcome.validity, Validity::PassThrough);
        assert_eq!(outcome.nout, samples.len());
        assert_eq!(rx.sync_state(), SyncState::Search);
        assert_eq!(rx.stats().frames, 1);
        assert_eq!(rx.stats().decodes, 0);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_diagnostic_line_counts_from_zero() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .with_level(false)
            .finish();

        let config = ModeConfig { verbose: 2, ..ModeConfig::default() };
        let mut rx = Receiver::new(config).unwrap();
        tracing::subscriber::with_default(subscriber, || {
            for _ in 0..2 {
                let samples = vec![Complex::ZERO; rx.nin()];
                rx.receive(&samples);
            }
        });

        let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = text.lines().filter(|l| l.contains(" st: ")).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].trim_start().starts_with("0 st: search"));
        assert!(lines[1].trim_start().starts_with("1 st: search"));
        assert_eq!(rx.stats().frames, 2);
    }

    #[test]
    fn test_squelch_mutes_silence() {
        let config = ModeConfig {
            squelch_enabled: true,
            ..ModeConfig::default()
        };
        let mut rx = Receiver::new(config).unwrap();
        let samples = vec![Complex::ZERO; rx.nin()];

        let outcome = rx.receive(&samples);
        assert_eq!(outcome.validity, Validity::Muted);
        assert_eq!(outcome.nout, 0);
    }

    #[test]
    fn test_modem_mismatch_rejected() {
        let ofdm = OfdmConfig::new(64, 16, 30, 7, 8000.0).unwrap();
        let demod = OfdmDemodulator::new(ofdm, SyncThresholds::default()).unwrap();
        let err = Receiver::with_demodulator(ModeConfig::default(), demod).err().unwrap();
        assert!(matches!(
            err,
            SessionError::ModemMismatch {
                expected: 217,
                actual: 210
            }
        ));
    }

    #[test]
    fn test_esno_override() {
        let mut rx = Receiver::new(ModeConfig::default()).unwrap();
        assert_eq!(rx.esno(), 3.0);
        rx.set_esno(Some(10.0));
        assert_eq!(rx.esno(), 10.0);
        rx.set_esno(Some(-1.0));
        assert_eq!(rx.esno(), 3.0);
    }

    #[test]
    fn test_decoded_buffer_sized_for_batch() {
        let config = ModeConfig {
            interleave_frames: 2,
            ..ModeConfig::default()
        };
        let rx = Receiver::new(config).unwrap();
        assert_eq!(rx.decoded_bits().len(), 624);
        assert_eq!(rx.decoded_bytes().len(), 78);
        assert_eq!(rx.interleaver_state(), InterleaverState::Search);
    }

    mod loopback {
        use super::*;
        use crate::text_io::RepeatingText;
        use crate::tx::Transmitter;
        use hfdv_modem::common::{DemodFrame, Modulator};
        use hfdv_modem::sync::{SyncMode, SyncTracker};
        use std::cell::RefCell;
        use std::rc::Rc;

        /// Sends one symbol per sample
        struct SymbolModulator {
            symbols: usize,
        }

        impl Modulator for SymbolModulator {
            fn modulate_frame(&mut self, symbols: &[Complex]) -> Vec<Complex> {
                let mut out = symbols.to_vec();
                out.resize(self.symbols, Complex::ZERO);
                out
            }

            fn samples_per_frame(&self) -> usize {
                self.symbols
            }

            fn symbols_per_frame(&self) -> usize {
                self.symbols
            }
        }

        /// Reads symbols straight back, with a sync tracker that can start anywhere
        struct SymbolDemodulator {
            symbols: usize,
            tracker: SyncTracker,
            thresholds: SyncThresholds,
            mean_amp: f64,
        }

        impl SymbolDemodulator {
            fn new(symbols: usize, state: SyncState) -> Self {
                Self {
                    symbols,
                    tracker: SyncTracker {
                        state,
                        ..SyncTracker::new(SyncMode::Manual)
                    },
                    thresholds: SyncThresholds::default(),
                    mean_amp: 0.0,
                }
            }
        }

        impl Demodulator for SymbolDemodulator {
            fn sync_state(&self) -> SyncState {
                self.tracker.state
            }

            fn sync_search(&mut self, _samples: &[Complex]) {}

            fn demodulate_frame(&mut self, samples: &[Complex]) -> DemodFrame {
                let amps: Vec<f64> = samples.iter().map(|s| s.magnitude()).collect();
                self.mean_amp = amps.iter().sum::<f64>() / amps.len().max(1) as f64;
                DemodFrame {
                    symbols: samples.to_vec(),
                    amps,
                }
            }

            fn advance_sync(&mut self, uw_errors: usize) {
                self.tracker = self.tracker.advance(false, uw_errors, &self.thresholds);
            }

            fn nin(&self) -> usize {
                self.symbols
            }

            fn stats(&self) -> DemodStats {
                DemodStats {
                    sync_state: self.tracker.state,
                    last_sync_state: self.tracker.last_state,
                    snr_est_db: 20.0,
                    mean_amp: self.mean_amp,
                    ..DemodStats::default()
                }
            }

            fn unsync(&mut self) {
                self.tracker = self.tracker.unsync();
            }

            fn symbols_per_frame(&self) -> usize {
                self.symbols
            }
        }

        fn deep_config() -> ModeConfig {
            ModeConfig {
                carriers: 23,
                data_rows: 6,
                data_bits_per_frame: 128,
                ldpc_data_bits_per_frame: 160,
                parity_bits: 128,
                unique_word: vec![1, 1, 0, 0, 1, 0, 1, 0, 1, 1, 1, 0, 0, 1, 0, 1],
                interleave_frames: 4,
                test_frames: true,
                ..ModeConfig::default()
            }
        }

        fn link(config: &ModeConfig, state: SyncState) -> (Transmitter<SymbolModulator>, Receiver<SymbolDemodulator>) {
            let symbols = config.geometry().unwrap().symbols_per_frame();
            let tx = Transmitter::with_modulator(config.clone(), SymbolModulator { symbols }).unwrap();
            let rx = Receiver::with_demodulator(config.clone(), SymbolDemodulator::new(symbols, state)).unwrap();
            (tx, rx)
        }

        #[test]
        fn test_deep_interleave_decodes_on_fourth_frame() {
            let config = deep_config();
            let (mut tx, mut rx) = link(&config, SyncState::Synced);
            assert_eq!(rx.nin(), 138);

            let samples = tx.transmit(&[]);
            assert_eq!(samples.len(), 4 * 138);

            let outcomes: Vec<RxOutcome> = samples.chunks(138).map(|frame| rx.receive(frame)).collect();
            for outcome in &outcomes[..3] {
                assert_eq!(outcome.nout, 0);
            }
            assert_eq!(outcomes[3].validity, Validity::Good);
            assert_eq!(outcomes[3].nout, config.speech_samples_per_decode);
            assert_eq!(rx.interleaver_state(), InterleaverState::Synced);

            let stats = rx.stats();
            assert_eq!(stats.decodes, 1);
            assert_eq!(stats.total_bit_errors, 0);
            assert_eq!(stats.total_bits, 4 * 16 + 4 * 256);
            assert_eq!(stats.total_bit_errors_coded, 0);
            assert_eq!(stats.total_bits_coded, 4 * 128);
        }

        #[test]
        fn test_deep_interleave_steady_state() {
            let config = deep_config();
            let (mut tx, mut rx) = link(&config, SyncState::Synced);

            let mut decodes = 0;
            for _ in 0..3 {
                let samples = tx.transmit(&[]);
                for frame in samples.chunks(138) {
                    if rx.receive(frame).nout > 0 {
                        decodes += 1;
                    }
                }
            }
            assert_eq!(decodes, 3);
            assert_eq!(rx.stats().coded_ber(), 0.0);
        }

        #[test]
        fn test_payload_recovered() {
            let config = ModeConfig {
                test_frames: false,
                interleave_frames: 2,
                ..deep_config()
            };
            let (mut tx, mut rx) = link(&config, SyncState::Synced);

            let payload: Vec<u8> = (0..32).map(|i| (i * 37 + 11) as u8).collect();
            assert_eq!(tx.payload_bytes_per_call(), 32);
            let samples = tx.transmit(&payload);

            let outcomes: Vec<RxOutcome> = samples.chunks(138).map(|frame| rx.receive(frame)).collect();
            assert_eq!(outcomes[1].validity, Validity::Good);
            assert_eq!(rx.decoded_bytes(), payload);
        }

        #[test]
        fn test_search_without_timing() {
            let config = deep_config();
            let (mut tx, mut rx) = link(&config, SyncState::Search);
            let samples = tx.transmit(&[]);

            let outcome = rx.receive(&samples[..138]);
            assert_eq!(outcome.validity, Validity::PassThrough);
            assert_eq!(outcome.nout, 138);

            rx.set_squelch(true);
            let outcome = rx.receive(&samples[138..276]);
            assert_eq!(outcome.validity, Validity::Muted);
            assert_eq!(outcome.nout, 0);
            assert_eq!(rx.stats().total_bits, 0);
        }

        #[test]
        fn test_unsync_drops_interleaver() {
            let config = deep_config();
            let (mut tx, mut rx) = link(&config, SyncState::Synced);
            for frame in tx.transmit(&[]).chunks(138) {
                rx.receive(frame);
            }
            assert_eq!(rx.interleaver_state(), InterleaverState::Synced);

            rx.unsync();
            assert_eq!(rx.sync_state(), SyncState::Search);
            assert_eq!(rx.interleaver_state(), InterleaverState::Search);
        }

        #[test]
        fn test_text_delivered() {
            let config = ModeConfig {
                interleave_frames: 1,
                ..deep_config()
            };
            let (mut tx, mut rx) = link(&config, SyncState::Synced);
            tx.set_text_source(RepeatingText::new("cq "));

            let received = Rc::new(RefCell::new(String::new()));
            let sink = Rc::clone(&received);
            rx.set_text_sink(move |ch| sink.borrow_mut().push(ch));

            for _ in 0..40 {
                let samples = tx.transmit(&[]);
                rx.receive(&samples);
            }
            assert!(received.borrow().contains("cq cq"));
        }

        #[test]
        fn test_noiseless_ofdm_link() {
            let config = ModeConfig {
                test_frames: true,
                ..ModeConfig::default()
            };
            let mut tx = Transmitter::new(config.clone()).unwrap();
            let mut rx = Receiver::new(config).unwrap();
            tx.set_text_source(RepeatingText::new("hello "));

            let received = Rc::new(RefCell::new(String::new()));
            let sink = Rc::clone(&received);
            rx.set_text_sink(move |ch| sink.borrow_mut().push(ch));

            let mut outcomes = Vec::new();
            for _ in 0..60 {
                let samples = tx.transmit(&[]);
                assert_eq!(samples.len(), rx.nin());
                outcomes.push(rx.receive(&samples));
            }

            assert_eq!(rx.sync_state(), SyncState::Synced);
            assert!(outcomes[10..].iter().all(|o| o.validity == Validity::Good));
            let stats = rx.stats();
            assert!(stats.decodes > 50);
            assert_eq!(stats.total_bit_errors, 0);
            assert_eq!(stats.total_bit_errors_coded, 0);
            assert!(received.borrow().contains("hello"));
        }
    }
}
