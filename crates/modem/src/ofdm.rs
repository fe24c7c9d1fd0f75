//! Reference OFDM QPSK modem
//!
//! A frame is one pilot row followed by `data_rows` rows of QPSK symbols,
//! each row occupying FFT bins `1..=carriers` and carrying a cyclic prefix.
//! The receiver equalises the phase of every carrier against the pilot row.
//! There is no frequency or fine timing tracking; blocks are expected to be
//! frame aligned once sync has been found.

use crate::common::{DemodFrame, DemodStats, Demodulator, Modulator};
use crate::sync::{SyncMode, SyncState, SyncThresholds, SyncTracker};
use crate::{ModemError, Result};
use hfdv_core::buffer::Complex;
use hfdv_core::fft::{FftConfig, FftProcessor};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Known BPSK pilot sequence, one bit per carrier
const PILOT_PATTERN: u64 = 0xB5C3_4E9A_17D2_6F08;

/// Cyclic prefix correlation needed to accept a row timing
const CP_SYNC_THRESHOLD: f64 = 0.8;

/// Pilot correlation needed to accept a frame start
const PILOT_SYNC_THRESHOLD: f64 = 0.7;

/// Mean sample power below which a block is treated as silence
const POWER_FLOOR: f64 = 1e-9;

const MAX_SNR_DB: f64 = 60.0;

/// OFDM layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfdmConfig {
    pub fft_size: usize,
    pub cp_length: usize,
    pub carriers: usize,
    pub data_rows: usize,
    pub sample_rate: f64,
}

impl OfdmConfig {
    pub fn new(
        fft_size: usize,
        cp_length: usize,
        carriers: usize,
        data_rows: usize,
        sample_rate: f64,
    ) -> Result<Self> {
        if carriers == 0 || carriers >= fft_size {
            return Err(ModemError::InvalidParameters {
                msg: format!("{} carriers do not fit an FFT of size {}", carriers, fft_size),
            });
        }

        if cp_length == 0 || cp_length >= fft_size {
            return Err(ModemError::InvalidParameters {
                msg: format!("Invalid cyclic prefix length: {}", cp_length),
            });
        }

        if data_rows == 0 {
            return Err(ModemError::InvalidParameters {
                msg: "At least one data row is required".to_string(),
            });
        }

        // Validates the FFT size and sample rate
        FftConfig::new(fft_size, sample_rate)?;

        Ok(Self {
            fft_size,
            cp_length,
            carriers,
            data_rows,
            sample_rate,
        })
    }

    /// Samples per row including the cyclic prefix
    pub fn row_length(&self) -> usize {
        self.fft_size + self.cp_length
    }

    /// Pilot row plus data rows
    pub fn rows(&self) -> usize {
        self.data_rows + 1
    }

    pub fn samples_per_frame(&self) -> usize {
        self.rows() * self.row_length()
    }

    pub fn symbols_per_frame(&self) -> usize {
        self.carriers * self.data_rows
    }

    pub fn bits_per_frame(&self) -> usize {
        2 * self.symbols_per_frame()
    }

    pub fn frame_duration_secs(&self) -> f64 {
        self.samples_per_frame() as f64 / self.sample_rate
    }

    /// FFT bin of carrier `k`
    fn bin(&self, k: usize) -> usize {
        k + 1
    }

    /// Pilot value on carrier `k`
    pub fn pilot(&self, k: usize) -> Complex {
        if (PILOT_PATTERN >> (k % 64)) & 1 == 1 {
            Complex::new(-1.0, 0.0)
        } else {
            Complex::ONE
        }
    }

    fn fft(&self) -> Result<FftProcessor> {
        Ok(FftProcessor::new(FftConfig::new(self.fft_size, self.sample_rate)?)?)
    }
}

/// OFDM modulator
pub struct OfdmModulator {
    config: OfdmConfig,
    fft_processor: FftProcessor,
    freq: Vec<Complex>,
    time: Vec<Complex>,
}

impl OfdmModulator {
    pub fn new(config: OfdmConfig) -> Result<Self> {
        let fft_processor = config.fft()?;
        let n = config.fft_size;
        Ok(Self {
            config,
            fft_processor,
            freq: vec![Complex::ZERO; n],
            time: vec![Complex::ZERO; n],
        })
    }

    pub fn config(&self) -> &OfdmConfig {
        &self.config
    }

    /// Modulate one row of carrier values and append it with its prefix
    fn push_row<F>(&mut self, carrier: F, output: &mut Vec<Complex>)
    where
        F: Fn(usize) -> Complex,
    {
        self.freq.fill(Complex::ZERO);
        for k in 0..self.config.carriers {
            self.freq[self.config.bin(k)] = carrier(k);
        }

        if let Err(e) = self.fft_processor.ifft(&self.freq, &mut self.time) {
            warn!("OFDM row transform failed: {}", e);
            self.time.fill(Complex::ZERO);
        }

        let cp_start = self.config.fft_size - self.config.cp_length;
        output.extend_from_slice(&self.time[cp_start..]);
        output.extend_from_slice(&self.time);
    }
}

impl Modulator for OfdmModulator {
    fn modulate_frame(&mut self, symbols: &[Complex]) -> Vec<Complex> {
        let mut output = Vec::with_capacity(self.config.samples_per_frame());
        let config = self.config.clone();
        let carriers = config.carriers;

        self.push_row(|k| config.pilot(k), &mut output);
        for row in 0..config.data_rows {
            self.push_row(
                |k| symbols.get(row * carriers + k).copied().unwrap_or(Complex::ZERO),
                &mut output,
            );
        }

        output
    }

    fn samples_per_frame(&self) -> usize {
        self.config.samples_per_frame()
    }

    fn symbols_per_frame(&self) -> usize {
        self.config.symbols_per_frame()
    }
}

/// OFDM demodulator with pilot based phase equalisation
pub struct OfdmDemodulator {
    config: OfdmConfig,
    fft_processor: FftProcessor,
    thresholds: SyncThresholds,
    tracker: SyncTracker,
    timing_valid: bool,
    nin: usize,
    snr_est_db: f64,
    mean_amp: f64,
    time: Vec<Complex>,
    freq: Vec<Complex>,
}

impl OfdmDemodulator {
    pub fn new(config: OfdmConfig, thresholds: SyncThresholds) -> Result<Self> {
        let fft_processor = config.fft()?;
        let n = config.fft_size;
        Ok(Self {
            nin: config.samples_per_frame(),
            config,
            fft_processor,
            thresholds,
            tracker: SyncTracker::new(SyncMode::Auto),
            timing_valid: false,
            snr_est_db: 0.0,
            mean_amp: 0.0,
            time: vec![Complex::ZERO; n],
            freq: vec![Complex::ZERO; n],
        })
    }

    /// Select automatic or manual unsync
    pub fn with_sync_mode(mut self, mode: SyncMode) -> Self {
        self.tracker.mode = mode;
        self
    }

    pub fn config(&self) -> &OfdmConfig {
        &self.config
    }

    /// Normalized correlation between the prefix at `off` and the row tail
    fn cp_correlation_at(&self, buf: &[Complex], off: usize) -> f64 {
        let fft_size = self.config.fft_size;
        let cp = self.config.cp_length;
        if off + fft_size + cp > buf.len() {
            return 0.0;
        }

        let mut acc = Complex::ZERO;
        let mut p1 = 0.0;
        let mut p2 = 0.0;
        for n in 0..cp {
            let a = buf[off + n];
            let b = buf[off + fft_size + n];
            acc += a * b.conj();
            p1 += a.norm_sqr();
            p2 += b.norm_sqr();
        }

        let denom = (p1 * p2).sqrt();
        if denom <= 1e-12 {
            0.0
        } else {
            acc.magnitude() / denom
        }
    }

    /// Transform the row starting at `start` into `self.freq`
    fn row_spectrum(&mut self, buf: &[Complex], start: usize) {
        let body = start + self.config.cp_length;
        for (i, t) in self.time.iter_mut().enumerate() {
            *t = buf.get(body + i).copied().unwrap_or(Complex::ZERO);
        }

        if let Err(e) = self.fft_processor.fft(&self.time, &mut self.freq) {
            warn!("OFDM row transform failed: {}", e);
            self.freq.fill(Complex::ZERO);
        }
    }

    /// How closely the row at `start` matches the pilot sequence
    fn pilot_correlation_at(&mut self, buf: &[Complex], start: usize) -> f64 {
        self.row_spectrum(buf, start);

        let mut acc = Complex::ZERO;
        let mut power = 0.0;
        for k in 0..self.config.carriers {
            let rx = self.freq[self.config.bin(k)];
            acc += rx * self.config.pilot(k);
            power += rx.norm_sqr();
        }

        let denom = (power * self.config.carriers as f64).sqrt();
        if denom <= 1e-12 {
            0.0
        } else {
            acc.magnitude() / denom
        }
    }

    /// Locate the start of a frame within `buf`
    fn find_frame_start(&mut self, buf: &[Complex]) -> Option<usize> {
        let row_len = self.config.row_length();
        if buf.len() < row_len {
            return None;
        }

        let power = buf.iter().map(|s| s.norm_sqr()).sum::<f64>() / buf.len() as f64;
        if power < POWER_FLOOR {
            return None;
        }

        let (row_off, cp_metric) = (0..row_len)
            .map(|off| (off, self.cp_correlation_at(buf, off)))
            .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if cp_metric < CP_SYNC_THRESHOLD {
            return None;
        }

        let mut best = None;
        let mut start = row_off;
        while start + row_len <= buf.len() {
            let metric = self.pilot_correlation_at(buf, start);
            if metric >= PILOT_SYNC_THRESHOLD && best.map_or(true, |(_, m)| metric > m) {
                best = Some((start, metric));
            }
            start += row_len;
        }

        best.map(|(start, _)| start)
    }
}

impl Demodulator for OfdmDemodulator {
    fn sync_state(&self) -> SyncState {
        self.tracker.state
    }

    fn sync_search(&mut self, samples: &[Complex]) {
        self.timing_valid = false;
        self.nin = self.config.samples_per_frame();

        match self.find_frame_start(samples) {
            Some(0) => {
                debug!("OFDM frame timing found");
                self.timing_valid = true;
            }
            Some(offset) => {
                // Realign so the next block starts on a frame boundary
                debug!("OFDM frame start at offset {}, realigning", offset);
                self.nin = offset;
            }
            None => {}
        }
    }

    fn demodulate_frame(&mut self, samples: &[Complex]) -> DemodFrame {
        let carriers = self.config.carriers;
        let row_len = self.config.row_length();
        let mut symbols = Vec::with_capacity(self.config.symbols_per_frame());
        let mut amps = Vec::with_capacity(self.config.symbols_per_frame());

        self.row_spectrum(samples, 0);
        let channel: Vec<Complex> = (0..carriers)
            .map(|k| self.freq[self.config.bin(k)] * self.config.pilot(k))
            .collect();

        for row in 1..self.config.rows() {
            self.row_spectrum(samples, row * row_len);
            for (k, h) in channel.iter().enumerate() {
                let rx = self.freq[self.config.bin(k)];
                let mag = h.magnitude();
                let eq = if mag > 1e-12 { rx * (h.conj() / mag) } else { rx };
                symbols.push(eq);
                amps.push(eq.magnitude());
            }
        }

        self.mean_amp = amps.iter().sum::<f64>() / amps.len().max(1) as f64;
        self.snr_est_db = estimate_snr_db(&symbols, self.mean_amp);
        self.nin = self.config.samples_per_frame();

        DemodFrame { symbols, amps }
    }

    fn advance_sync(&mut self, uw_errors: usize) {
        let next = self.tracker.advance(self.timing_valid, uw_errors, &self.thresholds);
        if next.state != self.tracker.state {
            debug!("Modem sync {} -> {}", self.tracker.state, next.state);
        }
        self.tracker = next;
        self.timing_valid = false;
    }

    fn nin(&self) -> usize {
        self.nin
    }

    fn stats(&self) -> DemodStats {
        DemodStats {
            sync_state: self.tracker.state,
            last_sync_state: self.tracker.last_state,
            snr_est_db: self.snr_est_db,
            foff_est_hz: 0.0,
            phase_bandwidth: self.tracker.phase_bandwidth,
            uw_errors: self.tracker.uw_errors,
            sync_counter: self.tracker.sync_counter,
            frame_count: self.tracker.frame_count,
            mean_amp: self.mean_amp,
        }
    }

    fn unsync(&mut self) {
        self.tracker = self.tracker.unsync();
        self.timing_valid = false;
        self.nin = self.config.samples_per_frame();
    }

    fn symbols_per_frame(&self) -> usize {
        self.config.symbols_per_frame()
    }
}

/// Nearest point of the `{1, j, -j, -1}` constellation
fn slice_qpsk(s: Complex) -> Complex {
    if s.real.abs() >= s.imag.abs() {
        Complex::new(s.real.signum(), 0.0)
    } else {
        Complex::new(0.0, s.imag.signum())
    }
}

/// SNR from the error vector magnitude of amplitude normalized symbols
fn estimate_snr_db(symbols: &[Complex], mean_amp: f64) -> f64 {
    if symbols.is_empty() || mean_amp <= 0.0 {
        return 0.0;
    }

    let err = symbols
        .iter()
        .map(|&s| {
            let s = s / mean_amp;
            (s - slice_qpsk(s)).norm_sqr()
        })
        .sum::<f64>()
        / symbols.len() as f64;

    if err <= 0.0 {
        MAX_SNR_DB
    } else {
        (-10.0 * err.log10()).min(MAX_SNR_DB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OfdmConfig {
        OfdmConfig::new(64, 16, 31, 7, 8000.0).unwrap()
    }

    fn qpsk(i: usize) -> Complex {
        [Complex::ONE, Complex::new(0.0, 1.0), Complex::new(0.0, -1.0), Complex::new(-1.0, 0.0)][(i * 7 + 3) % 4]
    }

    #[test]
    fn test_config_sizes() {
        let c = config();
        assert_eq!(c.row_length(), 80);
        assert_eq!(c.samples_per_frame(), 640);
        assert_eq!(c.symbols_per_frame(), 217);
        assert_eq!(c.bits_per_frame(), 434);
        assert!((c.frame_duration_secs() - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_config() {
        assert!(OfdmConfig::new(64, 16, 64, 7, 8000.0).is_err());
        assert!(OfdmConfig::new(64, 0, 31, 7, 8000.0).is_err());
        assert!(OfdmConfig::new(60, 16, 31, 7, 8000.0).is_err());
        assert!(OfdmConfig::new(64, 16, 31, 0, 8000.0).is_err());
    }

    #[test]
    fn test_cyclic_prefix() {
        let mut modulator = OfdmModulator::new(config()).unwrap();
        let symbols: Vec<Complex> = (0..217).map(qpsk).collect();
        let frame = modulator.modulate_frame(&symbols);
        assert_eq!(frame.len(), 640);
        for row in 0..8 {
            let base = row * 80;
            for i in 0..16 {
                assert!((frame[base + i] - frame[base + 64 + i]).magnitude() < 1e-12);
            }
        }
    }

    #[test]
    fn test_noiseless_loopback() {
        let mut modulator = OfdmModulator::new(config()).unwrap();
        let mut demod = OfdmDemodulator::new(config(), SyncThresholds::default()).unwrap();
        let symbols: Vec<Complex> = (0..217).map(qpsk).collect();

        // Arbitrary gain and phase rotation on the channel
        let channel = Complex::from_phase(0.7) * 3.0;
        let samples: Vec<Complex> = modulator
            .modulate_frame(&symbols)
            .into_iter()
            .map(|s| s * channel)
            .collect();

        let frame = demod.demodulate_frame(&samples);
        assert_eq!(frame.symbols.len(), 217);
        for (rx, tx) in frame.symbols.iter().zip(&symbols) {
            assert!((*rx / 3.0 - *tx).magnitude() < 1e-9);
        }
        assert!((demod.stats().mean_amp - 3.0).abs() < 1e-9);
        assert_eq!(demod.stats().snr_est_db, MAX_SNR_DB);
    }

    #[test]
    fn test_sync_search_aligned() {
        let mut modulator = OfdmModulator::new(config()).unwrap();
        let mut demod = OfdmDemodulator::new(config(), SyncThresholds::default()).unwrap();
        let symbols: Vec<Complex> = (0..217).map(qpsk).collect();
        let samples = modulator.modulate_frame(&symbols);

        demod.sync_search(&samples);
        assert_eq!(demod.nin(), 640);
        demod.advance_sync(0);
        assert_eq!(demod.sync_state(), SyncState::Trial);
    }

    #[test]
    fn test_sync_search_realigns() {
        let mut modulator = OfdmModulator::new(config()).unwrap();
        let mut demod = OfdmDemodulator::new(config(), SyncThresholds::default()).unwrap();
        let symbols: Vec<Complex> = (0..217).map(qpsk).collect();
        let mut stream = modulator.modulate_frame(&symbols);
        stream.extend(modulator.modulate_frame(&symbols));

        // Block starts 200 samples into the first frame
        demod.sync_search(&stream[200..840]);
        assert_eq!(demod.nin(), 440);
        demod.advance_sync(0);
        assert_eq!(demod.sync_state(), SyncState::Search);
    }

    #[test]
    fn test_silence_never_syncs() {
        let mut demod = OfdmDemodulator::new(config(), SyncThresholds::default()).unwrap();
        demod.sync_search(&vec![Complex::ZERO; 640]);
        demod.advance_sync(0);
        assert_eq!(demod.sync_state(), SyncState::Search);
        assert_eq!(demod.nin(), 640);
    }

    #[test]
    fn test_unsync() {
        let mut demod = OfdmDemodulator::new(config(), SyncThresholds::default())
            .unwrap()
            .with_sync_mode(SyncMode::Manual);
        demod.tracker.state = SyncState::Synced;
        demod.unsync();
        assert_eq!(demod.sync_state(), SyncState::Search);
        assert_eq!(demod.stats().last_sync_state, SyncState::Synced);
    }
}
