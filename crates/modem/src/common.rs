//! Common physical layer traits

use crate::sync::{PhaseBandwidth, SyncState};
use hfdv_core::buffer::Complex;
use serde::Serialize;

/// Converts one physical frame of symbols into samples
pub trait Modulator {
    /// Modulate exactly one frame; short input is zero filled
    fn modulate_frame(&mut self, symbols: &[Complex]) -> Vec<Complex>;

    /// Samples produced per frame
    fn samples_per_frame(&self) -> usize;

    /// Symbols consumed per frame
    fn symbols_per_frame(&self) -> usize;
}

/// One demodulated frame
#[derive(Debug, Clone, Default)]
pub struct DemodFrame {
    pub symbols: Vec<Complex>,
    /// Per-symbol reliability amplitudes
    pub amps: Vec<f64>,
}

/// Demodulator state reported to the session
#[derive(Debug, Clone, Default, Serialize)]
pub struct DemodStats {
    pub sync_state: SyncState,
    pub last_sync_state: SyncState,
    pub snr_est_db: f64,
    pub foff_est_hz: f64,
    pub phase_bandwidth: PhaseBandwidth,
    pub uw_errors: usize,
    pub sync_counter: u32,
    pub frame_count: u32,
    pub mean_amp: f64,
}

/// Recovers symbols from samples and owns the physical sync state.
///
/// Per call the session runs `sync_search` while searching, then
/// `demodulate_frame` while in trial or synced, reads `nin` and finally
/// feeds the unique word error count back through `advance_sync`.
pub trait Demodulator {
    fn sync_state(&self) -> SyncState;

    /// Look for frame timing in one block of samples
    fn sync_search(&mut self, samples: &[Complex]);

    /// Demodulate one frame of samples
    fn demodulate_frame(&mut self, samples: &[Complex]) -> DemodFrame;

    /// Step the sync state machine after a frame
    fn advance_sync(&mut self, uw_errors: usize);

    /// Samples expected on the next call
    fn nin(&self) -> usize;

    fn stats(&self) -> DemodStats;

    /// Drop back to search
    fn unsync(&mut self);

    /// Symbols produced per frame
    fn symbols_per_frame(&self) -> usize;
}
