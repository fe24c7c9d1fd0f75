//! Physical layer sync state machine
//!
//! `Search` looks for valid frame timing. Once found, `Trial` watches the
//! unique word for a few frames before committing to `Synced`. Bad unique
//! words drive the machine back to `Search`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical layer sync state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    #[default]
    Search,
    Trial,
    Synced,
}

impl SyncState {
    pub fn name(&self) -> &'static str {
        match self {
            SyncState::Search => "search",
            SyncState::Trial => "trial",
            SyncState::Synced => "synced",
        }
    }

    /// Whether frames are demodulated in this state
    pub fn is_demodulating(&self) -> bool {
        !matches!(self, SyncState::Search)
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Phase tracking loop bandwidth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseBandwidth {
    #[default]
    High,
    Low,
}

impl fmt::Display for PhaseBandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseBandwidth::High => f.write_str("high"),
            PhaseBandwidth::Low => f.write_str("low"),
        }
    }
}

/// Whether a synced modem may drop back to search on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    #[default]
    Auto,
    Manual,
}

/// Frame counts that drive the transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncThresholds {
    /// A frame with more unique word errors than this is bad
    pub bad_uw_errors: usize,
    /// Bad frames tolerated in trial
    pub trial_bad_frames: u32,
    /// Consecutive good frames needed to leave trial
    pub trial_good_frames: u32,
    /// Bad frames tolerated once synced
    pub synced_bad_frames: u32,
}

impl Default for SyncThresholds {
    fn default() -> Self {
        Self {
            bad_uw_errors: 3,
            trial_bad_frames: 2,
            trial_good_frames: 4,
            synced_bad_frames: 6,
        }
    }
}

/// Snapshot of the sync state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncTracker {
    pub state: SyncState,
    pub last_state: SyncState,
    pub mode: SyncMode,
    pub frame_count: u32,
    pub sync_counter: u32,
    pub uw_errors: usize,
    pub phase_bandwidth: PhaseBandwidth,
}

impl SyncTracker {
    pub fn new(mode: SyncMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Compute the next state after one frame.
    ///
    /// `timing_valid` is the outcome of the search on this frame and is only
    /// consulted in `Search`. `uw_errors` is only consulted while demodulating.
    pub fn advance(self, timing_valid: bool, uw_errors: usize, thresholds: &SyncThresholds) -> Self {
        let mut next = self;
        next.last_state = self.state;

        match self.state {
            SyncState::Search => {
                if timing_valid {
                    next.frame_count = 0;
                    next.sync_counter = 0;
                    next.state = SyncState::Trial;
                }
            }
            SyncState::Trial => {
                next.uw_errors = uw_errors;
                next.frame_count += 1;
                if uw_errors > thresholds.bad_uw_errors {
                    next.sync_counter += 1;
                    next.frame_count = 0;
                }

                if next.sync_counter > thresholds.trial_bad_frames {
                    next.state = SyncState::Search;
                    next.phase_bandwidth = PhaseBandwidth::High;
                } else if next.frame_count >= thresholds.trial_good_frames {
                    next.state = SyncState::Synced;
                    next.phase_bandwidth = PhaseBandwidth::Low;
                }
            }
            SyncState::Synced => {
                next.uw_errors = uw_errors;
                next.frame_count += 1;
                if uw_errors > thresholds.bad_uw_errors {
                    next.sync_counter += 1;
                } else {
                    next.sync_counter = 0;
                }

                if self.mode == SyncMode::Auto && next.sync_counter > thresholds.synced_bad_frames {
                    next.state = SyncState::Search;
                    next.phase_bandwidth = PhaseBandwidth::High;
                }
            }
        }

        next
    }

    /// Force the machine back to search
    pub fn unsync(self) -> Self {
        Self {
            state: SyncState::Search,
            last_state: self.state,
            frame_count: 0,
            sync_counter: 0,
            phase_bandwidth: PhaseBandwidth::High,
            ..self
        }
    }
}
