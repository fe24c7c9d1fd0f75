//! Validity and squelch decision
//!
//! Every receive call ends with a verdict telling the caller what to do with
//! the audio: pass the off-air samples through, stay silent, play the
//! decoded speech, or play it at reduced gain.

use hfdv_modem::sync::SyncState;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Validity {
    /// No sync and squelch disabled: the input samples are echoed
    PassThrough,
    /// Nothing should be played
    Muted,
    Good,
    /// Decoded but some parity checks failed; the caller should attenuate
    Marginal,
}

impl Validity {
    /// Integer code used on the wire between modem and audio layers
    pub fn code(&self) -> i32 {
        match self {
            Validity::PassThrough => -1,
            Validity::Muted => 0,
            Validity::Good => 1,
            Validity::Marginal => 2,
        }
    }

    /// Whether decoded speech is released
    pub fn releases_speech(&self) -> bool {
        matches!(self, Validity::Good | Validity::Marginal)
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Validity::PassThrough => "pass-through",
            Validity::Muted => "muted",
            Validity::Good => "good",
            Validity::Marginal => "marginal",
        };
        f.write_str(name)
    }
}

/// Squelch settings for one session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquelchPolicy {
    pub enabled: bool,
    pub snr_threshold_db: f64,
}

/// Inputs to the verdict for one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionInputs {
    /// Physical sync state after this call's transition
    pub state: SyncState,
    pub parity_checks_passed: usize,
    pub parity_checks: usize,
    pub snr_db: f64,
}

impl DecisionInputs {
    fn all_checks_pass(&self) -> bool {
        self.parity_checks_passed == self.parity_checks
    }

    /// Synced, or in trial with a decode that satisfied every check
    pub fn in_sync(&self) -> bool {
        match self.state {
            SyncState::Synced => true,
            SyncState::Trial => self.all_checks_pass(),
            SyncState::Search => false,
        }
    }
}

/// Grade one receive call
pub fn decide(inputs: &DecisionInputs, squelch: &SquelchPolicy) -> Validity {
    if !inputs.in_sync() {
        return if squelch.enabled {
            Validity::Muted
        } else {
            Validity::PassThrough
        };
    }

    if squelch.enabled && inputs.snr_db < squelch.snr_threshold_db {
        Validity::Muted
    } else if !squelch.enabled || inputs.all_checks_pass() {
        Validity::Good
    } else {
        Validity::Marginal
    }
}
