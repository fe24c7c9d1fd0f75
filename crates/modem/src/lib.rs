//! HFDV Modem - physical layer
//!
//! The session layer talks to the physical layer only through the
//! [`Modulator`](common::Modulator) and [`Demodulator`](common::Demodulator)
//! traits: symbols go in and samples come out on transmit, samples go in and
//! equalised symbols with per-symbol amplitudes come out on receive. The
//! physical sync state machine lives here as a pure transition function.
//! [`ofdm`] is a simple multi-carrier QPSK reference implementation.

pub mod common;
pub mod sync;
pub mod ofdm;
pub mod error;

pub use error::{ModemError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        common::{DemodFrame, DemodStats, Demodulator, Modulator},
        sync::{PhaseBandwidth, SyncMode, SyncState, SyncThresholds, SyncTracker},
        ofdm::{OfdmConfig, OfdmDemodulator, OfdmModulator},
        error::{ModemError, Result},
    };
}
