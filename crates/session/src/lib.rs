//! HFDV Session - frame level transmit and receive engine
//!
//! A [`Transmitter`](tx::Transmitter) turns payload bits into modem samples:
//! LDPC encoding per frame, one QPSK interleave across a batch of frames,
//! unique word and text side-channel insertion, then modulation. A
//! [`Receiver`](rx::Receiver) undoes this one frame at a time, running the
//! physical and interleaver sync machines and issuing a validity verdict on
//! every call.

pub mod config;
pub mod error;
pub mod fec;
pub mod interleaver_sync;
pub mod rx;
pub mod stats;
pub mod text_io;
pub mod tx;
pub mod validity;

pub use error::{Result, SessionError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        config::ModeConfig,
        error::{Result, SessionError},
        interleaver_sync::{InterleaverState, InterleaverSync},
        rx::{Receiver, RxOutcome},
        stats::Statistics,
        text_io::{RepeatingText, TextSink, TextSource},
        tx::Transmitter,
        validity::{SquelchPolicy, Validity},
    };
}
