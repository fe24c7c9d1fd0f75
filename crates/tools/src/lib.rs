//! HFDV Tools library

pub mod config;
pub mod wav;
pub mod tx;
pub mod rx;

pub use config::{load_mode_config, ModeOverrides};
pub use rx::{run_rx, RxArgs, RxSummary};
pub use tx::{run_tx, TxArgs, TxSummary};
pub use wav::{read_iq_wav, write_iq_wav};
