//! Mode configuration for the command line tools
//!
//! A TOML file supplies the mode; flags given on the command line win.

use anyhow::{Context, Result};
use clap::Args;
use hfdv_session::config::ModeConfig;
use std::path::Path;
use tracing::info;

/// Mode settings that can be overridden from the command line
#[derive(Debug, Clone, Default, Args)]
pub struct ModeOverrides {
    /// Frames per interleave batch
    #[arg(long, global = true)]
    pub interleave: Option<usize>,

    /// Send or expect the known test payload
    #[arg(long, global = true)]
    pub test_frames: bool,

    /// Mute output when sync or SNR is poor
    #[arg(long, global = true)]
    pub squelch: bool,

    /// Squelch threshold in dB
    #[arg(long, global = true)]
    pub squelch_snr: Option<f64>,

    /// Clip transmit peaks
    #[arg(long, global = true)]
    pub clip: bool,
}

impl ModeOverrides {
    pub fn apply(&self, config: &mut ModeConfig) {
        if let Some(depth) = self.interleave {
            config.interleave_frames = depth;
        }
        if let Some(snr) = self.squelch_snr {
            config.squelch_snr_db = snr;
        }
        config.test_frames |= self.test_frames;
        config.squelch_enabled |= self.squelch;
        config.clip |= self.clip;
    }
}

/// Load the mode from `path`, or use the default mode
pub fn load_mode_config(path: Option<&Path>, overrides: &ModeOverrides, verbose: u8) -> Result<ModeConfig> {
    let mut config = match path {
        Some(path) => {
            info!("Loading mode from {:?}", path);
            ModeConfig::from_file(path).with_context(|| format!("Failed to load mode config {:?}", path))?
        }
        None => ModeConfig::default(),
    };

    overrides.apply(&mut config);
    config.verbose = verbose;
    config.validate().context("Invalid mode after applying command line options")?;
    Ok(config)
}
