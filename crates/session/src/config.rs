//! Mode configuration
//!
//! One `ModeConfig` fixes everything both ends of a link must agree on: the
//! OFDM layout, the LDPC code, the unique word and the interleave depth. The
//! remaining fields are local receiver and transmitter policy.

use crate::{Result, SessionError};
use hfdv_frame::geometry::FrameGeometry;
use hfdv_frame::ldpc::LdpcCode;
use hfdv_modem::ofdm::OfdmConfig;
use hfdv_modem::sync::SyncThresholds;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    // OFDM layout
    pub fft_size: usize,
    pub cp_length: usize,
    pub carriers: usize,
    pub data_rows: usize,
    pub sample_rate: f64,

    // LDPC code
    pub data_bits_per_frame: usize,
    pub ldpc_data_bits_per_frame: usize,
    pub parity_bits: usize,
    pub column_weight: usize,
    pub max_iterations: usize,

    // Frame layout
    pub unique_word: Vec<u8>,
    pub text_bits: usize,
    pub interleave_frames: usize,
    pub bad_uw_errors: usize,

    /// Decoded speech samples released per FEC decode pass
    pub speech_samples_per_decode: usize,

    pub squelch_enabled: bool,
    pub squelch_snr_db: f64,
    pub test_frames: bool,

    pub clip: bool,
    pub amp_scale: f64,
    pub clip_level: f64,

    /// Energy per symbol to noise density used for LLRs
    pub esno: f64,
    pub verbose: u8,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            fft_size: 64,
            cp_length: 16,
            carriers: 31,
            data_rows: 7,
            sample_rate: 8000.0,
            data_bits_per_frame: 312,
            ldpc_data_bits_per_frame: 396,
            parity_bits: 108,
            column_weight: 3,
            max_iterations: 100,
            unique_word: vec![1, 1, 0, 0, 1, 0, 1, 0, 1, 1],
            text_bits: 4,
            interleave_frames: 1,
            bad_uw_errors: 3,
            speech_samples_per_decode: 1280,
            squelch_enabled: false,
            squelch_snr_db: 2.0,
            test_frames: false,
            clip: false,
            amp_scale: 2.5,
            clip_level: 0.75,
            esno: 3.0,
            verbose: 0,
        }
    }
}

impl ModeConfig {
    /// Parse a TOML document; missing keys take their default values
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SessionError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|source| SessionError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check that every derived component can be built
    pub fn validate(&self) -> Result<()> {
        if self.unique_word.iter().any(|&b| b > 1) {
            return Err(SessionError::InvalidConfig {
                msg: "Unique word must contain only 0 and 1 bits".to_string(),
            });
        }

        if self.speech_samples_per_decode == 0 {
            return Err(SessionError::InvalidConfig {
                msg: "speech_samples_per_decode must be non-zero".to_string(),
            });
        }

        if !(self.amp_scale > 0.0 && self.clip_level > 0.0 && self.esno > 0.0) {
            return Err(SessionError::InvalidConfig {
                msg: format!(
                    "amp_scale ({}), clip_level ({}) and esno ({}) must be positive",
                    self.amp_scale, self.clip_level, self.esno
                ),
            });
        }

        self.ofdm_config()?;
        self.geometry()?;
        self.ldpc_code()?;
        Ok(())
    }

    pub fn ofdm_config(&self) -> Result<OfdmConfig> {
        Ok(OfdmConfig::new(
            self.fft_size,
            self.cp_length,
            self.carriers,
            self.data_rows,
            self.sample_rate,
        )?)
    }

    /// Bits carried by one physical frame
    pub fn bits_per_frame(&self) -> usize {
        2 * self.carriers * self.data_rows
    }

    pub fn geometry(&self) -> Result<FrameGeometry> {
        Ok(FrameGeometry::new(
            self.bits_per_frame(),
            self.data_bits_per_frame,
            self.ldpc_data_bits_per_frame,
            self.parity_bits,
            self.unique_word.len(),
            self.text_bits,
            self.interleave_frames,
        )?)
    }

    pub fn ldpc_code(&self) -> Result<LdpcCode> {
        Ok(LdpcCode::new(
            self.ldpc_data_bits_per_frame,
            self.parity_bits,
            self.column_weight,
            self.max_iterations,
        )?)
    }

    pub fn sync_thresholds(&self) -> SyncThresholds {
        SyncThresholds {
            bad_uw_errors: self.bad_uw_errors,
            ..SyncThresholds::default()
        }
    }
}
