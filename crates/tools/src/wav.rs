//! Complex baseband samples in stereo WAV files
//!
//! The real part goes in the left channel and the imaginary part in the
//! right, as 16-bit integers.

use anyhow::{bail, Context, Result};
use hfdv_core::buffer::Complex;
use std::path::Path;
use tracing::{info, warn};

/// Sample magnitude mapped to integer full scale
pub const FULL_SCALE: f64 = 4.0;

pub fn write_iq_wav(samples: &[Complex], path: &Path, sample_rate: f64) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: sample_rate as u32,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {:?}", path))?;

    let scale = i16::MAX as f64 / FULL_SCALE;
    let mut overloads = 0;
    for sample in samples {
        for value in [sample.real, sample.imag] {
            let scaled = value * scale;
            if scaled.abs() > i16::MAX as f64 {
                overloads += 1;
            }
            writer.write_sample(scaled.clamp(-(i16::MAX as f64), i16::MAX as f64) as i16)?;
        }
    }

    writer.finalize()?;
    if overloads > 0 {
        warn!("{} values exceeded full scale and were limited", overloads);
    }
    info!("Wrote {} samples to {:?}", samples.len(), path);
    Ok(())
}

/// Read samples back; returns them with the file's sample rate
pub fn read_iq_wav(path: &Path) -> Result<(Vec<Complex>, f64)> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {:?}", path))?;

    let spec = reader.spec();
    if spec.channels != 2 || spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
        bail!(
            "Expected 16-bit stereo I/Q WAV, got {} channels of {} bits",
            spec.channels,
            spec.bits_per_sample
        );
    }

    let values: Result<Vec<i16>, _> = reader.samples::<i16>().collect();
    let values = values.with_context(|| "Failed to read audio samples")?;

    let scale = FULL_SCALE / i16::MAX as f64;
    let samples: Vec<Complex> = values
        .chunks_exact(2)
        .map(|iq| Complex::new(iq[0] as f64 * scale, iq[1] as f64 * scale))
        .collect();

    info!("Read {} samples from {:?}", samples.len(), path);
    Ok((samples, spec.sample_rate as f64))
}
