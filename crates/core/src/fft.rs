//! FFT processing wrapper

use crate::{buffer::Complex, CoreError, Result};
use rustfft::{num_complex::Complex64, FftPlanner};
use std::sync::Arc;
use tracing::debug;

/// FFT configuration
#[derive(Debug, Clone)]
pub struct FftConfig {
    pub size: usize,
    pub sample_rate: f64,
}

impl FftConfig {
    pub fn new(size: usize, sample_rate: f64) -> Result<Self> {
        if size == 0 || !size.is_power_of_two() {
            return Err(CoreError::FftError {
                msg: format!("FFT size must be a power of 2, got {}", size),
            });
        }

        if sample_rate <= 0.0 {
            return Err(CoreError::InvalidSampleRate { rate: sample_rate });
        }

        Ok(Self { size, sample_rate })
    }

    /// Get frequency resolution (Hz per bin)
    pub fn frequency_resolution(&self) -> f64 {
        self.sample_rate / self.size as f64
    }

    /// Convert bin index to frequency in Hz
    pub fn bin_to_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.frequency_resolution()
    }
}

/// Forward/inverse FFT of one fixed size, reusing its working buffers
pub struct FftProcessor {
    config: FftConfig,
    fft: Arc<dyn rustfft::Fft<f64>>,
    ifft: Arc<dyn rustfft::Fft<f64>>,
    work: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

impl FftProcessor {
    /// Create a new FFT processor
    pub fn new(config: FftConfig) -> Result<Self> {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.size);
        let ifft = planner.plan_fft_inverse(config.size);
        let scratch_len = fft
            .get_inplace_scratch_len()
            .max(ifft.get_inplace_scratch_len());
        debug!("Planned FFT of size {}", config.size);

        Ok(Self {
            work: vec![Complex64::new(0.0, 0.0); config.size],
            scratch: vec![Complex64::new(0.0, 0.0); scratch_len],
            config,
            fft,
            ifft,
        })
    }

    /// Get the FFT configuration
    pub fn config(&self) -> &FftConfig {
        &self.config
    }

    fn check_sizes(&self, input: &[Complex], output: &[Complex]) -> Result<()> {
        for len in [input.len(), output.len()] {
            if len != self.config.size {
                return Err(CoreError::BufferSizeMismatch {
                    expected: self.config.size,
                    actual: len,
                });
            }
        }
        Ok(())
    }

    fn load(&mut self, input: &[Complex]) {
        for (w, c) in self.work.iter_mut().zip(input) {
            *w = Complex64::new(c.real, c.imag);
        }
    }

    /// Perform forward FFT
    pub fn fft(&mut self, input: &[Complex], output: &mut [Complex]) -> Result<()> {
        self.check_sizes(input, output)?;
        self.load(input);
        self.fft.process_with_scratch(&mut self.work, &mut self.scratch);

        for (o, c) in output.iter_mut().zip(&self.work) {
            *o = Complex::new(c.re, c.im);
        }
        Ok(())
    }

    /// Perform inverse FFT, normalized by 1/N
    pub fn ifft(&mut self, input: &[Complex], output: &mut [Complex]) -> Result<()> {
        self.check_sizes(input, output)?;
        self.load(input);
        self.ifft.process_with_scratch(&mut self.work, &mut self.scratch);

        let scale = 1.0 / self.config.size as f64;
        for (o, c) in output.iter_mut().zip(&self.work) {
            *o = Complex::new(c.re * scale, c.im * scale);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fft_config_creation() {
        let config = FftConfig::new(1024, 48000.0).unwrap();
        assert_eq!(config.size, 1024);
        assert!((config.frequency_resolution() - 46.875).abs() < 1e-10);
        assert!((config.bin_to_frequency(2) - 93.75).abs() < 1e-10);
    }

    #[test]
    fn test_fft_config_invalid_size() {
        assert!(FftConfig::new(1000, 48000.0).is_err());
        assert!(FftConfig::new(64, 0.0).is_err());
    }

    #[test]
    fn test_fft_roundtrip() {
        let config = FftConfig::new(8, 8000.0).unwrap();
        let mut processor = FftProcessor::new(config).unwrap();

        let input: Vec<Complex> = (0..8)
            .map(|i| Complex::new(i as f64 * 0.25, 1.0 - i as f64 * 0.1))
            .collect();
        let mut freq = vec![Complex::default(); 8];
        let mut time = vec![Complex::default(); 8];

        processor.fft(&input, &mut freq).unwrap();
        processor.ifft(&freq, &mut time).unwrap();

        for (original, recovered) in input.iter().zip(time.iter()) {
            assert!((original.real - recovered.real).abs() < 1e-10);
            assert!((original.imag - recovered.imag).abs() < 1e-10);
        }
    }

    #[test]
    fn test_single_bin_tone() {
        let config = FftConfig::new(16, 8000.0).unwrap();
        let mut processor = FftProcessor::new(config).unwrap();

        let mut bins = vec![Complex::default(); 16];
        bins[3] = Complex::ONE;
        let mut time = vec![Complex::default(); 16];
        processor.ifft(&bins, &mut time).unwrap();

        let mut back = vec![Complex::default(); 16];
        processor.fft(&time, &mut back).unwrap();
        assert!((back[3].real - 1.0).abs() < 1e-10);
        assert!(back[4].magnitude() < 1e-10);
    }

    #[test]
    fn test_size_mismatch() {
        let config = FftConfig::new(8, 8000.0).unwrap();
        let mut processor = FftProcessor::new(config).unwrap();
        let input = vec![Complex::default(); 4];
        let mut output = vec![Complex::default(); 8];
        assert!(processor.fft(&input, &mut output).is_err());
    }
}
