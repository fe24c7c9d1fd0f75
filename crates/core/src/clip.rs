//! Output amplitude scaling and peak clipping

use crate::buffer::Complex;

/// Multiply every sample by a fixed gain
pub fn scale_samples(samples: &mut [Complex], gain: f64) {
    for s in samples.iter_mut() {
        *s = *s * gain;
    }
}

/// Hard-limit sample magnitudes to `threshold`, preserving phase.
///
/// Returns the number of samples that were clipped.
pub fn clip_peaks(samples: &mut [Complex], threshold: f64) -> usize {
    let mut clipped = 0;
    for s in samples.iter_mut() {
        let mag = s.magnitude();
        if mag > threshold {
            *s = *s * (threshold / mag);
            clipped += 1;
        }
    }
    clipped
}
