//! QPSK mapping, hard decisions, and soft demapping to LLRs

use hfdv_core::buffer::Complex;

/// Constellation indexed by `2 * b0 + b1`
pub const QPSK_CONSTELLATION: [Complex; 4] = [
    Complex { real: 1.0, imag: 0.0 },
    Complex { real: 0.0, imag: 1.0 },
    Complex { real: 0.0, imag: -1.0 },
    Complex { real: -1.0, imag: 0.0 },
];

/// Map one bit pair to a constellation point
pub fn qpsk_mod(b0: u8, b1: u8) -> Complex {
    QPSK_CONSTELLATION[(((b0 & 1) << 1) | (b1 & 1)) as usize]
}

/// Map bits to symbols two at a time; an odd trailing bit is paired with 0
pub fn qpsk_map_bits(bits: &[u8]) -> Vec<Complex> {
    bits.chunks(2)
        .map(|pair| qpsk_mod(pair[0], pair.get(1).copied().unwrap_or(0)))
        .collect()
}

/// Hard decision to the nearest constellation point
pub fn qpsk_demod(symbol: Complex) -> [u8; 2] {
    if symbol.real.abs() >= symbol.imag.abs() {
        if symbol.real >= 0.0 { [0, 0] } else { [1, 1] }
    } else if symbol.imag >= 0.0 {
        [0, 1]
    } else {
        [1, 0]
    }
}

/// Hard-decide a run of symbols into bits
pub fn symbols_to_bits(symbols: &[Complex]) -> Vec<u8> {
    symbols.iter().flat_map(|&s| qpsk_demod(s)).collect()
}

/// Jacobian logarithm, `ln(e^a + e^b)`
fn max_star(a: f64, b: f64) -> f64 {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    hi + (-(hi - lo)).exp().ln_1p()
}

/// Convert received symbols and their reliabilities into one LLR per bit.
///
/// `esno` scales the squared distance metric, `amps` are per-symbol fading
/// amplitudes, and `mean_amp` normalizes both. Positive LLRs favour bit 0.
pub fn symbols_to_llrs(symbols: &[Complex], amps: &[f64], esno: f64, mean_amp: f64) -> Vec<f64> {
    let mean_amp = if mean_amp > 0.0 { mean_amp } else { 1.0 };
    let mut llrs = Vec::with_capacity(symbols.len() * 2);

    for (&r, &amp) in symbols.iter().zip(amps) {
        let r = r / mean_amp;
        let mut likelihood = [0.0f64; 4];
        for (l, &point) in likelihood.iter_mut().zip(QPSK_CONSTELLATION.iter()) {
            let e = r - point * (amp / mean_amp);
            *l = -esno * e.norm_sqr();
        }

        for k in 0..2 {
            let mask = 1usize << (1 - k);
            let mut one = f64::NEG_INFINITY;
            let mut zero = f64::NEG_INFINITY;
            for (i, &metric) in likelihood.iter().enumerate() {
                if i & mask != 0 {
                    one = max_star(one, metric);
                } else {
                    zero = max_star(zero, metric);
                }
            }
            llrs.push(zero - one);
        }
    }

    llrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_decision_inverts_mapping() {
        for b0 in 0..2u8 {
            for b1 in 0..2u8 {
                let s = qpsk_mod(b0, b1) * 0.7;
                assert_eq!(qpsk_demod(s), [b0, b1]);
            }
        }
    }

    #[test]
    fn test_symbols_to_bits() {
        let bits = vec![1, 0, 0, 1, 1, 1, 0, 0];
        assert_eq!(symbols_to_bits(&qpsk_map_bits(&bits)), bits);
    }

    #[test]
    fn test_llr_signs_follow_bits() {
        let bits = vec![0, 1, 1, 0, 1, 1, 0, 0];
        let symbols = qpsk_map_bits(&bits);
        let amps = vec![1.0; symbols.len()];
        let llrs = symbols_to_llrs(&symbols, &amps, 3.0, 1.0);

        assert_eq!(llrs.len(), bits.len());
        for (&llr, &bit) in llrs.iter().zip(&bits) {
            if bit == 0 {
                assert!(llr > 1.0, "llr {} for bit 0", llr);
            } else {
                assert!(llr < -1.0, "llr {} for bit 1", llr);
            }
        }
    }

    #[test]
    fn test_llr_scale_invariant_in_amplitude() {
        let symbols = qpsk_map_bits(&[1, 0, 0, 1]);
        let amps = vec![1.0; 2];
        let unit = symbols_to_llrs(&symbols, &amps, 3.0, 1.0);

        let scaled: Vec<Complex> = symbols.iter().map(|&s| s * 0.25).collect();
        let amps = vec![0.25; 2];
        let small = symbols_to_llrs(&scaled, &amps, 3.0, 0.25);

        for (a, b) in unit.iter().zip(&small) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_mean_amp_is_guarded() {
        let llrs = symbols_to_llrs(&[Complex::ZERO], &[0.0], 3.0, 0.0);
        assert!(llrs.iter().all(|l| l.is_finite()));
    }

    #[test]
    fn test_max_star() {
        assert!((max_star(0.0, 0.0) - 2f64.ln()).abs() < 1e-12);
        assert_eq!(max_star(f64::NEG_INFINITY, -3.0), -3.0);
    }
}
