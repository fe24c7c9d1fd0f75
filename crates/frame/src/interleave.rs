//! Interleaving for burst error mitigation
//!
//! Coded symbols from several physical frames are interleaved together so a
//! fade that wipes out part of one frame is spread over every codeword.

use crate::{FrameError, Result};

/// Generic interleaver trait
pub trait Interleaver {
    /// Number of elements permuted per block
    fn block_size(&self) -> usize;

    /// Interleave data to spread errors
    fn interleave<T: Copy + Default>(&self, data: &[T]) -> Result<Vec<T>>;

    /// Deinterleave data to concentrate errors
    fn deinterleave<T: Copy + Default>(&self, data: &[T]) -> Result<Vec<T>>;
}

/// Golden-prime interleaver.
///
/// Element `i` is moved to position `(b * i) mod N`, where `b` is the first
/// prime above `N / 1.62` that does not divide `N`.
#[derive(Debug, Clone)]
pub struct GoldenPrimeInterleaver {
    b: usize,
    /// `positions[i] = (b * i) mod N`
    positions: Vec<usize>,
}

impl GoldenPrimeInterleaver {
    /// Create a new interleaver over blocks of `block_size` elements
    pub fn new(block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(FrameError::InterleavingError {
                msg: "Interleaver block size must be greater than 0".to_string(),
            });
        }

        let b = Self::choose_b(block_size);
        let positions = (0..block_size).map(|i| (b * i) % block_size).collect();

        Ok(Self { b, positions })
    }

    /// Interleaver step for a block of `n` elements
    pub fn choose_b(n: usize) -> usize {
        let mut candidate = (n as f64 / 1.62).floor() as usize + 1;
        loop {
            if is_prime(candidate) && n % candidate != 0 {
                return candidate;
            }
            candidate += 1;
        }
    }

    pub fn step(&self) -> usize {
        self.b
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.positions.len() {
            return Err(FrameError::SizeMismatch {
                expected: self.positions.len(),
                actual: len,
            });
        }
        Ok(())
    }

    /// Interleave into a caller-provided buffer of the same block size
    pub fn interleave_into<T: Copy>(&self, input: &[T], output: &mut [T]) {
        debug_assert_eq!(input.len(), self.positions.len());
        debug_assert_eq!(output.len(), self.positions.len());
        for (&pos, &value) in self.positions.iter().zip(input) {
            output[pos] = value;
        }
    }

    /// Deinterleave into a caller-provided buffer of the same block size
    pub fn deinterleave_into<T: Copy>(&self, input: &[T], output: &mut [T]) {
        debug_assert_eq!(input.len(), self.positions.len());
        debug_assert_eq!(output.len(), self.positions.len());
        for (out, &pos) in output.iter_mut().zip(&self.positions) {
            *out = input[pos];
        }
    }
}

impl Interleaver for GoldenPrimeInterleaver {
    fn block_size(&self) -> usize {
        self.positions.len()
    }

    fn interleave<T: Copy + Default>(&self, data: &[T]) -> Result<Vec<T>> {
        self.check_len(data.len())?;
        let mut result = vec![T::default(); data.len()];
        self.interleave_into(data, &mut result);
        Ok(result)
    }

    fn deinterleave<T: Copy + Default>(&self, data: &[T]) -> Result<Vec<T>> {
        self.check_len(data.len())?;
        let mut result = vec![T::default(); data.len()];
        self.deinterleave_into(data, &mut result);
        Ok(result)
    }
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_choose_b() {
        // 100 / 1.62 = 61.7 -> 67 (62..66 are not prime)
        assert_eq!(GoldenPrimeInterleaver::choose_b(100), 67);
        // 7 / 1.62 = 4.3 -> 5
        assert_eq!(GoldenPrimeInterleaver::choose_b(7), 5);
        // 10 / 1.62 = 6.2 -> 7
        assert_eq!(GoldenPrimeInterleaver::choose_b(10), 7);
    }

    #[test]
    fn test_interleaver_pattern() {
        let interleaver = GoldenPrimeInterleaver::new(4).unwrap();
        // 4 / 1.62 = 2.47 -> 3
        assert_eq!(interleaver.step(), 3);
        let interleaved = interleaver.interleave(&[0, 1, 2, 3]).unwrap();
        assert_eq!(interleaved, vec![0, 3, 2, 1]);
    }

    #[test]
    fn test_roundtrip() {
        let interleaver = GoldenPrimeInterleaver::new(512).unwrap();
        let data: Vec<u32> = (0..512).collect();
        let interleaved = interleaver.interleave(&data).unwrap();
        assert_ne!(interleaved, data);
        assert_eq!(interleaver.deinterleave(&interleaved).unwrap(), data);
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(GoldenPrimeInterleaver::new(0).is_err());
        let interleaver = GoldenPrimeInterleaver::new(8).unwrap();
        assert!(interleaver.interleave(&[1u8; 7]).is_err());
    }

    #[quickcheck]
    fn prop_deinterleave_inverts_interleave(len: u16) -> bool {
        let n = (len as usize % 2000) + 1;
        let interleaver = GoldenPrimeInterleaver::new(n).unwrap();
        let data: Vec<usize> = (0..n).collect();
        let interleaved = interleaver.interleave(&data).unwrap();
        interleaver.deinterleave(&interleaved).unwrap() == data
    }
}
