//! Bit helpers: error counting, packing, and the reference test payload.
//!
//! Bits are carried one per `u8` (values 0 or 1) throughout the modem.

/// Count positions where two bit slices differ, over their common length
pub fn count_errors(expected: &[u8], received: &[u8]) -> usize {
    expected
        .iter()
        .zip(received)
        .filter(|(a, b)| (**a & 1) != (**b & 1))
        .count()
}

/// Pack one-bit-per-byte values MSB first; the last byte is zero padded
pub fn pack_bits(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | ((bit & 1) << (7 - i)))
        })
        .collect()
}

/// Unpack bytes MSB first into `nbits` one-bit-per-byte values
pub fn unpack_bits(bytes: &[u8], nbits: usize) -> Vec<u8> {
    let mut bits = Vec::with_capacity(nbits);
    for &byte in bytes {
        for i in (0..8).rev() {
            if bits.len() == nbits {
                return bits;
            }
            bits.push((byte >> i) & 1);
        }
    }
    bits.resize(nbits, 0);
    bits
}

/// Generator for the known payload sent in test-frame mode.
///
/// Both ends regenerate the same sequence from a fixed seed for every frame.
#[derive(Debug, Clone)]
pub struct TestFrameGenerator {
    seed: u32,
}

impl TestFrameGenerator {
    pub const SEED: u32 = 1;

    pub fn new() -> Self {
        Self { seed: Self::SEED }
    }

    fn next_rand(&mut self) -> u32 {
        self.seed = (1_103_515_245u32
            .wrapping_mul(self.seed)
            .wrapping_add(12_345))
            % 32_768;
        self.seed
    }

    /// Generate `nbits` reference payload bits
    pub fn payload(nbits: usize) -> Vec<u8> {
        let mut generator = Self::new();
        (0..nbits)
            .map(|_| u8::from(generator.next_rand() > 16_384))
            .collect()
    }
}

impl Default for TestFrameGenerator {
    fn default() -> Self {
        Self::new()
    }
}
