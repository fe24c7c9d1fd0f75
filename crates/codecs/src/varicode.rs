//! Varicode character coding for the text side channel
//!
//! Codewords start and end with a 1 and never contain `00`, so the length of
//! a codeword is implied by its most significant set bit and two zeros
//! always separate consecutive characters.

use crate::{CodecError, Result};
use tracing::warn;

/// Codewords for ASCII 0..=127, transmitted MSB first
const VARICODE: [u16; 128] = [
    0x2AB, 0x2DB, 0x2ED, 0x377, 0x2EB, 0x35F, 0x2EF, 0x2FD,
    0x2FF, 0x0EF, 0x01D, 0x36F, 0x2DD, 0x01F, 0x375, 0x3AB,
    0x2F7, 0x2F5, 0x3AD, 0x3AF, 0x35B, 0x36B, 0x36D, 0x357,
    0x37B, 0x37D, 0x3B7, 0x355, 0x35D, 0x3BB, 0x2FB, 0x37F,
    0x001, 0x1FF, 0x15F, 0x1F5, 0x1DB, 0x2D5, 0x2BB, 0x17F,
    0x0FB, 0x0F7, 0x16F, 0x1DF, 0x075, 0x035, 0x057, 0x1AF,
    0x0B7, 0x0BD, 0x0ED, 0x0FF, 0x177, 0x15B, 0x16B, 0x1AD,
    0x1AB, 0x1B7, 0x0F5, 0x1BD, 0x1ED, 0x055, 0x1D7, 0x2AF,
    0x2BD, 0x07D, 0x0EB, 0x0AD, 0x0B5, 0x077, 0x0DB, 0x0FD,
    0x155, 0x07F, 0x1FD, 0x17D, 0x0D7, 0x0BB, 0x0DD, 0x0AB,
    0x0D5, 0x1DD, 0x0AF, 0x06F, 0x06D, 0x157, 0x1B5, 0x15D,
    0x175, 0x17B, 0x2AD, 0x1EF, 0x1EB, 0x1F7, 0x16D, 0x0BF,
    0x2BF, 0x00B, 0x05F, 0x02F, 0x02D, 0x003, 0x03D, 0x05B,
    0x02B, 0x00D, 0x1FB, 0x2DF, 0x01B, 0x03B, 0x00F, 0x007,
    0x03F, 0x1BF, 0x015, 0x017, 0x005, 0x037, 0x07B, 0x06B,
    0x0DF, 0x05D, 0x1D5, 0x2B7, 0x1BB, 0x2B5, 0x2D7, 0x3B5,
];

/// Longest codeword in the table
pub const MAX_CODE_BITS: u32 = 10;

/// Stateless Varicode lookups
pub struct Varicode;

impl Varicode {
    /// Codeword for an ASCII character
    pub fn code(ch: char) -> Option<u16> {
        if ch.is_ascii() {
            Some(VARICODE[ch as usize])
        } else {
            None
        }
    }

    /// Number of significant bits in a codeword
    pub fn code_len(code: u16) -> u32 {
        16 - code.leading_zeros()
    }

    /// Character for a complete codeword
    pub fn lookup(code: u16) -> Option<char> {
        VARICODE
            .iter()
            .position(|&c| c == code)
            .map(|i| i as u8 as char)
    }

    /// Bits of one character followed by the `00` separator
    pub fn encode_char(ch: char) -> Result<Vec<u8>> {
        let code = Self::code(ch).ok_or(CodecError::UnsupportedCharacter { ch })?;
        let len = Self::code_len(code);
        let mut bits: Vec<u8> = (0..len).rev().map(|i| ((code >> i) & 1) as u8).collect();
        bits.extend_from_slice(&[0, 0]);
        Ok(bits)
    }

    /// Encode a whole string, rejecting non-ASCII text
    pub fn encode_str(text: &str) -> Result<Vec<u8>> {
        let mut bits = Vec::new();
        for ch in text.chars() {
            bits.extend(Self::encode_char(ch)?);
        }
        Ok(bits)
    }
}

/// Feeds text bits into fixed-size frame slots.
///
/// A new character is only requested once every bit of the previous one has
/// been sent. Slots with nothing to send carry 0, which the decoder treats
/// as idle.
#[derive(Debug, Default, Clone)]
pub struct VaricodeEncoder {
    pending: Vec<u8>,
    cursor: usize,
}

impl VaricodeEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bits of the current character still waiting to be sent
    pub fn remaining(&self) -> usize {
        self.pending.len() - self.cursor
    }

    /// Queue a character, replacing anything left of the previous one
    pub fn load(&mut self, ch: char) -> Result<()> {
        let bits = Varicode::encode_char(ch)?;
        self.pending = bits;
        self.cursor = 0;
        Ok(())
    }

    /// Produce the next text bit, calling `fetch` when a new character is due
    pub fn next_bit<F>(&mut self, mut fetch: F) -> u8
    where
        F: FnMut() -> Option<char>,
    {
        if self.remaining() == 0 {
            self.pending.clear();
            self.cursor = 0;
            if let Some(ch) = fetch() {
                if let Err(e) = self.load(ch) {
                    warn!("Dropping text character: {}", e);
                }
            }
        }

        match self.pending.get(self.cursor) {
            Some(&bit) => {
                self.cursor += 1;
                bit
            }
            None => 0,
        }
    }

    /// Fill every slot in `slots`
    pub fn fill<F>(&mut self, slots: &mut [u8], mut fetch: F)
    where
        F: FnMut() -> Option<char>,
    {
        for slot in slots.iter_mut() {
            *slot = self.next_bit(&mut fetch);
        }
    }

    pub fn reset(&mut self) {
        self.pending.clear();
        self.cursor = 0;
    }
}

/// Bit-at-a-time Varicode decoder
#[derive(Debug, Default, Clone)]
pub struct VaricodeDecoder {
    shift: u16,
    nbits: u32,
    zeros: u32,
    overrun: bool,
}

impl VaricodeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one received bit, returning a character when one completes
    pub fn push_bit(&mut self, bit: u8) -> Option<char> {
        if bit & 1 == 1 {
            // A lone zero is part of the codeword only once one has started
            if self.zeros == 1 && self.nbits > 0 {
                self.append(0);
            }
            self.zeros = 0;
            self.append(1);
            return None;
        }

        self.zeros += 1;
        if self.zeros < 2 {
            return None;
        }

        let decoded = if self.nbits > 0 && !self.overrun {
            Varicode::lookup(self.shift)
        } else {
            None
        };
        self.reset();
        decoded
    }

    /// Push a run of bits, collecting every completed character
    pub fn push_bits(&mut self, bits: &[u8]) -> String {
        bits.iter().filter_map(|&b| self.push_bit(b)).collect()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn append(&mut self, bit: u16) {
        if self.nbits >= MAX_CODE_BITS {
            self.overrun = true;
            return;
        }
        self.shift = (self.shift << 1) | bit;
        self.nbits += 1;
    }
}
