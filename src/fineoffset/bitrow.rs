//! # Bit Rows
//!
//! A demodulated row of bits, as handed over by the upstream pulse decoder.
//! Bits are stored MSB first; only the first `bit_count` bits are meaningful.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// One demodulated row of bits
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitRow {
    bytes: Vec<u8>,
    bit_count: usize,
}

impl BitRow {
    /// Create a row from a byte buffer and the number of valid bits
    ///
    /// # Errors
    ///
    /// Returns error if the buffer holds fewer than `bit_count` bits
    pub fn new(bytes: Vec<u8>, bit_count: usize) -> Result<Self> {
        if bytes.len() * 8 < bit_count {
            return Err(Error::InvalidRow(format!(
                "{} bits do not fit in {} bytes",
                bit_count,
                bytes.len()
            )));
        }

        Ok(Self { bytes, bit_count })
    }

    /// Create a row where every bit of `bytes` is valid
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            bit_count: bytes.len() * 8,
        }
    }

    /// Number of valid bits
    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Underlying buffer, including padding bits
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Raw buffer byte at `index`, or 0 past the end of the buffer
    pub fn byte(&self, index: usize) -> u8 {
        self.bytes.get(index).copied().unwrap_or(0)
    }

    /// Bit at `index` (MSB first), or `false` past the end of the buffer
    pub fn bit(&self, index: usize) -> bool {
        (self.byte(index / 8) >> (7 - index % 8)) & 1 == 1
    }

    /// Find the first position at or after `start` where the first
    /// `pattern_bits` bits of `pattern` occur.
    ///
    /// Returns `bit_count()` when the pattern is not found, so that adding the
    /// pattern length always lands past the end of the row.
    pub fn search(&self, start: usize, pattern: &[u8], pattern_bits: usize) -> usize {
        let pattern_bit = |i: usize| (pattern[i / 8] >> (7 - i % 8)) & 1 == 1;

        let mut pos = start;
        while pos + pattern_bits <= self.bit_count {
            if (0..pattern_bits).all(|i| self.bit(pos + i) == pattern_bit(i)) {
                return pos;
            }
            pos += 1;
        }

        self.bit_count
    }

    /// Copy `len` bytes starting at an arbitrary bit offset
    pub fn extract_bytes(&self, bit_offset: usize, len: usize) -> Vec<u8> {
        (0..len)
            .map(|n| {
                (0..8).fold(0u8, |acc, i| {
                    (acc << 1) | self.bit(bit_offset + n * 8 + i) as u8
                })
            })
            .collect()
    }
}

impl fmt::Display for BitRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.bit_count)?;
        for byte in &self.bytes[..(self.bit_count + 7) / 8] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Parse the `{N}hexdigits` capture notation.
///
/// Without the `{N}` prefix every hex digit counts as four bits.
impl FromStr for BitRow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let text: String = s.chars().filter(|c| !c.is_whitespace()).collect();

        let (declared_bits, hex) = match text.strip_prefix('{') {
            Some(rest) => {
                let (count, hex) = rest.split_once('}').ok_or_else(|| {
                    Error::InvalidRow(format!("unterminated bit count in {:?}", s))
                })?;
                let bits = count
                    .parse::<usize>()
                    .map_err(|e| Error::InvalidRow(format!("bad bit count {:?}: {}", count, e)))?;
                (Some(bits), hex)
            }
            None => (None, text.as_str()),
        };

        let mut nibbles = Vec::with_capacity(hex.len());
        for c in hex.chars() {
            let nibble = c
                .to_digit(16)
                .ok_or_else(|| Error::InvalidRow(format!("invalid hex digit {:?}", c)))?;
            nibbles.push(nibble as u8);
        }

        let bit_count = declared_bits.unwrap_or(nibbles.len() * 4);
        let bytes = nibbles
            .chunks(2)
            .map(|pair| (pair[0] << 4) | pair.get(1).copied().unwrap_or(0))
            .collect();

        BitRow::new(bytes, bit_count)
    }
}

/// Assemble rows bit by bit, MSB first.
///
/// Useful for replaying captures with odd preambles and for building test rows.
#[derive(Debug, Clone, Default)]
pub struct BitRowBuilder {
    bytes: Vec<u8>,
    bit_count: usize,
}

impl BitRowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single bit
    pub fn push_bit(&mut self, bit: bool) -> &mut Self {
        if self.bit_count % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 0x80 >> (self.bit_count % 8);
        }
        self.bit_count += 1;
        self
    }

    /// Append the low `count` bits of `value`, MSB first.
    ///
    /// Counts above 64 are zero-extended on the left.
    pub fn push_bits(&mut self, value: u64, count: usize) -> &mut Self {
        for i in (0..count).rev() {
            let bit = u32::try_from(i)
                .ok()
                .and_then(|shift| value.checked_shr(shift))
                .unwrap_or(0);
            self.push_bit(bit & 1 == 1);
        }
        self
    }

    /// Append whole bytes at the current (possibly unaligned) position
    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        for &byte in bytes {
            self.push_bits(byte as u64, 8);
        }
        self
    }

    pub fn build(&self) -> BitRow {
        BitRow {
            bytes: self.bytes.clone(),
            bit_count: self.bit_count,
        }
    }
}
