//! # Frame Locator
//!
//! Finds where a fixed-length frame starts inside a bit row and copies it out.

use tracing::debug;

use super::bitrow::BitRow;
use crate::error::{DecodeError, DecodeResult};

/// How a format marks the start of its frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sync {
    /// Frame follows the first occurrence of this byte pattern
    Preamble(&'static [u8]),
    /// Frame starts at a fixed bit index
    Fixed(usize),
}

/// Byte-aligned copy of a frame together with where it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
    bit_offset: usize,
}

impl Frame {
    pub fn new(bytes: Vec<u8>, bit_offset: usize) -> Self {
        Self { bytes, bit_offset }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bit index of the first frame bit within the row
    pub fn bit_offset(&self) -> usize {
        self.bit_offset
    }
}

/// Bit index of the first frame bit for the given sync policy.
///
/// A missing preamble yields an offset past the end of the row.
pub fn frame_offset(row: &BitRow, sync: Sync) -> usize {
    match sync {
        Sync::Preamble(pattern) => {
            let bits = pattern.len() * 8;
            row.search(0, pattern, bits) + bits
        }
        Sync::Fixed(offset) => offset,
    }
}

/// Locate and extract a `frame_len`-byte frame
///
/// # Errors
///
/// Returns `AbortLength` if fewer than `frame_len * 8` bits remain after the offset
pub fn locate(row: &BitRow, sync: Sync, frame_len: usize) -> DecodeResult<Frame> {
    let bit_offset = frame_offset(row, sync);

    if bit_offset + frame_len * 8 > row.bit_count() {
        debug!(
            "short package. Row length: {}. Header index: {}",
            row.bit_count(),
            bit_offset
        );
        return Err(DecodeError::AbortLength);
    }

    Ok(Frame::new(row.extract_bytes(bit_offset, frame_len), bit_offset))
}
