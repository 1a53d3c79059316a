//! # Checksums
//!
//! CRC-8 and byte-sum checks shared by every Fine Offset frame format.
//!
//! **Polynomial**: 0x31 (x^8 + x^5 + x^4 + 1)
//! **Initial Value**: 0x00, MSB first, no final XOR

/// CRC-8 polynomial used by all Fine Offset sensors
pub const CRC8_POLY: u8 = 0x31;

/// Precomputed CRC8 lookup table for fast calculation
const CRC8_TABLE: [u8; 256] = generate_crc8_table();

/// Generate CRC8 lookup table at compile time
const fn generate_crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u8;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate CRC-8 (poly 0x31, init 0x00) using lookup table
///
/// # Examples
///
/// ```
/// use fineoffset_decoder::fineoffset::crc::crc8;
///
/// // WH0530 capture: CRC over the first six bytes sits in the seventh
/// let frame = [0x38, 0xa2, 0x8f, 0x02, 0x00, 0xff, 0xe7];
/// assert_eq!(crc8(&frame[..6]), 0xe7);
/// assert_eq!(crc8(&frame), 0x00);
/// ```
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;

    for &byte in data {
        crc = CRC8_TABLE[(crc ^ byte) as usize];
    }

    crc
}

/// Bitwise CRC-8, used to check the lookup table
#[cfg(test)]
fn crc8_slow(data: &[u8]) -> u8 {
    let mut crc: u8 = 0;

    for &byte in data {
        crc ^= byte;

        for _ in 0..8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}

/// Sum of all bytes modulo 256
pub fn add_bytes(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// XOR of all bytes with the two nibbles swapped
pub fn xor_bytes_swapped(data: &[u8]) -> u8 {
    let xor = data.iter().fold(0u8, |acc, &b| acc ^ b);
    xor.rotate_left(4)
}
