//! # Variant Classifier
//!
//! Pure decision tables mapping a bit row to the wire format that produced it.
//!
//! Length ranges are checked first, header bytes second, and where several
//! products share a frame geometry the ties are broken in a fixed order:
//!
//! | Family   | bit count       | header                        | variant            |
//! |----------|-----------------|-------------------------------|--------------------|
//! | WH2      | 48              | `byte0 == FF`                 | WH2                |
//! | WH2      | 55              | `byte0 == FE`                 | WH2A               |
//! | WH2      | 47              | `byte0 == FE`                 | WH5                |
//! | WH2      | 49              | `byte0 == FF`, `byte1.7 == 1` | Telldus            |
//! | WH0530   | 63              | 7x1, type 3                   | Alecto v1          |
//! | WH0530   | 95              | 7x1, type 3 / type 0x52       | Alecto v2 / DCF    |
//! | WH0530   | 71              | 7x1, type 3                   | WH0530             |
//! | WH25     | < 160           | preamble                      | WH0290             |
//! | WH25     | 160..190, > 510 | msg `E` / `D`                 | WH32B / WH32       |
//! | WH25     | 190..440        | see WH24                      | WH24 / WH65B       |
//! | WH25     | 440..=510       | msg `E`                       | WH25               |
//! | WH51     | >= 120          | family `0x51`                 | WH51               |

use tracing::debug;

use super::bitrow::BitRow;
use super::locator::{locate, Frame, Sync};
use super::protocol::*;
use crate::error::{DecodeError, DecodeResult};

/// Header index below which a short-tailed 17-byte frame is a WH24
pub const WH24_MAX_HEADER_INDEX: usize = 61;

/// Trailing bits below which a 17-byte frame may be a WH24
pub const WH24_MAX_TRAILING_BITS: usize = 8;

/// A located frame and the variant it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub variant: Variant,
    pub frame: Frame,
}

impl Classification {
    fn locate(row: &BitRow, variant: Variant, sync: Sync) -> DecodeResult<Self> {
        let frame = locate(row, sync, variant.frame_len())?;
        Ok(Self { variant, frame })
    }
}

const FSK_SYNC: Sync = Sync::Preamble(&FSK_PREAMBLE);

/// Classify a row with the decision table of the given entry point
pub fn classify(family: Family, row: &BitRow) -> DecodeResult<Classification> {
    match family {
        Family::Wh2 => classify_wh2(row),
        Family::Wh25 => classify_wh25(row),
        Family::Wh51 => classify_wh51(row),
        Family::Wh0530 => classify_wh0530(row),
    }
}

/// WH2, WH2A, WH5 and Telldus, told apart by exact length and first byte
pub fn classify_wh2(row: &BitRow) -> DecodeResult<Classification> {
    let b0 = row.byte(0);
    let b1 = row.byte(1);

    let (variant, offset) = match row.bit_count() {
        48 if b0 == 0xFF => (Variant::Wh2, 8),
        55 if b0 == 0xFE => (Variant::Wh2a, 7),
        47 if b0 == 0xFE => (Variant::Wh5, 7),
        49 if b0 == 0xFF && b1 & 0x80 == 0x80 => (Variant::Telldus, 9),
        _ => return Err(DecodeError::AbortLength),
    };

    Classification::locate(row, variant, Sync::Fixed(offset))
}

/// Seven 1-bits followed by the 0x3 type nibble
fn has_alecto_header(row: &BitRow) -> bool {
    row.byte(0) >> 1 == 0x7F && row.byte(1) >> 5 == ALECTO_TYPE_NIBBLE
}

/// Seven 1-bits followed by the 0x52 radio-clock type byte
fn has_alecto_dcf_header(row: &BitRow) -> bool {
    row.byte(0) >> 1 == 0x7F && row.byte(1) >> 1 == ALECTO_DCF_TYPE
}

/// WH0530, forwarding the Alecto lengths to their own tables
pub fn classify_wh0530(row: &BitRow) -> DecodeResult<Classification> {
    match row.bit_count() {
        63 => return classify_alecto_v1(row),
        95 => return classify_alecto_v2(row),
        71 => {}
        _ => return Err(DecodeError::AbortLength),
    }

    if !has_alecto_header(row) {
        return Err(DecodeError::AbortEarly);
    }

    Classification::locate(row, Variant::Wh0530, Sync::Fixed(PWM_PREAMBLE_OFFSET))
}

/// Alecto WS-1200 v1: 63 bits with the type nibble
pub fn classify_alecto_v1(row: &BitRow) -> DecodeResult<Classification> {
    if row.bit_count() != 63 || !has_alecto_header(row) {
        return Err(DecodeError::AbortLength);
    }

    Classification::locate(row, Variant::AlectoV1, Sync::Fixed(PWM_PREAMBLE_OFFSET))
}

/// Alecto WS-1200 v2: 95 bits, sensor frame by type nibble, else radio clock by type byte
pub fn classify_alecto_v2(row: &BitRow) -> DecodeResult<Classification> {
    if row.bit_count() != 95 {
        return Err(DecodeError::AbortLength);
    }

    let variant = if has_alecto_header(row) {
        Variant::AlectoV2
    } else if has_alecto_dcf_header(row) {
        Variant::AlectoV2Dcf
    } else {
        return Err(DecodeError::AbortLength);
    };

    Classification::locate(row, variant, Sync::Fixed(PWM_PREAMBLE_OFFSET))
}

/// WH24 / WH65B outdoor unit, 190 to 215 bits.
///
/// Both products send the same 17-byte payload. A row with less than a byte
/// of trailing bits and a header found before bit 61 is a WH24, anything
/// else a WH65B.
pub fn classify_wh24(row: &BitRow) -> DecodeResult<Classification> {
    let bits = row.bit_count();
    if !(190..=215).contains(&bits) {
        return Err(DecodeError::AbortLength);
    }

    let located = Classification::locate(row, Variant::Wh24, FSK_SYNC)?;
    let bit_offset = located.frame.bit_offset();
    let trailing_bits = bits - bit_offset - located.frame.bytes().len() * 8;

    let variant = if trailing_bits < WH24_MAX_TRAILING_BITS && bit_offset < WH24_MAX_HEADER_INDEX {
        Variant::Wh24
    } else {
        Variant::Wh65b
    };

    debug!(
        "Raw @ bit_offset [{}]: {:02x?}",
        bit_offset,
        located.frame.bytes()
    );

    if located.frame.bytes()[0] != WH24_FAMILY_CODE {
        return Err(DecodeError::FailSanity);
    }

    Ok(Classification {
        variant,
        frame: located.frame,
    })
}

/// WH0290 particulate matter sensor
pub fn classify_wh0290(row: &BitRow) -> DecodeResult<Classification> {
    Classification::locate(row, Variant::Wh0290, FSK_SYNC)
}

/// WH25 umbrella: routes by length, then settles WH25/WH32/WH32B by message type
pub fn classify_wh25(row: &BitRow) -> DecodeResult<Classification> {
    let bits = row.bit_count();

    let mut variant = if bits < 160 {
        return classify_wh0290(row);
    } else if bits < 190 {
        Variant::Wh32b
    } else if bits < 440 {
        return classify_wh24(row);
    } else if bits > 510 {
        Variant::Wh32b
    } else {
        Variant::Wh25
    };

    let located = Classification::locate(row, variant, FSK_SYNC)?;
    let b0 = located.frame.bytes()[0];
    debug!("Packet: {:02x?}", located.frame.bytes());

    let msg_type = b0 & 0xF0;
    if variant == Variant::Wh32b && msg_type == WH32_MSG_TYPE {
        variant = Variant::Wh32;
    } else if msg_type != WH25_MSG_TYPE {
        debug!("Msg type unknown: {:02x}", b0);
        if b0 == WH0290_FAMILY_CODE {
            return classify_wh0290(row);
        }
        return Err(DecodeError::AbortEarly);
    }

    Ok(Classification {
        variant,
        frame: located.frame,
    })
}

/// WH51 soil moisture sensor
pub fn classify_wh51(row: &BitRow) -> DecodeResult<Classification> {
    if row.bit_count() < 120 {
        return Err(DecodeError::AbortLength);
    }

    let located = Classification::locate(row, Variant::Wh51, FSK_SYNC)?;

    let b0 = located.frame.bytes()[0];
    if b0 != WH51_FAMILY_CODE {
        debug!("Msg family unknown: {:02x}", b0);
        return Err(DecodeError::AbortEarly);
    }

    Ok(located)
}
