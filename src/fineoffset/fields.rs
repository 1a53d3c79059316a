//! # Field Decoding
//!
//! Every physical field is described by a [`FieldSpec`]: which bits make up
//! the raw value, how the raw value maps to a physical value, and which raw
//! value means "not measured". One generic routine evaluates the specs, so the
//! per-variant knowledge lives entirely in the layout tables at the bottom of
//! this module.

use super::protocol::Variant;
use super::record::Value;

/// Masked bits of one frame byte, shifted into place.
///
/// Positive `shift` moves left, negative moves right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitPart {
    pub byte: usize,
    pub mask: u8,
    pub shift: i8,
}

pub const fn part(byte: usize, mask: u8, shift: i8) -> BitPart {
    BitPart { byte, mask, shift }
}

/// How a raw value becomes a physical value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Encoding {
    /// `raw * mul / div`, integer arithmetic
    Integer { mul: i64, div: i64 },
    /// Low-battery bit turned into `battery_ok`
    InvertedFlag,
    /// `(raw + offset) * scale`
    Linear { offset: f64, scale: f64 },
    /// Top bit is the sign, remaining bits the magnitude, times `scale`
    SignMagnitude { sign_mask: u64, scale: f64 },
    /// UV irradiance to UV index via [`UVI_UPPER`]
    UvIndex,
    /// Lowercase, zero-padded hex string
    Hex { digits: usize },
    /// Six BCD bytes YY MM DD hh mm ss
    RadioClock,
}

impl Encoding {
    pub fn apply(self, raw: u64) -> Value {
        match self {
            Encoding::Integer { mul, div } => Value::Int(raw as i64 * mul / div),
            Encoding::InvertedFlag => Value::Int((raw == 0) as i64),
            Encoding::Linear { offset, scale } => Value::Float((raw as f64 + offset) * scale),
            Encoding::SignMagnitude { sign_mask, scale } => {
                let magnitude = (raw & !sign_mask) as f64;
                let signed = if raw & sign_mask != 0 { -magnitude } else { magnitude };
                Value::Float(signed * scale)
            }
            Encoding::UvIndex => Value::Int(uv_index(raw) as i64),
            Encoding::Hex { digits } => Value::String(format!("{:0width$x}", raw, width = digits)),
            Encoding::RadioClock => {
                let digit = |n: u32| (raw >> (40 - 8 * n)) & 0xFF;
                Value::String(format!(
                    "{:04x}-{:02x}-{:02x}T{:02x}:{:02x}:{:02x}",
                    0x2000 + digit(0),
                    digit(1),
                    digit(2),
                    digit(3),
                    digit(4),
                    digit(5)
                ))
            }
        }
    }
}

/// Declarative description of one output field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub parts: &'static [BitPart],
    pub encoding: Encoding,
    /// Raw value meaning "not measured"; the field is omitted
    pub sentinel: Option<u64>,
    pub unit: &'static str,
}

const INT: Encoding = Encoding::Integer { mul: 1, div: 1 };

const fn spec(
    name: &'static str,
    parts: &'static [BitPart],
    encoding: Encoding,
    unit: &'static str,
) -> FieldSpec {
    FieldSpec {
        name,
        parts,
        encoding,
        sentinel: None,
        unit,
    }
}

const fn linear(
    name: &'static str,
    parts: &'static [BitPart],
    offset: f64,
    scale: f64,
    unit: &'static str,
) -> FieldSpec {
    spec(name, parts, Encoding::Linear { offset, scale }, unit)
}

/// Assemble the raw value from its bit parts
pub fn unpack(frame: &[u8], parts: &[BitPart]) -> u64 {
    parts.iter().fold(0u64, |acc, p| {
        let bits = (frame[p.byte] & p.mask) as u64;
        let shifted = if p.shift >= 0 {
            bits << p.shift.unsigned_abs()
        } else {
            bits >> p.shift.unsigned_abs()
        };
        acc | shifted
    })
}

/// Decode one field, `None` when the raw value is the field's sentinel
pub fn decode_field(spec: &FieldSpec, frame: &[u8]) -> Option<Value> {
    let raw = unpack(frame, spec.parts);
    if spec.sentinel == Some(raw) {
        return None;
    }
    Some(spec.encoding.apply(raw))
}

/// Upper UV irradiance bound of each UV index step
pub const UVI_UPPER: [u64; 13] = [
    432, 851, 1210, 1570, 2017, 2450, 2761, 3100, 3512, 3918, 4277, 4650, 5029,
];

/// UV index 0..=13: the number of thresholds strictly below `uv_raw`
pub fn uv_index(uv_raw: u64) -> u8 {
    UVI_UPPER.iter().take_while(|&&upper| upper < uv_raw).count() as u8
}

/// Degrees of the 16 compass points, N = 0, clockwise
pub const WIND_DIR_DEGREES: [u16; 16] = [
    0, 23, 45, 68, 90, 113, 135, 158, 180, 203, 225, 248, 270, 293, 315, 338,
];

/// Legacy 4-bit wind direction code to degrees
pub fn compass_to_degrees(code: u8) -> u16 {
    WIND_DIR_DEGREES[(code & 0x0F) as usize]
}

// Calibration of the WH24/WH65B outdoor unit
pub const WH24_WIND_FACTOR: f64 = 1.12;
pub const WH65B_WIND_FACTOR: f64 = 0.51;
pub const WH24_RAIN_STEP_MM: f64 = 0.3;
pub const WH65B_RAIN_STEP_MM: f64 = 0.254;

/// Rain bucket size of the PWM family
pub const PWM_RAIN_STEP_MM: f64 = 0.3;

const ID_NIBBLES: &[BitPart] = &[part(0, 0x0F, 4), part(1, 0xF0, -4)];
const BATTERY_LOW_B1: &[BitPart] = &[part(1, 0x08, -3)];
const TEMP_11: &[BitPart] = &[part(1, 0x07, 8), part(2, 0xFF, 0)];
const TEMP_12: &[BitPart] = &[part(1, 0x0F, 8), part(2, 0xFF, 0)];
const HUMIDITY_B3: &[BitPart] = &[part(3, 0xFF, 0)];
const RAIN_LE: &[BitPart] = &[part(4, 0xFF, 8), part(3, 0xFF, 0)];

const HUMIDITY: FieldSpec = FieldSpec {
    sentinel: Some(0xFF),
    ..spec("humidity", HUMIDITY_B3, INT, "%")
};

static WH2_FIELDS: [FieldSpec; 3] = [
    spec("id", ID_NIBBLES, INT, ""),
    spec(
        "temperature_C",
        TEMP_12,
        Encoding::SignMagnitude { sign_mask: 0x800, scale: 0.1 },
        "C",
    ),
    HUMIDITY,
];

static WH5_FIELDS: [FieldSpec; 3] = [
    spec("id", ID_NIBBLES, INT, ""),
    linear("temperature_C", TEMP_12, -400.0, 0.1, "C"),
    HUMIDITY,
];

/// WH0530 and Alecto v1/v2 share one layout
static PWM_RAIN_FIELDS: [FieldSpec; 4] = [
    spec("id", ID_NIBBLES, INT, ""),
    spec("battery_ok", BATTERY_LOW_B1, Encoding::InvertedFlag, ""),
    linear("temperature_C", TEMP_11, -400.0, 0.1, "C"),
    linear("rain_mm", RAIN_LE, 0.0, PWM_RAIN_STEP_MM, "mm"),
];

const DCF_BATTERY_LOW: &[BitPart] = &[part(2, 0x80, -7)];
// Clock digits end at b8: b9 holds the CRC-8 trailer and b10 the byte sum
const DCF_CLOCK: &[BitPart] = &[
    part(3, 0xFF, 40),
    part(4, 0xFF, 32),
    part(5, 0xFF, 24),
    part(6, 0xFF, 16),
    part(7, 0xFF, 8),
    part(8, 0xFF, 0),
];

static ALECTO_DCF_FIELDS: [FieldSpec; 3] = [
    spec("id", B1, INT, ""),
    spec("battery_ok", DCF_BATTERY_LOW, Encoding::InvertedFlag, ""),
    spec("radio_clock", DCF_CLOCK, Encoding::RadioClock, ""),
];

const B1: &[BitPart] = &[part(1, 0xFF, 0)];
const WH24_BATTERY_LOW: &[BitPart] = &[part(3, 0x08, -3)];
const WH24_TEMP: &[BitPart] = &[part(3, 0x07, 8), part(4, 0xFF, 0)];
const WH24_HUMIDITY: &[BitPart] = &[part(5, 0xFF, 0)];
const WH24_WIND_DIR: &[BitPart] = &[part(2, 0xFF, 0), part(3, 0x80, 1)];
const WH24_WIND_SPEED: &[BitPart] = &[part(6, 0xFF, 0), part(3, 0x10, 4)];
const WH24_GUST: &[BitPart] = &[part(7, 0xFF, 0)];
const WH24_RAIN: &[BitPart] = &[part(8, 0xFF, 8), part(9, 0xFF, 0)];
const WH24_UV: &[BitPart] = &[part(10, 0xFF, 8), part(11, 0xFF, 0)];
const WH24_LIGHT: &[BitPart] = &[part(12, 0xFF, 16), part(13, 0xFF, 8), part(14, 0xFF, 0)];

const fn wh24_layout(wind_scale: f64, gust_scale: f64, rain_scale: f64) -> [FieldSpec; 11] {
    [
        spec("id", B1, INT, ""),
        spec("battery_ok", WH24_BATTERY_LOW, Encoding::InvertedFlag, ""),
        FieldSpec {
            sentinel: Some(0x7FF),
            ..linear("temperature_C", WH24_TEMP, -400.0, 0.1, "C")
        },
        FieldSpec {
            sentinel: Some(0xFF),
            ..spec("humidity", WH24_HUMIDITY, INT, "%")
        },
        FieldSpec {
            sentinel: Some(0x1FF),
            ..spec("wind_dir_deg", WH24_WIND_DIR, INT, "deg")
        },
        FieldSpec {
            sentinel: Some(0x1FF),
            ..linear("wind_avg_m_s", WH24_WIND_SPEED, 0.0, wind_scale, "m/s")
        },
        FieldSpec {
            sentinel: Some(0xFF),
            ..linear("wind_max_m_s", WH24_GUST, 0.0, gust_scale, "m/s")
        },
        linear("rain_mm", WH24_RAIN, 0.0, rain_scale, "mm"),
        FieldSpec {
            sentinel: Some(0xFFFF),
            ..spec("uv", WH24_UV, INT, "")
        },
        FieldSpec {
            sentinel: Some(0xFFFF),
            ..spec("uvi", WH24_UV, Encoding::UvIndex, "")
        },
        FieldSpec {
            sentinel: Some(0xFF_FFFF),
            ..linear("light_lux", WH24_LIGHT, 0.0, 0.1, "lux")
        },
    ]
}

static WH24_FIELDS: [FieldSpec; 11] = wh24_layout(
    0.125 * WH24_WIND_FACTOR,
    WH24_WIND_FACTOR,
    WH24_RAIN_STEP_MM,
);

static WH65B_FIELDS: [FieldSpec; 11] = wh24_layout(
    0.125 * WH65B_WIND_FACTOR,
    WH65B_WIND_FACTOR,
    WH65B_RAIN_STEP_MM,
);

const WH25_TEMP: &[BitPart] = &[part(1, 0x03, 8), part(2, 0xFF, 0)];
const WH25_PRESSURE: &[BitPart] = &[part(4, 0xFF, 8), part(5, 0xFF, 0)];

static WH25_FIELDS: [FieldSpec; 5] = [
    spec("id", ID_NIBBLES, INT, ""),
    spec("battery_ok", BATTERY_LOW_B1, Encoding::InvertedFlag, ""),
    linear("temperature_C", WH25_TEMP, -400.0, 0.1, "C"),
    spec("humidity", HUMIDITY_B3, INT, "%"),
    FieldSpec {
        sentinel: Some(0xFFFF),
        ..linear("pressure_hPa", WH25_PRESSURE, 0.0, 0.1, "hPa")
    },
];

const PM_DECI: Encoding = Encoding::Integer { mul: 1, div: 10 };
const WH0290_BATTERY_BARS: &[BitPart] = &[part(2, 0x40, -4), part(4, 0xC0, -6)];
const WH0290_PM2_5: &[BitPart] = &[part(2, 0x3F, 8), part(3, 0xFF, 0)];
const WH0290_PM10: &[BitPart] = &[part(4, 0x3F, 8), part(5, 0xFF, 0)];

static WH0290_FIELDS: [FieldSpec; 4] = [
    spec("id", B1, INT, ""),
    linear("battery_ok", WH0290_BATTERY_BARS, 0.0, 0.2, ""),
    spec("pm2_5_ug_m3", WH0290_PM2_5, PM_DECI, "ug/m3"),
    spec("estimated_pm10_0_ug_m3", WH0290_PM10, PM_DECI, "ug/m3"),
];

const WH51_ID: &[BitPart] = &[part(1, 0xFF, 16), part(2, 0xFF, 8), part(3, 0xFF, 0)];
const WH51_BATTERY: &[BitPart] = &[part(4, 0x1F, 0)];
const WH51_BOOST: &[BitPart] = &[part(4, 0xE0, -5)];
const WH51_MOISTURE: &[BitPart] = &[part(6, 0xFF, 0)];
const WH51_AD: &[BitPart] = &[part(7, 0x01, 8), part(8, 0xFF, 0)];

static WH51_FIELDS: [FieldSpec; 6] = [
    spec("id", WH51_ID, Encoding::Hex { digits: 6 }, ""),
    // (mV - 700) / 900 with mV = raw * 100
    linear("battery_ok", WH51_BATTERY, -7.0, 100.0 / 900.0, ""),
    spec("battery_mV", WH51_BATTERY, Encoding::Integer { mul: 100, div: 1 }, "mV"),
    spec("moisture", WH51_MOISTURE, INT, "%"),
    spec("boost", WH51_BOOST, INT, ""),
    spec("ad_raw", WH51_AD, INT, ""),
];

/// Field layout of a variant, in emission order (`model` and `mic` excluded)
pub fn layout(variant: Variant) -> &'static [FieldSpec] {
    match variant {
        Variant::Wh2 | Variant::Wh2a | Variant::Telldus => &WH2_FIELDS,
        Variant::Wh5 => &WH5_FIELDS,
        Variant::Wh0530 | Variant::AlectoV1 | Variant::AlectoV2 => &PWM_RAIN_FIELDS,
        Variant::AlectoV2Dcf => &ALECTO_DCF_FIELDS,
        Variant::Wh24 => &WH24_FIELDS,
        Variant::Wh65b => &WH65B_FIELDS,
        Variant::Wh25 | Variant::Wh32 | Variant::Wh32b => &WH25_FIELDS,
        Variant::Wh0290 => &WH0290_FIELDS,
        Variant::Wh51 => &WH51_FIELDS,
    }
}
