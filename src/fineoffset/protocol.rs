//! # Fine Offset Protocol Constants and Types
//!
//! Wire-format constants, the closed set of frame variants, and the four
//! decoder entry points ("families") that route rows to them.

use serde::Deserialize;
use std::fmt;

/// Sync word in front of every FSK PCM frame
pub const FSK_PREAMBLE: [u8; 3] = [0xAA, 0x2D, 0xD4];

/// Preamble length in bits
pub const FSK_PREAMBLE_BITS: usize = FSK_PREAMBLE.len() * 8;

/// PWM frames from the WH0530/Alecto family start after a run of seven 1-bits
pub const PWM_PREAMBLE_OFFSET: usize = 7;

/// Type nibble carried by WH0530 and Alecto v1/v2 frames
pub const ALECTO_TYPE_NIBBLE: u8 = 0x3;

/// Type byte carried by the Alecto v2 DCF77 radio-clock frame
pub const ALECTO_DCF_TYPE: u8 = 0x52;

/// Type nibble carried by every WH2-family frame
pub const WH2_TYPE_NIBBLE: u8 = 0x4;

/// Family code of the WH24/WH65B outdoor unit
pub const WH24_FAMILY_CODE: u8 = 0x24;

/// Family code of the WH51 soil moisture sensor
pub const WH51_FAMILY_CODE: u8 = 0x51;

/// Family code of the WH0290 particulate matter sensor
pub const WH0290_FAMILY_CODE: u8 = 0x41;

/// Message type (high nibble) of WH25 and WH32B frames
pub const WH25_MSG_TYPE: u8 = 0xE0;

/// Message type (high nibble) of the WH32 frame
pub const WH32_MSG_TYPE: u8 = 0xD0;

/// Value of the constant `mic` field on every emitted record
pub const MIC_CRC: &str = "CRC";

/// Decoder entry point, one per registered device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// WH2, WH2A, WH5, Telldus (OOK PWM)
    Wh2,
    /// WH25, WH32, WH32B, WH24, WH65B, WH0290 (FSK PCM)
    Wh25,
    /// WH51 soil moisture (FSK PCM)
    Wh51,
    /// WH0530 and Alecto WS-1200 v1/v2/DCF (OOK PWM)
    Wh0530,
}

impl Family {
    pub const ALL: [Family; 4] = [Family::Wh2, Family::Wh25, Family::Wh51, Family::Wh0530];

    /// Human readable device name
    pub fn name(self) -> &'static str {
        match self {
            Family::Wh2 => {
                "Fine Offset Electronics, WH2, WH5, Telldus Temperature/Humidity/Rain Sensor"
            }
            Family::Wh25 => {
                "Fine Offset Electronics, WH25, WH32, WH32B, WN32B, WH24, WH65B, HP1000, \
                 Misol WS2320 Temperature/Humidity/Pressure Sensor"
            }
            Family::Wh51 => {
                "Fine Offset Electronics/ECOWITT WH51, SwitchDoc Labs SM23 Soil Moisture Sensor"
            }
            Family::Wh0530 => "Fine Offset Electronics, WH0530 Temperature/Rain Sensor",
        }
    }

    /// Every field name a record from this family may carry
    pub fn declared_fields(self) -> &'static [&'static str] {
        match self {
            Family::Wh2 => &["model", "id", "temperature_C", "humidity", "mic"],
            Family::Wh25 => &[
                "model",
                "id",
                "battery_ok",
                "temperature_C",
                "humidity",
                "pressure_hPa",
                "wind_dir_deg",
                "wind_avg_m_s",
                "wind_max_m_s",
                "rain_mm",
                "uv",
                "uvi",
                "light_lux",
                "pm2_5_ug_m3",
                "estimated_pm10_0_ug_m3",
                "mic",
            ],
            Family::Wh51 => &[
                "model",
                "id",
                "battery_ok",
                "battery_mV",
                "moisture",
                "boost",
                "ad_raw",
                "mic",
            ],
            Family::Wh0530 => &[
                "model",
                "id",
                "battery_ok",
                "temperature_C",
                "rain_mm",
                "radio_clock",
                "mic",
            ],
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Family::Wh2 => "wh2",
            Family::Wh25 => "wh25",
            Family::Wh51 => "wh51",
            Family::Wh0530 => "wh0530",
        };
        f.write_str(key)
    }
}

/// Concrete wire format a frame was classified as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Wh2,
    Wh2a,
    Wh5,
    Telldus,
    Wh0530,
    Wh24,
    Wh65b,
    Wh25,
    Wh32,
    Wh32b,
    Wh0290,
    Wh51,
    AlectoV1,
    AlectoV2,
    AlectoV2Dcf,
}

impl Variant {
    /// Value of the `model` field
    pub fn model(self) -> &'static str {
        match self {
            Variant::Wh2 => "Fineoffset-WH2",
            Variant::Wh2a => "Fineoffset-WH2A",
            Variant::Wh5 => "Fineoffset-WH5",
            Variant::Telldus => "Fineoffset-TelldusProove",
            Variant::Wh0530 => "Fineoffset-WH0530",
            Variant::Wh24 => "Fineoffset-WH24",
            Variant::Wh65b => "Fineoffset-WH65B",
            Variant::Wh25 => "Fineoffset-WH25",
            Variant::Wh32 => "Fineoffset-WH32",
            Variant::Wh32b => "Fineoffset-WH32B",
            Variant::Wh0290 => "Fineoffset-WH0290",
            Variant::Wh51 => "Fineoffset-WH51",
            Variant::AlectoV1 => "Alecto-WS1200v1",
            Variant::AlectoV2 | Variant::AlectoV2Dcf => "Alecto-WS1200v2",
        }
    }

    /// Frame length in bytes
    pub fn frame_len(self) -> usize {
        match self {
            Variant::Wh2 | Variant::Wh5 | Variant::Telldus => 5,
            Variant::Wh2a => 6,
            Variant::AlectoV1 => 7,
            Variant::Wh0530 | Variant::Wh25 | Variant::Wh32 | Variant::Wh32b | Variant::Wh0290 => 8,
            Variant::AlectoV2 | Variant::AlectoV2Dcf => 11,
            Variant::Wh51 => 14,
            Variant::Wh24 | Variant::Wh65b => 17,
        }
    }

    /// Entry point that can produce this variant
    pub fn family(self) -> Family {
        match self {
            Variant::Wh2 | Variant::Wh2a | Variant::Wh5 | Variant::Telldus => Family::Wh2,
            Variant::Wh24
            | Variant::Wh65b
            | Variant::Wh25
            | Variant::Wh32
            | Variant::Wh32b
            | Variant::Wh0290 => Family::Wh25,
            Variant::Wh51 => Family::Wh51,
            Variant::Wh0530 | Variant::AlectoV1 | Variant::AlectoV2 | Variant::AlectoV2Dcf => {
                Family::Wh0530
            }
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model())
    }
}
