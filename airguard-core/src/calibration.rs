//! Factory Calibration Coefficients
//!
//! Every BME680 leaves the factory with its own set of compensation
//! coefficients burned into non-volatile registers. They are read exactly
//! once, right after the chip identity has been confirmed, and never change
//! afterwards.
//!
//! ## Register Layout
//!
//! The coefficients are spread over three register blocks which are read
//! back to back and concatenated into one 46-byte image:
//!
//! ```text
//! image[0..25]   ← 0x89..=0xA1   temperature (t2, t3), pressure (p1..p10)
//! image[25..41]  ← 0xE1..=0xF0   humidity (h1..h7), t1, gas heater (g1..g3)
//! image[41..46]  ← 0x00..=0x04   res_heat_val, res_heat_range, range_sw_err
//! ```
//!
//! Two fields are packed across nibbles:
//!
//! ```text
//! 0xE1 = h2[11:4]   0xE2 = h2[3:0] | h1[3:0]   0xE3 = h1[11:4]
//! ```
//!
//! Decoding is a pure function over the image ([`CalibrationSet::from_image`]),
//! so the bit-level layout can be checked without a bus.

use crate::constants::registers::{
    ADDR_CHIP_ID, CALIBRATION_BLOCKS, CALIBRATION_IMAGE_LEN, CHIP_ID,
};
use crate::errors::{SensorError, SensorResult};
use crate::transport::RegisterTransport;

/// Offset of the second register block inside the image.
const BLOCK_E1: usize = 25;
/// Offset of the third register block inside the image.
const BLOCK_00: usize = 41;

/// Immutable factory calibration of one sensor
///
/// Field names follow the datasheet (`par_t*` temperature, `par_p*` pressure,
/// `par_h*` humidity, `par_g*` gas heater).
#[allow(missing_docs)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationSet {
    pub par_t1: u16,
    pub par_t2: i16,
    pub par_t3: i8,

    pub par_p1: u16,
    pub par_p2: i16,
    pub par_p3: i8,
    pub par_p4: i16,
    pub par_p5: i16,
    pub par_p6: i8,
    pub par_p7: i8,
    pub par_p8: i16,
    pub par_p9: i16,
    pub par_p10: u8,

    pub par_h1: u16,
    pub par_h2: u16,
    pub par_h3: i8,
    pub par_h4: i8,
    pub par_h5: i8,
    pub par_h6: u8,
    pub par_h7: i8,

    pub par_g1: i8,
    pub par_g2: i16,
    pub par_g3: i8,

    /// Heater resistance range, 2 bits
    pub res_heat_range: u8,
    /// Heater resistance correction
    pub res_heat_val: i8,
    /// Gas ADC range switching error, signed 4 bits
    pub range_sw_err: i8,
}

impl CalibrationSet {
    /// Confirm the chip identity, then read and decode the calibration blocks.
    ///
    /// Any bus failure is fatal: without calibration no reading is valid.
    pub fn load<T>(transport: &mut T) -> SensorResult<Self, T::Error>
    where
        T: RegisterTransport + ?Sized,
    {
        let chip_id = transport
            .read_byte(ADDR_CHIP_ID)
            .map_err(SensorError::Transport)?;
        if chip_id != CHIP_ID {
            return Err(SensorError::DeviceIdentity { found: Some(chip_id) });
        }

        let mut image = [0u8; CALIBRATION_IMAGE_LEN];
        let mut offset = 0;
        // Block lengths sum to the image length (checked at compile time)
        for (register, len) in CALIBRATION_BLOCKS {
            transport
                .read(register, &mut image[offset..offset + len])
                .map_err(SensorError::Transport)?;
            offset += len;
        }

        let calibration = Self::from_image(&image);
        log_debug!("calibration loaded: {:?}", calibration);
        Ok(calibration)
    }

    /// Decode the concatenated calibration image.
    pub fn from_image(image: &[u8; CALIBRATION_IMAGE_LEN]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([image[i], image[i + 1]]);
        let i16_at = |i: usize| i16::from_le_bytes([image[i], image[i + 1]]);
        let i8_at = |i: usize| image[i] as i8;

        // Block 0x89: image index = address - 0x89
        let t = |addr: u8| (addr - 0x89) as usize;
        // Block 0xE1: image index = BLOCK_E1 + address - 0xE1
        let e = |addr: u8| BLOCK_E1 + (addr - 0xE1) as usize;

        let h_lsb = image[e(0xE2)];

        Self {
            par_t1: u16_at(e(0xE9)),
            par_t2: i16_at(t(0x8A)),
            par_t3: i8_at(t(0x8C)),

            par_p1: u16_at(t(0x8E)),
            par_p2: i16_at(t(0x90)),
            par_p3: i8_at(t(0x92)),
            par_p4: i16_at(t(0x94)),
            par_p5: i16_at(t(0x96)),
            par_p6: i8_at(t(0x99)),
            par_p7: i8_at(t(0x98)),
            par_p8: i16_at(t(0x9C)),
            par_p9: i16_at(t(0x9E)),
            par_p10: image[t(0xA0)],

            par_h1: (u16::from(image[e(0xE3)]) << 4) | u16::from(h_lsb & 0x0F),
            par_h2: (u16::from(image[e(0xE1)]) << 4) | u16::from(h_lsb >> 4),
            par_h3: i8_at(e(0xE4)),
            par_h4: i8_at(e(0xE5)),
            par_h5: i8_at(e(0xE6)),
            par_h6: image[e(0xE7)],
            par_h7: i8_at(e(0xE8)),

            par_g1: i8_at(e(0xED)),
            par_g2: i16_at(e(0xEB)),
            par_g3: i8_at(e(0xEE)),

            res_heat_val: i8_at(BLOCK_00),
            res_heat_range: (image[BLOCK_00 + 2] >> 4) & 0x03,
            // Upper nibble of 0x04, sign-extended
            range_sw_err: i8_at(BLOCK_00 + 4) >> 4,
        }
    }
}
