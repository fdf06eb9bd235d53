//! BME680 Register Map
//!
//! Addresses, block sizes and bit layouts from the Bosch BME680 datasheet
//! (section 5.2, memory map). Multi-byte calibration fields are little-endian;
//! ADC fields are big-endian with the low nibble (or two bits) left-aligned
//! in the last byte.

// ===== BUS ADDRESSES =====

/// 7-bit I2C address with SDO pulled high. Tried first during probing.
pub const PRIMARY_ADDRESS: u8 = 0x77;

/// 7-bit I2C address with SDO tied to ground.
pub const SECONDARY_ADDRESS: u8 = 0x76;

// ===== IDENTITY =====

/// Chip-id register.
pub const ADDR_CHIP_ID: u8 = 0xD0;

/// Value of the chip-id register on every BME680/BME688.
pub const CHIP_ID: u8 = 0x61;

/// Variant-id register (BME688 and later silicon).
pub const ADDR_VARIANT_ID: u8 = 0xF0;

/// Variant id reported by the original BME680.
pub const VARIANT_BME680: u8 = 0x00;

/// Variant id reported by the BME688.
pub const VARIANT_BME688: u8 = 0x01;

// ===== RESET =====

/// Soft-reset register.
pub const ADDR_SOFT_RESET: u8 = 0xE0;

/// Magic value that triggers a soft reset.
pub const SOFT_RESET_CMD: u8 = 0xB6;

/// Start-up time after a soft reset (milliseconds).
pub const SOFT_RESET_DELAY_MS: u32 = 10;

// ===== CALIBRATION =====

/// Calibration register blocks as `(start address, length)`, read in order
/// and concatenated into one image.
///
/// 1. `0x89..=0xA1`: temperature and pressure coefficients
/// 2. `0xE1..=0xF0`: humidity, `par_t1` and gas-heater coefficients
/// 3. `0x00..=0x04`: heater resistance value/range, range switching error
pub const CALIBRATION_BLOCKS: [(u8, usize); 3] = [(0x89, 25), (0xE1, 16), (0x00, 5)];

/// Total size of the concatenated calibration image (bytes).
pub const CALIBRATION_IMAGE_LEN: usize = 25 + 16 + 5;

const _: () = {
    let mut total = 0;
    let mut i = 0;
    while i < CALIBRATION_BLOCKS.len() {
        total += CALIBRATION_BLOCKS[i].1;
        i += 1;
    }
    assert!(total == CALIBRATION_IMAGE_LEN, "calibration blocks must fill the image exactly");
};

// ===== CONTROL =====

/// `ctrl_gas_0`: bit 3 switches the heater off.
pub const ADDR_CTRL_GAS_0: u8 = 0x70;

/// `ctrl_gas_1`: bit 4 `run_gas`, bits 3:0 heater profile index.
pub const ADDR_CTRL_GAS_1: u8 = 0x71;

/// `ctrl_hum`: bits 2:0 humidity oversampling.
pub const ADDR_CTRL_HUM: u8 = 0x72;

/// `ctrl_meas`: bits 7:5 temperature oversampling, 4:2 pressure, 1:0 mode.
pub const ADDR_CTRL_MEAS: u8 = 0x74;

/// `config`: bits 4:2 IIR filter coefficient.
pub const ADDR_CONFIG: u8 = 0x75;

/// Heater duration for profile 0 (`gas_wait_0`).
pub const ADDR_GAS_WAIT_0: u8 = 0x64;

/// Heater target resistance for profile 0 (`res_heat_0`).
pub const ADDR_RES_HEAT_0: u8 = 0x5A;

/// `run_gas` bit in `ctrl_gas_1`.
pub const RUN_GAS: u8 = 1 << 4;

/// `heat_off` bit in `ctrl_gas_0`.
pub const HEAT_OFF: u8 = 1 << 3;

/// Forced-mode selector in `ctrl_meas` bits 1:0.
pub const MODE_FORCED: u8 = 0b01;

// ===== MEASUREMENT DATA =====

/// First register of the field-0 data block (`meas_status_0`).
pub const ADDR_FIELD_0: u8 = 0x1D;

/// Length of the field-0 data block, `0x1D..=0x2B`.
pub const FIELD_DATA_LEN: usize = 15;

/// `meas_status_0` bit 7: a new result is available.
pub const STATUS_NEW_DATA: u8 = 1 << 7;

/// `meas_status_0` bit 6: gas conversion in progress.
pub const STATUS_GAS_MEASURING: u8 = 1 << 6;

/// `meas_status_0` bit 5: TPH conversion in progress.
pub const STATUS_MEASURING: u8 = 1 << 5;

/// `gas_r_lsb` bit 5: the gas result is valid.
pub const GAS_VALID: u8 = 1 << 5;

/// `gas_r_lsb` bit 4: heater reached its target before the gas sample.
pub const HEAT_STABLE: u8 = 1 << 4;

/// `gas_r_lsb` bits 3:0: ADC range used for the gas conversion.
pub const GAS_RANGE_MASK: u8 = 0x0F;

/// Offsets of ADC fields inside the field-0 block.
pub mod field {
    /// Pressure MSB (`0x1F`), followed by LSB and XLSB.
    pub const PRESS: usize = 2;
    /// Temperature MSB (`0x22`), followed by LSB and XLSB.
    pub const TEMP: usize = 5;
    /// Humidity MSB (`0x25`), followed by LSB.
    pub const HUM: usize = 8;
    /// Gas resistance MSB (`0x2A`), followed by LSB/status byte.
    pub const GAS: usize = 13;
}

// ===== TIMING =====

/// Duration of one oversampling cycle (microseconds).
pub const MEAS_CYCLE_US: u32 = 1963;

/// Fixed TPH switching overhead: 4 × 477 µs + 5 × 477 µs.
pub const MEAS_OVERHEAD_US: u32 = 477 * 9;

/// Wake-up time from sleep to the first conversion (microseconds).
pub const WAKE_UP_US: u32 = 1000;
