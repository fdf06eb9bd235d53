//! Simulated BME680
//!
//! An in-memory register file that reacts to the writes a real sensor cares
//! about:
//!
//! - `0xB6 → 0xE0` resets control and data registers
//! - forced mode in `ctrl_meas` starts a conversion; `meas_status_0` reports
//!   busy for a configurable number of reads, then the field-0 block is filled
//!   from the configured [`RawSample`]
//!
//! Failure modes are switchable: a conversion that never finishes, a bus that
//! rejects every transfer, a foreign chip id. The same register file is
//! reachable directly as a [`RegisterTransport`] and through
//! `embedded_hal::i2c::I2c` at a configurable address.

use embedded_hal::i2c::{self, ErrorKind, NoAcknowledgeSource, Operation};

use super::RegisterTransport;
use crate::constants::registers::{
    ADDR_CHIP_ID, ADDR_CTRL_GAS_1, ADDR_CTRL_MEAS, ADDR_FIELD_0, ADDR_SOFT_RESET,
    ADDR_VARIANT_ID, CALIBRATION_BLOCKS, CALIBRATION_IMAGE_LEN, CHIP_ID, FIELD_DATA_LEN,
    MODE_FORCED, PRIMARY_ADDRESS, RUN_GAS, SOFT_RESET_CMD, STATUS_GAS_MEASURING,
    STATUS_MEASURING, STATUS_NEW_DATA, VARIANT_BME680,
};
use crate::measurement::RawSample;

/// Calibration image of a typical BME680, in [`CALIBRATION_BLOCKS`] order.
pub const REFERENCE_CALIBRATION: [u8; CALIBRATION_IMAGE_LEN] = [
    // 0x89..=0xA1
    0x00, 0xAC, 0x66, 0x03, 0x00, 0x7E, 0x8E, 0x71, 0xD7, 0x58, 0x00, 0xAA, 0x1A,
    0x8E, 0xFF, 0x38, 0x1E, 0x00, 0x00, 0x64, 0xF6, 0x95, 0xEF, 0x1E, 0x00,
    // 0xE1..=0xF0
    0x3F, 0x87, 0x30, 0x00, 0x2D, 0x14, 0x78, 0x9C, 0xAC, 0x65, 0xE5, 0xD6, 0xEB,
    0x12, 0x00, 0x00,
    // 0x00..=0x04
    0x2E, 0x00, 0x1A, 0x00, 0x35,
];

/// Room-air conversion result: roughly 26 °C, 1008 hPa, 50 %RH.
pub const REFERENCE_SAMPLE: RawSample = RawSample {
    temp_adc: 500_000,
    press_adc: 350_000,
    hum_adc: 22_000,
    gas_adc: 600,
    gas_range: 5,
    gas_valid: true,
    heater_stable: true,
};

/// Bus failures the simulator can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedBusError {
    /// Nothing acknowledged the address
    Nack,
    /// Injected bus failure
    BusFault,
}

impl i2c::Error for SimulatedBusError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Nack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            Self::BusFault => ErrorKind::Bus,
        }
    }
}

/// Register-level BME680 stand-in
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    registers: [u8; 256],
    address: u8,
    sample: RawSample,
    busy_polls: u16,
    /// Busy status reads left in the conversion in flight
    pending: Option<u16>,
    stuck_busy: bool,
    bus_fault: bool,
    status_polls: u32,
    conversions: u32,
    /// I2C register pointer
    pointer: u8,
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new(&REFERENCE_CALIBRATION)
    }
}

impl SimulatedSensor {
    /// Sensor with the given calibration image and [`REFERENCE_SAMPLE`] loaded.
    pub fn new(calibration: &[u8; CALIBRATION_IMAGE_LEN]) -> Self {
        let mut registers = [0u8; 256];

        let mut offset = 0;
        for (start, len) in CALIBRATION_BLOCKS {
            for i in 0..len {
                registers[usize::from(start) + i] = calibration[offset + i];
            }
            offset += len;
        }
        registers[usize::from(ADDR_CHIP_ID)] = CHIP_ID;
        registers[usize::from(ADDR_VARIANT_ID)] = VARIANT_BME680;

        Self {
            registers,
            address: PRIMARY_ADDRESS,
            sample: REFERENCE_SAMPLE,
            busy_polls: 1,
            pending: None,
            stuck_busy: false,
            bus_fault: false,
            status_polls: 0,
            conversions: 0,
            pointer: 0,
        }
    }

    /// Answer on `address` when accessed through I2C.
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// ADC values produced by the next conversions.
    pub fn set_sample(&mut self, sample: RawSample) {
        self.sample = sample;
    }

    /// Number of status reads that report busy before a conversion completes.
    pub fn set_busy_polls(&mut self, polls: u16) {
        self.busy_polls = polls;
    }

    /// Never finish a conversion.
    pub fn set_stuck_busy(&mut self, stuck: bool) {
        self.stuck_busy = stuck;
    }

    /// Reject every transfer.
    pub fn fail_bus(&mut self, fail: bool) {
        self.bus_fault = fail;
    }

    /// Overwrite the chip-id register.
    pub fn set_chip_id(&mut self, id: u8) {
        self.registers[usize::from(ADDR_CHIP_ID)] = id;
    }

    /// Overwrite the variant-id register.
    pub fn set_variant(&mut self, variant: u8) {
        self.registers[usize::from(ADDR_VARIANT_ID)] = variant;
    }

    /// Current value of a register, without side effects.
    pub fn register(&self, address: u8) -> u8 {
        self.registers[usize::from(address)]
    }

    /// Reads of `meas_status_0` so far.
    pub fn status_polls(&self) -> u32 {
        self.status_polls
    }

    /// Completed conversions so far.
    pub fn conversions(&self) -> u32 {
        self.conversions
    }

    fn load(&mut self, address: u8) -> u8 {
        if address == ADDR_FIELD_0 {
            self.status_polls += 1;
            self.advance_conversion();
        }
        self.registers[usize::from(address)]
    }

    fn store(&mut self, address: u8, value: u8) {
        match address {
            ADDR_SOFT_RESET => {
                if value == SOFT_RESET_CMD {
                    self.soft_reset();
                }
            }
            ADDR_CTRL_MEAS => {
                self.registers[usize::from(address)] = value;
                if value & 0b11 == MODE_FORCED {
                    self.start_conversion();
                }
            }
            _ => self.registers[usize::from(address)] = value,
        }
    }

    fn soft_reset(&mut self) {
        for register in &mut self.registers[usize::from(ADDR_FIELD_0)..=usize::from(0x2Bu8)] {
            *register = 0;
        }
        for register in &mut self.registers[0x50..=0x75] {
            *register = 0;
        }
        self.pending = None;
    }

    fn gas_enabled(&self) -> bool {
        self.registers[usize::from(ADDR_CTRL_GAS_1)] & RUN_GAS != 0
    }

    fn start_conversion(&mut self) {
        let mut status = STATUS_MEASURING;
        if self.gas_enabled() {
            status |= STATUS_GAS_MEASURING;
        }
        self.registers[usize::from(ADDR_FIELD_0)] = status;
        self.pending = Some(self.busy_polls);
    }

    fn advance_conversion(&mut self) {
        match self.pending {
            Some(_) if self.stuck_busy => {}
            Some(0) => self.finish_conversion(),
            Some(remaining) => self.pending = Some(remaining - 1),
            None => {}
        }
    }

    fn finish_conversion(&mut self) {
        let mut sample = self.sample;
        if !self.gas_enabled() {
            sample.gas_adc = 0;
            sample.gas_range = 0;
            sample.gas_valid = false;
            sample.heater_stable = false;
        }

        let mut field = sample.to_field_data();
        field[0] = STATUS_NEW_DATA;

        let start = usize::from(ADDR_FIELD_0);
        self.registers[start..start + FIELD_DATA_LEN].copy_from_slice(&field);

        // Back to sleep mode
        self.registers[usize::from(ADDR_CTRL_MEAS)] &= !0b11;
        self.pending = None;
        self.conversions += 1;
    }
}

impl RegisterTransport for SimulatedSensor {
    type Error = SimulatedBusError;

    fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        if self.bus_fault {
            return Err(SimulatedBusError::BusFault);
        }
        let mut address = register;
        for byte in buf.iter_mut() {
            *byte = self.load(address);
            address = address.wrapping_add(1);
        }
        Ok(())
    }

    fn write(&mut self, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        if self.bus_fault {
            return Err(SimulatedBusError::BusFault);
        }
        let mut address = register;
        for &value in data {
            self.store(address, value);
            address = address.wrapping_add(1);
        }
        Ok(())
    }
}

impl i2c::ErrorType for SimulatedSensor {
    type Error = SimulatedBusError;
}

impl i2c::I2c for SimulatedSensor {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(SimulatedBusError::Nack);
        }
        if self.bus_fault {
            return Err(SimulatedBusError::BusFault);
        }

        // The first written byte of a transaction sets the register pointer
        let mut pointer_set = false;
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    for &byte in bytes.iter() {
                        if pointer_set {
                            self.store(self.pointer, byte);
                            self.pointer = self.pointer.wrapping_add(1);
                        } else {
                            self.pointer = byte;
                            pointer_set = true;
                        }
                    }
                }
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = self.load(self.pointer);
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::registers::ADDR_CTRL_HUM;

    fn trigger(sensor: &mut SimulatedSensor) {
        RegisterTransport::write(sensor, ADDR_CTRL_MEAS, &[MODE_FORCED]).unwrap();
    }

    #[test]
    fn conversion_reports_busy_then_ready() {
        let mut sensor = SimulatedSensor::default();
        sensor.set_busy_polls(2);
        trigger(&mut sensor);

        assert_ne!(sensor.read_byte(ADDR_FIELD_0).unwrap() & STATUS_MEASURING, 0);
        assert_ne!(sensor.read_byte(ADDR_FIELD_0).unwrap() & STATUS_MEASURING, 0);
        assert_eq!(sensor.read_byte(ADDR_FIELD_0).unwrap(), STATUS_NEW_DATA);
        assert_eq!(sensor.conversions(), 1);
        assert_eq!(sensor.register(ADDR_CTRL_MEAS) & 0b11, 0);
    }

    #[test]
    fn stuck_sensor_never_completes() {
        let mut sensor = SimulatedSensor::default();
        sensor.set_stuck_busy(true);
        trigger(&mut sensor);

        for _ in 0..50 {
            assert_ne!(sensor.read_byte(ADDR_FIELD_0).unwrap() & STATUS_MEASURING, 0);
        }
        assert_eq!(sensor.conversions(), 0);
        assert_eq!(sensor.status_polls(), 50);
    }

    #[test]
    fn gas_fields_follow_run_gas() {
        let mut sensor = SimulatedSensor::default();
        sensor.set_busy_polls(0);
        trigger(&mut sensor);

        let mut field = [0u8; FIELD_DATA_LEN];
        RegisterTransport::read(&mut sensor, ADDR_FIELD_0, &mut field).unwrap();
        let sample = RawSample::from_field_data(&field);
        assert!(!sample.gas_valid);
        assert_eq!(sample.temp_adc, REFERENCE_SAMPLE.temp_adc);
    }

    #[test]
    fn soft_reset_keeps_calibration() {
        let mut sensor = SimulatedSensor::default();
        sensor.write_byte(ADDR_CTRL_HUM, 0b010).unwrap();
        sensor.write_byte(ADDR_SOFT_RESET, SOFT_RESET_CMD).unwrap();

        assert_eq!(sensor.register(ADDR_CTRL_HUM), 0);
        assert_eq!(sensor.register(0x8A), REFERENCE_CALIBRATION[1]);
        assert_eq!(sensor.register(ADDR_CHIP_ID), CHIP_ID);
    }
}
