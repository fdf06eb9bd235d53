//! Register Transport
//!
//! The engine only ever talks to the sensor through two operations: read a
//! run of registers, write a run of registers. Everything bus-specific
//! (addressing, clock stretching, retries) stays behind this trait.
//!
//! ## Implementations
//!
//! - [`I2cTransport`]: any `embedded_hal::i2c::I2c` bus bound to one address
//! - [`SimulatedSensor`]: in-memory register file for tests and hosts
//!   without hardware
//!
//! ## Address Detection
//!
//! The BME680 answers on 0x77 or 0x76 depending on how SDO is strapped.
//! [`probe`] tries both, in that order, and reports the first address whose
//! chip-id register identifies a BME680.

use core::fmt::Debug;

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

use crate::constants::registers::{ADDR_CHIP_ID, CHIP_ID, PRIMARY_ADDRESS, SECONDARY_ADDRESS};
use crate::errors::{SensorError, SensorResult};

mod i2c;
pub mod simulated;

pub use i2c::I2cTransport;
pub use simulated::{SimulatedBusError, SimulatedSensor};

/// Byte-level access to the sensor's registers
pub trait RegisterTransport {
    /// Bus-level failure
    type Error: Debug;

    /// Fill `buf` starting at `register`, auto-incrementing.
    fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `data` starting at `register`, auto-incrementing.
    fn write(&mut self, register: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read a single register.
    fn read_byte(&mut self, register: u8) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read(register, &mut buf)?;
        Ok(buf[0])
    }

    /// Write a single register.
    fn write_byte(&mut self, register: u8, value: u8) -> Result<(), Self::Error> {
        self.write(register, &[value])
    }
}

impl<T: RegisterTransport + ?Sized> RegisterTransport for &mut T {
    type Error = T::Error;

    fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read(register, buf)
    }

    fn write(&mut self, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write(register, data)
    }
}

/// Find the BME680 on the bus.
///
/// Tries the primary address (0x77) first, then the secondary (0x76).
/// Returns the address that answered with the BME680 chip id.
///
/// Fails with [`SensorError::DeviceIdentity`] carrying the last chip id that
/// was read, or `None` when neither address acknowledged. Only a missing
/// acknowledge counts as an empty address; any other bus failure is returned
/// as [`SensorError::Transport`].
pub fn probe<I2C: I2c>(bus: &mut I2C) -> SensorResult<u8, I2C::Error> {
    let mut found = None;

    for address in [PRIMARY_ADDRESS, SECONDARY_ADDRESS] {
        let mut id = [0u8; 1];
        match bus.write_read(address, &[ADDR_CHIP_ID], &mut id) {
            Ok(()) if id[0] == CHIP_ID => {
                log_info!("BME680 detected at {:#04x}", address);
                return Ok(address);
            }
            Ok(()) => {
                log_warn!("device at {:#04x} reports chip id {:#04x}", address, id[0]);
                found = Some(id[0]);
            }
            Err(e) if matches!(e.kind(), ErrorKind::NoAcknowledge(_)) => {
                log_debug!("no answer at {:#04x}", address);
            }
            Err(e) => return Err(SensorError::Transport(e)),
        }
    }

    Err(SensorError::DeviceIdentity { found })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_prefers_primary_address() {
        let mut sensor = SimulatedSensor::default().with_address(PRIMARY_ADDRESS);
        assert_eq!(probe(&mut sensor), Ok(PRIMARY_ADDRESS));
    }

    #[test]
    fn probe_falls_back_to_secondary() {
        let mut sensor = SimulatedSensor::default().with_address(SECONDARY_ADDRESS);
        assert_eq!(probe(&mut sensor), Ok(SECONDARY_ADDRESS));
    }

    #[test]
    fn probe_reports_foreign_chip() {
        let mut sensor = SimulatedSensor::default().with_address(SECONDARY_ADDRESS);
        sensor.set_chip_id(0x60); // BME280

        assert_eq!(
            probe(&mut sensor),
            Err(SensorError::DeviceIdentity { found: Some(0x60) })
        );
    }

    #[test]
    fn probe_reports_empty_bus() {
        let mut sensor = SimulatedSensor::default().with_address(0x42);
        assert_eq!(
            probe(&mut sensor),
            Err(SensorError::DeviceIdentity { found: None })
        );
    }

    #[test]
    fn probe_propagates_bus_fault() {
        let mut sensor = SimulatedSensor::default().with_address(PRIMARY_ADDRESS);
        sensor.fail_bus(true);

        assert_eq!(
            probe(&mut sensor),
            Err(SensorError::Transport(SimulatedBusError::BusFault))
        );
    }

    #[test]
    fn mutable_reference_is_a_transport() {
        fn chip_id<T: RegisterTransport>(mut transport: T) -> Result<u8, T::Error> {
            transport.read_byte(ADDR_CHIP_ID)
        }

        let mut sensor = SimulatedSensor::default();
        assert_eq!(chip_id(&mut sensor), Ok(CHIP_ID));
        assert_eq!(chip_id(sensor), Ok(CHIP_ID));
    }
}
