//! I2C binding for `embedded-hal` 1.0 buses

use embedded_hal::i2c::{I2c, Operation};

use super::RegisterTransport;

/// A bus bound to the sensor's 7-bit address
#[derive(Debug)]
pub struct I2cTransport<I2C> {
    bus: I2C,
    address: u8,
}

impl<I2C: I2c> I2cTransport<I2C> {
    /// Bind `bus` to `address` (see [`super::probe`]).
    pub fn new(bus: I2C, address: u8) -> Self {
        Self { bus, address }
    }

    /// Address this transport talks to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.bus
    }
}

impl<I2C: I2c> RegisterTransport for I2cTransport<I2C> {
    type Error = I2C::Error;

    fn read(&mut self, register: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.bus.write_read(self.address, &[register], buf)
    }

    fn write(&mut self, register: u8, data: &[u8]) -> Result<(), Self::Error> {
        // Adjacent writes go out as one transfer: [register, data...]
        self.bus.transaction(
            self.address,
            &mut [Operation::Write(&[register]), Operation::Write(data)],
        )
    }
}
