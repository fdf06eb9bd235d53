//! Forced-Mode Measurement Cycle
//!
//! One cycle is: write the oversampling, filter and heater registers, switch
//! the device into forced mode, wait for the conversion, read the field-0
//! block back. The device returns to sleep on its own afterwards.
//!
//! ## States
//!
//! ```text
//!          start()                    poll(): busy        poll(): ready
//! Idle ──────────────▶ Configuring ─────────▶ Converting ──────────────▶ Ready ──▶ Idle
//!   ▲                                           │
//!   └──────────── poll(): max_polls reached ────┘  (MeasurementTimeout)
//! ```
//!
//! [`MeasurementCycle::poll`] is non-blocking and returns
//! `nb::Error::WouldBlock` while the device is busy, so it composes with any
//! executor or superloop. [`MeasurementCycle::measure`] is the blocking
//! convenience built on top of it.

use embedded_hal::delay::DelayNs;

use crate::config::{IirFilter, OversamplingConfig, PollConfig};
use crate::constants::registers::{
    field, ADDR_CONFIG, ADDR_CTRL_GAS_0, ADDR_CTRL_GAS_1, ADDR_CTRL_HUM, ADDR_CTRL_MEAS,
    ADDR_FIELD_0, ADDR_GAS_WAIT_0, ADDR_RES_HEAT_0, FIELD_DATA_LEN, GAS_RANGE_MASK, GAS_VALID,
    HEAT_OFF, HEAT_STABLE, MEAS_CYCLE_US, MEAS_OVERHEAD_US, MODE_FORCED, RUN_GAS,
    STATUS_GAS_MEASURING, STATUS_MEASURING, STATUS_NEW_DATA, WAKE_UP_US,
};
use crate::errors::{SensorError, SensorResult};
use crate::heater::HeaterSetpoint;
use crate::transport::RegisterTransport;

/// Uncompensated ADC values of one conversion
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawSample {
    /// 20-bit temperature ADC
    pub temp_adc: u32,
    /// 20-bit pressure ADC
    pub press_adc: u32,
    /// 16-bit humidity ADC
    pub hum_adc: u16,
    /// 10-bit gas ADC
    pub gas_adc: u16,
    /// Gas ADC range, 0..=15
    pub gas_range: u8,
    /// The gas conversion produced a result
    pub gas_valid: bool,
    /// The heater reached its target before the gas conversion
    pub heater_stable: bool,
}

impl RawSample {
    /// Decode the field-0 block (`0x1D..=0x2B`).
    pub fn from_field_data(data: &[u8; FIELD_DATA_LEN]) -> Self {
        let adc20 = |i: usize| {
            (u32::from(data[i]) << 12) | (u32::from(data[i + 1]) << 4) | (u32::from(data[i + 2]) >> 4)
        };
        let gas_lsb = data[field::GAS + 1];

        Self {
            press_adc: adc20(field::PRESS),
            temp_adc: adc20(field::TEMP),
            hum_adc: u16::from_be_bytes([data[field::HUM], data[field::HUM + 1]]),
            gas_adc: (u16::from(data[field::GAS]) << 2) | u16::from(gas_lsb >> 6),
            gas_range: gas_lsb & GAS_RANGE_MASK,
            gas_valid: gas_lsb & GAS_VALID != 0,
            heater_stable: gas_lsb & HEAT_STABLE != 0,
        }
    }

    /// Encode into the field-0 layout. The status byte is left zero.
    pub fn to_field_data(&self) -> [u8; FIELD_DATA_LEN] {
        let mut data = [0u8; FIELD_DATA_LEN];
        let mut put20 = |i: usize, adc: u32| {
            data[i] = (adc >> 12) as u8;
            data[i + 1] = (adc >> 4) as u8;
            data[i + 2] = ((adc & 0x0F) << 4) as u8;
        };
        put20(field::PRESS, self.press_adc);
        put20(field::TEMP, self.temp_adc);

        data[field::HUM..field::HUM + 2].copy_from_slice(&self.hum_adc.to_be_bytes());

        data[field::GAS] = (self.gas_adc >> 2) as u8;
        let mut gas_lsb = ((self.gas_adc & 0x03) << 6) as u8 | (self.gas_range & GAS_RANGE_MASK);
        if self.gas_valid {
            gas_lsb |= GAS_VALID;
        }
        if self.heater_stable {
            gas_lsb |= HEAT_STABLE;
        }
        data[field::GAS + 1] = gas_lsb;
        data
    }
}

/// Where the cycle is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    /// No cycle in flight
    Idle,
    /// Registers are being written
    Configuring,
    /// Forced mode triggered, waiting for the device
    Converting {
        /// Status reads so far
        polls: u16,
    },
    /// Result read back
    Ready,
}

/// Drives forced-mode conversions on one device
#[derive(Debug, Clone)]
pub struct MeasurementCycle {
    state: CycleState,
    oversampling: OversamplingConfig,
    filter: IirFilter,
    poll: PollConfig,
}

impl MeasurementCycle {
    /// Cycle with fixed oversampling, filter and polling budget
    pub fn new(oversampling: OversamplingConfig, filter: IirFilter, poll: PollConfig) -> Self {
        Self { state: CycleState::Idle, oversampling, filter, poll }
    }

    /// Current state
    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Configure the device and trigger a forced-mode conversion.
    ///
    /// With `heater` set the gas measurement runs at that setpoint, otherwise
    /// the heater is switched off for this cycle. Fails with
    /// [`SensorError::CycleBusy`] while a conversion is in flight.
    pub fn start<T>(
        &mut self,
        transport: &mut T,
        heater: Option<&HeaterSetpoint>,
    ) -> SensorResult<(), T::Error>
    where
        T: RegisterTransport + ?Sized,
    {
        if let CycleState::Converting { .. } = self.state {
            return Err(SensorError::CycleBusy);
        }

        self.state = CycleState::Configuring;
        if let Err(e) = self.configure(transport, heater) {
            self.state = CycleState::Idle;
            return Err(SensorError::Transport(e));
        }

        self.state = CycleState::Converting { polls: 0 };
        Ok(())
    }

    fn configure<T>(&self, transport: &mut T, heater: Option<&HeaterSetpoint>) -> Result<(), T::Error>
    where
        T: RegisterTransport + ?Sized,
    {
        let os = &self.oversampling;

        // ctrl_hum only takes effect after the following ctrl_meas write
        transport.write_byte(ADDR_CTRL_HUM, os.humidity.bits())?;
        transport.write_byte(ADDR_CONFIG, self.filter.bits() << 2)?;

        match heater {
            Some(setpoint) => {
                transport.write_byte(ADDR_RES_HEAT_0, setpoint.res_heat)?;
                transport.write_byte(ADDR_GAS_WAIT_0, setpoint.gas_wait)?;
                transport.write_byte(ADDR_CTRL_GAS_0, 0)?;
                transport.write_byte(ADDR_CTRL_GAS_1, RUN_GAS)?;
            }
            None => {
                transport.write_byte(ADDR_CTRL_GAS_1, 0)?;
                transport.write_byte(ADDR_CTRL_GAS_0, HEAT_OFF)?;
            }
        }

        let ctrl_meas = (os.temperature.bits() << 5) | (os.pressure.bits() << 2) | MODE_FORCED;
        transport.write_byte(ADDR_CTRL_MEAS, ctrl_meas)?;

        log_debug!("forced mode triggered (ctrl_meas {:#04x})", ctrl_meas);
        Ok(())
    }

    /// Check once whether the conversion has finished.
    ///
    /// Returns `WouldBlock` while the device is busy, and
    /// [`SensorError::MeasurementTimeout`] once the poll budget is spent.
    /// Either outcome other than `WouldBlock` returns the cycle to idle.
    pub fn poll<T>(&mut self, transport: &mut T) -> nb::Result<RawSample, SensorError<T::Error>>
    where
        T: RegisterTransport + ?Sized,
    {
        let polls = match self.state {
            CycleState::Converting { polls } => polls,
            _ => return Err(nb::Error::Other(SensorError::CycleNotStarted)),
        };

        let status = match transport.read_byte(ADDR_FIELD_0) {
            Ok(status) => status,
            Err(e) => {
                self.state = CycleState::Idle;
                return Err(nb::Error::Other(SensorError::Transport(e)));
            }
        };

        let polls = polls.saturating_add(1);
        let busy = status & (STATUS_MEASURING | STATUS_GAS_MEASURING) != 0
            || status & STATUS_NEW_DATA == 0;

        if busy {
            if polls >= self.poll.max_polls {
                log_warn!("conversion still busy after {} polls", polls);
                self.state = CycleState::Idle;
                return Err(nb::Error::Other(SensorError::MeasurementTimeout { polls }));
            }
            self.state = CycleState::Converting { polls };
            return Err(nb::Error::WouldBlock);
        }

        self.state = CycleState::Ready;
        let mut data = [0u8; FIELD_DATA_LEN];
        let read = transport.read(ADDR_FIELD_0, &mut data);

        // Ready is left on every path: one cycle yields at most one sample
        self.state = CycleState::Idle;
        read.map_err(|e| nb::Error::Other(SensorError::Transport(e)))?;
        Ok(RawSample::from_field_data(&data))
    }

    /// Run one complete cycle, blocking on `delay`.
    ///
    /// Waits the expected conversion time first, then polls at the
    /// configured interval.
    pub fn measure<T, D>(
        &mut self,
        transport: &mut T,
        delay: &mut D,
        heater: Option<&HeaterSetpoint>,
    ) -> SensorResult<RawSample, T::Error>
    where
        T: RegisterTransport + ?Sized,
        D: DelayNs,
    {
        self.start(transport, heater)?;
        delay.delay_us(self.expected_duration_us(heater));

        let interval_us = u32::try_from(self.poll.interval.as_micros()).unwrap_or(u32::MAX);
        loop {
            match self.poll(transport) {
                Ok(sample) => return Ok(sample),
                Err(nb::Error::WouldBlock) => delay.delay_us(interval_us),
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
    }

    /// Expected conversion time including the heater hold (µs).
    pub fn expected_duration_us(&self, heater: Option<&HeaterSetpoint>) -> u32 {
        let tph = self.oversampling.cycles() * MEAS_CYCLE_US + MEAS_OVERHEAD_US + WAKE_UP_US;
        let heat = heater.map_or(0, |h| u32::from(h.duration_ms) * 1000);
        tph + heat
    }
}
