//! Error Types for Bring-Up and Measurement Failures
//!
//! ## Design Philosophy
//!
//! The engine runs next to the sensor, often on a microcontroller, so errors
//! follow the same rules as the rest of the crate:
//!
//! 1. **No Heap Allocation**: every variant is inline data, messages are
//!    `&'static str`.
//! 2. **Copy Semantics**: errors are `Copy` whenever the transport's error is,
//!    so they can be parked in a mailbox or retried without cloning.
//! 3. **Caller Owns Policy**: nothing here is retried internally. Each variant
//!    tells the scheduler what kind of failure it is looking at.
//!
//! ## Error Categories
//!
//! ### Fatal at Bring-Up
//! - `DeviceIdentity`: no BME680 at either address, something else answered,
//!   or a BME688 (different gas register layout)
//!
//! ### Environmental (retry a fresh cycle)
//! - `Transport`: the bus failed; carries the transport's own error
//! - `MeasurementTimeout`: the conversion never finished within the poll budget
//!
//! ### Programming Errors
//! - `CycleBusy`: a new cycle was started while one is still converting
//! - `CycleNotStarted`: the status was polled with no cycle in flight
//! - `InvalidConfig`: the configuration cannot be expressed in device registers
//!
//! A missing air-quality score is *not* an error. Warm-up and unstable heater
//! samples are reported through [`crate::scoring::IaqOutcome::Unavailable`].
//!
//! ```rust
//! use airguard_core::SensorError;
//!
//! fn should_retry<E: core::fmt::Debug>(err: &SensorError<E>) -> bool {
//!     matches!(
//!         err,
//!         SensorError::Transport(_) | SensorError::MeasurementTimeout { .. }
//!     )
//! }
//!
//! assert!(should_retry::<()>(&SensorError::MeasurementTimeout { polls: 100 }));
//! assert!(!should_retry::<()>(&SensorError::CycleBusy));
//! ```

use core::fmt::Debug;

use thiserror_no_std::Error;

/// Result type for engine operations over a transport with error `E`
pub type SensorResult<T, E> = Result<T, SensorError<E>>;

/// Everything that can go wrong between the bus and a compensated reading
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError<E: Debug> {
    /// The chip-id register did not identify a BME680
    #[error("No BME680 found (chip id {found:?})")]
    DeviceIdentity {
        /// Identity byte read from the device: the chip id, or the variant
        /// id of a chip that answers with the right id but an unsupported
        /// variant. `None` if no address answered
        found: Option<u8>,
    },

    /// Underlying register read or write failed
    #[error("Register transport failed: {0:?}")]
    Transport(E),

    /// The device kept reporting a conversion in progress
    #[error("Measurement still in progress after {polls} status polls")]
    MeasurementTimeout {
        /// Number of status polls performed before giving up
        polls: u16,
    },

    /// A cycle was started while another one is still converting
    #[error("Measurement cycle already in flight")]
    CycleBusy,

    /// Status polled while no cycle is in flight
    #[error("No measurement cycle in flight")]
    CycleNotStarted,

    /// Configuration rejected before anything was written to the device
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with it
        reason: &'static str,
    },
}

impl<E: Debug> SensorError<E> {
    /// True for failures that mean the device itself is unusable
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DeviceIdentity { .. } | Self::InvalidConfig { .. })
    }
}

#[cfg(feature = "defmt")]
impl<E: Debug> defmt::Format for SensorError<E> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::DeviceIdentity { found: Some(id) } =>
                defmt::write!(fmt, "No BME680 (chip id {=u8:#x})", id),
            Self::DeviceIdentity { found: None } =>
                defmt::write!(fmt, "No BME680 on the bus"),
            Self::Transport(_) =>
                defmt::write!(fmt, "Register transport failed"),
            Self::MeasurementTimeout { polls } =>
                defmt::write!(fmt, "Measurement timeout after {} polls", polls),
            Self::CycleBusy =>
                defmt::write!(fmt, "Measurement cycle busy"),
            Self::CycleNotStarted =>
                defmt::write!(fmt, "No measurement cycle in flight"),
            Self::InvalidConfig { reason } =>
                defmt::write!(fmt, "Invalid configuration: {}", reason),
        }
    }
}
