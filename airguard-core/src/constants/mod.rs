//! Constants for AirGuard Core
//!
//! Every number the engine relies on is defined here, with its unit and
//! where it comes from. Register addresses and bit layouts are fixed by the
//! BME680 register map; a wrong offset produces plausible-looking garbage
//! rather than an error, so they are kept in one place.
//!
//! ## Organization
//!
//! - **Registers**: addresses, block lengths, bit masks, chip identity
//! - **Gas**: range lookup tables and heater limits
//! - **Air quality**: scoring defaults and category boundaries

/// Register map of the BME680 (addresses, masks, field layouts).
pub mod registers;

/// Gas-range lookup tables and heater constants.
pub mod gas;

/// Scoring defaults and IAQ category boundaries.
pub mod air_quality;

pub use registers::{CHIP_ID, PRIMARY_ADDRESS, SECONDARY_ADDRESS};
pub use air_quality::{
    DEFAULT_BASELINE_SMOOTHING, DEFAULT_GAS_WEIGHT, DEFAULT_IDEAL_HUMIDITY_PCT,
    DEFAULT_WARM_UP_SECS, IAQ_MAX, IAQ_MIN,
};
