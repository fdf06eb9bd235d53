//! Compensation and air-quality scoring engine for the Bosch BME680
//!
//! Turns raw device registers into calibrated physical readings and a
//! bounded indoor-air-quality index. Designed to run on the same small
//! targets the sensor usually sits next to.
//!
//! Key constraints:
//! - No heap allocation anywhere in a measurement cycle
//! - One engine instance per physical sensor, never shared
//! - Blocking only inside the bounded status poll
//!
//! Data flows strictly upward:
//!
//! ```text
//! RegisterTransport ─▶ CalibrationSet (once)
//!        │
//!        ▼
//! MeasurementCycle ─▶ RawSample ─▶ compensate() ─▶ apply_offsets() ─▶ caller
//!                                        │
//!                                        └────────▶ AirQualityScorer ─▶ IaqOutcome
//! ```
//!
//! ```no_run
//! use airguard_core::{AirQualityEngine, EngineConfig, SimulatedSensor};
//! use core::time::Duration;
//! # struct NoDelay;
//! # impl embedded_hal::delay::DelayNs for NoDelay { fn delay_ns(&mut self, _: u32) {} }
//!
//! let mut delay = NoDelay;
//! let sensor = SimulatedSensor::default();
//! let mut engine = AirQualityEngine::new(sensor, EngineConfig::default(), &mut delay)?;
//!
//! let sample = engine.sample(Duration::from_secs(30), &mut delay)?;
//! println!("{:.2} °C", sample.reading.temperature_c);
//! # Ok::<(), airguard_core::SensorError<airguard_core::transport::SimulatedBusError>>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod macros;

pub mod calibration;
pub mod compensation;
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod heater;
pub mod measurement;
pub mod offsets;
pub mod scoring;
pub mod telemetry;
pub mod transport;

// Public API
pub use calibration::CalibrationSet;
pub use compensation::{compensate, CompensatedReading};
pub use config::{EngineConfig, EngineConfigBuilder, HeaterProfile, PollConfig};
pub use engine::{AirQualityEngine, Sample};
pub use errors::{SensorError, SensorResult};
pub use measurement::{CycleState, MeasurementCycle, RawSample};
pub use offsets::{apply_offsets, Offsets};
pub use scoring::{
    AirQualityScorer, BaselineState, IaqCategory, IaqOutcome, IaqScore, ScoringConfig,
    UnavailableReason,
};
pub use telemetry::{TelemetryRecord, TelemetrySink};
pub use transport::{probe, I2cTransport, RegisterTransport, SimulatedSensor};

/// Crate version, as published.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
