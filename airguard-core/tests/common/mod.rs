//! Shared fixtures for integration tests
//!
//! Expected values were computed independently from the datasheet formulas
//! for the reference calibration image.

#![allow(dead_code)]

use core::time::Duration;

use airguard_core::{
    transport::simulated::REFERENCE_CALIBRATION, AirQualityEngine, CalibrationSet, EngineConfig,
    RawSample, SimulatedSensor,
};
use embedded_hal::delay::DelayNs;

/// Absolute tolerance for compensated values
pub const TOLERANCE: f32 = 1e-3;

/// Delay that returns immediately and records how long it was asked to wait
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

/// One conversion with the readings it must compensate to
pub struct Fixture {
    pub raw: RawSample,
    pub temperature_c: f32,
    pub pressure_hpa: f32,
    pub humidity_rh: f32,
    pub gas_resistance_ohm: f32,
}

/// Room air: about 26 °C, 1008 hPa, 50 %RH
pub const ROOM_AIR: Fixture = Fixture {
    raw: RawSample {
        temp_adc: 500_000,
        press_adc: 350_000,
        hum_adc: 22_000,
        gas_adc: 600,
        gas_range: 5,
        gas_valid: true,
        heater_stable: true,
    },
    temperature_c: 26.183_132,
    pressure_hpa: 1007.749_8,
    humidity_rh: 50.270_704,
    gas_resistance_ohm: 232_978.61,
};

/// Warm and humid: about 32 °C, 1001 hPa, 64 %RH
pub const WARM_HUMID: Fixture = Fixture {
    raw: RawSample {
        temp_adc: 520_000,
        press_adc: 360_000,
        hum_adc: 24_000,
        gas_adc: 300,
        gas_range: 5,
        gas_valid: true,
        heater_stable: true,
    },
    temperature_c: 32.451_768,
    pressure_hpa: 1000.632_9,
    humidity_rh: 64.235_06,
    gas_resistance_ohm: 294_861.47,
};

/// Room air with VOCs: resistance drops to ~82.7 % of [`ROOM_AIR`]
pub const POLLUTED: RawSample = RawSample { gas_adc: 900, ..ROOM_AIR.raw };

/// Room air sampled before the heater reached its target
pub const UNSTABLE_HEATER: RawSample = RawSample { heater_stable: false, ..ROOM_AIR.raw };

/// IAQ of [`ROOM_AIR`] when it seeds the baseline
pub const ROOM_AIR_IAQ: f32 = 21.397;

/// IAQ of [`POLLUTED`] against a baseline seeded by [`ROOM_AIR`]
pub const POLLUTED_IAQ: f32 = 86.447;

/// Time since boot well past the default warm-up
pub const AFTER_WARM_UP: Duration = Duration::from_secs(301);

pub fn calibration() -> CalibrationSet {
    CalibrationSet::from_image(&REFERENCE_CALIBRATION)
}

pub fn sensor_with(raw: RawSample) -> SimulatedSensor {
    let mut sensor = SimulatedSensor::default();
    sensor.set_sample(raw);
    sensor
}

pub fn engine_with(raw: RawSample, config: EngineConfig) -> AirQualityEngine<SimulatedSensor> {
    AirQualityEngine::new(sensor_with(raw), config, &mut RecordingDelay::default())
        .expect("simulated sensor brings up")
}

pub fn assert_close(actual: f32, expected: f32, tolerance: f32, what: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{what}: expected {expected}, got {actual} (tolerance {tolerance})"
    );
}
