//! Gas Channel Constants
//!
//! The gas ADC switches between 16 ranges; each range has its own reference
//! resistance and a small correction for the range switching error. Values
//! are the floating-point tables published with the BME680 datasheet.

/// Number of gas ADC ranges (4-bit `gas_range` field).
pub const GAS_RANGES: usize = 16;

/// Per-range correction factor applied to the range switching error term.
pub const RANGE_CORRECTION: [f64; GAS_RANGES] = [
    1.0, 1.0, 1.0, 1.0, 1.0, 0.99, 1.0, 0.992,
    1.0, 1.0, 0.998, 0.995, 1.0, 0.99, 1.0, 1.0,
];

/// Per-range reference resistance (ohms).
pub const RANGE_REFERENCE_OHM: [f64; GAS_RANGES] = [
    8_000_000.0, 4_000_000.0, 2_000_000.0, 1_000_000.0,
    499_500.4995, 248_262.1648, 125_000.0, 63_004.03226,
    31_281.28128, 15_625.0, 7_812.5, 3_906.25,
    1_953.125, 976.5625, 488.28125, 244.140625,
];

/// Base of the range switching error term.
pub const RANGE_SWITCHING_BASE: f64 = 1340.0;

/// Weight of the per-chip `range_sw_err` calibration value.
pub const RANGE_SWITCHING_WEIGHT: f64 = 5.0;

/// Gas ADC midpoint subtracted before applying the range formula.
pub const GAS_ADC_OFFSET: f64 = 512.0;

/// Highest heater target the membrane tolerates (°C).
pub const HEATER_MAX_TARGET_C: u16 = 400;

/// Durations at or above this saturate the `gas_wait` register (ms).
pub const HEATER_MAX_DURATION_MS: u16 = 0x0FC0;

/// Default heater target temperature (°C).
pub const DEFAULT_HEATER_TARGET_C: u16 = 300;

/// Default heater duration (ms).
pub const DEFAULT_HEATER_DURATION_MS: u16 = 100;

/// Default ambient estimate used for the first heater setpoint (°C).
pub const DEFAULT_AMBIENT_C: f32 = 25.0;
