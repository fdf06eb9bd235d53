//! Air-Quality Scoring Defaults
//!
//! The IAQ index combines how far gas resistance has fallen below its
//! running baseline with how far humidity sits from a comfortable band.
//! The weights and band limits below are tuning values, not physics, and
//! every one of them can be overridden through `ScoringConfig`.

/// Lowest possible IAQ score (cleanest air).
pub const IAQ_MIN: f32 = 0.0;

/// Highest possible IAQ score (worst air).
pub const IAQ_MAX: f32 = 500.0;

/// Heater burn-in before scores are reported (seconds).
///
/// The metal-oxide layer drifts strongly for the first minutes after power-up.
pub const DEFAULT_WARM_UP_SECS: u64 = 5 * 60;

/// Weight of the newest sample in the gas baseline moving average.
pub const DEFAULT_BASELINE_SMOOTHING: f32 = 0.1;

/// Humidity treated as ideal for indoor air (%RH).
pub const DEFAULT_IDEAL_HUMIDITY_PCT: f32 = 40.0;

/// Share of the gas component in the combined score; humidity gets the rest.
pub const DEFAULT_GAS_WEIGHT: f32 = 0.75;

/// Component scores are expressed on a 0..=100 "quality" scale.
pub const COMPONENT_MAX: f32 = 100.0;

/// Upper bounds of the IAQ categories, inclusive.
///
/// Excellent, good, lightly, moderately and heavily polluted. Anything above
/// the last bound is severely polluted.
pub const CATEGORY_BOUNDS: [f32; 5] = [50.0, 100.0, 150.0, 200.0, 300.0];
