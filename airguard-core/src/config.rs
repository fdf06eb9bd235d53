//! Engine Configuration
//!
//! Everything the engine needs to know before the first cycle: how hard to
//! oversample, how to drive the heater, how to correct readings and how to
//! score them. All values are plain data; [`EngineConfig::validate`] checks
//! them once, before anything is written to the device.
//!
//! ```rust
//! use airguard_core::config::{EngineConfig, IirFilter, Oversampling};
//! use core::time::Duration;
//!
//! let config = EngineConfig::builder()
//!     .temperature_oversampling(Oversampling::X8)
//!     .filter(IirFilter::Coeff3)
//!     .heater(320, 150)
//!     .warm_up(Duration::from_secs(60))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.heater.unwrap().target_c, 320);
//! ```

use core::time::Duration;

use crate::constants::gas::{
    DEFAULT_AMBIENT_C, DEFAULT_HEATER_DURATION_MS, DEFAULT_HEATER_TARGET_C,
    HEATER_MAX_DURATION_MS,
};
use crate::offsets::Offsets;
use crate::scoring::ScoringConfig;

/// Oversampling ratio of one TPH channel, encoded as its register value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum Oversampling {
    /// Channel disabled
    Skipped = 0,
    X1 = 1,
    X2 = 2,
    X4 = 3,
    X8 = 4,
    X16 = 5,
}

impl Oversampling {
    /// 3-bit register encoding
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Number of ADC conversions this setting costs per cycle
    pub fn cycles(self) -> u32 {
        match self {
            Self::Skipped => 0,
            Self::X1 => 1,
            Self::X2 => 2,
            Self::X4 => 4,
            Self::X8 => 8,
            Self::X16 => 16,
        }
    }
}

/// Oversampling for the three TPH channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub struct OversamplingConfig {
    pub temperature: Oversampling,
    pub pressure: Oversampling,
    pub humidity: Oversampling,
}

impl Default for OversamplingConfig {
    fn default() -> Self {
        Self {
            temperature: Oversampling::X4,
            pressure: Oversampling::X4,
            humidity: Oversampling::X2,
        }
    }
}

impl OversamplingConfig {
    /// Total ADC conversions per cycle
    pub fn cycles(&self) -> u32 {
        self.temperature.cycles() + self.pressure.cycles() + self.humidity.cycles()
    }
}

/// IIR filter applied to temperature and pressure
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum IirFilter {
    Off = 0,
    #[default]
    Coeff1 = 1,
    Coeff3 = 2,
    Coeff7 = 3,
    Coeff15 = 4,
    Coeff31 = 5,
    Coeff63 = 6,
    Coeff127 = 7,
}

impl IirFilter {
    /// 3-bit register encoding
    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Heater target for the gas measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeaterProfile {
    /// Hot-plate target temperature (°C); values above 400 are capped
    pub target_c: u16,
    /// Time the heater is held at target before the gas conversion (ms)
    pub duration_ms: u16,
}

impl Default for HeaterProfile {
    fn default() -> Self {
        Self {
            target_c: DEFAULT_HEATER_TARGET_C,
            duration_ms: DEFAULT_HEATER_DURATION_MS,
        }
    }
}

/// Bounded status polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PollConfig {
    /// Wait between two status reads
    pub interval: Duration,
    /// Status reads before giving up with a timeout
    pub max_polls: u16,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5),
            max_polls: 100,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// TPH oversampling
    pub oversampling: OversamplingConfig,
    /// IIR filter coefficient
    pub filter: IirFilter,
    /// Heater profile, `None` to skip the gas measurement
    pub heater: Option<HeaterProfile>,
    /// Ambient estimate for the first heater setpoint (°C)
    pub ambient_temp_c: f32,
    /// Post-compensation corrections
    pub offsets: Offsets,
    /// IAQ scoring parameters
    pub scoring: ScoringConfig,
    /// Status polling budget
    pub polling: PollConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            oversampling: OversamplingConfig::default(),
            filter: IirFilter::default(),
            heater: Some(HeaterProfile::default()),
            ambient_temp_c: DEFAULT_AMBIENT_C,
            offsets: Offsets::default(),
            scoring: ScoringConfig::default(),
            polling: PollConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Start from the defaults
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Check every value that cannot be represented or makes scoring meaningless.
    pub fn validate(&self) -> Result<(), &'static str> {
        let s = &self.scoring;
        if !(s.baseline_smoothing > 0.0 && s.baseline_smoothing <= 1.0) {
            return Err("baseline smoothing must be in (0, 1]");
        }
        if !(0.0..=1.0).contains(&s.gas_weight) {
            return Err("gas weight must be in [0, 1]");
        }
        if !(s.ideal_humidity_pct > 0.0 && s.ideal_humidity_pct < 100.0) {
            return Err("ideal humidity must be in (0, 100)");
        }
        if self.polling.max_polls == 0 {
            return Err("poll budget must allow at least one status read");
        }
        if !self.ambient_temp_c.is_finite() {
            return Err("ambient temperature must be finite");
        }
        if let Some(heater) = self.heater {
            if heater.duration_ms == 0 {
                return Err("heater duration must be non-zero");
            }
            if heater.duration_ms > HEATER_MAX_DURATION_MS {
                return Err("heater duration exceeds 4032 ms");
            }
        }
        Ok(())
    }
}

/// Fluent construction of an [`EngineConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Builder seeded with [`EngineConfig::default`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Temperature oversampling
    pub fn temperature_oversampling(mut self, os: Oversampling) -> Self {
        self.config.oversampling.temperature = os;
        self
    }

    /// Pressure oversampling
    pub fn pressure_oversampling(mut self, os: Oversampling) -> Self {
        self.config.oversampling.pressure = os;
        self
    }

    /// Humidity oversampling
    pub fn humidity_oversampling(mut self, os: Oversampling) -> Self {
        self.config.oversampling.humidity = os;
        self
    }

    /// IIR filter coefficient
    pub fn filter(mut self, filter: IirFilter) -> Self {
        self.config.filter = filter;
        self
    }

    /// Heater target (°C) and duration (ms)
    pub fn heater(mut self, target_c: u16, duration_ms: u16) -> Self {
        self.config.heater = Some(HeaterProfile { target_c, duration_ms });
        self
    }

    /// Skip the gas measurement entirely
    pub fn without_gas(mut self) -> Self {
        self.config.heater = None;
        self
    }

    /// Ambient estimate used before the first reading
    pub fn ambient_temp_c(mut self, ambient: f32) -> Self {
        self.config.ambient_temp_c = ambient;
        self
    }

    /// Post-compensation offsets
    pub fn offsets(mut self, offsets: Offsets) -> Self {
        self.config.offsets = offsets;
        self
    }

    /// Scoring parameters, replacing all of them
    pub fn scoring(mut self, scoring: ScoringConfig) -> Self {
        self.config.scoring = scoring;
        self
    }

    /// Warm-up before scores are reported
    pub fn warm_up(mut self, warm_up: Duration) -> Self {
        self.config.scoring.warm_up = warm_up;
        self
    }

    /// Status polling budget
    pub fn polling(mut self, interval: Duration, max_polls: u16) -> Self {
        self.config.polling = PollConfig { interval, max_polls };
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<EngineConfig, &'static str> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = EngineConfig::default();
        assert_eq!(config.oversampling.temperature, Oversampling::X4);
        assert_eq!(config.oversampling.pressure, Oversampling::X4);
        assert_eq!(config.oversampling.humidity, Oversampling::X2);
        assert_eq!(config.filter, IirFilter::Coeff1);
        assert_eq!(config.heater, Some(HeaterProfile { target_c: 300, duration_ms: 100 }));
        assert_eq!(config.polling.max_polls, 100);
        assert_eq!(config.scoring.warm_up, Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn cycles_count_conversions() {
        assert_eq!(OversamplingConfig::default().cycles(), 10);
        assert_eq!(Oversampling::Skipped.cycles(), 0);
        assert_eq!(Oversampling::X16.bits(), 5);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = EngineConfig::default();
        config.scoring.baseline_smoothing = 0.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.scoring.gas_weight = 1.5;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.scoring.ideal_humidity_pct = 100.0;
        assert!(config.validate().is_err());

        assert!(EngineConfig::builder().heater(300, 5000).build().is_err());
        assert!(EngineConfig::builder().polling(Duration::from_millis(1), 0).build().is_err());
    }

    #[test]
    fn builder_without_gas() {
        let config = EngineConfig::builder().without_gas().build().unwrap();
        assert_eq!(config.heater, None);
    }
}
