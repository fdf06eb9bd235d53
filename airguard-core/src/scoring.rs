//! Air-Quality Scoring
//!
//! Maps a compensated reading onto a 0..=500 indoor-air-quality index,
//! higher meaning worse air. Two components on a 0..=100 "quality" scale are
//! blended:
//!
//! - **Gas**: current resistance relative to a running clean-air baseline.
//!   VOCs lower the resistance of the metal-oxide layer, so a reading below
//!   the baseline scores worse. Capped at 100 (cleaner than baseline).
//! - **Humidity**: distance from an ideal relative humidity, linear on both
//!   sides down to 0 at 0 %RH and 100 %RH.
//!
//! ```text
//! iaq = 500 - (gas × w + humidity × (1 - w)) × 5      clamped to 0..=500
//! ```
//!
//! ## Baseline
//!
//! The baseline is an exponential moving average of heater-stable
//! resistance, seeded with the first accepted sample after warm-up. Each
//! score is computed against the baseline as it was *before* that sample
//! was folded in.
//!
//! Samples taken during warm-up or with an unstable heater produce no score
//! and never touch the baseline.

use core::time::Duration;

use crate::compensation::CompensatedReading;
use crate::constants::air_quality::{
    CATEGORY_BOUNDS, COMPONENT_MAX, DEFAULT_BASELINE_SMOOTHING, DEFAULT_GAS_WEIGHT,
    DEFAULT_IDEAL_HUMIDITY_PCT, DEFAULT_WARM_UP_SECS, IAQ_MAX, IAQ_MIN,
};

/// Tuning of the scorer
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoringConfig {
    /// No scores before this much time since boot
    pub warm_up: Duration,
    /// Weight of the newest sample in the baseline average, in (0, 1]
    pub baseline_smoothing: f32,
    /// Humidity that scores best (%RH)
    pub ideal_humidity_pct: f32,
    /// Share of the gas component, in [0, 1]
    pub gas_weight: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            warm_up: Duration::from_secs(DEFAULT_WARM_UP_SECS),
            baseline_smoothing: DEFAULT_BASELINE_SMOOTHING,
            ideal_humidity_pct: DEFAULT_IDEAL_HUMIDITY_PCT,
            gas_weight: DEFAULT_GAS_WEIGHT,
        }
    }
}

/// Scoring state carried from one cycle to the next
///
/// Owned by exactly one engine. Lives as long as the process; there is no
/// persistence across restarts.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaselineState {
    /// Running clean-air resistance (Ω), `None` until the first accepted sample
    pub gas_baseline_ohm: Option<f32>,
    /// Humidity the humidity component is measured against (%RH)
    pub humidity_baseline_pct: f32,
    /// Warm-up left before scores are produced
    pub warm_up_remaining: Duration,
    /// Time since boot at the previous call
    pub last_elapsed: Option<Duration>,
}

impl BaselineState {
    /// Fresh state at boot
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            gas_baseline_ohm: None,
            humidity_baseline_pct: config.ideal_humidity_pct,
            warm_up_remaining: config.warm_up,
            last_elapsed: None,
        }
    }

    /// True once warm-up is over
    pub fn is_warm(&self) -> bool {
        self.warm_up_remaining.is_zero()
    }

    fn advance(&mut self, elapsed_since_boot: Duration) {
        let step = match self.last_elapsed {
            Some(last) => elapsed_since_boot.saturating_sub(last),
            None => elapsed_since_boot,
        };
        self.last_elapsed = Some(elapsed_since_boot);

        let was_warming = !self.is_warm();
        self.warm_up_remaining = self.warm_up_remaining.saturating_sub(step);
        if was_warming && self.is_warm() {
            log_info!("gas sensor warm-up complete after {:?}", elapsed_since_boot);
        }
    }
}

/// IAQ index, 0..=500
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IaqScore(f32);

impl IaqScore {
    /// Clamp `value` into the valid range. NaN maps to the worst score.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            Self(IAQ_MAX)
        } else {
            Self(value.clamp(IAQ_MIN, IAQ_MAX))
        }
    }

    /// Numeric score
    pub fn value(self) -> f32 {
        self.0
    }

    /// Descriptive band
    pub fn category(self) -> IaqCategory {
        let bands = [
            IaqCategory::Excellent,
            IaqCategory::Good,
            IaqCategory::LightlyPolluted,
            IaqCategory::ModeratelyPolluted,
            IaqCategory::HeavilyPolluted,
        ];
        CATEGORY_BOUNDS
            .iter()
            .zip(bands)
            .find(|(bound, _)| self.0 <= **bound)
            .map_or(IaqCategory::SeverelyPolluted, |(_, band)| band)
    }
}

/// Descriptive IAQ band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum IaqCategory {
    Excellent,
    Good,
    LightlyPolluted,
    ModeratelyPolluted,
    HeavilyPolluted,
    SeverelyPolluted,
}

impl IaqCategory {
    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::LightlyPolluted => "Lightly polluted",
            Self::ModeratelyPolluted => "Moderately polluted",
            Self::HeavilyPolluted => "Heavily polluted",
            Self::SeverelyPolluted => "Severely polluted",
        }
    }
}

/// Why a cycle produced no score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnavailableReason {
    /// Still inside the warm-up window
    WarmingUp {
        /// Warm-up left
        remaining: Duration,
    },
    /// The heater had not reached its target
    HeaterUnstable,
    /// The cycle carried no usable gas resistance
    NoGasData,
}

/// Result of scoring one reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IaqOutcome {
    /// A score was produced
    Score(IaqScore),
    /// Not an error: no score this cycle
    Unavailable(UnavailableReason),
}

impl IaqOutcome {
    /// The score, if any
    pub fn score(&self) -> Option<IaqScore> {
        match self {
            Self::Score(score) => Some(*score),
            Self::Unavailable(_) => None,
        }
    }
}

/// Scores readings against an adaptive baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirQualityScorer {
    config: ScoringConfig,
}

impl AirQualityScorer {
    /// Scorer with the given tuning
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Tuning in use
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// State for a freshly booted sensor
    pub fn initial_state(&self) -> BaselineState {
        BaselineState::new(&self.config)
    }

    /// Score one reading and update the baseline.
    ///
    /// `heater_stable` is combined with the flag carried by the reading;
    /// either one being false makes the gas channel unusable.
    pub fn score(
        &self,
        reading: &CompensatedReading,
        heater_stable: bool,
        state: &mut BaselineState,
        elapsed_since_boot: Duration,
    ) -> IaqOutcome {
        state.advance(elapsed_since_boot);
        if !state.is_warm() {
            return IaqOutcome::Unavailable(UnavailableReason::WarmingUp {
                remaining: state.warm_up_remaining,
            });
        }

        if !(heater_stable && reading.heater_stable) {
            log_debug!("heater not stable, sample not scored");
            return IaqOutcome::Unavailable(UnavailableReason::HeaterUnstable);
        }

        let resistance = match reading.gas_resistance_ohm {
            Some(r) if reading.gas_valid && r.is_finite() && r > 0.0 => r,
            _ => return IaqOutcome::Unavailable(UnavailableReason::NoGasData),
        };

        let baseline = match state.gas_baseline_ohm {
            Some(baseline) => baseline,
            None => {
                log_info!("gas baseline seeded at {} ohm", resistance);
                resistance
            }
        };

        let score = Self::index(
            resistance,
            baseline,
            reading.humidity_rh,
            state.humidity_baseline_pct,
            self.config.gas_weight,
        );

        let alpha = self.config.baseline_smoothing;
        state.gas_baseline_ohm = Some(baseline + alpha * (resistance - baseline));

        IaqOutcome::Score(score)
    }

    /// The IAQ formula on its own, without state.
    pub fn index(
        gas_resistance_ohm: f32,
        gas_baseline_ohm: f32,
        humidity_pct: f32,
        ideal_humidity_pct: f32,
        gas_weight: f32,
    ) -> IaqScore {
        let gas = if gas_baseline_ohm > 0.0 {
            (gas_resistance_ohm / gas_baseline_ohm * COMPONENT_MAX).min(COMPONENT_MAX)
        } else {
            0.0
        };

        let humidity = if humidity_pct < ideal_humidity_pct {
            humidity_pct / ideal_humidity_pct * COMPONENT_MAX
        } else {
            (100.0 - humidity_pct) / (100.0 - ideal_humidity_pct) * COMPONENT_MAX
        };
        let humidity = humidity.clamp(0.0, COMPONENT_MAX);

        let quality = gas * gas_weight + humidity * (1.0 - gas_weight);
        IaqScore::new(IAQ_MAX - quality * (IAQ_MAX / COMPONENT_MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WARM: Duration = Duration::from_secs(600);

    fn reading(resistance: f32, humidity: f32) -> CompensatedReading {
        CompensatedReading {
            temperature_c: 22.0,
            pressure_hpa: Some(1013.0),
            humidity_rh: humidity,
            gas_resistance_ohm: Some(resistance),
            gas_valid: true,
            heater_stable: true,
        }
    }

    fn scorer() -> AirQualityScorer {
        AirQualityScorer::new(ScoringConfig::default())
    }

    #[test]
    fn warm_up_blocks_scores() {
        let scorer = scorer();
        let mut state = scorer.initial_state();

        let outcome = scorer.score(&reading(50_000.0, 40.0), true, &mut state, Duration::from_secs(60));
        assert_eq!(
            outcome,
            IaqOutcome::Unavailable(UnavailableReason::WarmingUp {
                remaining: Duration::from_secs(240)
            })
        );
        assert_eq!(state.gas_baseline_ohm, None);

        let outcome = scorer.score(&reading(50_000.0, 40.0), true, &mut state, Duration::from_secs(300));
        assert!(outcome.score().is_some());
    }

    #[test]
    fn warm_up_uses_elapsed_deltas() {
        let scorer = scorer();
        let mut state = scorer.initial_state();

        scorer.score(&reading(50_000.0, 40.0), true, &mut state, Duration::from_secs(100));
        scorer.score(&reading(50_000.0, 40.0), true, &mut state, Duration::from_secs(250));
        assert_eq!(state.warm_up_remaining, Duration::from_secs(50));

        // A clock that goes backwards does not extend warm-up
        scorer.score(&reading(50_000.0, 40.0), true, &mut state, Duration::from_secs(200));
        assert_eq!(state.warm_up_remaining, Duration::from_secs(50));
    }

    #[test]
    fn unstable_heater_leaves_baseline_untouched() {
        let scorer = scorer();
        let mut state = scorer.initial_state();
        scorer.score(&reading(80_000.0, 40.0), true, &mut state, WARM);
        let before = state.gas_baseline_ohm.unwrap().to_bits();

        let outcome = scorer.score(&reading(10_000.0, 40.0), false, &mut state, WARM);
        assert_eq!(outcome, IaqOutcome::Unavailable(UnavailableReason::HeaterUnstable));

        let mut tagged = reading(10_000.0, 40.0);
        tagged.heater_stable = false;
        let outcome = scorer.score(&tagged, true, &mut state, WARM);
        assert_eq!(outcome, IaqOutcome::Unavailable(UnavailableReason::HeaterUnstable));

        assert_eq!(state.gas_baseline_ohm.unwrap().to_bits(), before);
    }

    #[test]
    fn missing_gas_is_unavailable() {
        let scorer = scorer();
        let mut state = scorer.initial_state();
        let mut r = reading(50_000.0, 40.0);
        r.gas_resistance_ohm = None;

        assert_eq!(
            scorer.score(&r, true, &mut state, WARM),
            IaqOutcome::Unavailable(UnavailableReason::NoGasData)
        );
        assert_eq!(state.gas_baseline_ohm, None);
    }

    #[test]
    fn first_sample_seeds_baseline() {
        let scorer = scorer();
        let mut state = scorer.initial_state();

        let score = scorer.score(&reading(50_000.0, 40.0), true, &mut state, WARM).score().unwrap();
        // Gas at baseline, humidity ideal
        assert_eq!(score.value(), 0.0);
        assert_eq!(state.gas_baseline_ohm, Some(50_000.0));
    }

    #[test]
    fn baseline_follows_moving_average() {
        let scorer = scorer();
        let mut state = scorer.initial_state();
        scorer.score(&reading(50_000.0, 40.0), true, &mut state, WARM);

        let score = scorer.score(&reading(25_000.0, 40.0), true, &mut state, WARM).score().unwrap();
        // Half the baseline: gas 50, humidity 100 → quality 62.5 → 187.5
        assert!((score.value() - 187.5).abs() < 1e-3);
        assert!((state.gas_baseline_ohm.unwrap() - 47_500.0).abs() < 1e-2);
    }

    #[test]
    fn humidity_component_is_piecewise_linear() {
        let at = |h: f32| AirQualityScorer::index(1.0, 1.0, h, 40.0, 0.0).value();
        assert_eq!(at(40.0), 0.0);
        assert!((at(20.0) - 250.0).abs() < 1e-3);
        assert!((at(70.0) - 250.0).abs() < 1e-3);
        assert_eq!(at(0.0), 500.0);
        assert_eq!(at(100.0), 500.0);
    }

    #[test]
    fn score_is_clamped() {
        assert_eq!(IaqScore::new(-3.0).value(), 0.0);
        assert_eq!(IaqScore::new(812.0).value(), 500.0);
        assert_eq!(IaqScore::new(f32::NAN).value(), 500.0);
        assert_eq!(AirQualityScorer::index(1.0, 0.0, 40.0, 40.0, 1.0).value(), 500.0);
    }

    #[test]
    fn categories() {
        assert_eq!(IaqScore::new(0.0).category(), IaqCategory::Excellent);
        assert_eq!(IaqScore::new(50.0).category(), IaqCategory::Excellent);
        assert_eq!(IaqScore::new(50.5).category(), IaqCategory::Good);
        assert_eq!(IaqScore::new(150.0).category(), IaqCategory::LightlyPolluted);
        assert_eq!(IaqScore::new(175.0).category(), IaqCategory::ModeratelyPolluted);
        assert_eq!(IaqScore::new(300.0).category(), IaqCategory::HeavilyPolluted);
        assert_eq!(IaqScore::new(301.0).category(), IaqCategory::SeverelyPolluted);
        assert_eq!(IaqCategory::LightlyPolluted.label(), "Lightly polluted");
    }
}
