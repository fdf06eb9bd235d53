//! Boundary and monotonicity properties of the IAQ score

use core::time::Duration;

use airguard_core::{
    AirQualityScorer, CompensatedReading, IaqOutcome, ScoringConfig, UnavailableReason,
};
use proptest::prelude::*;

fn reading(resistance: f32, humidity: f32, heater_stable: bool) -> CompensatedReading {
    CompensatedReading {
        temperature_c: 22.0,
        pressure_hpa: Some(1013.25),
        humidity_rh: humidity,
        gas_resistance_ohm: Some(resistance),
        gas_valid: true,
        heater_stable,
    }
}

proptest! {
    #[test]
    fn prop_index_in_range(
        resistance in -1.0e7f32..1.0e7,
        baseline in -1.0e7f32..1.0e7,
        humidity in -50.0f32..150.0,
        ideal in 1.0f32..99.0,
        weight in 0.0f32..=1.0,
    ) {
        let score = AirQualityScorer::index(resistance, baseline, humidity, ideal, weight).value();
        prop_assert!((0.0..=500.0).contains(&score));
    }

    #[test]
    fn prop_less_resistance_never_scores_better(
        r1 in 1.0f32..1.0e6,
        r2 in 1.0f32..1.0e6,
        baseline in 1.0f32..1.0e6,
        humidity in 0.0f32..=100.0,
    ) {
        let (low, high) = if r1 <= r2 { (r1, r2) } else { (r2, r1) };
        let score = |r| AirQualityScorer::index(r, baseline, humidity, 40.0, 0.75).value();
        prop_assert!(score(low) >= score(high));
    }

    #[test]
    fn prop_warm_up_always_unavailable(
        resistance in 1.0f32..1.0e6,
        humidity in 0.0f32..=100.0,
        stable in any::<bool>(),
        secs in 0u64..300,
    ) {
        let scorer = AirQualityScorer::new(ScoringConfig::default());
        let mut state = scorer.initial_state();
        let outcome = scorer.score(
            &reading(resistance, humidity, stable),
            stable,
            &mut state,
            Duration::from_secs(secs),
        );

        let warming = matches!(outcome, IaqOutcome::Unavailable(UnavailableReason::WarmingUp { .. }));
        prop_assert!(warming);
        prop_assert_eq!(state.gas_baseline_ohm, None);
    }

    #[test]
    fn prop_unstable_heater_never_moves_baseline(
        seed in 1.0f32..1.0e6,
        noise in proptest::collection::vec(1.0f32..1.0e6, 1..20),
    ) {
        let scorer = AirQualityScorer::new(ScoringConfig::default());
        let mut state = scorer.initial_state();
        let warm = Duration::from_secs(600);
        scorer.score(&reading(seed, 40.0, true), true, &mut state, warm);
        let before = state.gas_baseline_ohm.map(f32::to_bits);

        for r in noise {
            let outcome = scorer.score(&reading(r, 40.0, false), false, &mut state, warm);
            prop_assert_eq!(outcome, IaqOutcome::Unavailable(UnavailableReason::HeaterUnstable));
        }
        prop_assert_eq!(state.gas_baseline_ohm.map(f32::to_bits), before);
    }
}
