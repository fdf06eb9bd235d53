//! Air-Quality Engine
//!
//! Owns one sensor end to end: the transport, the calibration read at
//! bring-up, the measurement cycle and the scoring state. One call to
//! [`AirQualityEngine::sample`] runs a full cycle:
//!
//! ```text
//! heater setpoint ─▶ forced conversion ─▶ compensate ─▶ offsets ─▶ score
//!       ▲                                     │
//!       └──────── measured temperature ───────┘
//! ```
//!
//! The engine exposes no timers. The caller decides when to sample and
//! passes the time since boot, which drives the scoring warm-up.

use core::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::calibration::CalibrationSet;
use crate::compensation::{compensate, CompensatedReading};
use crate::config::EngineConfig;
use crate::constants::registers::{
    ADDR_SOFT_RESET, ADDR_VARIANT_ID, SOFT_RESET_CMD, SOFT_RESET_DELAY_MS, VARIANT_BME680,
};
use crate::errors::{SensorError, SensorResult};
use crate::heater::HeaterSetpoint;
use crate::measurement::MeasurementCycle;
use crate::offsets::apply_offsets;
use crate::scoring::{AirQualityScorer, BaselineState, IaqOutcome, UnavailableReason};
use crate::transport::RegisterTransport;

/// Output of one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// Compensated reading with offsets applied
    pub reading: CompensatedReading,
    /// Air-quality score, or why there is none
    pub iaq: IaqOutcome,
}

/// Compensation and scoring engine for one BME680
#[derive(Debug)]
pub struct AirQualityEngine<T: RegisterTransport> {
    transport: T,
    calibration: CalibrationSet,
    cycle: MeasurementCycle,
    scorer: AirQualityScorer,
    baseline: BaselineState,
    config: EngineConfig,
    ambient_c: f32,
}

impl<T: RegisterTransport> AirQualityEngine<T> {
    /// Bring the device up: validate `config`, soft-reset, read calibration.
    ///
    /// Fails with [`SensorError::DeviceIdentity`] if the device is not a
    /// BME680 and with [`SensorError::Transport`] on any bus failure. A
    /// BME688 shares the chip id but uses a different gas register layout;
    /// it is rejected with its variant id as `found`.
    pub fn new<D: DelayNs>(
        mut transport: T,
        config: EngineConfig,
        delay: &mut D,
    ) -> SensorResult<Self, T::Error> {
        config
            .validate()
            .map_err(|reason| SensorError::InvalidConfig { reason })?;

        transport
            .write_byte(ADDR_SOFT_RESET, SOFT_RESET_CMD)
            .map_err(SensorError::Transport)?;
        delay.delay_ms(SOFT_RESET_DELAY_MS);

        let calibration = CalibrationSet::load(&mut transport)?;
        let variant = transport
            .read_byte(ADDR_VARIANT_ID)
            .map_err(SensorError::Transport)?;
        if variant != VARIANT_BME680 {
            log_warn!("unsupported variant {:#04x}", variant);
            return Err(SensorError::DeviceIdentity { found: Some(variant) });
        }
        log_info!("BME680 ready");

        let scorer = AirQualityScorer::new(config.scoring);
        Ok(Self {
            transport,
            calibration,
            cycle: MeasurementCycle::new(config.oversampling, config.filter, config.polling),
            baseline: scorer.initial_state(),
            scorer,
            ambient_c: config.ambient_temp_c,
            config,
        })
    }

    /// Run one measurement cycle and score it.
    ///
    /// Errors are per cycle: after a timeout or a bus failure the next call
    /// starts a fresh cycle. The scoring state is untouched by failed cycles.
    pub fn sample<D: DelayNs>(
        &mut self,
        elapsed_since_boot: Duration,
        delay: &mut D,
    ) -> SensorResult<Sample, T::Error> {
        let setpoint = self
            .config
            .heater
            .map(|profile| HeaterSetpoint::new(&profile, self.ambient_c, &self.calibration));

        let raw = self.cycle.measure(&mut self.transport, delay, setpoint.as_ref())?;
        let compensated = compensate(&raw, &self.calibration);

        // Heater resistance depends on ambient; track the uncorrected die temperature
        self.ambient_c = compensated.temperature_c;

        let reading = apply_offsets(compensated, &self.config.offsets);
        let iaq = if setpoint.is_some() {
            self.scorer
                .score(&reading, raw.heater_stable, &mut self.baseline, elapsed_since_boot)
        } else {
            IaqOutcome::Unavailable(UnavailableReason::NoGasData)
        };

        Ok(Sample { reading, iaq })
    }

    /// Factory calibration of this sensor
    pub fn calibration(&self) -> &CalibrationSet {
        &self.calibration
    }

    /// Current scoring state
    pub fn baseline(&self) -> &BaselineState {
        &self.baseline
    }

    /// Configuration in use
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ambient estimate for the next heater setpoint (°C)
    pub fn ambient_c(&self) -> f32 {
        self.ambient_c
    }

    /// Direct access to the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Tear down and give the transport back
    pub fn release(self) -> T {
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::registers::{ADDR_CTRL_GAS_1, ADDR_RES_HEAT_0, VARIANT_BME688};
    use crate::transport::simulated::SimulatedSensor;
    use crate::transport::I2cTransport;

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn engine(config: EngineConfig) -> AirQualityEngine<SimulatedSensor> {
        AirQualityEngine::new(SimulatedSensor::default(), config, &mut NoDelay).unwrap()
    }

    #[test]
    fn bring_up_reads_calibration() {
        let engine = engine(EngineConfig::default());

        assert_eq!(engine.calibration().par_t1, 26028);
        assert_eq!(engine.ambient_c(), 25.0);
    }

    #[test]
    fn bring_up_rejects_bme688() {
        let mut sensor = SimulatedSensor::default();
        sensor.set_variant(VARIANT_BME688);

        let err = AirQualityEngine::new(sensor, EngineConfig::default(), &mut NoDelay).unwrap_err();
        assert_eq!(err, SensorError::DeviceIdentity { found: Some(VARIANT_BME688) });
        assert!(err.is_fatal());
    }

    #[test]
    fn bring_up_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.scoring.gas_weight = -1.0;

        let err = AirQualityEngine::new(SimulatedSensor::default(), config, &mut NoDelay).unwrap_err();
        assert!(matches!(err, SensorError::InvalidConfig { .. }));
    }

    #[test]
    fn bring_up_rejects_foreign_chip() {
        let mut sensor = SimulatedSensor::default();
        sensor.set_chip_id(0x60);

        let err = AirQualityEngine::new(sensor, EngineConfig::default(), &mut NoDelay).unwrap_err();
        assert_eq!(err, SensorError::DeviceIdentity { found: Some(0x60) });
    }

    #[test]
    fn sample_during_warm_up_has_reading_but_no_score() {
        let mut engine = engine(EngineConfig::default());
        let sample = engine.sample(Duration::from_secs(10), &mut NoDelay).unwrap();

        assert!((sample.reading.temperature_c - 26.18).abs() < 0.01);
        assert!(matches!(
            sample.iaq,
            IaqOutcome::Unavailable(UnavailableReason::WarmingUp { .. })
        ));
    }

    #[test]
    fn measured_temperature_feeds_next_heater_setpoint() {
        let mut engine = engine(EngineConfig::default());
        engine.sample(Duration::from_secs(1), &mut NoDelay).unwrap();
        assert_eq!(engine.transport_mut().register(ADDR_RES_HEAT_0), 112);
        assert!((engine.ambient_c() - 26.18).abs() < 0.01);

        engine.sample(Duration::from_secs(2), &mut NoDelay).unwrap();
        let expected = crate::heater::heater_resistance(300, engine.ambient_c(), engine.calibration());
        assert_eq!(engine.transport_mut().register(ADDR_RES_HEAT_0), expected);
    }

    #[test]
    fn offsets_do_not_feed_heater_ambient() {
        let mut config = EngineConfig::default();
        config.offsets.temperature_c = -3.0;
        let mut engine = engine(config);

        let sample = engine.sample(Duration::from_secs(1), &mut NoDelay).unwrap();
        assert!((sample.reading.temperature_c - 23.18).abs() < 0.01);
        assert!((engine.ambient_c() - 26.18).abs() < 0.01);
    }

    #[test]
    fn gas_disabled_never_scores() {
        let config = EngineConfig::builder().without_gas().warm_up(Duration::ZERO).build().unwrap();
        let mut engine = engine(config);
        let sample = engine.sample(Duration::from_secs(1), &mut NoDelay).unwrap();

        assert_eq!(engine.transport_mut().register(ADDR_CTRL_GAS_1), 0);
        assert!(!sample.reading.gas_valid);
        assert_eq!(sample.iaq, IaqOutcome::Unavailable(UnavailableReason::NoGasData));
        assert_eq!(engine.baseline().gas_baseline_ohm, None);
    }

    #[test]
    fn timeout_leaves_engine_usable() {
        let mut engine = engine(EngineConfig::default());
        engine.transport_mut().set_stuck_busy(true);
        let err = engine.sample(Duration::from_secs(1), &mut NoDelay).unwrap_err();
        assert_eq!(err, SensorError::MeasurementTimeout { polls: 100 });

        engine.transport_mut().set_stuck_busy(false);
        assert!(engine.sample(Duration::from_secs(2), &mut NoDelay).is_ok());
    }

    #[test]
    fn runs_over_i2c() {
        let bus = SimulatedSensor::default();
        let transport = I2cTransport::new(bus, 0x77);
        let mut engine = AirQualityEngine::new(transport, EngineConfig::default(), &mut NoDelay).unwrap();

        let sample = engine.sample(Duration::from_secs(1), &mut NoDelay).unwrap();
        assert!(sample.reading.pressure_hpa.is_some());
        assert_eq!(engine.release().release().conversions(), 1);
    }
}
