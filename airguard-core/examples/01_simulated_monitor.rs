//! Simulated Air-Quality Monitor Example
//!
//! Runs the engine against the in-memory sensor model: bring-up, a
//! shortened warm-up, then a burst of polluted air.
//!
//! ## What You'll Learn
//!
//! - Building an engine configuration with a custom warm-up
//! - Reading compensated values from each cycle
//! - Telling a score apart from an unavailable result
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_simulated_monitor
//! ```

use std::time::Duration;

use airguard_core::{
    transport::simulated::REFERENCE_SAMPLE, AirQualityEngine, EngineConfig, IaqOutcome,
    SimulatedSensor,
};
use embedded_hal::delay::DelayNs;

/// Simulated time: conversions finish instantly
struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("AirGuard Simulated Monitor");
    println!("==========================\n");

    let config = EngineConfig::builder()
        .heater(320, 150)
        .warm_up(Duration::from_secs(30))
        .build()?;

    let mut delay = NoDelay;
    let mut engine = AirQualityEngine::new(SimulatedSensor::default(), config, &mut delay)
        .map_err(|e| format!("bring-up failed: {}", e))?;
    println!("Calibration loaded (par_t1 = {})\n", engine.calibration().par_t1);

    for step in 0..12u64 {
        // Air gets dirtier from the eighth cycle on: lower gas resistance
        if step == 8 {
            let mut polluted = REFERENCE_SAMPLE;
            polluted.gas_adc = 900;
            engine.transport_mut().set_sample(polluted);
            println!("-- pollution event --");
        }

        let elapsed = Duration::from_secs(step * 5);
        let sample = engine
            .sample(elapsed, &mut delay)
            .map_err(|e| format!("cycle failed: {}", e))?;
        let reading = sample.reading;

        print!(
            "t={:3}s  {:5.2} °C  {:5.1} %RH  ",
            elapsed.as_secs(),
            reading.temperature_c,
            reading.humidity_rh
        );
        match reading.pressure_hpa {
            Some(p) => print!("{:7.2} hPa  ", p),
            None => print!("    --- hPa  "),
        }

        match sample.iaq {
            IaqOutcome::Score(score) => println!(
                "IAQ {:5.1} ({})",
                score.value(),
                score.category().label()
            ),
            IaqOutcome::Unavailable(reason) => println!("IAQ n/a ({:?})", reason),
        }
    }

    if let Some(baseline) = engine.baseline().gas_baseline_ohm {
        println!("\nGas baseline settled at {:.0} Ω", baseline);
    }

    Ok(())
}
