//! Telemetry Records
//!
//! A flat record per accepted cycle, shaped for whatever publishes it
//! downstream. The core knows nothing about protocols or channel mapping;
//! sinks implement [`TelemetrySink`].

use crate::engine::Sample;

/// One cycle, flattened
///
/// `None` marks a value that is unavailable this cycle: a tripped
/// compensation guard, or no IAQ score during warm-up or heater instability.
/// Gas resistance is only published when the conversion was valid and the
/// heater had reached its target.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelemetryRecord {
    /// Temperature (°C)
    pub temperature_c: f32,
    /// Relative humidity (%RH)
    pub humidity_pct: f32,
    /// Pressure (hPa)
    pub pressure_hpa: Option<f32>,
    /// Gas resistance (Ω)
    pub gas_resistance_ohm: Option<f32>,
    /// IAQ index, 0..=500
    pub iaq_score: Option<f32>,
}

impl From<&Sample> for TelemetryRecord {
    fn from(sample: &Sample) -> Self {
        let reading = &sample.reading;
        Self {
            temperature_c: reading.temperature_c,
            humidity_pct: reading.humidity_rh,
            pressure_hpa: reading.pressure_hpa,
            gas_resistance_ohm: reading
                .gas_resistance_ohm
                .filter(|_| reading.gas_valid && reading.heater_stable),
            iaq_score: sample.iaq.score().map(|score| score.value()),
        }
    }
}

impl TelemetryRecord {
    /// Copy rounded to publishing resolution: 0.1 for temperature, humidity
    /// and pressure, whole numbers for gas resistance and IAQ.
    pub fn rounded(&self) -> Self {
        let tenths = |v: f32| libm::roundf(v * 10.0) / 10.0;
        Self {
            temperature_c: tenths(self.temperature_c),
            humidity_pct: tenths(self.humidity_pct),
            pressure_hpa: self.pressure_hpa.map(tenths),
            gas_resistance_ohm: self.gas_resistance_ohm.map(libm::roundf),
            iaq_score: self.iaq_score.map(libm::roundf),
        }
    }
}

/// Destination for telemetry records
pub trait TelemetrySink {
    /// Publishing failure
    type Error;

    /// Hand one record to the sink.
    fn publish(&mut self, record: &TelemetryRecord) -> Result<(), Self::Error>;
}
