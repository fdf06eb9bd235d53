//! User Offset Calibration
//!
//! Fixed additive corrections for a sensor that reads consistently high or
//! low against a reference instrument, e.g. temperature skew from a nearby
//! voltage regulator. Applied after compensation, before the reading leaves
//! the engine. Gas resistance is never offset.

use crate::compensation::CompensatedReading;

/// Additive corrections, all zero by default
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offsets {
    /// Added to temperature (°C)
    pub temperature_c: f32,
    /// Added to relative humidity (%RH)
    pub humidity_pct: f32,
    /// Added to pressure (hPa)
    pub pressure_hpa: f32,
}

/// Apply `offsets` to a reading.
///
/// Humidity is clamped to 0..=100 afterwards; a missing pressure stays missing.
pub fn apply_offsets(reading: CompensatedReading, offsets: &Offsets) -> CompensatedReading {
    CompensatedReading {
        temperature_c: reading.temperature_c + offsets.temperature_c,
        humidity_rh: (reading.humidity_rh + offsets.humidity_pct).clamp(0.0, 100.0),
        pressure_hpa: reading.pressure_hpa.map(|p| p + offsets.pressure_hpa),
        ..reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading() -> CompensatedReading {
        CompensatedReading {
            temperature_c: 24.5,
            pressure_hpa: Some(1012.25),
            humidity_rh: 97.0,
            gas_resistance_ohm: Some(120_000.0),
            gas_valid: true,
            heater_stable: true,
        }
    }

    #[test]
    fn zero_offsets_are_identity() {
        let offsets = Offsets::default();
        let once = apply_offsets(reading(), &offsets);
        assert_eq!(once, reading());
        assert_eq!(apply_offsets(once, &offsets), reading());
    }

    #[test]
    fn offsets_are_additive() {
        let offsets = Offsets { temperature_c: -1.5, humidity_pct: -2.0, pressure_hpa: 0.75 };
        let adjusted = apply_offsets(reading(), &offsets);

        assert_eq!(adjusted.temperature_c, 23.0);
        assert_eq!(adjusted.humidity_rh, 95.0);
        assert_eq!(adjusted.pressure_hpa, Some(1013.0));
        assert_eq!(adjusted.gas_resistance_ohm, Some(120_000.0));
    }

    #[test]
    fn humidity_is_clamped_after_offset() {
        let up = Offsets { humidity_pct: 10.0, ..Offsets::default() };
        assert_eq!(apply_offsets(reading(), &up).humidity_rh, 100.0);

        let down = Offsets { humidity_pct: -150.0, ..Offsets::default() };
        assert_eq!(apply_offsets(reading(), &down).humidity_rh, 0.0);
    }

    #[test]
    fn missing_pressure_stays_missing() {
        let offsets = Offsets { pressure_hpa: 3.0, ..Offsets::default() };
        let r = CompensatedReading { pressure_hpa: None, ..reading() };
        assert_eq!(apply_offsets(r, &offsets).pressure_hpa, None);
    }
}
