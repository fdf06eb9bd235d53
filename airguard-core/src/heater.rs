//! Gas Heater Setpoint
//!
//! The hot plate is driven by two registers per profile: a target
//! resistance code (`res_heat_x`) and a hold time (`gas_wait_x`). Both are
//! derived from the requested temperature and duration here.
//!
//! The resistance code depends on the ambient temperature, so it is
//! recomputed before every cycle from the latest measured temperature.

use crate::calibration::CalibrationSet;
use crate::config::HeaterProfile;
use crate::constants::gas::{HEATER_MAX_DURATION_MS, HEATER_MAX_TARGET_C};

/// Register values for one heater profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaterSetpoint {
    /// `res_heat_0` code
    pub res_heat: u8,
    /// `gas_wait_0` code
    pub gas_wait: u8,
    /// Requested hold time (ms), used to size the wait before polling
    pub duration_ms: u16,
}

impl HeaterSetpoint {
    /// Setpoint for `profile` at the given ambient temperature.
    pub fn new(profile: &HeaterProfile, ambient_c: f32, calibration: &CalibrationSet) -> Self {
        Self {
            res_heat: heater_resistance(profile.target_c, ambient_c, calibration),
            gas_wait: heater_duration(profile.duration_ms),
            duration_ms: profile.duration_ms,
        }
    }
}

/// `res_heat_x` code for a target temperature.
///
/// Targets above 400 °C are capped.
pub fn heater_resistance(target_c: u16, ambient_c: f32, cal: &CalibrationSet) -> u8 {
    let target = f64::from(target_c.min(HEATER_MAX_TARGET_C));
    let ambient = f64::from(ambient_c);

    let var1 = f64::from(cal.par_g1) / 16.0 + 49.0;
    let var2 = f64::from(cal.par_g2) / 32768.0 * 0.0005 + 0.00235;
    let var3 = f64::from(cal.par_g3) / 1024.0;
    let var4 = var1 * (1.0 + var2 * target);
    let var5 = var4 + var3 * ambient;

    let range = 4.0 / (4.0 + f64::from(cal.res_heat_range));
    let correction = 1.0 / (1.0 + f64::from(cal.res_heat_val) * 0.002);
    let res_heat = 3.4 * (var5 * range * correction - 25.0);

    // Float-to-int casts saturate
    res_heat as u8
}

/// `gas_wait_x` code for a hold time.
///
/// Six bits of mantissa and a two-bit ×4 multiplier; anything at or above
/// 4032 ms saturates to `0xFF`.
pub fn heater_duration(duration_ms: u16) -> u8 {
    if duration_ms >= HEATER_MAX_DURATION_MS {
        return 0xFF;
    }

    let mut duration = duration_ms;
    let mut factor = 0u8;
    while duration > 0x3F {
        duration /= 4;
        factor += 1;
    }
    duration as u8 + factor * 64
}
