//! Compensation Engine
//!
//! Converts one [`RawSample`] into physical units using the chip's
//! [`CalibrationSet`]. The formulas are the floating-point variants from the
//! BME680 datasheet (section 3.3) and are evaluated in `f64`; results are
//! narrowed to `f32` at the end.
//!
//! Temperature has to be computed first: its intermediate "fine temperature"
//! (`t_fine`) feeds both the pressure and the humidity polynomial.
//!
//! ## Failure Handling
//!
//! Nothing here fails for finite inputs. The two divisions whose denominator
//! can reach zero for corrupt calibration data are guarded and yield `None`
//! for that channel instead of infinity or NaN.

use crate::calibration::CalibrationSet;
use crate::constants::gas::{
    GAS_ADC_OFFSET, RANGE_CORRECTION, RANGE_REFERENCE_OHM, RANGE_SWITCHING_BASE,
    RANGE_SWITCHING_WEIGHT,
};
use crate::measurement::RawSample;

/// Calibrated reading in physical units
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompensatedReading {
    /// Temperature (°C)
    pub temperature_c: f32,
    /// Pressure (hPa), `None` if the compensation guard tripped
    pub pressure_hpa: Option<f32>,
    /// Relative humidity (%), clamped to 0..=100
    pub humidity_rh: f32,
    /// Gas resistance (Ω), `None` if the compensation guard tripped
    pub gas_resistance_ohm: Option<f32>,
    /// The gas conversion ran and produced a result
    pub gas_valid: bool,
    /// The heater was at target when the gas was sampled
    pub heater_stable: bool,
}

impl CompensatedReading {
    /// True if the gas channel may be fed to the scorer.
    ///
    /// Resistance from an unstable heater is still reported, but it is not
    /// a measurement of the air.
    pub fn gas_scorable(&self) -> bool {
        self.gas_valid && self.heater_stable && self.gas_resistance_ohm.is_some()
    }
}

/// Compensate all four channels of one conversion.
pub fn compensate(raw: &RawSample, cal: &CalibrationSet) -> CompensatedReading {
    let t_fine = fine_temperature(raw.temp_adc, cal);

    CompensatedReading {
        temperature_c: (t_fine / 5120.0) as f32,
        pressure_hpa: pressure_pa(raw.press_adc, t_fine, cal).map(|pa| (pa / 100.0) as f32),
        humidity_rh: humidity(raw.hum_adc, t_fine, cal) as f32,
        gas_resistance_ohm: gas_resistance(raw.gas_adc, raw.gas_range, cal).map(|r| r as f32),
        gas_valid: raw.gas_valid,
        heater_stable: raw.heater_stable,
    }
}

/// Fine temperature, `°C × 5120`.
pub fn fine_temperature(temp_adc: u32, cal: &CalibrationSet) -> f64 {
    let adc = f64::from(temp_adc);
    let t1 = f64::from(cal.par_t1);

    let var1 = (adc / 16384.0 - t1 / 1024.0) * f64::from(cal.par_t2);
    let d = adc / 131072.0 - t1 / 8192.0;
    let var2 = d * d * (f64::from(cal.par_t3) * 16.0);
    var1 + var2
}

/// Pressure in pascal.
pub fn pressure_pa(press_adc: u32, t_fine: f64, cal: &CalibrationSet) -> Option<f64> {
    let mut var1 = t_fine / 2.0 - 64000.0;
    let mut var2 = var1 * var1 * (f64::from(cal.par_p6) / 131072.0);
    var2 += var1 * f64::from(cal.par_p5) * 2.0;
    var2 = var2 / 4.0 + f64::from(cal.par_p4) * 65536.0;
    var1 = (f64::from(cal.par_p3) * var1 * var1 / 16384.0 + f64::from(cal.par_p2) * var1)
        / 524288.0;
    var1 = (1.0 + var1 / 32768.0) * f64::from(cal.par_p1);

    if var1 == 0.0 {
        return None;
    }

    let mut p = 1048576.0 - f64::from(press_adc);
    p = (p - var2 / 4096.0) * 6250.0 / var1;

    let var1 = f64::from(cal.par_p9) * p * p / 2147483648.0;
    let var2 = p * (f64::from(cal.par_p8) / 32768.0);
    let q = p / 256.0;
    let var3 = q * q * q * (f64::from(cal.par_p10) / 131072.0);

    Some(p + (var1 + var2 + var3 + f64::from(cal.par_p7) * 128.0) / 16.0)
}

/// Relative humidity in percent, clamped to 0..=100.
pub fn humidity(hum_adc: u16, t_fine: f64, cal: &CalibrationSet) -> f64 {
    let temp = t_fine / 5120.0;

    let var1 = f64::from(hum_adc)
        - (f64::from(cal.par_h1) * 16.0 + f64::from(cal.par_h3) / 2.0 * temp);
    let var2 = var1
        * (f64::from(cal.par_h2) / 262144.0
            * (1.0
                + f64::from(cal.par_h4) / 16384.0 * temp
                + f64::from(cal.par_h5) / 1048576.0 * temp * temp));
    let var3 = f64::from(cal.par_h6) / 16384.0;
    let var4 = f64::from(cal.par_h7) / 2097152.0;

    let rh = var2 + (var3 + var4 * temp) * var2 * var2;
    rh.clamp(0.0, 100.0)
}

/// Gas resistance in ohm.
///
/// `gas_range` values above 15 are masked to the 4-bit register field.
pub fn gas_resistance(gas_adc: u16, gas_range: u8, cal: &CalibrationSet) -> Option<f64> {
    let range = usize::from(gas_range & 0x0F);

    let var1 = (RANGE_SWITCHING_BASE + RANGE_SWITCHING_WEIGHT * f64::from(cal.range_sw_err))
        * RANGE_CORRECTION[range];
    let denominator = f64::from(gas_adc) - GAS_ADC_OFFSET + var1;

    if denominator == 0.0 {
        return None;
    }

    let resistance = var1 * RANGE_REFERENCE_OHM[range] / denominator;
    (resistance.is_finite() && resistance > 0.0).then_some(resistance)
}
