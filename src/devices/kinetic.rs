use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::devices::types::{Harvester, Modality, finite_or};
use crate::environment::EnvironmentSample;
use crate::error::HarvestError;

/// Air density at sea level (kg/m³).
const AIR_DENSITY: f64 = 1.225;
/// Vibration amplitudes below this are treated as no vibration (m).
const MIN_VIBRATION_AMPLITUDE: f64 = 1e-6;

/// A combined wind and vibration harvester.
///
/// Wind power follows the cubic swept-area law between the cut-in and cut-out
/// speeds. Vibration power models a resonant proof-mass harvester driven at
/// the sampled frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KineticSpec {
    /// Swept rotor area (m²).
    pub area: f64,
    /// Conversion efficiency (0..1.0).
    pub efficiency: f64,
    /// Wind speed below which the rotor does not turn (m/s).
    pub cut_in: f64,
    /// Wind speed above which the rotor is furled (m/s).
    pub cut_out: f64,
    /// Oscillating proof mass of the vibration harvester (kg).
    pub proof_mass: f64,
    /// Mechanical damping ratio of the vibration harvester.
    pub damping_ratio: f64,
    /// Unit cost per m² of area.
    pub cost: f64,
    /// Rated lifetime (years).
    pub lifetime: f64,
}

impl KineticSpec {
    /// Wind contribution (W) at the given speed.
    pub fn wind_power_w(&self, wind_speed: f64) -> f64 {
        let v = finite_or(wind_speed, 0.0);
        if v < self.cut_in || v > self.cut_out || v <= 0.0 {
            return 0.0;
        }
        0.5 * AIR_DENSITY * self.area * v.powi(3) * self.efficiency
    }

    /// Vibration contribution (W) at the given amplitude and frequency.
    pub fn vibration_power_w(&self, amplitude: f64, frequency: f64) -> f64 {
        let a = finite_or(amplitude, 0.0);
        let f = finite_or(frequency, 0.0);
        if a < MIN_VIBRATION_AMPLITUDE || f <= 0.0 || self.damping_ratio <= 0.0 {
            return 0.0;
        }
        let omega = 2.0 * PI * f;
        self.proof_mass * a * a * omega.powi(3) / (4.0 * self.damping_ratio) * self.efficiency
    }
}

impl Default for KineticSpec {
    fn default() -> Self {
        Self {
            area: 2.0,
            efficiency: 0.35,
            cut_in: 2.5,
            cut_out: 25.0,
            proof_mass: 0.05,
            damping_ratio: 0.05,
            cost: 150.0,
            lifetime: 15.0,
        }
    }
}

impl Harvester for KineticSpec {
    fn power_w(&self, sample: &EnvironmentSample) -> Result<f64, HarvestError> {
        let wind = self.wind_power_w(sample.wind_speed);
        let vibration =
            self.vibration_power_w(sample.vibration_amplitude, sample.vibration_frequency);
        Ok((wind + vibration).max(0.0))
    }

    fn modality(&self) -> Modality {
        Modality::Kinetic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(wind: f64, amplitude: f64, frequency: f64) -> EnvironmentSample {
        EnvironmentSample {
            wind_speed: wind,
            vibration_amplitude: amplitude,
            vibration_frequency: frequency,
            ..EnvironmentSample::neutral(0, 0)
        }
    }

    #[test]
    fn no_wind_no_vibration_is_zero() {
        let spec = KineticSpec::default();
        assert_eq!(spec.power_w(&sample(0.0, 0.0, 0.0)).ok(), Some(0.0));
    }

    #[test]
    fn wind_below_cut_in_and_above_cut_out_is_zero() {
        let spec = KineticSpec::default();
        assert_eq!(spec.wind_power_w(2.0), 0.0);
        assert_eq!(spec.wind_power_w(30.0), 0.0);
    }

    #[test]
    fn wind_power_follows_cubic_law() {
        let spec = KineticSpec::default();
        // 0.5 * 1.225 * 2.0 * 216 * 0.35 = 92.61
        assert!((spec.wind_power_w(6.0) - 92.61).abs() < 1e-9);
        let ratio = spec.wind_power_w(10.0) / spec.wind_power_w(5.0);
        assert!((ratio - 8.0).abs() < 1e-9);
    }

    #[test]
    fn vibration_power_matches_resonant_formula() {
        let spec = KineticSpec {
            efficiency: 1.0,
            ..KineticSpec::default()
        };
        let omega = 2.0 * PI * 30.0;
        let expected = 0.05 * 1e-6 * omega.powi(3) / (4.0 * 0.05);
        assert!((spec.vibration_power_w(1e-3, 30.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn tiny_vibration_is_gated() {
        let spec = KineticSpec::default();
        assert_eq!(spec.vibration_power_w(1e-7, 50.0), 0.0);
        assert_eq!(spec.vibration_power_w(1e-3, 0.0), 0.0);
    }

    #[test]
    fn undefined_readings_are_neutral() {
        let spec = KineticSpec::default();
        let p = spec.power_w(&sample(f64::NAN, f64::NAN, f64::INFINITY));
        assert_eq!(p.ok(), Some(0.0));
    }

    #[test]
    fn power_sums_both_terms() {
        let spec = KineticSpec::default();
        let total = spec.power_w(&sample(6.0, 1e-3, 30.0)).unwrap_or_default();
        let parts = spec.wind_power_w(6.0) + spec.vibration_power_w(1e-3, 30.0);
        assert!((total - parts).abs() < 1e-12);
        assert_eq!(spec.modality(), Modality::Kinetic);
    }
}
