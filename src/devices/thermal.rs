use serde::{Deserialize, Serialize};

use crate::devices::types::{Harvester, Modality, finite_or};
use crate::environment::EnvironmentSample;
use crate::error::HarvestError;

/// Gradients below this produce no usable output (K).
pub const MIN_THERMAL_GRADIENT: f64 = 1.0;
/// Practical ceiling on thermoelectric conversion efficiency.
const MAX_CARNOT_FRACTION: f64 = 0.3;
/// Thermoelectric modules per m² (25 cm² modules).
const MODULES_PER_M2: f64 = 400.0;
const KELVIN_OFFSET: f64 = 273.15;

/// A thermoelectric (Seebeck) generator array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThermalSpec {
    /// Total module area (m²).
    pub area: f64,
    /// Seebeck coefficient of one module (V/K).
    pub seebeck_coeff: f64,
    /// Internal resistance of one module (Ω).
    pub resistance: f64,
    /// Unit cost per m² of area.
    pub cost: f64,
    /// Rated lifetime (years).
    pub lifetime: f64,
    /// Site-specific scaling applied once from geographic data.
    #[serde(skip, default = "unit_scale")]
    pub efficiency_scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl ThermalSpec {
    /// Matched-load power of a single module (W): `V² / 4R`.
    pub fn module_power_w(&self, gradient: f64) -> f64 {
        if self.resistance <= 0.0 {
            return 0.0;
        }
        let voltage = self.seebeck_coeff * gradient;
        voltage * voltage / (4.0 * self.resistance)
    }

    /// Carnot-limited conversion fraction for the gradient at the given ambient temperature.
    pub fn carnot_fraction(gradient: f64, ambient_c: f64) -> f64 {
        let hot_k = ambient_c + KELVIN_OFFSET + gradient;
        if hot_k <= 0.0 {
            return 0.0;
        }
        (gradient / hot_k).clamp(0.0, MAX_CARNOT_FRACTION)
    }
}

impl Default for ThermalSpec {
    fn default() -> Self {
        Self {
            area: 0.5,
            seebeck_coeff: 0.2,
            resistance: 2.0,
            cost: 400.0,
            lifetime: 20.0,
            efficiency_scale: 1.0,
        }
    }
}

impl Harvester for ThermalSpec {
    fn power_w(&self, sample: &EnvironmentSample) -> Result<f64, HarvestError> {
        let gradient = finite_or(sample.thermal_gradient, 0.0);
        if gradient < MIN_THERMAL_GRADIENT {
            return Ok(0.0);
        }
        let ambient = finite_or(sample.ambient_temperature, 25.0);
        let modules = self.area * MODULES_PER_M2;
        let power = self.module_power_w(gradient)
            * modules
            * Self::carnot_fraction(gradient, ambient)
            * self.efficiency_scale;
        Ok(power.max(0.0))
    }

    fn modality(&self) -> Modality {
        Modality::Thermal
    }
}
