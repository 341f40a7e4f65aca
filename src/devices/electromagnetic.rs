use serde::{Deserialize, Serialize};

use crate::devices::types::{Harvester, Modality, finite_or};
use crate::environment::EnvironmentSample;
use crate::error::HarvestError;

/// Fields weaker than this induce no usable voltage (T).
pub const MIN_MAGNETIC_FIELD: f64 = 1e-5;

/// An induction coil moving through an ambient magnetic field.
///
/// Induced EMF follows the moving-conductor law `V = B·L·v`; the coil
/// dissipates `V²/R` into a matched load, scaled by conversion efficiency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElectromagneticSpec {
    /// Total conductor length (m).
    pub coil_length: f64,
    /// Coil footprint (m²), used for costing.
    pub coil_area: f64,
    /// Coil resistance (Ω).
    pub resistance: f64,
    /// Nominal conductor velocity used when the sample has none (m/s).
    pub velocity: f64,
    /// Conversion efficiency (0..1.0).
    pub efficiency: f64,
    /// Unit cost per m² of coil area.
    pub cost: f64,
    /// Rated lifetime (years).
    pub lifetime: f64,
}

impl ElectromagneticSpec {
    /// Induced open-circuit voltage (V).
    pub fn induced_voltage(&self, field: f64, velocity: f64) -> f64 {
        field * self.coil_length * velocity
    }
}

impl Default for ElectromagneticSpec {
    fn default() -> Self {
        Self {
            coil_length: 500.0,
            coil_area: 0.2,
            resistance: 0.5,
            velocity: 2.0,
            efficiency: 0.7,
            cost: 250.0,
            lifetime: 25.0,
        }
    }
}

impl Harvester for ElectromagneticSpec {
    fn power_w(&self, sample: &EnvironmentSample) -> Result<f64, HarvestError> {
        let field = finite_or(sample.magnetic_field, 0.0).abs();
        if field < MIN_MAGNETIC_FIELD || self.resistance <= 0.0 {
            return Ok(0.0);
        }
        let velocity = finite_or(sample.relative_velocity, self.velocity);
        let voltage = self.induced_voltage(field, velocity);
        Ok((voltage * voltage / self.resistance * self.efficiency).max(0.0))
    }

    fn modality(&self) -> Modality {
        Modality::Electromagnetic
    }
}
