use serde::{Deserialize, Serialize};

use crate::devices::types::{Harvester, Modality, finite_or};
use crate::environment::EnvironmentSample;
use crate::error::HarvestError;

/// Log-ratio gradients smaller than this in magnitude produce no output.
pub const MIN_CHEMICAL_GRADIENT: f64 = 0.01;
/// Molar gas constant (J/(mol·K)).
const GAS_CONSTANT: f64 = 8.314;
/// Faraday constant (C/mol).
const FARADAY: f64 = 96_485.0;
const KELVIN_OFFSET: f64 = 273.15;

/// A concentration-gradient (salinity / soil electrolyte) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChemicalSpec {
    /// Membrane area (m²).
    pub area: f64,
    /// Conversion efficiency (0..1.0).
    pub efficiency: f64,
    /// Ion-mobility current density per unit log-gradient (A/m²).
    pub mobility: f64,
    /// Unit cost per m² of area.
    pub cost: f64,
    /// Rated lifetime (years).
    pub lifetime: f64,
}

impl ChemicalSpec {
    /// Natural-log gradient of a concentration ratio.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::NumericDomain`] if `ratio <= 0`, where the
    /// logarithm is undefined.
    pub fn gradient(ratio: f64) -> Result<f64, HarvestError> {
        if ratio <= 0.0 {
            return Err(HarvestError::NumericDomain {
                quantity: "concentration_ratio",
                value: ratio,
            });
        }
        Ok(ratio.ln())
    }

    /// Nernst potential (V) for a log-gradient at the given temperature.
    pub fn nernst_voltage(gradient: f64, ambient_c: f64) -> f64 {
        GAS_CONSTANT * (ambient_c + KELVIN_OFFSET) / FARADAY * gradient
    }
}

impl Default for ChemicalSpec {
    fn default() -> Self {
        Self {
            area: 1.0,
            efficiency: 0.5,
            mobility: 2.0,
            cost: 80.0,
            lifetime: 10.0,
        }
    }
}

impl Harvester for ChemicalSpec {
    fn power_w(&self, sample: &EnvironmentSample) -> Result<f64, HarvestError> {
        // NaN never compares <= 0, so an undefined ratio falls back to neutral here.
        let gradient = Self::gradient(finite_or(sample.concentration_ratio, 1.0))?;
        if gradient.abs() < MIN_CHEMICAL_GRADIENT {
            return Ok(0.0);
        }
        let ambient = finite_or(sample.ambient_temperature, 25.0);
        let voltage = Self::nernst_voltage(gradient, ambient);
        let current = self.mobility * gradient.abs() * self.area;
        Ok((voltage * current * self.efficiency).abs())
    }

    fn modality(&self) -> Modality {
        Modality::Chemical
    }
}
