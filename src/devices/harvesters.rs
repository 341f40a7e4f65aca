use serde::{Deserialize, Serialize};

use crate::devices::chemical::ChemicalSpec;
use crate::devices::electromagnetic::ElectromagneticSpec;
use crate::devices::kinetic::KineticSpec;
use crate::devices::thermal::ThermalSpec;
use crate::devices::types::{Harvester, Modality, PerModality};
use crate::environment::EnvironmentSample;
use crate::error::{ConfigError, HarvestError};

/// The four harvesters of one installation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarvesterSet {
    pub kinetic: KineticSpec,
    pub thermal: ThermalSpec,
    pub electromagnetic: ElectromagneticSpec,
    pub chemical: ChemicalSpec,
}

impl HarvesterSet {
    /// Returns the harvester for a modality.
    pub fn get(&self, modality: Modality) -> &dyn Harvester {
        match modality {
            Modality::Kinetic => &self.kinetic,
            Modality::Thermal => &self.thermal,
            Modality::Electromagnetic => &self.electromagnetic,
            Modality::Chemical => &self.chemical,
        }
    }

    /// Evaluates every harvester against one sample, in priority order.
    pub fn power_w(&self, sample: &EnvironmentSample) -> PerModality<Result<f64, HarvestError>> {
        PerModality::from_fn(|m| self.get(m).power_w(sample))
    }

    /// Hardware cost: area times unit cost, summed over the four modalities.
    ///
    /// The electromagnetic harvester is costed on its coil footprint.
    pub fn hardware_cost(&self) -> f64 {
        self.kinetic.area * self.kinetic.cost
            + self.thermal.area * self.thermal.cost
            + self.electromagnetic.coil_area * self.electromagnetic.cost
            + self.chemical.area * self.chemical.cost
    }

    /// Checks geometric and efficiency parameters.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut positive = |field: &str, value: f64| {
            if !(value > 0.0) {
                errors.push(ConfigError::new(field, "must be > 0"));
            }
        };
        positive("kinetic.area", self.kinetic.area);
        positive("thermal.area", self.thermal.area);
        positive("thermal.resistance", self.thermal.resistance);
        positive("em.coil_length", self.electromagnetic.coil_length);
        positive("em.coil_area", self.electromagnetic.coil_area);
        positive("em.resistance", self.electromagnetic.resistance);
        positive("chemical.area", self.chemical.area);

        for (field, value) in [
            ("kinetic.efficiency", self.kinetic.efficiency),
            ("em.efficiency", self.electromagnetic.efficiency),
            ("chemical.efficiency", self.chemical.efficiency),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(ConfigError::new(field, "must be in [0, 1]"));
            }
        }
        if self.kinetic.cut_in > self.kinetic.cut_out {
            errors.push(ConfigError::new(
                "kinetic.cut_in",
                "must be <= kinetic.cut_out",
            ));
        }
        errors
    }
}
