//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::devices::{
    ChemicalSpec, ElectromagneticSpec, HarvesterSet, KineticSpec, StorageConfig, ThermalSpec,
};
use crate::environment::{DAYS_PER_YEAR, HOURS_PER_DAY, WeatherPattern};
use crate::error::ConfigError;
use crate::location::Location;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Run length and global parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Installation site.
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub kinetic: KineticSpec,
    #[serde(default)]
    pub thermal: ThermalSpec,
    #[serde(default)]
    pub em: ElectromagneticSpec,
    #[serde(default)]
    pub chemical: ChemicalSpec,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Parasitic draw of the installation's own electronics.
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
}

/// Run length and global parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of days to simulate.
    pub days: usize,
    /// Hours simulated per day (at most 24).
    pub hours_per_day: usize,
    /// Master random seed.
    pub seed: u64,
    /// Value of one exported kWh.
    pub energy_value_per_kwh: f64,
    /// Day of year the run starts on (0..365).
    pub start_day_of_year: usize,
    /// Weather regime: `"mild"`, `"windy"`, `"stormy"` or `"still"`.
    pub weather: String,
    /// Whether the adaptive weighting loop runs.
    pub optimization: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: 30,
            hours_per_day: 24,
            seed: 42,
            energy_value_per_kwh: 0.15,
            start_day_of_year: 0,
            weather: "mild".to_string(),
            optimization: true,
        }
    }
}

/// Maintenance draw: `base_power + capacity_coefficient * storage capacity (Wh)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaintenanceConfig {
    /// Constant draw (W).
    pub base_power: f64,
    /// Additional draw per Wh of nameplate storage (W/Wh).
    pub capacity_coefficient: f64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            base_power: 5.0,
            capacity_coefficient: 0.001,
        }
    }
}

impl MaintenanceConfig {
    /// Total maintenance draw (W) for a storage bank of the given capacity.
    pub fn draw_w(&self, capacity_wh: f64) -> f64 {
        self.base_power + self.capacity_coefficient * capacity_wh
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: default hardware at a temperate site.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the windy-coast preset: large rotor, bigger bank, windy weather.
    pub fn windy_coast() -> Self {
        Self {
            simulation: SimulationConfig {
                weather: "windy".to_string(),
                seed: 7,
                ..SimulationConfig::default()
            },
            location: Location {
                lat: 57.15,
                lon: -2.09,
                name: "Windy Coast".to_string(),
            },
            kinetic: KineticSpec {
                area: 4.0,
                efficiency: 0.4,
                ..KineticSpec::default()
            },
            chemical: ChemicalSpec {
                area: 2.0,
                ..ChemicalSpec::default()
            },
            storage: StorageConfig {
                capacity_wh: 10_000.0,
                max_charge_rate_w: 2000.0,
                max_discharge_rate_w: 2000.0,
                ..StorageConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the industrial-site preset: waste-heat and stray-field heavy,
    /// little wind.
    pub fn industrial_site() -> Self {
        Self {
            simulation: SimulationConfig {
                weather: "still".to_string(),
                seed: 11,
                energy_value_per_kwh: 0.22,
                ..SimulationConfig::default()
            },
            location: Location {
                lat: 53.48,
                lon: -2.24,
                name: "Industrial Estate".to_string(),
            },
            thermal: ThermalSpec {
                area: 2.0,
                ..ThermalSpec::default()
            },
            em: ElectromagneticSpec {
                coil_length: 1000.0,
                coil_area: 0.5,
                ..ElectromagneticSpec::default()
            },
            maintenance: MaintenanceConfig {
                base_power: 8.0,
                ..MaintenanceConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "windy_coast", "industrial_site"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "windy_coast" => Ok(Self::windy_coast()),
            "industrial_site" => Ok(Self::industrial_site()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new(
                "scenario",
                format!("cannot read \"{}\": {e}", path.display()),
            )
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// The four harvester specs as one set.
    pub fn harvesters(&self) -> HarvesterSet {
        HarvesterSet {
            kinetic: self.kinetic.clone(),
            thermal: self.thermal.clone(),
            electromagnetic: self.em.clone(),
            chemical: self.chemical.clone(),
        }
    }

    /// Parsed weather regime; falls back to mild if the name is unknown.
    ///
    /// Call [`ScenarioConfig::validate`] first to reject unknown names.
    pub fn weather(&self) -> WeatherPattern {
        self.simulation.weather.parse().unwrap_or_default()
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.hours_per_day > HOURS_PER_DAY {
            errors.push(ConfigError::new(
                "simulation.hours_per_day",
                format!("must be <= {HOURS_PER_DAY}"),
            ));
        }
        if s.start_day_of_year >= DAYS_PER_YEAR {
            errors.push(ConfigError::new(
                "simulation.start_day_of_year",
                format!("must be < {DAYS_PER_YEAR}"),
            ));
        }
        if !(s.energy_value_per_kwh >= 0.0) {
            errors.push(ConfigError::new(
                "simulation.energy_value_per_kwh",
                "must be >= 0",
            ));
        }
        if let Err(message) = s.weather.parse::<WeatherPattern>() {
            errors.push(ConfigError::new("simulation.weather", message));
        }

        if !(-90.0..=90.0).contains(&self.location.lat) {
            errors.push(ConfigError::new("location.lat", "must be in [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&self.location.lon) {
            errors.push(ConfigError::new("location.lon", "must be in [-180, 180]"));
        }

        errors.extend(self.harvesters().validate());
        errors.extend(self.storage.validate());

        let m = &self.maintenance;
        if !(m.base_power >= 0.0) || !(m.capacity_coefficient >= 0.0) {
            errors.push(ConfigError::new(
                "maintenance",
                "base_power and capacity_coefficient must be >= 0",
            ));
        }

        errors
    }
}
