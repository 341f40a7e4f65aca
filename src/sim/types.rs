//! Core simulation types: run configuration and per-step records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ScenarioConfig;
use crate::devices::{PerModality, StorageSnapshot};
use crate::environment::{EnvironmentSample, HOURS_PER_DAY, WeatherPattern};

use super::economics::EconomicSnapshot;

/// Centralized run configuration.
///
/// The orchestrator and the time grid reference this struct for timing
/// parameters, so the step duration is defined in one place.
///
/// # Examples
///
/// ```
/// use harvest_sim::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(24, 2, 42);
/// assert_eq!(cfg.dt_hours, 1.0);
/// assert_eq!(cfg.total_steps(), 48);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Hours simulated per day; values above 24 are capped.
    pub hours_per_day: usize,
    /// Number of days to simulate.
    pub days: usize,
    /// Duration of one step in hours.
    pub dt_hours: f64,
    /// Master random seed for reproducibility.
    pub seed: u64,
    /// Day of year of the first simulated day.
    pub start_day_of_year: usize,
    pub weather: WeatherPattern,
    /// Value of one exported kWh.
    pub energy_value_per_kwh: f64,
    /// Whether the adaptive weighting loop runs.
    pub optimization: bool,
}

impl SimConfig {
    /// Creates a run configuration with hourly steps and default parameters.
    ///
    /// # Arguments
    ///
    /// * `hours_per_day` - Hours simulated per day (capped at 24)
    /// * `days` - Number of days to simulate
    /// * `seed` - Master random seed
    pub fn new(hours_per_day: usize, days: usize, seed: u64) -> Self {
        Self {
            hours_per_day: hours_per_day.min(HOURS_PER_DAY),
            days,
            dt_hours: 1.0,
            seed,
            start_day_of_year: 0,
            weather: WeatherPattern::Mild,
            energy_value_per_kwh: 0.15,
            optimization: true,
        }
    }

    /// Builds the run configuration described by a scenario's `[simulation]` table.
    pub fn from_scenario(scenario: &ScenarioConfig) -> Self {
        let s = &scenario.simulation;
        Self {
            start_day_of_year: s.start_day_of_year,
            weather: scenario.weather(),
            energy_value_per_kwh: s.energy_value_per_kwh,
            optimization: s.optimization,
            ..Self::new(s.hours_per_day, s.days, s.seed)
        }
    }

    /// Total number of simulation steps across all days.
    pub fn total_steps(&self) -> usize {
        self.hours_per_day.min(HOURS_PER_DAY) * self.days
    }
}

/// Complete record of one simulation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    /// Absolute hour index (`day * 24 + hour`).
    pub time_index: usize,
    pub day_of_year: usize,
    /// Step duration (h).
    pub time_step_h: f64,
    pub environment: EnvironmentSample,
    /// Weighted power per modality (W).
    pub power_w: PerModality<f64>,
    /// Sum of the weighted modality powers (W).
    pub total_harvested_w: f64,
    /// Parasitic draw of the installation (W).
    pub maintenance_w: f64,
    /// Harvested minus maintenance (W).
    pub net_w: f64,
    /// Storage state after this step.
    pub storage: StorageSnapshot,
    /// Economics over the history including this step.
    pub economics: Option<EconomicSnapshot>,
}

impl fmt::Display for PerformanceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>5} (day {:>3}, {:>2}h) | net={:>8.2} W  total={:>8.2} W \
             [kin={:.2} th={:.2} em={:.2} chem={:.2}] | SoC={:.1}%  health={:.3}",
            self.time_index,
            self.day_of_year,
            self.environment.hour_of_day,
            self.net_w,
            self.total_harvested_w,
            self.power_w.kinetic,
            self.power_w.thermal,
            self.power_w.electromagnetic,
            self.power_w.chemical,
            self.storage.soc * 100.0,
            self.storage.health,
        )
    }
}
