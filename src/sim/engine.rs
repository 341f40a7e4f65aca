//! Simulation orchestrator that sequences environment, harvesters, storage,
//! economics, and optimization over the time grid.

use std::iter;

use tracing::{info, warn};

use crate::config::{MaintenanceConfig, ScenarioConfig};
use crate::devices::{Battery, HarvesterSet, Modality, PerModality, StorageConfig};
use crate::environment::{EnvironmentBaseline, EnvironmentModel, EnvironmentSample};
use crate::error::{ConfigErrors, HarvestError};
use crate::location::{GeographicDataSource, Location, adjust_for_site};

use super::clock::Clock;
use super::economics::{
    ECONOMIC_WINDOW, EconomicAssumptions, EconomicModel, EconomicSnapshot, Investment,
};
use super::history::History;
use super::optimizer::Optimizer;
use super::report::Report;
use super::types::{PerformanceRecord, SimConfig};

/// One installation being simulated.
///
/// Owns every piece of mutable run state: the environment RNG, the battery,
/// the optimizer, and the history. Independent simulations share nothing.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    location: Location,
    environment: EnvironmentModel,
    harvesters: HarvesterSet,
    battery: Battery,
    maintenance: MaintenanceConfig,
    economics: EconomicModel,
    optimizer: Optimizer,
    history: History,
}

impl Simulation {
    /// Builds a simulation from a scenario.
    ///
    /// The geographic source is consulted once: its record scales harvester
    /// efficiencies and sets the environment baseline.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::InvalidConfig`] listing every invalid field.
    pub fn new(
        scenario: &ScenarioConfig,
        geography: &dyn GeographicDataSource,
    ) -> Result<Self, HarvestError> {
        let errors = scenario.validate();
        if !errors.is_empty() {
            return Err(HarvestError::InvalidConfig(ConfigErrors(errors)));
        }

        let geo = geography.lookup(&scenario.location);
        let mut harvesters = scenario.harvesters();
        adjust_for_site(&mut harvesters, &geo);

        let mut sim = Self::from_parts(
            SimConfig::from_scenario(scenario),
            harvesters,
            scenario.storage.clone(),
            scenario.maintenance,
            EnvironmentBaseline::from_geography(&geo),
        )?;
        sim.location = scenario.location.clone();
        info!(
            site = %sim.location.name,
            seed = sim.config.seed,
            investment = sim.economics.investment().total,
            "installation built"
        );
        Ok(sim)
    }

    /// Builds a simulation from already-resolved parts, skipping the site lookup.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::InvalidConfig`] if the harvesters or storage
    /// are invalid.
    pub fn from_parts(
        config: SimConfig,
        harvesters: HarvesterSet,
        storage: StorageConfig,
        maintenance: MaintenanceConfig,
        baseline: EnvironmentBaseline,
    ) -> Result<Self, HarvestError> {
        let errors = harvesters.validate();
        if !errors.is_empty() {
            return Err(HarvestError::InvalidConfig(ConfigErrors(errors)));
        }
        let battery = Battery::new(storage)?;
        let economics =
            EconomicModel::new(&harvesters, battery.config(), EconomicAssumptions::default());
        Ok(Self {
            environment: EnvironmentModel::with_baseline(baseline, config.seed),
            optimizer: Optimizer::new(config.optimization),
            location: Location::default(),
            config,
            harvesters,
            battery,
            maintenance,
            economics,
            history: History::new(),
        })
    }

    /// Executes one step and returns its record.
    ///
    /// # Arguments
    ///
    /// * `time_index` - Absolute hour index; hour of day is `time_index % 24`
    /// * `day_of_year` - Day within the annual cycle
    /// * `time_step_h` - Step duration (h)
    pub fn step_once(
        &mut self,
        time_index: usize,
        day_of_year: usize,
        time_step_h: f64,
    ) -> PerformanceRecord {
        let sample = self
            .environment
            .sample(time_index, day_of_year, self.config.weather);
        self.step_with_sample(sample, time_step_h)
    }

    /// Executes one step against a given environment sample.
    pub(crate) fn step_with_sample(
        &mut self,
        sample: EnvironmentSample,
        time_step_h: f64,
    ) -> PerformanceRecord {
        let time_index = sample.time_index;

        // 1. Raw power per modality; anomalies cost that modality this step only
        let raw = self.harvesters.power_w(&sample);
        let power_w = PerModality::from_fn(|m: Modality| match raw.get_ref(m) {
            Ok(p) => p * self.optimizer.scale(m),
            Err(e) => {
                warn!(modality = %m, time_index, error = %e, "harvester failed, counting 0 W");
                0.0
            }
        });

        // 2. Net of maintenance draw
        let total_harvested_w = power_w.sum();
        let maintenance_w = self.maintenance.draw_w(self.battery.config().capacity_wh);
        let net_w = total_harvested_w - maintenance_w;

        // 3. Storage
        let storage = self
            .battery
            .update(net_w, time_step_h, sample.ambient_temperature);

        let mut record = PerformanceRecord {
            time_index,
            day_of_year: sample.day_of_year,
            time_step_h,
            environment: sample,
            power_w,
            total_harvested_w,
            maintenance_w,
            net_w,
            storage,
            economics: None,
        };

        // 4. Economics over the retained history plus this step
        let earlier = self.history.trailing(ECONOMIC_WINDOW - 1);
        let economics = self.economics.appraise(
            earlier.chain(iter::once(&record)),
            self.config.energy_value_per_kwh,
        );
        record.economics = economics;

        // 5. Record, then optimize on cadence
        self.history.push(record.clone());
        self.optimizer
            .maybe_optimize(&self.history, &self.harvesters, self.battery.config());

        record
    }

    /// Runs `days` days of `hours_per_day` hourly steps.
    ///
    /// # Returns
    ///
    /// The report over the whole history, or `None` if no step ran.
    pub fn run_for(&mut self, days: usize, hours_per_day: usize) -> Option<Report> {
        let mut clock = Clock::new(days, hours_per_day, self.config.start_day_of_year);
        let steps = clock.total();
        info!(days, hours_per_day, steps, "run started");
        let dt = self.config.dt_hours;
        clock.run(|tick| {
            self.step_once(tick.time_index, tick.day_of_year, dt);
        });
        if steps == 0 {
            return None;
        }
        let report = self.report();
        if let Some(r) = &report {
            info!(
                average_net_w = r.performance.average_net_power_w,
                energy_kwh = r.performance.total_energy_kwh,
                "run finished"
            );
        }
        report
    }

    /// Runs the days and hours given by the configuration.
    pub fn run(&mut self) -> Option<Report> {
        self.run_for(self.config.days, self.config.hours_per_day)
    }

    /// Appraises the retained history at the given energy value.
    pub fn evaluate_economics(&self, energy_value_per_kwh: f64) -> Option<EconomicSnapshot> {
        self.economics.evaluate(&self.history, energy_value_per_kwh)
    }

    /// Builds the report for everything simulated so far.
    pub fn report(&self) -> Option<Report> {
        Report::from_history(
            &self.history,
            self.history.total_pushed(),
            *self.optimizer.weights(),
            self.optimizer.best_performance(),
        )
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Harvester specs after the site adjustment.
    pub fn harvesters(&self) -> &HarvesterSet {
        &self.harvesters
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    pub fn optimizer(&self) -> &Optimizer {
        &self.optimizer
    }

    pub fn investment(&self) -> &Investment {
        self.economics.investment()
    }
}
