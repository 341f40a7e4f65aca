//! Independent runs of one scenario across many seeds, in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ScenarioConfig;
use crate::error::HarvestError;
use crate::location::GeographicDataSource;

use super::engine::Simulation;

/// Headline figures of one seeded run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedOutcome {
    pub seed: u64,
    pub average_net_power_w: f64,
    /// `None` when the run produced no steps.
    pub npv: Option<f64>,
    pub viable: bool,
}

/// Summary over all seeds of an ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSummary {
    /// Outcomes in the order the seeds were given.
    pub outcomes: Vec<SeedOutcome>,
    pub mean_average_net_power_w: f64,
    /// Fraction of runs whose economics were viable.
    pub viable_fraction: f64,
}

/// Runs one independent simulation per seed.
///
/// Each run gets its own [`Simulation`], so no state is shared between
/// threads. The site lookup is done once per run, as in a single run.
///
/// # Errors
///
/// Returns the first construction error; the scenario is the same for every
/// seed, so either all runs build or none do.
pub fn run_ensemble(
    scenario: &ScenarioConfig,
    geography: &(dyn GeographicDataSource + Sync),
    seeds: &[u64],
    days: usize,
    hours_per_day: usize,
) -> Result<EnsembleSummary, HarvestError> {
    info!(runs = seeds.len(), days, hours_per_day, "ensemble started");
    let outcomes: Vec<SeedOutcome> = seeds
        .par_iter()
        .map(|&seed| -> Result<SeedOutcome, HarvestError> {
            let mut scenario = scenario.clone();
            scenario.simulation.seed = seed;
            let mut sim = Simulation::new(&scenario, geography)?;
            let report = sim.run_for(days, hours_per_day);
            let economics = report.as_ref().and_then(|r| r.economics);
            Ok(SeedOutcome {
                seed,
                average_net_power_w: report
                    .as_ref()
                    .map_or(0.0, |r| r.performance.average_net_power_w),
                npv: economics.map(|e| e.npv),
                viable: economics.is_some_and(|e| e.viable),
            })
        })
        .collect::<Result<_, _>>()?;

    let n = outcomes.len();
    let (mean_average_net_power_w, viable_fraction) = if n == 0 {
        (0.0, 0.0)
    } else {
        let net: f64 = outcomes.iter().map(|o| o.average_net_power_w).sum();
        let viable = outcomes.iter().filter(|o| o.viable).count();
        (net / n as f64, viable as f64 / n as f64)
    };
    info!(mean_average_net_power_w, viable_fraction, "ensemble finished");

    Ok(EnsembleSummary {
        outcomes,
        mean_average_net_power_w,
        viable_fraction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::StaticGeographicData;

    #[test]
    fn outcomes_follow_seed_order() {
        let seeds = [9, 3, 7, 1];
        let summary = run_ensemble(
            &ScenarioConfig::baseline(),
            &StaticGeographicData::default(),
            &seeds,
            2,
            24,
        )
        .expect("baseline is valid");
        let got: Vec<_> = summary.outcomes.iter().map(|o| o.seed).collect();
        assert_eq!(got, seeds);
        assert!((0.0..=1.0).contains(&summary.viable_fraction));
    }

    #[test]
    fn ensemble_matches_sequential_runs() {
        let scenario = ScenarioConfig::baseline();
        let geo = StaticGeographicData::default();
        let summary = run_ensemble(&scenario, &geo, &[5, 6], 3, 24).expect("valid");

        for outcome in &summary.outcomes {
            let mut s = scenario.clone();
            s.simulation.seed = outcome.seed;
            let report = Simulation::new(&s, &geo)
                .expect("valid")
                .run_for(3, 24)
                .expect("steps ran");
            assert_eq!(
                outcome.average_net_power_w,
                report.performance.average_net_power_w
            );
        }
    }

    #[test]
    fn empty_seed_list() {
        let summary = run_ensemble(
            &ScenarioConfig::baseline(),
            &StaticGeographicData::default(),
            &[],
            1,
            24,
        )
        .expect("valid");
        assert!(summary.outcomes.is_empty());
        assert_eq!(summary.viable_fraction, 0.0);
    }

    #[test]
    fn invalid_scenario_fails() {
        let mut scenario = ScenarioConfig::baseline();
        scenario.kinetic.area = -1.0;
        let result = run_ensemble(&scenario, &StaticGeographicData::default(), &[1], 1, 24);
        assert!(matches!(result, Err(HarvestError::InvalidConfig(_))));
    }
}
