//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use harvest_sim::config::ScenarioConfig;
use harvest_sim::location::StaticGeographicData;
use harvest_sim::sim::Simulation;

/// Baseline scenario with the given seed.
pub fn baseline_scenario(seed: u64) -> ScenarioConfig {
    let mut scenario = ScenarioConfig::baseline();
    scenario.simulation.seed = seed;
    scenario
}

/// Simulation of the baseline scenario at the fixed static site.
pub fn baseline_simulation(seed: u64) -> Simulation {
    Simulation::new(&baseline_scenario(seed), &StaticGeographicData::default())
        .expect("baseline scenario should be valid")
}

/// Simulation of a named preset at the fixed static site.
pub fn preset_simulation(name: &str) -> Simulation {
    let scenario = ScenarioConfig::from_preset(name).expect("preset should exist");
    Simulation::new(&scenario, &StaticGeographicData::default())
        .expect("preset scenario should be valid")
}
