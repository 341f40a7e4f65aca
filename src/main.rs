//! Harvesting simulator entry point: CLI wiring and scenario-driven runs.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use harvest_sim::config::ScenarioConfig;
use harvest_sim::error::{ConfigErrors, HarvestError};
use harvest_sim::io::export::{export_csv, export_report_json};
use harvest_sim::location::StaticGeographicData;
use harvest_sim::logging::init_tracing;
use harvest_sim::sim::Simulation;
use harvest_sim::sim::ensemble::run_ensemble;

/// Ambient energy harvesting simulator.
///
/// If neither --scenario nor --preset is given, the baseline preset is used.
#[derive(Debug, Parser)]
#[command(name = "harvest-sim", version, about)]
struct Cli {
    /// Load scenario from a TOML config file
    #[arg(long, value_name = "PATH", conflicts_with = "preset")]
    scenario: Option<PathBuf>,

    /// Use a built-in preset (baseline, windy_coast, industrial_site)
    #[arg(long, value_name = "NAME")]
    preset: Option<String>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of simulated days
    #[arg(long)]
    days: Option<usize>,

    /// Override the hours simulated per day (at most 24)
    #[arg(long)]
    hours_per_day: Option<usize>,

    /// Export step records to CSV
    #[arg(long, value_name = "PATH")]
    telemetry_out: Option<PathBuf>,

    /// Export the report as JSON
    #[arg(long, value_name = "PATH")]
    report_out: Option<PathBuf>,

    /// Print one line per simulated step
    #[arg(long, default_value_t = false)]
    print_steps: bool,

    /// Run N independent seeds in parallel, starting at the scenario seed
    #[arg(long, value_name = "N")]
    ensemble: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Start the REST API server after the run
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = false)]
    serve: bool,

    /// API server port
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

/// Resolves the scenario: --scenario, then --preset, then the baseline.
fn load_scenario(cli: &Cli) -> Result<ScenarioConfig, HarvestError> {
    let mut scenario = if let Some(path) = &cli.scenario {
        ScenarioConfig::from_toml_file(path)?
    } else if let Some(name) = &cli.preset {
        ScenarioConfig::from_preset(name)?
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed {
        scenario.simulation.seed = seed;
    }
    if let Some(days) = cli.days {
        scenario.simulation.days = days;
    }
    if let Some(hours) = cli.hours_per_day {
        scenario.simulation.hours_per_day = hours;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        return Err(HarvestError::InvalidConfig(ConfigErrors(errors)));
    }
    Ok(scenario)
}

fn run_ensemble_mode(scenario: &ScenarioConfig, runs: usize) -> Result<(), HarvestError> {
    let s = &scenario.simulation;
    let seeds: Vec<u64> = (0..runs as u64).map(|i| s.seed.wrapping_add(i)).collect();
    let summary = run_ensemble(
        scenario,
        &StaticGeographicData::default(),
        &seeds,
        s.days,
        s.hours_per_day,
    )?;

    println!("--- Ensemble ({runs} runs) ---");
    for o in &summary.outcomes {
        let npv = o.npv.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));
        println!(
            "seed {:>6}: net {:>9.3} W  NPV {:>10}  viable {}",
            o.seed, o.average_net_power_w, npv, o.viable
        );
    }
    println!(
        "Mean average net power: {:.3} W",
        summary.mean_average_net_power_w
    );
    println!("Viable fraction:        {:.1}%", summary.viable_fraction * 100.0);
    Ok(())
}

fn run(cli: &Cli) -> Result<(), HarvestError> {
    let scenario = load_scenario(cli)?;

    if let Some(runs) = cli.ensemble {
        return run_ensemble_mode(&scenario, runs);
    }

    let mut sim = Simulation::new(&scenario, &StaticGeographicData::default())?;
    let report = sim.run();

    if cli.print_steps {
        for r in sim.history().iter() {
            println!("{r}");
        }
    }

    match &report {
        Some(report) => println!("{report}"),
        None => println!("No steps were simulated; nothing to report."),
    }

    if let Some(path) = &cli.telemetry_out {
        export_csv(sim.history().iter(), path)?;
        eprintln!("Telemetry written to {}", path.display());
    }

    if let (Some(path), Some(report)) = (&cli.report_out, &report) {
        export_report_json(report, path)?;
        eprintln!("Report written to {}", path.display());
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(harvest_sim::api::AppState {
            report,
            records: sim.history().iter().cloned().collect(),
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(harvest_sim::api::serve(state, addr))?;
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{e}");
        process::exit(1);
    }
}
