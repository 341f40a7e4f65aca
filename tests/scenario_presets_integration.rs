use std::path::Path;
use std::process::Command;

use harvest_sim::config::ScenarioConfig;

#[derive(Debug)]
struct Headline {
    average_net_w: f64,
    energy_kwh: f64,
}

#[test]
fn scenario_files_match_builtin_presets() {
    for name in ScenarioConfig::PRESETS {
        let path = format!("scenarios/{name}.toml");
        let from_file = ScenarioConfig::from_toml_file(Path::new(&path))
            .unwrap_or_else(|e| panic!("{path} should load: {e}"));
        let preset = ScenarioConfig::from_preset(name).expect("preset should exist");
        assert_eq!(from_file, preset, "{path} drifted from the `{name}` preset");
    }
}

#[test]
fn scenario_presets_run_via_cli_and_produce_distinct_dynamics() {
    let baseline = run_and_parse(&["--scenario", "scenarios/baseline.toml", "--days", "5"]);
    let windy = run_and_parse(&["--scenario", "scenarios/windy_coast.toml", "--days", "5"]);
    let industrial = run_and_parse(&["--preset", "industrial_site", "--days", "5"]);

    assert!(
        windy.energy_kwh > baseline.energy_kwh,
        "expected windy_coast to harvest more than baseline: windy={:.3}, baseline={:.3}",
        windy.energy_kwh,
        baseline.energy_kwh
    );

    assert!(
        (baseline.average_net_w - industrial.average_net_w).abs() > 1e-3,
        "expected baseline and industrial_site to differ: baseline={:.3}, industrial={:.3}",
        baseline.average_net_w,
        industrial.average_net_w
    );
}

#[test]
fn cli_is_deterministic_for_a_fixed_seed() {
    let args = ["--preset", "baseline", "--seed", "99", "--days", "3"];
    let a = run_stdout(&args);
    let b = run_stdout(&args);
    assert_eq!(a, b);
}

#[test]
fn cli_rejects_unknown_preset() {
    let output = Command::new(env!("CARGO_BIN_EXE_harvest-sim"))
        .args(["--preset", "volcano"])
        .output()
        .expect("harvest-sim process should run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("volcano"), "stderr: {stderr}");
}

#[test]
fn cli_rejects_too_many_hours_per_day() {
    let output = Command::new(env!("CARGO_BIN_EXE_harvest-sim"))
        .args(["--hours-per-day", "30"])
        .output()
        .expect("harvest-sim process should run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("simulation.hours_per_day"), "stderr: {stderr}");
}

#[test]
fn cli_reports_nothing_for_zero_days() {
    let stdout = run_stdout(&["--days", "0"]);
    assert!(stdout.contains("nothing to report"), "stdout: {stdout}");
}

#[test]
fn cli_writes_telemetry_and_report_files() {
    let dir = std::env::temp_dir().join(format!("harvest-sim-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    let csv_path = dir.join("telemetry.csv");
    let json_path = dir.join("report.json");

    let output = Command::new(env!("CARGO_BIN_EXE_harvest-sim"))
        .args(["--days", "2", "--telemetry-out"])
        .arg(&csv_path)
        .arg("--report-out")
        .arg(&json_path)
        .output()
        .expect("harvest-sim process should run");
    assert!(output.status.success());

    let csv = std::fs::read_to_string(&csv_path).expect("telemetry should be written");
    assert_eq!(csv.lines().count(), 1 + 48);

    let json = std::fs::read_to_string(&json_path).expect("report should be written");
    let report: serde_json::Value = serde_json::from_str(&json).expect("report should be JSON");
    assert_eq!(report["period"]["steps"], 48);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn cli_ensemble_lists_every_seed() {
    let stdout = run_stdout(&["--ensemble", "3", "--seed", "20", "--days", "2"]);
    for seed in ["seed     20", "seed     21", "seed     22"] {
        assert!(stdout.contains(seed), "missing `{seed}` in: {stdout}");
    }
    assert!(stdout.contains("Viable fraction:"));
}

fn run_stdout(args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_harvest-sim"))
        .args(args)
        .output()
        .expect("harvest-sim process should run");

    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8(output.stdout).expect("stdout should be valid UTF-8")
}

fn run_and_parse(args: &[&str]) -> Headline {
    let stdout = run_stdout(args);
    Headline {
        average_net_w: parse_metric(&stdout, "Average net power:", "W"),
        energy_kwh: parse_metric(&stdout, "Energy harvested:", "kWh"),
    }
}

fn parse_metric(stdout: &str, label: &str, unit: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing report line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid report format for line `{line}`"));

    let value = raw
        .strip_suffix(unit)
        .map(str::trim)
        .unwrap_or_else(|| panic!("expected unit `{unit}` in line `{line}`"));

    value
        .parse::<f64>()
        .unwrap_or_else(|e| panic!("failed to parse `{value}` from `{line}`: {e}"))
}
