/// Simulation clock for walking the day/hour grid.
pub mod clock;
pub mod economics;
pub mod engine;
/// Parallel multi-seed runs.
pub mod ensemble;
pub mod history;
pub mod optimizer;
pub mod report;
pub mod types;

pub use engine::Simulation;
pub use report::Report;
