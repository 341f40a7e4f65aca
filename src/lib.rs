//! Ambient energy harvesting simulator.
//!
//! Models an installation of kinetic, thermal, electromagnetic, and chemical
//! harvesters feeding a storage bank, and appraises it economically.

/// Read-only HTTP API over a finished run.
#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod devices;
pub mod environment;
pub mod error;
pub mod io;
pub mod location;
pub mod logging;
/// Orchestrator, history, economics, optimization, and reporting.
pub mod sim;

pub use config::ScenarioConfig;
pub use error::HarvestError;
pub use sim::{Report, Simulation};
