//! API response and query types.
//!
//! Telemetry field names follow the CSV export columns.

use serde::{Deserialize, Serialize};

use crate::sim::types::PerformanceRecord;

/// Flat telemetry record using the CSV column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    pub time_index: usize,
    pub day_of_year: usize,
    /// Wind speed (m/s).
    pub wind_speed: f64,
    /// Ambient temperature (°C).
    pub ambient_temp: f64,
    pub kinetic_w: f64,
    pub thermal_w: f64,
    pub em_w: f64,
    pub chemical_w: f64,
    pub total_w: f64,
    pub maintenance_w: f64,
    pub net_w: f64,
    /// Storage state of charge (0.0 to 1.0).
    pub soc: f64,
    pub health: f64,
    pub cycles: f64,
}

impl From<&PerformanceRecord> for TelemetryRecord {
    fn from(r: &PerformanceRecord) -> Self {
        Self {
            time_index: r.time_index,
            day_of_year: r.day_of_year,
            wind_speed: r.environment.wind_speed,
            ambient_temp: r.environment.ambient_temperature,
            kinetic_w: r.power_w.kinetic,
            thermal_w: r.power_w.thermal,
            em_w: r.power_w.electromagnetic,
            chemical_w: r.power_w.chemical,
            total_w: r.total_harvested_w,
            maintenance_w: r.maintenance_w,
            net_w: r.net_w,
            soc: r.storage.soc,
            health: r.storage.health,
            cycles: r.storage.cycles,
        }
    }
}

/// Optional range query parameters for the telemetry endpoint.
#[derive(Debug, Deserialize)]
pub struct TelemetryQuery {
    /// First time index (inclusive).
    pub from: Option<usize>,
    /// Last time index (inclusive).
    pub to: Option<usize>,
}

/// Error response body for 4xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
