/// File export of telemetry and reports.
pub mod export;
