//! Harvesting devices and the storage bank they charge.

/// Stationary battery storage model.
pub mod battery;
/// Concentration-gradient electrochemical cell.
pub mod chemical;
/// Moving-coil induction harvester.
pub mod electromagnetic;
pub mod harvesters;
/// Wind and vibration harvester.
pub mod kinetic;
/// Thermoelectric generator array.
pub mod thermal;
pub mod types;

// Re-export the main types for convenience
pub use battery::{Battery, StorageConfig, StorageSnapshot};
pub use chemical::ChemicalSpec;
pub use electromagnetic::ElectromagneticSpec;
pub use harvesters::HarvesterSet;
pub use kinetic::KineticSpec;
pub use thermal::ThermalSpec;
pub use types::{Harvester, Modality, PerModality};
