use serde::{Deserialize, Serialize};

use crate::devices::types::finite_or;
use crate::error::{ConfigError, ConfigErrors, HarvestError};

/// Temperature at which the battery delivers its rated capacity and efficiency (°C).
const REFERENCE_TEMPERATURE: f64 = 25.0;
/// Calendar ageing, as health lost per year of elapsed time.
const CALENDAR_FADE_PER_YEAR: f64 = 0.02;
/// Health never drops below this floor.
pub const MIN_HEALTH: f64 = 0.5;
const HOURS_PER_YEAR: f64 = 8760.0;

/// Static parameters of the storage bank.
///
/// Serialized under the scenario file's `[storage]` key names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Chemistry label, e.g. "lithium-ion".
    #[serde(rename = "type")]
    pub kind: String,
    /// Nameplate capacity (Wh).
    #[serde(rename = "capacity")]
    pub capacity_wh: f64,
    /// Maximum charging power (W).
    #[serde(rename = "max_charge_rate")]
    pub max_charge_rate_w: f64,
    /// Maximum discharging power (W).
    #[serde(rename = "max_discharge_rate")]
    pub max_discharge_rate_w: f64,
    /// Round-trip efficiency (0..1.0).
    #[serde(rename = "efficiency")]
    pub round_trip_efficiency: f64,
    /// State of charge at the start of a run (0..1.0).
    pub initial_soc: f64,
    /// Health lost per equivalent full cycle.
    pub degradation_rate: f64,
    /// Unit cost per kWh of capacity.
    #[serde(rename = "cost")]
    pub cost_per_kwh: f64,
    /// Rated lifetime (years).
    pub lifetime: f64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: "lithium-ion".to_string(),
            capacity_wh: 5000.0,
            max_charge_rate_w: 1000.0,
            max_discharge_rate_w: 1000.0,
            round_trip_efficiency: 0.92,
            initial_soc: 0.5,
            degradation_rate: 0.0002,
            cost_per_kwh: 300.0,
            lifetime: 10.0,
        }
    }
}

impl StorageConfig {
    /// Checks the parameters a battery cannot be built without.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if !(self.capacity_wh > 0.0) {
            errors.push(ConfigError::new("storage.capacity", "must be > 0"));
        }
        if !(self.max_charge_rate_w >= 0.0) {
            errors.push(ConfigError::new("storage.max_charge_rate", "must be >= 0"));
        }
        if !(self.max_discharge_rate_w >= 0.0) {
            errors.push(ConfigError::new(
                "storage.max_discharge_rate",
                "must be >= 0",
            ));
        }
        if !(self.round_trip_efficiency > 0.0 && self.round_trip_efficiency <= 1.0) {
            errors.push(ConfigError::new("storage.efficiency", "must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.initial_soc) {
            errors.push(ConfigError::new("storage.initial_soc", "must be in [0, 1]"));
        }
        if !(self.degradation_rate >= 0.0) {
            errors.push(ConfigError::new("storage.degradation_rate", "must be >= 0"));
        }
        errors
    }

    /// Capacity in kWh, as used for costing.
    pub fn capacity_kwh(&self) -> f64 {
        self.capacity_wh / 1000.0
    }
}

/// Battery state after one [`Battery::update`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageSnapshot {
    /// Energy held in the bank (Wh).
    pub stored_wh: f64,
    /// State of charge relative to the effective capacity (0..1.0).
    pub soc: f64,
    /// Capacity available at the current temperature and health (Wh).
    pub effective_capacity_wh: f64,
    /// One-way conversion efficiency applied this step.
    pub effective_efficiency: f64,
    /// Cumulative equivalent full cycles.
    pub cycles: f64,
    /// Health factor in [0.5, 1].
    pub health: f64,
    /// Cell temperature (°C).
    pub temperature: f64,
    /// Surplus the bank could not absorb this step, plus stored energy lost
    /// to capacity derating (Wh).
    pub spilled_wh: f64,
    /// Deficit the bank could not cover this step (Wh).
    pub unserved_wh: f64,
}

/// A stateful storage bank with temperature derating and ageing.
///
/// # Power Flow Convention
/// - Positive net power: surplus, charges the bank
/// - Negative net power: deficit, discharges the bank
#[derive(Debug, Clone)]
pub struct Battery {
    config: StorageConfig,
    stored_wh: f64,
    soc: f64,
    cycles: f64,
    health: f64,
    temperature: f64,
    elapsed_hours: f64,
}

impl Battery {
    /// Creates a battery at its configured initial state of charge.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::InvalidConfig`] if capacity is not positive,
    /// an efficiency or SOC lies outside its range, or a rate is negative.
    pub fn new(config: StorageConfig) -> Result<Self, HarvestError> {
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(HarvestError::InvalidConfig(ConfigErrors(errors)));
        }
        Ok(Self {
            stored_wh: config.capacity_wh * config.initial_soc,
            soc: config.initial_soc,
            cycles: 0.0,
            health: 1.0,
            temperature: REFERENCE_TEMPERATURE,
            elapsed_hours: 0.0,
            config,
        })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn soc(&self) -> f64 {
        self.soc
    }

    pub fn stored_wh(&self) -> f64 {
        self.stored_wh
    }

    pub fn cycles(&self) -> f64 {
        self.cycles
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    /// Temperature seen at the last update (°C).
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Capacity multiplier at the given temperature.
    pub fn capacity_factor(temperature: f64) -> f64 {
        (1.0 - 0.005 * (temperature - REFERENCE_TEMPERATURE).abs()).max(0.5)
    }

    /// Efficiency multiplier at the given temperature.
    pub fn efficiency_factor(temperature: f64) -> f64 {
        (1.0 - 0.002 * (temperature - REFERENCE_TEMPERATURE).abs()).max(0.5)
    }

    /// Applies one step of net power to the bank.
    ///
    /// # Arguments
    ///
    /// * `net_power_w` - Harvested minus consumed power (W); positive charges
    /// * `time_step_h` - Step duration (h); non-finite or negative is treated as 0
    /// * `temperature_c` - Ambient temperature (°C); non-finite is treated as 25 °C
    ///
    /// # Returns
    ///
    /// The post-update [`StorageSnapshot`]. SOC is always within [0, 1].
    pub fn update(
        &mut self,
        net_power_w: f64,
        time_step_h: f64,
        temperature_c: f64,
    ) -> StorageSnapshot {
        let net = finite_or(net_power_w, 0.0);
        let dt = finite_or(time_step_h, 0.0).max(0.0);
        let temperature = finite_or(temperature_c, REFERENCE_TEMPERATURE);
        self.temperature = temperature;

        let effective_capacity =
            self.config.capacity_wh * self.health * Self::capacity_factor(temperature);
        let efficiency =
            self.config.round_trip_efficiency.sqrt() * Self::efficiency_factor(temperature);

        // Energy above the derated capacity is lost, not cycled.
        let derated = self.stored_wh.clamp(0.0, effective_capacity);
        let mut spilled_wh = (self.stored_wh - derated).max(0.0);
        self.stored_wh = derated;
        let before = self.stored_wh;

        let mut unserved_wh = 0.0;
        if net > 0.0 {
            let offered = net * dt;
            let headroom = (effective_capacity - self.stored_wh).max(0.0);
            let e_in = offered.min(self.config.max_charge_rate_w * dt).min(headroom);
            self.stored_wh += e_in * efficiency;
            spilled_wh += offered - e_in;
        } else if net < 0.0 {
            let requested = -net * dt;
            let deliverable = self.stored_wh * efficiency;
            let e_out = requested
                .min(self.config.max_discharge_rate_w * dt)
                .min(deliverable);
            if efficiency > 0.0 {
                self.stored_wh = (self.stored_wh - e_out / efficiency).max(0.0);
            }
            unserved_wh = requested - e_out;
        }
        self.stored_wh = self.stored_wh.clamp(0.0, effective_capacity);

        self.soc = if effective_capacity > 0.0 {
            (self.stored_wh / effective_capacity).clamp(0.0, 1.0)
        } else {
            0.0
        };

        self.cycles += (self.stored_wh - before).abs() / (2.0 * self.config.capacity_wh);
        self.elapsed_hours += dt;
        let years = self.elapsed_hours / HOURS_PER_YEAR;
        let aged = (1.0
            - self.cycles * self.config.degradation_rate
            - years * CALENDAR_FADE_PER_YEAR)
            .max(MIN_HEALTH);
        self.health = self.health.min(aged);

        StorageSnapshot {
            stored_wh: self.stored_wh,
            soc: self.soc,
            effective_capacity_wh: effective_capacity,
            effective_efficiency: efficiency,
            cycles: self.cycles,
            health: self.health,
            temperature,
            spilled_wh,
            unserved_wh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ideal(capacity_wh: f64, soc: f64, rate_w: f64) -> Battery {
        Battery::new(StorageConfig {
            capacity_wh,
            max_charge_rate_w: rate_w,
            max_discharge_rate_w: rate_w,
            round_trip_efficiency: 1.0,
            initial_soc: soc,
            degradation_rate: 0.0,
            ..StorageConfig::default()
        })
        .expect("valid storage config")
    }

    #[test]
    fn test_new_battery() {
        let battery = Battery::new(StorageConfig::default()).expect("default is valid");
        assert_eq!(battery.soc(), 0.5);
        assert_eq!(battery.stored_wh(), 2500.0);
        assert_eq!(battery.health(), 1.0);
        assert_eq!(battery.cycles(), 0.0);
        assert_eq!(battery.config().kind, "lithium-ion");
    }

    #[test]
    fn test_invalid_capacity() {
        let err = Battery::new(StorageConfig {
            capacity_wh: 0.0,
            ..StorageConfig::default()
        })
        .unwrap_err();
        assert_eq!(err.config_errors()[0].field, "storage.capacity");
    }

    #[test]
    fn test_invalid_soc_and_efficiency() {
        let err = Battery::new(StorageConfig {
            initial_soc: 1.1,
            round_trip_efficiency: 1.5,
            ..StorageConfig::default()
        })
        .unwrap_err();
        assert_eq!(err.config_errors().len(), 2);
    }

    #[test]
    fn test_charge_rate_limit() {
        let mut battery = ideal(10_000.0, 0.5, 500.0);
        let snap = battery.update(2000.0, 1.0, 25.0);
        assert!((snap.stored_wh - 5500.0).abs() < 1e-9);
        assert!((snap.spilled_wh - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn test_discharge_rate_limit() {
        let mut battery = ideal(10_000.0, 0.5, 500.0);
        let snap = battery.update(-2000.0, 1.0, 25.0);
        assert!((snap.stored_wh - 4500.0).abs() < 1e-9);
        assert!((snap.unserved_wh - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn test_charge_capacity_limit() {
        let mut battery = ideal(1000.0, 0.9, 5000.0);
        let snap = battery.update(500.0, 1.0, 25.0);
        assert!((snap.soc - 1.0).abs() < 1e-12);
        assert!((snap.spilled_wh - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_discharge_energy_limit() {
        let mut battery = ideal(1000.0, 0.1, 5000.0);
        let snap = battery.update(-500.0, 1.0, 25.0);
        assert_eq!(snap.soc, 0.0);
        assert!((snap.unserved_wh - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_efficiency_charge() {
        let mut battery = Battery::new(StorageConfig {
            capacity_wh: 10_000.0,
            initial_soc: 0.0,
            round_trip_efficiency: 0.81,
            degradation_rate: 0.0,
            ..StorageConfig::default()
        })
        .expect("valid");
        // One-way efficiency is sqrt(0.81) = 0.9 at 25 °C.
        let snap = battery.update(1000.0, 1.0, 25.0);
        assert!((snap.stored_wh - 900.0).abs() < 1e-9);
        assert!((snap.effective_efficiency - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_temperature_factors() {
        assert_eq!(Battery::capacity_factor(25.0), 1.0);
        assert!((Battery::capacity_factor(5.0) - 0.9).abs() < 1e-12);
        assert_eq!(Battery::capacity_factor(-200.0), 0.5);
        assert!((Battery::efficiency_factor(45.0) - 0.96).abs() < 1e-12);
        assert_eq!(Battery::efficiency_factor(500.0), 0.5);
    }

    #[test]
    fn test_cold_spills_lost_capacity() {
        let mut battery = ideal(1000.0, 1.0, 100.0);
        // At 5 °C only 90% of nameplate is usable.
        let snap = battery.update(0.0, 1.0, 5.0);
        assert!((snap.stored_wh - 900.0).abs() < 1e-9);
        assert!((snap.spilled_wh - 100.0).abs() < 1e-9);
        assert_eq!(snap.soc, 1.0);
        assert_eq!(snap.cycles, 0.0);
    }

    #[test]
    fn test_derating_alone_does_not_cycle() {
        let mut battery = Battery::new(StorageConfig {
            initial_soc: 1.0,
            degradation_rate: 0.01,
            ..StorageConfig::default()
        })
        .expect("valid");
        // Idle, zero-length, very cold step on a full bank.
        let snap = battery.update(0.0, 0.0, -75.0);
        assert_eq!(snap.cycles, 0.0);
        assert_eq!(snap.health, 1.0);
        assert!((snap.stored_wh - 2500.0).abs() < 1e-9);
        assert!((snap.spilled_wh - 2500.0).abs() < 1e-9);

        // Warming back up does not count as charging either.
        let snap = battery.update(0.0, 1.0, 25.0);
        assert_eq!(snap.cycles, 0.0);
    }

    #[test]
    fn test_soc_bounded_under_extreme_requests() {
        let mut battery = Battery::new(StorageConfig::default()).expect("valid");
        let requests = [1e12, -1e12, f64::NAN, f64::INFINITY, -5e3, 5e3, 0.0];
        for (i, p) in requests.iter().cycle().take(200).enumerate() {
            let temp = -40.0 + (i % 10) as f64 * 10.0;
            let snap = battery.update(*p, 1.0, temp);
            assert!((0.0..=1.0).contains(&snap.soc), "soc {} out of range", snap.soc);
            assert!(snap.stored_wh >= 0.0);
        }
    }

    #[test]
    fn test_cycles_monotonic_and_health_non_increasing() {
        let mut battery = Battery::new(StorageConfig {
            degradation_rate: 0.01,
            ..StorageConfig::default()
        })
        .expect("valid");
        let mut last_cycles = 0.0;
        let mut last_health = 1.0;
        for i in 0..500 {
            let p = if i % 6 < 3 { 1000.0 } else { -1000.0 };
            let snap = battery.update(p, 1.0, 25.0);
            assert!(snap.cycles >= last_cycles);
            assert!(snap.health <= last_health);
            assert!(snap.health >= MIN_HEALTH);
            last_cycles = snap.cycles;
            last_health = snap.health;
        }
        assert!(last_health < 1.0);
    }

    #[test]
    fn test_degenerate_time_step_is_noop() {
        let mut battery = ideal(1000.0, 0.5, 100.0);
        let snap = battery.update(100.0, f64::NAN, 25.0);
        assert_eq!(snap.stored_wh, 500.0);
        let snap = battery.update(100.0, -1.0, 25.0);
        assert_eq!(snap.stored_wh, 500.0);
        assert_eq!(snap.cycles, 0.0);
    }

    #[test]
    fn test_calendar_fade() {
        let mut battery = ideal(1000.0, 0.5, 100.0);
        // One idle year costs 2% health.
        let snap = battery.update(0.0, 8760.0, 25.0);
        assert!((snap.health - 0.98).abs() < 1e-12);
    }
}
