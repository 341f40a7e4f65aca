//! Investment appraisal over the trailing year of history.

use serde::{Deserialize, Serialize};

use crate::devices::{HarvesterSet, StorageConfig};

use super::history::History;
use super::types::PerformanceRecord;

/// Hours in one year of production.
pub const HOURS_PER_YEAR: f64 = 8760.0;
/// Most recent records considered by an appraisal.
pub const ECONOMIC_WINDOW: usize = 8760;

/// Rates and horizons used by the appraisal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicAssumptions {
    /// Installation surcharge as a fraction of harvester hardware cost.
    pub installation_fraction: f64,
    /// Yearly maintenance cost as a fraction of total investment.
    pub maintenance_fraction: f64,
    /// Appraisal horizon (years).
    pub horizon_years: u32,
    pub discount_rate: f64,
    /// Yearly loss of output.
    pub degradation_rate: f64,
    /// Yearly growth of costs.
    pub inflation_rate: f64,
}

impl Default for EconomicAssumptions {
    fn default() -> Self {
        Self {
            installation_fraction: 0.30,
            maintenance_fraction: 0.03,
            horizon_years: 20,
            discount_rate: 0.10,
            degradation_rate: 0.01,
            inflation_rate: 0.03,
        }
    }
}

/// Up-front cost breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub hardware: f64,
    pub storage: f64,
    pub installation: f64,
    pub total: f64,
}

impl Investment {
    /// Prices the installation once, at construction.
    pub fn compute(
        harvesters: &HarvesterSet,
        storage: &StorageConfig,
        assumptions: &EconomicAssumptions,
    ) -> Self {
        let hardware = harvesters.hardware_cost();
        let storage_cost = storage.capacity_kwh() * storage.cost_per_kwh;
        let installation = assumptions.installation_fraction * hardware;
        Self {
            hardware,
            storage: storage_cost,
            installation,
            total: hardware + storage_cost + installation,
        }
    }
}

/// Economic state derived from the history at one point in a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicSnapshot {
    /// Extrapolated yearly production (kWh).
    pub annual_production_kwh: f64,
    pub annual_revenue: f64,
    pub annual_costs: f64,
    pub net_cash_flow: f64,
    /// Years to recover the investment; `None` when cash flow is not positive.
    pub payback_years: Option<f64>,
    pub npv: f64,
    /// Cash-flow yield in percent. This is a simple proxy
    /// (`net cash flow / investment`), not a root-solved IRR.
    pub irr_percent: Option<f64>,
    /// Positive NPV with payback inside the horizon.
    pub viable: bool,
}

/// Net present value of a constant-then-drifting cash flow.
///
/// `NPV = -I + Σ_{y=1..N} (R·(1-deg)^(y-1) - C·(1+infl)^(y-1)) / (1+r)^y`
pub fn npv(investment: f64, revenue: f64, costs: f64, a: &EconomicAssumptions) -> f64 {
    let mut value = -investment;
    for year in 1..=a.horizon_years {
        let n = f64::from(year);
        let inflow = revenue * (1.0 - a.degradation_rate).powf(n - 1.0);
        let outflow = costs * (1.0 + a.inflation_rate).powf(n - 1.0);
        value += (inflow - outflow) / (1.0 + a.discount_rate).powf(n);
    }
    value
}

/// Prices the installation and appraises its recorded performance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EconomicModel {
    investment: Investment,
    assumptions: EconomicAssumptions,
}

impl EconomicModel {
    pub fn new(
        harvesters: &HarvesterSet,
        storage: &StorageConfig,
        assumptions: EconomicAssumptions,
    ) -> Self {
        Self {
            investment: Investment::compute(harvesters, storage, &assumptions),
            assumptions,
        }
    }

    pub fn investment(&self) -> &Investment {
        &self.investment
    }

    pub fn assumptions(&self) -> &EconomicAssumptions {
        &self.assumptions
    }

    /// Appraises the trailing year of `history`.
    ///
    /// # Returns
    ///
    /// `None` when the history is empty.
    pub fn evaluate(
        &self,
        history: &History,
        energy_value_per_kwh: f64,
    ) -> Option<EconomicSnapshot> {
        self.appraise(history.trailing(ECONOMIC_WINDOW), energy_value_per_kwh)
    }

    /// Appraises an arbitrary window of records.
    ///
    /// Zero recorded hours yield zero production rather than an error.
    pub fn appraise<'a>(
        &self,
        window: impl IntoIterator<Item = &'a PerformanceRecord>,
        energy_value_per_kwh: f64,
    ) -> Option<EconomicSnapshot> {
        let a = &self.assumptions;
        let investment = self.investment.total;

        let mut records = 0_usize;
        let mut positive_wh = 0.0;
        let mut hours = 0.0;
        for r in window {
            records += 1;
            positive_wh += r.net_w.max(0.0) * r.time_step_h;
            hours += r.time_step_h;
        }
        if records == 0 {
            return None;
        }
        let annual_production_kwh = if hours > 0.0 {
            positive_wh / 1000.0 * HOURS_PER_YEAR / hours
        } else {
            0.0
        };

        let annual_revenue = annual_production_kwh * energy_value_per_kwh;
        let annual_costs = a.maintenance_fraction * investment;
        let net_cash_flow = annual_revenue - annual_costs;

        let payback_years = if net_cash_flow > 0.0 && investment > 0.0 {
            Some(investment / net_cash_flow)
        } else {
            None
        };
        let horizon = f64::from(a.horizon_years);
        let pays_back = payback_years.is_some_and(|y| y <= horizon);

        let npv = npv(investment, annual_revenue, annual_costs, a);
        let irr_percent = pays_back.then(|| net_cash_flow / investment * 100.0);

        Some(EconomicSnapshot {
            annual_production_kwh,
            annual_revenue,
            annual_costs,
            net_cash_flow,
            payback_years,
            npv,
            irr_percent,
            viable: npv > 0.0 && pays_back,
        })
    }
}
