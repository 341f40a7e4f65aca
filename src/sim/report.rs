//! Post-hoc performance report computed from the step history.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::devices::{Modality, PerModality};

use super::economics::EconomicSnapshot;
use super::history::History;

/// A run is considered self-sustaining above this fraction of positive-net steps.
const VIABLE_POSITIVE_FRACTION: f64 = 0.7;
const PAYBACK_WARNING_YEARS: f64 = 10.0;
const LOW_SOC: f64 = 0.2;
const LOW_HEALTH: f64 = 0.8;
const WEAK_SOURCE_SHARE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Steps executed, including any trimmed from the history.
    pub steps: usize,
    /// Simulated hours divided by 24. A partial-day grid spans more calendar
    /// days than this.
    pub days: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub average_net_power_w: f64,
    /// Energy harvested before maintenance draw (kWh).
    pub total_energy_kwh: f64,
    /// Fraction of steps with positive net power.
    pub positive_fraction: f64,
    pub viable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub average_power_w: PerModality<f64>,
    pub dominant: Modality,
    /// `1 - strongest share`; 0 when nothing was harvested.
    pub diversity_index: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageSummary {
    pub average_soc: f64,
    pub average_efficiency: f64,
    pub health: f64,
    pub cycles: f64,
}

/// Aggregate view of a run.
///
/// Computed post-hoc from the retained history so that the reported
/// figures always agree with the step records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub period: PeriodSummary,
    pub performance: PerformanceSummary,
    pub sources: SourceSummary,
    pub storage: StorageSummary,
    /// Economics as of the last step.
    pub economics: Option<EconomicSnapshot>,
    pub weights: PerModality<f64>,
    pub best_performance_w: Option<f64>,
    pub recommendations: Vec<String>,
}

impl Report {
    /// Builds the report for a history.
    ///
    /// # Arguments
    ///
    /// * `history` - Retained step records
    /// * `steps_executed` - Steps run in total, including trimmed ones
    /// * `weights` - Current optimization weights
    /// * `best_performance_w` - Best mean net power seen by the optimizer
    ///
    /// # Returns
    ///
    /// `None` when the history is empty.
    pub fn from_history(
        history: &History,
        steps_executed: usize,
        weights: PerModality<f64>,
        best_performance_w: Option<f64>,
    ) -> Option<Self> {
        let latest = history.latest()?;
        let n = history.len() as f64;

        let mut net_sum = 0.0;
        let mut energy_wh = 0.0;
        let mut positive = 0_usize;
        let mut soc_sum = 0.0;
        let mut efficiency_sum = 0.0;
        let mut power_sums = PerModality::splat(0.0);
        for r in history.iter() {
            net_sum += r.net_w;
            energy_wh += r.total_harvested_w * r.time_step_h;
            if r.net_w > 0.0 {
                positive += 1;
            }
            soc_sum += r.storage.soc;
            efficiency_sum += r.storage.effective_efficiency;
            power_sums = power_sums.map(|m, s| s + r.power_w.get(m));
        }

        let average_net_power_w = net_sum / n;
        let positive_fraction = positive as f64 / n;
        let performance = PerformanceSummary {
            average_net_power_w,
            total_energy_kwh: energy_wh / 1000.0,
            positive_fraction,
            viable: average_net_power_w > 0.0 && positive_fraction > VIABLE_POSITIVE_FRACTION,
        };

        let average_power_w = power_sums.map(|_, s| s / n);
        let (dominant, strongest) = average_power_w.max_modality();
        let total = average_power_w.sum();
        let sources = SourceSummary {
            average_power_w,
            dominant,
            diversity_index: if total > 0.0 {
                1.0 - strongest / total
            } else {
                0.0
            },
        };

        let storage = StorageSummary {
            average_soc: soc_sum / n,
            average_efficiency: efficiency_sum / n,
            health: latest.storage.health,
            cycles: latest.storage.cycles,
        };

        let economics = latest.economics;
        let recommendations = recommendations(economics.as_ref(), &storage, &average_power_w);

        Some(Self {
            period: PeriodSummary {
                steps: steps_executed,
                days: steps_executed as f64 * latest.time_step_h / 24.0,
            },
            performance,
            sources,
            storage,
            economics,
            weights,
            best_performance_w,
            recommendations,
        })
    }
}

fn recommendations(
    economics: Option<&EconomicSnapshot>,
    storage: &StorageSummary,
    average_power_w: &PerModality<f64>,
) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(e) = economics {
        if let Some(payback) = e.payback_years.filter(|y| *y > PAYBACK_WARNING_YEARS) {
            out.push(format!(
                "Payback period of {payback:.1} years is long; reduce hardware cost or favour higher-yield sources"
            ));
        }
        if e.npv < 0.0 {
            out.push(format!(
                "Negative NPV ({:.2}); the installation does not recover its cost over the appraisal horizon",
                e.npv
            ));
        }
    }
    if storage.average_soc < LOW_SOC {
        out.push(format!(
            "Average state of charge is low ({:.1}%); add harvesting capacity or reduce load",
            storage.average_soc * 100.0
        ));
    }
    if storage.health < LOW_HEALTH {
        out.push(format!(
            "Battery health has dropped to {:.1}%; plan for replacement",
            storage.health * 100.0
        ));
    }
    let total = average_power_w.sum();
    if total > 0.0 {
        let (weakest, power) = average_power_w.min_modality();
        let share = power / total;
        if share < WEAK_SOURCE_SHARE {
            out.push(format!(
                "The {weakest} source contributes only {:.1}% of harvested power; consider removing or resizing it",
                share * 100.0
            ));
        }
    }
    if out.is_empty() {
        out.push("System is performing within expected parameters".to_string());
    }
    out
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Harvesting Report ---")?;
        writeln!(
            f,
            "Period:                {} steps ({:.1} days)",
            self.period.steps, self.period.days
        )?;
        let p = &self.performance;
        writeln!(f, "Average net power:     {:.3} W", p.average_net_power_w)?;
        writeln!(f, "Energy harvested:      {:.3} kWh", p.total_energy_kwh)?;
        writeln!(
            f,
            "Positive-net steps:    {:.1}% (self-sustaining: {})",
            p.positive_fraction * 100.0,
            p.viable
        )?;
        writeln!(f, "Average source power:")?;
        for (m, w) in self.sources.average_power_w.iter() {
            writeln!(f, "  {:<16} {:.3} W (weight {:.3})", m.label(), w, self.weights.get(m))?;
        }
        writeln!(
            f,
            "Dominant source:       {} (diversity {:.3})",
            self.sources.dominant, self.sources.diversity_index
        )?;
        let s = &self.storage;
        writeln!(
            f,
            "Storage:               SoC avg {:.1}%, efficiency {:.3}, health {:.3}, {:.2} cycles",
            s.average_soc * 100.0,
            s.average_efficiency,
            s.health,
            s.cycles
        )?;
        match &self.economics {
            Some(e) => {
                writeln!(
                    f,
                    "Annual production:     {:.2} kWh (revenue {:.2}, costs {:.2})",
                    e.annual_production_kwh, e.annual_revenue, e.annual_costs
                )?;
                match e.payback_years {
                    Some(y) => writeln!(f, "Payback:               {y:.1} years")?,
                    None => writeln!(f, "Payback:               never")?,
                }
                writeln!(f, "NPV (20 y):            {:.2}", e.npv)?;
                if let Some(irr) = e.irr_percent {
                    writeln!(f, "Cash yield (IRR est.): {irr:.1}%")?;
                }
                writeln!(f, "Economically viable:   {}", e.viable)?;
            }
            None => writeln!(f, "Economics:             n/a")?,
        }
        if let Some(best) = self.best_performance_w {
            writeln!(f, "Best window net power: {best:.3} W")?;
        }
        write!(f, "Recommendations:")?;
        for r in &self.recommendations {
            write!(f, "\n  - {r}")?;
        }
        Ok(())
    }
}
