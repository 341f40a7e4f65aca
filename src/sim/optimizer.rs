//! Adaptive per-modality weighting.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::devices::{HarvesterSet, Modality, PerModality, StorageConfig};

use super::history::History;

/// Steps between optimization passes, and the size of the window each pass looks at.
pub const OPTIMIZATION_INTERVAL: usize = 100;
/// Weight given to the newest observed share in the exponential update.
pub const SMOOTHING: f64 = 0.1;
pub const INITIAL_WEIGHT: f64 = 0.25;
/// Multiplier that makes equal weights a no-op on power (`4 × 0.25 = 1`).
pub const WEIGHT_SCALE: f64 = 4.0;

/// Deep copy of an installation's tunable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationSnapshot {
    pub harvesters: HarvesterSet,
    /// Site scaling of the thermal array; `ThermalSpec` does not serialize it.
    pub thermal_efficiency_scale: f64,
    pub storage: StorageConfig,
    pub weights: PerModality<f64>,
}

impl InstallationSnapshot {
    pub fn new(
        harvesters: &HarvesterSet,
        storage: &StorageConfig,
        weights: PerModality<f64>,
    ) -> Self {
        Self {
            harvesters: harvesters.clone(),
            thermal_efficiency_scale: harvesters.thermal.efficiency_scale,
            storage: storage.clone(),
            weights,
        }
    }

    /// The harvesters with the site scaling re-applied, also after a
    /// round trip through JSON.
    pub fn restored_harvesters(&self) -> HarvesterSet {
        let mut harvesters = self.harvesters.clone();
        harvesters.thermal.efficiency_scale = self.thermal_efficiency_scale;
        harvesters
    }
}

/// Nudges per-modality weights toward the sources that recently produced most.
///
/// Every [`OPTIMIZATION_INTERVAL`] steps the mean power of each modality over
/// the last interval becomes its share of the total, and each weight moves
/// `SMOOTHING` of the way toward that share. The configuration with the best
/// mean net power seen so far is kept as a snapshot.
#[derive(Debug, Clone)]
pub struct Optimizer {
    enabled: bool,
    weights: PerModality<f64>,
    best_performance: Option<f64>,
    best_configuration: Option<InstallationSnapshot>,
    evaluations: usize,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Optimizer {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            weights: PerModality::splat(INITIAL_WEIGHT),
            best_performance: None,
            best_configuration: None,
            evaluations: 0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn weights(&self) -> &PerModality<f64> {
        &self.weights
    }

    /// Power multiplier for a modality.
    pub fn scale(&self, modality: Modality) -> f64 {
        WEIGHT_SCALE * self.weights.get(modality)
    }

    /// Best mean net power (W) over any evaluated window; `None` before the first pass.
    pub fn best_performance(&self) -> Option<f64> {
        self.best_performance
    }

    pub fn best_configuration(&self) -> Option<&InstallationSnapshot> {
        self.best_configuration.as_ref()
    }

    /// Number of passes run so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Whether a pass is due for a history of `len` records.
    pub fn is_due(&self, len: usize) -> bool {
        self.enabled && len >= OPTIMIZATION_INTERVAL && len % OPTIMIZATION_INTERVAL == 0
    }

    /// Runs one pass if due.
    ///
    /// # Returns
    ///
    /// `true` if the weights changed.
    pub fn maybe_optimize(
        &mut self,
        history: &History,
        harvesters: &HarvesterSet,
        storage: &StorageConfig,
    ) -> bool {
        if !self.is_due(history.len()) {
            return false;
        }
        self.evaluations += 1;

        let window = OPTIMIZATION_INTERVAL as f64;
        let mut net_sum = 0.0;
        let mut sums = PerModality::splat(0.0);
        for r in history.trailing(OPTIMIZATION_INTERVAL) {
            net_sum += r.net_w;
            sums = sums.map(|m, s| s + r.power_w.get(m));
        }
        let mean_net = net_sum / window;
        let means = sums.map(|_, s| s / window);

        if self.best_performance.is_none_or(|best| mean_net > best) {
            self.best_performance = Some(mean_net);
            self.best_configuration =
                Some(InstallationSnapshot::new(harvesters, storage, self.weights));
            debug!(mean_net, "new best configuration");
        }

        let total = means.sum();
        if !(total > 0.0) {
            debug!(total, "no harvested power in window, weights unchanged");
            return false;
        }
        self.weights = self
            .weights
            .map(|m, w| (1.0 - SMOOTHING) * w + SMOOTHING * means.get(m) / total);
        debug!(weights = ?self.weights, "weights updated");
        true
    }
}
