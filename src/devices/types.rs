//! Common types and traits for the harvesting modalities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::environment::EnvironmentSample;
use crate::error::HarvestError;

/// One of the four independent energy-harvesting mechanisms.
///
/// Declaration order doubles as the fixed priority used to break ties
/// (e.g. when two modalities share the highest average power).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Kinetic,
    Thermal,
    Electromagnetic,
    Chemical,
}

impl Modality {
    /// All modalities in priority order.
    pub const ALL: [Modality; 4] = [
        Modality::Kinetic,
        Modality::Thermal,
        Modality::Electromagnetic,
        Modality::Chemical,
    ];

    /// Short lowercase label used in logs, CSV headers, and recommendations.
    pub fn label(self) -> &'static str {
        match self {
            Modality::Kinetic => "kinetic",
            Modality::Thermal => "thermal",
            Modality::Electromagnetic => "electromagnetic",
            Modality::Chemical => "chemical",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A value held once per modality.
///
/// Used for per-source power readings, averages, and optimization weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerModality<T> {
    pub kinetic: T,
    pub thermal: T,
    pub electromagnetic: T,
    pub chemical: T,
}

impl<T> PerModality<T> {
    /// Builds a value by calling `f` once per modality in priority order.
    pub fn from_fn(mut f: impl FnMut(Modality) -> T) -> Self {
        Self {
            kinetic: f(Modality::Kinetic),
            thermal: f(Modality::Thermal),
            electromagnetic: f(Modality::Electromagnetic),
            chemical: f(Modality::Chemical),
        }
    }

    pub fn get_ref(&self, modality: Modality) -> &T {
        match modality {
            Modality::Kinetic => &self.kinetic,
            Modality::Thermal => &self.thermal,
            Modality::Electromagnetic => &self.electromagnetic,
            Modality::Chemical => &self.chemical,
        }
    }
}

impl<T: Copy> PerModality<T> {
    /// Creates a value with every modality set to `value`.
    pub fn splat(value: T) -> Self {
        Self {
            kinetic: value,
            thermal: value,
            electromagnetic: value,
            chemical: value,
        }
    }

    pub fn get(&self, modality: Modality) -> T {
        match modality {
            Modality::Kinetic => self.kinetic,
            Modality::Thermal => self.thermal,
            Modality::Electromagnetic => self.electromagnetic,
            Modality::Chemical => self.chemical,
        }
    }

    pub fn set(&mut self, modality: Modality, value: T) {
        match modality {
            Modality::Kinetic => self.kinetic = value,
            Modality::Thermal => self.thermal = value,
            Modality::Electromagnetic => self.electromagnetic = value,
            Modality::Chemical => self.chemical = value,
        }
    }

    /// Applies `f` to each value, keeping the modality layout.
    pub fn map<U: Copy>(&self, mut f: impl FnMut(Modality, T) -> U) -> PerModality<U> {
        PerModality::from_fn(|m| f(m, self.get(m)))
    }

    /// Iterates `(modality, value)` pairs in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (Modality, T)> + '_ {
        Modality::ALL.into_iter().map(move |m| (m, self.get(m)))
    }
}

impl PerModality<f64> {
    pub fn sum(&self) -> f64 {
        self.kinetic + self.thermal + self.electromagnetic + self.chemical
    }

    /// Returns the modality with the largest value.
    ///
    /// Ties go to the modality that comes first in [`Modality::ALL`].
    pub fn max_modality(&self) -> (Modality, f64) {
        let mut best = (Modality::Kinetic, self.kinetic);
        for (m, v) in self.iter().skip(1) {
            if v > best.1 {
                best = (m, v);
            }
        }
        best
    }

    /// Returns the modality with the smallest value, ties to the earlier modality.
    pub fn min_modality(&self) -> (Modality, f64) {
        let mut worst = (Modality::Kinetic, self.kinetic);
        for (m, v) in self.iter().skip(1) {
            if v < worst.1 {
                worst = (m, v);
            }
        }
        worst
    }
}

/// Trait implemented by every harvesting modality.
///
/// Implementations are pure: the same sample always yields the same power.
/// Returned power is in watts and never negative.
pub trait Harvester {
    /// Returns instantaneous power (W) for the given environment sample.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::NumericDomain`] when a reading falls outside
    /// the domain of the modality's formula.
    fn power_w(&self, sample: &EnvironmentSample) -> Result<f64, HarvestError>;

    /// Returns which modality this harvester implements.
    fn modality(&self) -> Modality;
}

/// Replaces a non-finite reading with the modality's neutral value.
pub fn finite_or(value: f64, neutral: f64) -> f64 {
    if value.is_finite() { value } else { neutral }
}
