//! Error taxonomy for construction, numeric-domain, and export failures.

use std::fmt;

use thiserror::Error;

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"storage.capacity"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A list of validation failures collected in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigErrors(pub Vec<ConfigError>);

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for e in &self.0 {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
            first = false;
        }
        Ok(())
    }
}

/// Errors surfaced by the harvesting simulator.
///
/// Construction-time problems (`InvalidConfig`, `Config`) are fatal and are
/// returned to the caller immediately. `NumericDomain` is raised by the
/// chemical model when handed a non-positive concentration ratio; the
/// orchestrator absorbs it for the step it occurs in.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// One or more configuration values violate their constraints.
    #[error("{0}")]
    InvalidConfig(ConfigErrors),

    /// A scenario could not be read, parsed, or resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A physical quantity fell outside the domain of its formula.
    #[error("numeric domain error: {quantity} = {value} is outside the valid domain")]
    NumericDomain { quantity: &'static str, value: f64 },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarvestError {
    /// Returns the validation errors carried by `InvalidConfig`, if any.
    pub fn config_errors(&self) -> &[ConfigError] {
        match self {
            HarvestError::InvalidConfig(errors) => &errors.0,
            _ => &[],
        }
    }
}
