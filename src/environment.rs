//! Synthetic environment generator: daily and seasonal cycles with seeded jitter.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

/// Hours in one simulated day.
pub const HOURS_PER_DAY: usize = 24;
/// Days in one simulated year.
pub const DAYS_PER_YEAR: usize = 365;

/// Concentration ratios are never generated below this value, so the chemical
/// model's logarithm is always defined.
pub const MIN_CONCENTRATION_RATIO: f64 = 1e-3;

/// Prevailing weather regime applied on top of the deterministic cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherPattern {
    #[default]
    Mild,
    Windy,
    Stormy,
    Still,
}

impl WeatherPattern {
    /// Accepted names, as written in scenario files.
    pub const NAMES: &[&str] = &["mild", "windy", "stormy", "still"];

    /// Returns the `(wind, vibration, thermal)` multipliers for this regime.
    pub fn multipliers(self) -> (f64, f64, f64) {
        match self {
            WeatherPattern::Mild => (1.0, 1.0, 1.0),
            WeatherPattern::Windy => (1.6, 1.2, 0.9),
            WeatherPattern::Stormy => (2.2, 1.5, 0.8),
            WeatherPattern::Still => (0.4, 0.8, 1.2),
        }
    }
}

impl FromStr for WeatherPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mild" => Ok(WeatherPattern::Mild),
            "windy" => Ok(WeatherPattern::Windy),
            "stormy" => Ok(WeatherPattern::Stormy),
            "still" => Ok(WeatherPattern::Still),
            other => Err(format!(
                "unknown weather pattern \"{other}\", available: {}",
                Self::NAMES.join(", ")
            )),
        }
    }
}

impl fmt::Display for WeatherPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeatherPattern::Mild => "mild",
            WeatherPattern::Windy => "windy",
            WeatherPattern::Stormy => "stormy",
            WeatherPattern::Still => "still",
        };
        f.write_str(name)
    }
}

/// Physical readings for one time step.
///
/// Produced fresh each step by [`EnvironmentModel::sample`]. Readings that a
/// caller leaves undefined (non-finite) are treated as physically neutral by
/// the harvesters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSample {
    /// Absolute hour index since the start of the run.
    pub time_index: usize,
    /// Hour of day (0..24).
    pub hour_of_day: usize,
    /// Day of year (0..365).
    pub day_of_year: usize,
    pub weather: WeatherPattern,
    /// Wind speed (m/s).
    pub wind_speed: f64,
    /// Vibration displacement amplitude (m).
    pub vibration_amplitude: f64,
    /// Vibration frequency (Hz).
    pub vibration_frequency: f64,
    /// Temperature difference available to thermoelectric modules (K).
    pub thermal_gradient: f64,
    /// Ambient air temperature (°C).
    pub ambient_temperature: f64,
    /// Magnetic flux density at the coil (T).
    pub magnetic_field: f64,
    /// Conductor velocity relative to the field (m/s).
    pub relative_velocity: f64,
    /// Ratio of ionic concentrations across the electrochemical cell.
    pub concentration_ratio: f64,
}

impl EnvironmentSample {
    /// A sample in which every modality sees physically neutral conditions:
    /// no wind, no vibration, no gradient, no field, equal concentrations.
    pub fn neutral(time_index: usize, day_of_year: usize) -> Self {
        Self {
            time_index,
            hour_of_day: time_index % HOURS_PER_DAY,
            day_of_year,
            weather: WeatherPattern::Mild,
            wind_speed: 0.0,
            vibration_amplitude: 0.0,
            vibration_frequency: 0.0,
            thermal_gradient: 0.0,
            ambient_temperature: 25.0,
            magnetic_field: 0.0,
            relative_velocity: 0.0,
            concentration_ratio: 1.0,
        }
    }
}

/// Mean environmental levels around which the cycles oscillate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentBaseline {
    /// Mean wind speed (m/s).
    pub wind_speed: f64,
    /// Mean vibration amplitude (m).
    pub vibration_amplitude: f64,
    /// Mean ambient temperature (°C).
    pub temperature: f64,
    /// Mean magnetic field (T).
    pub magnetic_field: f64,
}

impl Default for EnvironmentBaseline {
    fn default() -> Self {
        Self {
            wind_speed: 5.0,
            vibration_amplitude: 5e-4,
            temperature: 15.0,
            magnetic_field: 5e-5,
        }
    }
}

/// Seeded generator of [`EnvironmentSample`]s.
///
/// All stochastic draws of a simulation run happen here. Draws are made in a
/// fixed order per sample, so two models built from the same seed and
/// baseline produce identical streams.
#[derive(Debug, Clone)]
pub struct EnvironmentModel {
    baseline: EnvironmentBaseline,
    rng: StdRng,
}

impl EnvironmentModel {
    /// Creates a model with the default baseline.
    pub fn new(seed: u64) -> Self {
        Self::with_baseline(EnvironmentBaseline::default(), seed)
    }

    pub fn with_baseline(baseline: EnvironmentBaseline, seed: u64) -> Self {
        Self {
            baseline,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn baseline(&self) -> &EnvironmentBaseline {
        &self.baseline
    }

    /// Produces the environment sample for one hour.
    ///
    /// # Arguments
    ///
    /// * `time_index` - Absolute hour index; hour of day is `time_index % 24`
    /// * `day_of_year` - Day within the annual cycle (wrapped to 0..365)
    /// * `weather` - Prevailing weather regime
    pub fn sample(
        &mut self,
        time_index: usize,
        day_of_year: usize,
        weather: WeatherPattern,
    ) -> EnvironmentSample {
        let hour = time_index % HOURS_PER_DAY;
        let day = day_of_year % DAYS_PER_YEAR;
        let (daily, annual, annual_cos) = cycles(hour, day);
        let (wind_mult, vibration_mult, thermal_mult) = weather.multipliers();
        let b = self.baseline;

        let wind = b.wind_speed
            * wind_mult
            * (1.0 + 0.3 * (2.0 * PI * hour as f64 / HOURS_PER_DAY as f64 + PI / 3.0).sin())
            * (1.0 + 0.15 * annual_cos);
        let wind_speed = self.jitter(wind, 0.25).max(0.0);

        let amplitude = b.vibration_amplitude * vibration_mult * (1.0 + 0.5 * daily.max(0.0));
        let vibration_amplitude = self.jitter(amplitude, 0.20).max(0.0);

        let vibration_frequency = self.jitter(30.0 + 10.0 * daily, 0.10).max(1.0);

        let ambient_temperature = self.jitter(b.temperature + 8.0 * annual + 5.0 * daily, 0.10);

        let gradient = (5.0 + 10.0 * daily.max(0.0)) * thermal_mult;
        let thermal_gradient = self.jitter(gradient, 0.20).max(0.0);

        let magnetic_field = self
            .jitter(b.magnetic_field * (1.0 + 0.3 * daily), 0.10)
            .max(0.0);

        let relative_velocity = self.jitter(1.5 + daily.abs(), 0.20).max(0.0);

        let concentration_ratio = self
            .jitter(1.5 + 0.5 * annual, 0.10)
            .max(MIN_CONCENTRATION_RATIO);

        EnvironmentSample {
            time_index,
            hour_of_day: hour,
            day_of_year: day,
            weather,
            wind_speed,
            vibration_amplitude,
            vibration_frequency,
            thermal_gradient,
            ambient_temperature,
            magnetic_field,
            relative_velocity,
            concentration_ratio,
        }
    }

    /// Adds uniform noise of up to `fraction` of the signal's magnitude.
    fn jitter(&mut self, value: f64, fraction: f64) -> f64 {
        let u: f64 = self.rng.random_range(-1.0..=1.0);
        value + value.abs() * fraction * u
    }
}

/// Returns `(daily, annual, annual_cos)` phase terms for an hour and day.
///
/// `daily` peaks at noon and bottoms out at midnight; `annual` peaks near
/// midsummer (day 171).
fn cycles(hour: usize, day: usize) -> (f64, f64, f64) {
    let daily = (2.0 * PI * (hour as f64 - 6.0) / HOURS_PER_DAY as f64).sin();
    let annual_angle = 2.0 * PI * (day as f64 - 80.0) / DAYS_PER_YEAR as f64;
    (daily, annual_angle.sin(), annual_angle.cos())
}
