//! Installation site and the one-shot geographic adjustment applied at construction.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::devices::HarvesterSet;
use crate::environment::EnvironmentBaseline;

/// Where an installation sits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Location {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    pub name: String,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            lat: 51.5,
            lon: -0.12,
            name: "Default Site".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilComposition {
    pub ph: f64,
    /// Electrical conductivity (S/m).
    pub conductivity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearbyInfrastructure {
    pub power_lines: bool,
    pub major_roads: bool,
    pub buildings: bool,
    pub industrial_activity: bool,
}

/// Site characteristics returned by a [`GeographicDataSource`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicData {
    /// Mean wind speed (m/s).
    pub average_wind_speed: f64,
    /// Mean air temperature (°C).
    pub average_temperature: f64,
    /// Mean irradiance (W/m²).
    pub average_solar_radiation: f64,
    /// Magnetic declination (degrees).
    pub magnetic_declination: f64,
    pub soil_composition: SoilComposition,
    pub nearby_infrastructure: NearbyInfrastructure,
}

/// Supplies site characteristics for a location.
///
/// Consulted once while an installation is built; never on a schedule.
pub trait GeographicDataSource {
    fn lookup(&self, location: &Location) -> GeographicData;
}

/// A source that returns the same record for every location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticGeographicData(pub GeographicData);

impl Default for StaticGeographicData {
    fn default() -> Self {
        Self(GeographicData {
            average_wind_speed: 5.5,
            average_temperature: 12.0,
            average_solar_radiation: 150.0,
            magnetic_declination: -3.5,
            soil_composition: SoilComposition {
                ph: 6.5,
                conductivity: 0.02,
            },
            nearby_infrastructure: NearbyInfrastructure {
                power_lines: true,
                major_roads: true,
                buildings: true,
                industrial_activity: false,
            },
        })
    }
}

impl GeographicDataSource for StaticGeographicData {
    fn lookup(&self, _location: &Location) -> GeographicData {
        self.0
    }
}

/// Scales harvester efficiencies to suit the site.
///
/// Windy sites (> 6 m/s) boost kinetic efficiency by 20%, sheltered ones
/// (< 3 m/s) cut it by 30%, and road traffic adds another 10%. Power lines
/// boost electromagnetic efficiency by 50%. Industrial activity and buildings
/// raise the thermal scale by 30% and 10%. Soil pH away from neutral improves
/// the chemical cell. Efficiencies are clamped to at most 1 afterwards.
pub fn adjust_for_site(harvesters: &mut HarvesterSet, geo: &GeographicData) {
    let infra = &geo.nearby_infrastructure;

    let kinetic = &mut harvesters.kinetic;
    if geo.average_wind_speed > 6.0 {
        kinetic.efficiency *= 1.2;
    } else if geo.average_wind_speed < 3.0 {
        kinetic.efficiency *= 0.7;
    }
    if infra.major_roads {
        kinetic.efficiency *= 1.1;
    }

    if infra.power_lines {
        harvesters.electromagnetic.efficiency *= 1.5;
    }

    if infra.industrial_activity {
        harvesters.thermal.efficiency_scale *= 1.3;
    }
    if infra.buildings {
        harvesters.thermal.efficiency_scale *= 1.1;
    }

    harvesters.chemical.efficiency *= 1.0 + 0.1 * (geo.soil_composition.ph - 7.0).abs();

    harvesters.kinetic.efficiency = harvesters.kinetic.efficiency.min(1.0);
    harvesters.electromagnetic.efficiency = harvesters.electromagnetic.efficiency.min(1.0);
    harvesters.chemical.efficiency = harvesters.chemical.efficiency.min(1.0);

    debug!(
        kinetic = harvesters.kinetic.efficiency,
        thermal_scale = harvesters.thermal.efficiency_scale,
        em = harvesters.electromagnetic.efficiency,
        chemical = harvesters.chemical.efficiency,
        "site-adjusted efficiencies"
    );
}

impl EnvironmentBaseline {
    /// Derives mean environmental levels from site data.
    pub fn from_geography(geo: &GeographicData) -> Self {
        let defaults = Self::default();
        let infra = &geo.nearby_infrastructure;
        Self {
            wind_speed: geo.average_wind_speed.max(0.0),
            temperature: geo.average_temperature,
            magnetic_field: if infra.power_lines {
                2e-4
            } else {
                defaults.magnetic_field
            },
            vibration_amplitude: if infra.major_roads {
                defaults.vibration_amplitude * 1.5
            } else {
                defaults.vibration_amplitude
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo(wind: f64, ph: f64, infra: NearbyInfrastructure) -> GeographicData {
        GeographicData {
            average_wind_speed: wind,
            soil_composition: SoilComposition {
                ph,
                conductivity: 0.02,
            },
            nearby_infrastructure: infra,
            ..StaticGeographicData::default().0
        }
    }

    const NONE: NearbyInfrastructure = NearbyInfrastructure {
        power_lines: false,
        major_roads: false,
        buildings: false,
        industrial_activity: false,
    };

    #[test]
    fn static_source_ignores_location() {
        let source = StaticGeographicData::default();
        let a = source.lookup(&Location::default());
        let b = source.lookup(&Location {
            lat: -33.9,
            lon: 151.2,
            name: "Elsewhere".into(),
        });
        assert_eq!(a, b);
        assert_eq!(a.average_wind_speed, 5.5);
    }

    #[test]
    fn neutral_site_leaves_efficiencies_alone() {
        let mut set = HarvesterSet::default();
        adjust_for_site(&mut set, &geo(4.0, 7.0, NONE));
        assert_eq!(set, HarvesterSet::default());
    }

    #[test]
    fn windy_site_with_roads_boosts_kinetic() {
        let mut set = HarvesterSet::default();
        let infra = NearbyInfrastructure {
            major_roads: true,
            ..NONE
        };
        adjust_for_site(&mut set, &geo(7.0, 7.0, infra));
        assert!((set.kinetic.efficiency - 0.35 * 1.2 * 1.1).abs() < 1e-12);
    }

    #[test]
    fn sheltered_site_cuts_kinetic() {
        let mut set = HarvesterSet::default();
        adjust_for_site(&mut set, &geo(2.0, 7.0, NONE));
        assert!((set.kinetic.efficiency - 0.35 * 0.7).abs() < 1e-12);
    }

    #[test]
    fn efficiencies_are_clamped_to_one() {
        let mut set = HarvesterSet::default();
        set.electromagnetic.efficiency = 0.9;
        set.chemical.efficiency = 0.95;
        let infra = NearbyInfrastructure {
            power_lines: true,
            ..NONE
        };
        adjust_for_site(&mut set, &geo(4.0, 2.0, infra));
        assert_eq!(set.electromagnetic.efficiency, 1.0);
        assert_eq!(set.chemical.efficiency, 1.0);
    }

    #[test]
    fn thermal_scale_compounds_infrastructure() {
        let mut set = HarvesterSet::default();
        let infra = NearbyInfrastructure {
            buildings: true,
            industrial_activity: true,
            ..NONE
        };
        adjust_for_site(&mut set, &geo(4.0, 7.0, infra));
        assert!((set.thermal.efficiency_scale - 1.43).abs() < 1e-12);
    }

    #[test]
    fn baseline_from_geography() {
        let data = StaticGeographicData::default().0;
        let baseline = EnvironmentBaseline::from_geography(&data);
        assert_eq!(baseline.wind_speed, 5.5);
        assert_eq!(baseline.temperature, 12.0);
        assert_eq!(baseline.magnetic_field, 2e-4);
        assert!((baseline.vibration_amplitude - 7.5e-4).abs() < 1e-15);

        let quiet = EnvironmentBaseline::from_geography(&geo(3.0, 7.0, NONE));
        assert_eq!(quiet.magnetic_field, EnvironmentBaseline::default().magnetic_field);
    }
}
