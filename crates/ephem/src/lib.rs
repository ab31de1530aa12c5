//! Ephemeris lookups built on the catalog's mean orbital elements.
//!
//! The simulator only needs the heliocentric state of the departure body at the launch
//! epoch, so a two-body Keplerian model of the catalog elements is sufficient. Anything
//! richer (a SPICE kernel reader, a remote service) can sit behind the same [`Ephemeris`]
//! trait.

use chrono::{DateTime, Utc};
use iris_config::{BodyCatalog, BodyConfig, OrbitConfig};
use iris_core::constants::SECONDS_PER_DAY;
use iris_core::time::utc_to_julian_date;
use iris_orbits::elements::mean_motion;
use iris_orbits::{KeplerSolver, OrbitalElements, PropagationError, StateVector};
use thiserror::Error;

/// Errors surfaced while resolving a body state.
#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("body '{0}' is not in the catalog")]
    UnknownBody(String),
    #[error("body '{0}' has no orbit in the catalog")]
    NoOrbit(String),
    #[error("body '{body}' orbits '{parent}', not '{center}'")]
    WrongCenter {
        body: String,
        parent: String,
        center: String,
    },
    #[error("body '{0}' follows an unbound orbit; mean elements do not apply")]
    UnboundOrbit(String),
    #[error("central body '{0}' has no gravitational parameter")]
    MissingGravity(String),
    #[error("element conversion failed: {0}")]
    Elements(#[from] PropagationError),
}

/// Source of body states relative to a central body.
pub trait Ephemeris: Send + Sync {
    fn state_at(
        &self,
        body: &str,
        center: &str,
        epoch: DateTime<Utc>,
    ) -> Result<StateVector, EphemerisError>;
}

/// Normalize a catalog target name: trimmed, upper case, barycenter suffix removed.
pub fn normalize_body_name(name: &str) -> String {
    let upper = name.trim().to_ascii_uppercase();
    upper
        .strip_suffix(" BARYCENTER")
        .map(str::to_string)
        .unwrap_or(upper)
}

/// Two-body ephemeris advancing each body's mean anomaly from its element epoch.
#[derive(Debug, Clone)]
pub struct KeplerianEphemeris {
    catalog: BodyCatalog,
    solver: KeplerSolver,
}

impl KeplerianEphemeris {
    pub fn new(catalog: BodyCatalog) -> Self {
        Self {
            catalog,
            solver: KeplerSolver::default(),
        }
    }

    pub fn catalog(&self) -> &BodyCatalog {
        &self.catalog
    }

    fn lookup(&self, name: &str) -> Result<&BodyConfig, EphemerisError> {
        self.catalog
            .find(&normalize_body_name(name))
            .ok_or_else(|| EphemerisError::UnknownBody(name.to_string()))
    }

    fn elements_at(
        &self,
        body: &BodyConfig,
        orbit: &OrbitConfig,
        mu: f64,
        epoch: &DateTime<Utc>,
    ) -> Result<OrbitalElements, EphemerisError> {
        let unbound = || EphemerisError::UnboundOrbit(body.name.clone());
        let sma = orbit.semi_major_axis_km().ok_or_else(unbound)?;
        let n = mean_motion(sma, mu).ok_or_else(unbound)?;
        let elapsed_s = (utc_to_julian_date(epoch) - orbit.epoch_jd) * SECONDS_PER_DAY;
        let mean_anomaly = orbit.mean_anomaly_deg.to_radians() + n * elapsed_s;

        Ok(OrbitalElements::from_mean_anomaly(
            sma,
            orbit.eccentricity,
            orbit.inclination_deg.to_radians(),
            orbit.raan_deg.to_radians(),
            orbit.arg_periapsis_deg.to_radians(),
            mean_anomaly,
            &self.solver,
        )?)
    }
}

impl Ephemeris for KeplerianEphemeris {
    fn state_at(
        &self,
        body: &str,
        center: &str,
        epoch: DateTime<Utc>,
    ) -> Result<StateVector, EphemerisError> {
        let target = self.lookup(body)?;
        let central = self.lookup(center)?;
        let orbit = target
            .orbit
            .as_ref()
            .ok_or_else(|| EphemerisError::NoOrbit(target.name.clone()))?;

        let parent = self.lookup(&orbit.parent)?;
        if parent.name != central.name {
            return Err(EphemerisError::WrongCenter {
                body: target.name.clone(),
                parent: parent.name.clone(),
                center: central.name.clone(),
            });
        }
        if !(central.mu_km3_s2 > 0.0) {
            return Err(EphemerisError::MissingGravity(central.name.clone()));
        }

        let elements = self.elements_at(target, orbit, central.mu_km3_s2, &epoch)?;
        let (position_km, velocity_km_s) = elements.to_state_vectors(central.mu_km3_s2);
        Ok(StateVector::new(position_km, velocity_km_s, epoch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use iris_config::{BodyConfig, OrbitConfig};
    use iris_core::constants::AU_KM;

    fn catalog() -> BodyCatalog {
        let sun = BodyConfig {
            name: "SUN".to_string(),
            aliases: vec![],
            mu_km3_s2: 1.327_124_400_18e11,
            radius_km: 695_700.0,
            orbit: None,
        };
        let earth = BodyConfig {
            name: "EARTH".to_string(),
            aliases: vec!["TERRA".to_string()],
            mu_km3_s2: 398_600.4418,
            radius_km: 6_371.0,
            orbit: Some(OrbitConfig {
                parent: "SUN".to_string(),
                semi_major_axis_au: Some(1.000_002_61),
                periapsis_au: None,
                eccentricity: 0.016_711_23,
                inclination_deg: -0.000_015_31,
                raan_deg: 0.0,
                arg_periapsis_deg: 102.937_681_93,
                mean_anomaly_deg: -2.473_110_27,
                epoch_jd: 2_451_545.0,
            }),
        };
        let borisov = BodyConfig {
            name: "2I/BORISOV".to_string(),
            aliases: vec![],
            mu_km3_s2: 0.0,
            radius_km: 0.0,
            orbit: Some(OrbitConfig {
                parent: "SUN".to_string(),
                semi_major_axis_au: None,
                periapsis_au: Some(2.0066),
                eccentricity: 3.3565,
                inclination_deg: 44.05,
                raan_deg: 308.15,
                arg_periapsis_deg: 209.12,
                mean_anomaly_deg: 0.0,
                epoch_jd: 2_458_826.05,
            }),
        };
        BodyCatalog::new(vec![sun, earth, borisov])
    }

    #[test]
    fn earth_is_about_one_au_from_the_sun() {
        let ephemeris = KeplerianEphemeris::new(catalog());
        let epoch = Utc.with_ymd_and_hms(2026, 1, 3, 0, 0, 0).unwrap();
        let state = ephemeris.state_at("earth", "Sun", epoch).unwrap();
        let distance_au = state.radius_km() / AU_KM;
        assert!((0.98..=1.02).contains(&distance_au), "{distance_au}");
        assert!((28.0..=31.5).contains(&state.speed_km_s()));
        assert_eq!(state.epoch, epoch);
        // Perihelion falls in early January.
        assert!(distance_au < 0.99);
    }

    #[test]
    fn barycenter_names_and_aliases_resolve() {
        let ephemeris = KeplerianEphemeris::new(catalog());
        let epoch = Utc.with_ymd_and_hms(2026, 7, 4, 0, 0, 0).unwrap();
        let a = ephemeris.state_at("EARTH BARYCENTER", "SUN", epoch).unwrap();
        let b = ephemeris.state_at("terra", "SUN", epoch).unwrap();
        assert_eq!(a, b);
        assert_eq!(normalize_body_name(" mars barycenter "), "MARS");
    }

    #[test]
    fn lookup_failures_are_typed() {
        let ephemeris = KeplerianEphemeris::new(catalog());
        let epoch = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            ephemeris.state_at("VULCAN", "SUN", epoch),
            Err(EphemerisError::UnknownBody(_))
        ));
        assert!(matches!(
            ephemeris.state_at("SUN", "SUN", epoch),
            Err(EphemerisError::NoOrbit(_))
        ));
        assert!(matches!(
            ephemeris.state_at("2I/Borisov", "SUN", epoch),
            Err(EphemerisError::UnboundOrbit(_))
        ));
        assert!(matches!(
            ephemeris.state_at("SUN", "EARTH", epoch).unwrap_err(),
            EphemerisError::NoOrbit(_)
        ));
    }
}
