//! Circular reference orbits for display: one full revolution around a chosen body.

use std::str::FromStr;

use iris_config::BodyCatalog;
use iris_core::constants::{AU_KM, JD_J2000};
use iris_orbits::{PropagationError, circular_state, orbital_period};
use iris_trajectory::{TrajectoryPoint, TrajectorySampler};

use crate::SimulationError;
use crate::validate::{ValidationError, lookup_body, validate_epoch, validate_point_count};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackBody {
    Earth,
    Mars,
    /// Heliocentric track at 1 AU; the altitude argument does not apply.
    Sun,
}

impl TrackBody {
    fn catalog_name(self) -> &'static str {
        match self {
            TrackBody::Earth => "EARTH",
            TrackBody::Mars => "MARS",
            TrackBody::Sun => "SUN",
        }
    }
}

impl FromStr for TrackBody {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "earth" => Ok(TrackBody::Earth),
            "mars" => Ok(TrackBody::Mars),
            "sun" => Ok(TrackBody::Sun),
            _ => Err(ValidationError::UnsupportedTrackBody(s.to_string())),
        }
    }
}

pub(crate) fn orbit_track(
    catalog: &BodyCatalog,
    sampler: &TrajectorySampler,
    body: &str,
    altitude_km: f64,
    points: i64,
) -> Result<Vec<TrajectoryPoint>, SimulationError> {
    let which: TrackBody = body.parse()?;
    let points = validate_point_count(points)?;
    let config = lookup_body(catalog, which.catalog_name())?;

    let radius_km = match which {
        TrackBody::Sun => AU_KM,
        TrackBody::Earth | TrackBody::Mars => {
            if !(altitude_km.is_finite() && altitude_km >= 0.0) {
                return Err(ValidationError::InvalidAltitude(altitude_km).into());
            }
            config.radius_km + altitude_km
        }
    };

    let epoch = validate_epoch(JD_J2000)?;
    let state = circular_state(config.mu_km3_s2, radius_km, epoch);
    let period = orbital_period(&state, config.mu_km3_s2).ok_or_else(|| {
        PropagationError::DegenerateOrbit(format!("{} has no bound circular orbit", config.name))
    })?;
    Ok(sampler.sample(&state, None, config.mu_km3_s2, period, points)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use iris_config::BodyConfig;

    fn catalog() -> BodyCatalog {
        let body = |name: &str, mu: f64, radius: f64| BodyConfig {
            name: name.to_string(),
            aliases: vec![],
            mu_km3_s2: mu,
            radius_km: radius,
            orbit: None,
        };
        BodyCatalog::new(vec![
            body("SUN", 1.327_124_400_18e11, 695_700.0),
            body("EARTH", 398_600.4418, 6_371.0),
            body("MARS", 42_828.37, 3_389.5),
        ])
    }

    #[test]
    fn earth_track_closes_on_itself() {
        let track = orbit_track(&catalog(), &TrajectorySampler::default(), "earth", 500.0, 200)
            .unwrap();
        assert_eq!(track.len(), 200);
        let first = track.first().unwrap();
        let last = track.last().unwrap();
        assert!((first.distance - 6_871.0).abs() < 1e-6);
        assert!((last.distance - first.distance).abs() < 1e-6);
        assert!((last.x - first.x).abs() < 1e-3 && (last.y - first.y).abs() < 1e-3);
    }

    #[test]
    fn sun_track_sits_at_one_au() {
        let track =
            orbit_track(&catalog(), &TrajectorySampler::default(), "Sun", 12_345.0, 10).unwrap();
        for point in &track {
            assert!((point.distance - AU_KM).abs() / AU_KM < 1e-8);
        }
    }

    #[test]
    fn unsupported_inputs_are_validation_errors() {
        let sampler = TrajectorySampler::default();
        for (body, alt, points) in [("pluto", 500.0, 10), ("mars", -1.0, 10), ("earth", 500.0, 0)] {
            let err = orbit_track(&catalog(), &sampler, body, alt, points).unwrap_err();
            assert!(matches!(err, SimulationError::Validation(_)), "{body}: {err:?}");
        }
    }
}
