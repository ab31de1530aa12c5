//! Input checks performed before any numerical work.

use chrono::{DateTime, Utc};
use iris_config::{BodyCatalog, BodyConfig, OrbitConfig};
use iris_core::time::julian_date_to_utc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("unknown body '{0}'")]
    UnknownBody(String),
    #[error("body '{body}' has no orbit about '{center}'")]
    NoHeliocentricOrbit { body: String, center: String },
    #[error("swarm size must be positive (got {0})")]
    NonPositiveSwarm(i64),
    #[error("invalid epoch: Julian date {0} is not representable")]
    InvalidEpoch(f64),
    #[error("unknown propulsion type '{name}' (known: {known})")]
    UnknownPropulsion { name: String, known: String },
    #[error("role split must not be empty")]
    EmptyRoleSplit,
    #[error("point count must be at least 1 (got {0})")]
    NonPositivePointCount(i64),
    #[error("duration must be finite and non-negative (got {0} s)")]
    NegativeDuration(f64),
    #[error("altitude must be finite and non-negative (got {0} km)")]
    InvalidAltitude(f64),
    #[error("orbit tracks are available for earth, mars and sun (got '{0}')")]
    UnsupportedTrackBody(String),
}

pub fn validate_point_count(count: i64) -> Result<usize, ValidationError> {
    if count < 1 {
        return Err(ValidationError::NonPositivePointCount(count));
    }
    usize::try_from(count).map_err(|_| ValidationError::NonPositivePointCount(count))
}

pub fn validate_swarm_size(size: i64) -> Result<u32, ValidationError> {
    u32::try_from(size)
        .ok()
        .filter(|size| *size > 0)
        .ok_or(ValidationError::NonPositiveSwarm(size))
}

pub fn validate_epoch(julian_date: f64) -> Result<DateTime<Utc>, ValidationError> {
    julian_date_to_utc(julian_date).ok_or(ValidationError::InvalidEpoch(julian_date))
}

pub fn validate_duration(seconds: f64) -> Result<f64, ValidationError> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(seconds)
    } else {
        Err(ValidationError::NegativeDuration(seconds))
    }
}

pub fn lookup_body<'a>(catalog: &'a BodyCatalog, name: &str) -> Result<&'a BodyConfig, ValidationError> {
    catalog
        .find(&iris_ephem::normalize_body_name(name))
        .ok_or_else(|| ValidationError::UnknownBody(name.trim().to_string()))
}

/// Resolve a target that orbits `center` directly and has a usable reference radius.
pub fn lookup_target<'a>(
    catalog: &'a BodyCatalog,
    name: &str,
    center: &BodyConfig,
) -> Result<(&'a BodyConfig, &'a OrbitConfig), ValidationError> {
    let body = lookup_body(catalog, name)?;
    let no_orbit = || ValidationError::NoHeliocentricOrbit {
        body: body.name.clone(),
        center: center.name.clone(),
    };
    let orbit = body.orbit.as_ref().ok_or_else(no_orbit)?;
    let parent = catalog.find(&orbit.parent).ok_or_else(no_orbit)?;
    if parent.name != center.name || orbit.reference_radius_km().is_none() {
        return Err(no_orbit());
    }
    Ok((body, orbit))
}
