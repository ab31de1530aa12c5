//! Two-body orbit propagation: state vectors, impulsive maneuvers, and a universal-variable
//! Kepler solver that works for elliptical, parabolic, and hyperbolic motion.

use chrono::{DateTime, Utc};
use iris_core::vector::{self, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod elements;
pub mod kepler;

pub use elements::OrbitalElements;
pub use kepler::KeplerSolver;

/// Position and velocity about a single central body at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub position_km: Vector3,
    pub velocity_km_s: Vector3,
    pub epoch: DateTime<Utc>,
}

impl StateVector {
    pub fn new(position_km: Vector3, velocity_km_s: Vector3, epoch: DateTime<Utc>) -> Self {
        Self {
            position_km,
            velocity_km_s,
            epoch,
        }
    }

    /// Distance from the central body.
    pub fn radius_km(&self) -> f64 {
        vector::norm(&self.position_km)
    }

    pub fn speed_km_s(&self) -> f64 {
        vector::norm(&self.velocity_km_s)
    }
}

/// Instantaneous velocity change applied at `epoch`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    pub delta_v_km_s: Vector3,
    pub epoch: DateTime<Utc>,
}

impl Maneuver {
    pub fn impulse(delta_v_km_s: Vector3, epoch: DateTime<Utc>) -> Self {
        Self {
            delta_v_km_s,
            epoch,
        }
    }

    /// Burn of `magnitude_km_s` along the current velocity direction (negative = retrograde).
    pub fn along_velocity(state: &StateVector, magnitude_km_s: f64) -> Option<Self> {
        let direction = vector::unit(&state.velocity_km_s)?;
        Some(Self::impulse(
            vector::scale(&direction, magnitude_km_s),
            state.epoch,
        ))
    }

    pub fn magnitude_km_s(&self) -> f64 {
        vector::norm(&self.delta_v_km_s)
    }
}

/// Failures of the numerical propagation. Callers must surface these, never default them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PropagationError {
    #[error("degenerate orbit: {0}")]
    DegenerateOrbit(String),
    #[error("Kepler solver did not converge after {iterations} iterations (last step {last_step:e})")]
    NonConvergence { iterations: usize, last_step: f64 },
    #[error("propagated epoch is outside the representable range")]
    EpochOutOfRange,
}

/// Apply an impulsive maneuver: same position and epoch, velocity plus delta.
pub fn apply_maneuver(state: &StateVector, maneuver: &Maneuver) -> StateVector {
    StateVector {
        position_km: state.position_km,
        velocity_km_s: vector::add(&state.velocity_km_s, &maneuver.delta_v_km_s),
        epoch: state.epoch,
    }
}

/// Propagate `state` by `elapsed_s` seconds about a body with parameter `mu_km3_s2`,
/// using the default solver tolerance and iteration budget.
pub fn propagate(
    state: &StateVector,
    mu_km3_s2: f64,
    elapsed_s: f64,
) -> Result<StateVector, PropagationError> {
    KeplerSolver::default().propagate(state, mu_km3_s2, elapsed_s)
}

/// Circular orbit of radius `radius_km` in the reference x-y plane, starting on the +x axis.
pub fn circular_state(mu_km3_s2: f64, radius_km: f64, epoch: DateTime<Utc>) -> StateVector {
    let speed = (mu_km3_s2 / radius_km).sqrt();
    StateVector::new([radius_km, 0.0, 0.0], [0.0, speed, 0.0], epoch)
}

/// Orbital period in seconds for bound states; `None` for parabolic or hyperbolic motion.
pub fn orbital_period(state: &StateVector, mu_km3_s2: f64) -> Option<f64> {
    let r = state.radius_km();
    let v2 = vector::dot(&state.velocity_km_s, &state.velocity_km_s);
    let alpha = 2.0 / r - v2 / mu_km3_s2;
    (alpha > 0.0 && alpha.is_finite()).then(|| kepler::bound_period(alpha, mu_km3_s2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const MU_EARTH: f64 = 398_600.4418;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn maneuver_changes_velocity_only() {
        let state = circular_state(MU_EARTH, 7_000.0, epoch());
        let burn = Maneuver::impulse([0.0, 0.5, -0.1], epoch());
        let after = apply_maneuver(&state, &burn);
        assert_eq!(after.position_km, state.position_km);
        assert_eq!(after.epoch, state.epoch);
        assert!((after.velocity_km_s[1] - state.velocity_km_s[1] - 0.5).abs() < 1e-15);
        assert!((after.velocity_km_s[2] + 0.1).abs() < 1e-15);
    }

    #[test]
    fn prograde_burn_points_along_velocity() {
        let state = circular_state(MU_EARTH, 7_000.0, epoch());
        let burn = Maneuver::along_velocity(&state, -0.25).unwrap();
        assert!((burn.delta_v_km_s[1] + 0.25).abs() < 1e-15);
        assert!((burn.magnitude_km_s() - 0.25).abs() < 1e-15);
    }

    #[test]
    fn circular_period_matches_kepler_third_law() {
        let r = 6_871.0;
        let state = circular_state(MU_EARTH, r, epoch());
        let period = orbital_period(&state, MU_EARTH).unwrap();
        let expected = 2.0 * std::f64::consts::PI * (r.powi(3) / MU_EARTH).sqrt();
        assert!((period - expected).abs() / expected < 1e-12);
    }

    #[test]
    fn escape_state_has_no_period() {
        let mut state = circular_state(MU_EARTH, 7_000.0, epoch());
        state.velocity_km_s[1] *= 1.5;
        assert!(orbital_period(&state, MU_EARTH).is_none());
    }
}
