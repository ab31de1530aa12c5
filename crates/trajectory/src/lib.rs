//! Discretized trajectories: fixed-count sampling of a propagated state and summary
//! statistics over the resulting points.

use chrono::{DateTime, Utc};
use iris_core::vector::{self, Vector3};
use iris_orbits::{KeplerSolver, Maneuver, PropagationError, StateVector, apply_maneuver};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Provenance tag for points produced by the universal-variable propagator.
pub const KEPLER_SOURCE: &str = "kepler_universal_variable";

/// One sampled state. Field names are the persisted wire names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub datetime: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub distance: f64,
    pub source: String,
}

impl TrajectoryPoint {
    /// Build a point from a state; `distance` is always the norm of the position.
    pub fn from_state(state: &StateVector, source: &str) -> Self {
        let [x, y, z] = state.position_km;
        let [vx, vy, vz] = state.velocity_km_s;
        Self {
            datetime: state.epoch,
            x,
            y,
            z,
            vx,
            vy,
            vz,
            distance: state.radius_km(),
            source: source.to_string(),
        }
    }

    pub fn position(&self) -> Vector3 {
        [self.x, self.y, self.z]
    }

    pub fn velocity(&self) -> Vector3 {
        [self.vx, self.vy, self.vz]
    }

    /// True when the stored distance agrees with the position norm to `relative_tolerance`.
    pub fn distance_is_consistent(&self, relative_tolerance: f64) -> bool {
        let expected = vector::norm(&self.position());
        let scale = expected.abs().max(1.0);
        self.distance.is_finite() && (self.distance - expected).abs() <= relative_tolerance * scale
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SampleError {
    #[error("invalid sampling input: {0}")]
    InvalidInput(String),
    #[error("propagation failed at point {index}: {source}")]
    Propagation {
        index: usize,
        #[source]
        source: PropagationError,
    },
    #[error("trajectory has no points")]
    Empty,
}

/// Samples a post-maneuver state at evenly spaced elapsed times.
#[derive(Debug, Clone)]
pub struct TrajectorySampler {
    solver: KeplerSolver,
    source: String,
}

impl Default for TrajectorySampler {
    fn default() -> Self {
        Self::new(KeplerSolver::default())
    }
}

impl TrajectorySampler {
    pub fn new(solver: KeplerSolver) -> Self {
        Self {
            solver,
            source: KEPLER_SOURCE.to_string(),
        }
    }

    /// Elapsed seconds of point `index` out of `num_points` spread over `total_duration_s`.
    pub fn elapsed_at(index: usize, num_points: usize, total_duration_s: f64) -> f64 {
        if num_points <= 1 {
            0.0
        } else {
            total_duration_s * index as f64 / (num_points - 1) as f64
        }
    }

    /// Produce `num_points` points from `elapsed = 0` to `elapsed = total_duration_s`
    /// inclusive. The maneuver, if any, is applied once before the first point.
    pub fn sample(
        &self,
        initial: &StateVector,
        maneuver: Option<&Maneuver>,
        mu_km3_s2: f64,
        total_duration_s: f64,
        num_points: usize,
    ) -> Result<Vec<TrajectoryPoint>, SampleError> {
        if num_points == 0 {
            return Err(SampleError::InvalidInput(
                "number of points must be at least 1".to_string(),
            ));
        }
        if !(total_duration_s.is_finite() && total_duration_s >= 0.0) {
            return Err(SampleError::InvalidInput(format!(
                "total duration must be finite and non-negative, got {total_duration_s}"
            )));
        }

        let start = match maneuver {
            Some(burn) => apply_maneuver(initial, burn),
            None => *initial,
        };

        let results: Vec<Result<TrajectoryPoint, SampleError>> = (0..num_points)
            .into_par_iter()
            .map(|index| {
                let elapsed = Self::elapsed_at(index, num_points, total_duration_s);
                self.solver
                    .propagate(&start, mu_km3_s2, elapsed)
                    .map(|state| TrajectoryPoint::from_state(&state, &self.source))
                    .map_err(|source| SampleError::Propagation { index, source })
            })
            .collect();

        // Ordered collect keeps index order, so the first error is the lowest index.
        let points = results.into_iter().collect::<Result<Vec<_>, _>>()?;
        debug!(
            points = points.len(),
            duration_s = total_duration_s,
            "sampled trajectory"
        );
        Ok(points)
    }
}

/// Sample with the default solver settings.
pub fn sample(
    initial: &StateVector,
    maneuver: Option<&Maneuver>,
    mu_km3_s2: f64,
    total_duration_s: f64,
    num_points: usize,
) -> Result<Vec<TrajectoryPoint>, SampleError> {
    TrajectorySampler::default().sample(initial, maneuver, mu_km3_s2, total_duration_s, num_points)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    fn of(values: impl Iterator<Item = f64>) -> Self {
        values.fold(
            Range {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |acc, v| Range {
                min: acc.min.min(v),
                max: acc.max.max(v),
            },
        )
    }
}

/// Aggregate view of a trajectory used in mission summaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryStats {
    pub x: Range,
    pub y: Range,
    pub z: Range,
    pub distance: Range,
    pub first_distance: f64,
    pub last_distance: f64,
}

impl TrajectoryStats {
    pub fn from_points(points: &[TrajectoryPoint]) -> Result<Self, SampleError> {
        let (first, last) = match (points.first(), points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(SampleError::Empty),
        };
        Ok(Self {
            x: Range::of(points.iter().map(|p| p.x)),
            y: Range::of(points.iter().map(|p| p.y)),
            z: Range::of(points.iter().map(|p| p.z)),
            distance: Range::of(points.iter().map(|p| p.distance)),
            first_distance: first.distance,
            last_distance: last.distance,
        })
    }
}
