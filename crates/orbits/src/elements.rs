//! Classical orbital elements and their conversion to and from state vectors.

use std::f64::consts::TAU;

use iris_core::vector::{self, Vector3};

use crate::{KeplerSolver, PropagationError};

/// Classical Keplerian elements. Angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    /// Negative for hyperbolic orbits.
    pub semi_major_axis_km: f64,
    pub eccentricity: f64,
    pub inclination_rad: f64,
    pub raan_rad: f64,
    pub arg_periapsis_rad: f64,
    pub true_anomaly_rad: f64,
}

impl OrbitalElements {
    /// Position (km) and velocity (km/s) in the reference frame of the elements.
    pub fn to_state_vectors(&self, mu: f64) -> (Vector3, Vector3) {
        let p = self.semi_major_axis_km * (1.0 - self.eccentricity * self.eccentricity);
        let (sin_nu, cos_nu) = self.true_anomaly_rad.sin_cos();
        let r = p / (1.0 + self.eccentricity * cos_nu);

        let r_pqw = [r * cos_nu, r * sin_nu, 0.0];
        let sqrt_mu_p = (mu / p).sqrt();
        let v_pqw = [-sqrt_mu_p * sin_nu, sqrt_mu_p * (self.eccentricity + cos_nu), 0.0];

        (self.perifocal_to_inertial(&r_pqw), self.perifocal_to_inertial(&v_pqw))
    }

    /// Recover elements from a state vector. Circular and equatorial cases collapse the
    /// undefined angles to zero and fold them into the true anomaly.
    pub fn from_state_vectors(
        position_km: &Vector3,
        velocity_km_s: &Vector3,
        mu: f64,
    ) -> Result<Self, PropagationError> {
        let r = vector::norm(position_km);
        let v = vector::norm(velocity_km_s);
        let h = vector::cross(position_km, velocity_km_s);
        let h_mag = vector::norm(&h);
        if r == 0.0 || h_mag <= 1e-10 * r * v.max(f64::MIN_POSITIVE) {
            return Err(PropagationError::DegenerateOrbit(
                "angular momentum is numerically zero".to_string(),
            ));
        }

        let node = [-h[1], h[0], 0.0];
        let node_mag = vector::norm(&node);
        let rdotv = vector::dot(position_km, velocity_km_s);
        let e_vec = vector::scale(
            &vector::sub(
                &vector::scale(position_km, v * v - mu / r),
                &vector::scale(velocity_km_s, rdotv),
            ),
            1.0 / mu,
        );
        let ecc = vector::norm(&e_vec);
        let energy = 0.5 * v * v - mu / r;
        let sma = -mu / (2.0 * energy);

        let inclination = (h[2] / h_mag).clamp(-1.0, 1.0).acos();
        let raan = if node_mag > 1e-10 {
            let angle = (node[0] / node_mag).clamp(-1.0, 1.0).acos();
            if node[1] < 0.0 { TAU - angle } else { angle }
        } else {
            0.0
        };

        let reference = if ecc > 1e-10 {
            e_vec
        } else if node_mag > 1e-10 {
            node
        } else {
            [1.0, 0.0, 0.0]
        };
        let reference_mag = vector::norm(&reference);

        let arg_periapsis = if ecc > 1e-10 && node_mag > 1e-10 {
            let angle = (vector::dot(&node, &e_vec) / (node_mag * ecc))
                .clamp(-1.0, 1.0)
                .acos();
            if e_vec[2] < 0.0 { TAU - angle } else { angle }
        } else if ecc > 1e-10 {
            let angle = e_vec[1].atan2(e_vec[0]);
            if h[2] < 0.0 { (TAU - angle).rem_euclid(TAU) } else { angle.rem_euclid(TAU) }
        } else {
            0.0
        };

        let cos_nu = (vector::dot(&reference, position_km) / (reference_mag * r)).clamp(-1.0, 1.0);
        let mut true_anomaly = cos_nu.acos();
        let outbound = if ecc > 1e-10 {
            rdotv >= 0.0
        } else {
            vector::dot(&vector::cross(&reference, position_km), &h) >= 0.0
        };
        if !outbound {
            true_anomaly = TAU - true_anomaly;
        }

        Ok(Self {
            semi_major_axis_km: sma,
            eccentricity: ecc,
            inclination_rad: inclination,
            raan_rad: raan,
            arg_periapsis_rad: arg_periapsis,
            true_anomaly_rad: true_anomaly,
        })
    }

    /// Build elements for a bound orbit from a mean anomaly.
    pub fn from_mean_anomaly(
        semi_major_axis_km: f64,
        eccentricity: f64,
        inclination_rad: f64,
        raan_rad: f64,
        arg_periapsis_rad: f64,
        mean_anomaly_rad: f64,
        solver: &KeplerSolver,
    ) -> Result<Self, PropagationError> {
        let true_anomaly = mean_to_true_anomaly(mean_anomaly_rad, eccentricity, solver)?;
        Ok(Self {
            semi_major_axis_km,
            eccentricity,
            inclination_rad,
            raan_rad,
            arg_periapsis_rad,
            true_anomaly_rad: true_anomaly,
        })
    }

    fn perifocal_to_inertial(&self, v: &Vector3) -> Vector3 {
        let (sin_raan, cos_raan) = self.raan_rad.sin_cos();
        let (sin_argp, cos_argp) = self.arg_periapsis_rad.sin_cos();
        let (sin_inc, cos_inc) = self.inclination_rad.sin_cos();
        [
            (cos_raan * cos_argp - sin_raan * sin_argp * cos_inc) * v[0]
                + (-cos_raan * sin_argp - sin_raan * cos_argp * cos_inc) * v[1],
            (sin_raan * cos_argp + cos_raan * sin_argp * cos_inc) * v[0]
                + (-sin_raan * sin_argp + cos_raan * cos_argp * cos_inc) * v[1],
            (sin_argp * sin_inc) * v[0] + (cos_argp * sin_inc) * v[1],
        ]
    }
}

/// Mean motion in rad/s; `None` unless the semi-major axis and `mu` are positive.
pub fn mean_motion(semi_major_axis_km: f64, mu: f64) -> Option<f64> {
    (semi_major_axis_km > 0.0 && mu > 0.0 && semi_major_axis_km.is_finite())
        .then(|| (mu / semi_major_axis_km.powi(3)).sqrt())
}

/// Solve Kepler's equation `M = E - e sin E` and return the true anomaly in `[0, 2π)`.
pub fn mean_to_true_anomaly(
    mean_anomaly_rad: f64,
    eccentricity: f64,
    solver: &KeplerSolver,
) -> Result<f64, PropagationError> {
    if !(0.0..1.0).contains(&eccentricity) || !mean_anomaly_rad.is_finite() {
        return Err(PropagationError::DegenerateOrbit(format!(
            "mean anomaly requires a bound orbit (e = {eccentricity})"
        )));
    }
    let m = mean_anomaly_rad.rem_euclid(TAU);
    let mut ea = if eccentricity < 0.8 { m } else { std::f64::consts::PI };
    let mut converged = false;
    let mut last_step = f64::INFINITY;
    for _ in 0..solver.max_iterations {
        let f = ea - eccentricity * ea.sin() - m;
        let fp = 1.0 - eccentricity * ea.cos();
        let delta = f / fp;
        ea -= delta;
        last_step = delta.abs();
        if last_step < solver.tolerance {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(PropagationError::NonConvergence {
            iterations: solver.max_iterations,
            last_step,
        });
    }

    let half = 0.5 * ea;
    let nu = 2.0
        * ((1.0 + eccentricity).sqrt() * half.sin()).atan2((1.0 - eccentricity).sqrt() * half.cos());
    Ok(nu.rem_euclid(TAU))
}
