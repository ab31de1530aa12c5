//! Universal-variable solution of Kepler's problem with Lagrange f/g coefficients.

use iris_core::time::offset_epoch;
use iris_core::vector::{self, Vector3};

use crate::{PropagationError, StateVector};

/// Relative threshold on `alpha * r0` separating elliptic, parabolic and hyperbolic cases.
const CONIC_EPS: f64 = 1e-10;
/// Angular momentum below this fraction of `|r| |v|` is treated as rectilinear motion.
const MOMENTUM_EPS: f64 = 1e-10;

/// Iteration settings for the universal Kepler equation.
///
/// `tolerance` is measured on the anomaly scale: the change in eccentric (or hyperbolic)
/// anomaly per Newton step for conic orbits, and `chi / sqrt(r0)` near the parabolic limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolver {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for KeplerSolver {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 64,
        }
    }
}

impl KeplerSolver {
    /// Propagate `state` by `elapsed_s` seconds under two-body gravity.
    ///
    /// `elapsed_s == 0` returns the input unchanged. Bound orbits are reduced modulo one
    /// period before solving, so whole-period propagation reproduces the initial state.
    pub fn propagate(
        &self,
        state: &StateVector,
        mu: f64,
        elapsed_s: f64,
    ) -> Result<StateVector, PropagationError> {
        if !(mu.is_finite() && mu > 0.0) {
            return Err(PropagationError::DegenerateOrbit(format!(
                "gravitational parameter must be positive, got {mu}"
            )));
        }
        if !elapsed_s.is_finite() {
            return Err(PropagationError::DegenerateOrbit(
                "elapsed time is not finite".to_string(),
            ));
        }
        if !(vector::is_finite(&state.position_km) && vector::is_finite(&state.velocity_km_s)) {
            return Err(PropagationError::DegenerateOrbit(
                "state vector has non-finite components".to_string(),
            ));
        }
        if elapsed_s == 0.0 {
            return Ok(*state);
        }

        let r0 = state.position_km;
        let v0 = state.velocity_km_s;
        let r0_mag = vector::norm(&r0);
        let v0_mag = vector::norm(&v0);
        if r0_mag == 0.0 {
            return Err(PropagationError::DegenerateOrbit(
                "position is at the centre of the attracting body".to_string(),
            ));
        }
        let h = vector::norm(&vector::cross(&r0, &v0));
        if h <= MOMENTUM_EPS * r0_mag * v0_mag.max((mu / r0_mag).sqrt()) {
            return Err(PropagationError::DegenerateOrbit(format!(
                "angular momentum is numerically zero (|h| = {h:e} km^2/s)"
            )));
        }

        let epoch =
            offset_epoch(&state.epoch, elapsed_s).ok_or(PropagationError::EpochOutOfRange)?;

        let sqrt_mu = mu.sqrt();
        let rdotv = vector::dot(&r0, &v0);
        let alpha = 2.0 / r0_mag - v0_mag * v0_mag / mu;
        let conic = Conic::classify(alpha, r0_mag);

        let dt = match conic {
            Conic::Elliptic => elapsed_s.rem_euclid(bound_period(alpha, mu)),
            _ => elapsed_s,
        };
        if dt == 0.0 {
            return Ok(StateVector::new(r0, v0, epoch));
        }

        let problem = UniversalKepler {
            r0_mag,
            rdotv_over_sqrt_mu: rdotv / sqrt_mu,
            alpha,
            sqrt_mu,
            dt,
        };
        let chi = self.solve(&problem, conic)?;

        let chi2 = chi * chi;
        let psi = alpha * chi2;
        let (c2, c3) = stumpff(psi);
        let r_mag = problem.radius(chi, c2, c3);

        let f = 1.0 - chi2 / r0_mag * c2;
        let g = dt - chi2 * chi / sqrt_mu * c3;
        let f_dot = sqrt_mu / (r_mag * r0_mag) * chi * (psi * c3 - 1.0);
        let g_dot = 1.0 - chi2 / r_mag * c2;

        let position = combine(f, &r0, g, &v0);
        let velocity = combine(f_dot, &r0, g_dot, &v0);
        Ok(StateVector::new(position, velocity, epoch))
    }

    fn solve(&self, problem: &UniversalKepler, conic: Conic) -> Result<f64, PropagationError> {
        let scale = match conic {
            Conic::Elliptic | Conic::Hyperbolic => problem.alpha.abs().sqrt(),
            Conic::Parabolic => 1.0 / problem.r0_mag.sqrt(),
        };

        // f(chi) is strictly increasing (df/dchi = r > 0); for bound orbits the root lies
        // in one anomaly revolution because dt was reduced modulo the period.
        let (mut lower, mut upper) = match conic {
            Conic::Elliptic => (0.0, 2.0 * std::f64::consts::PI / scale),
            _ => (f64::NEG_INFINITY, f64::INFINITY),
        };

        let mut chi = problem.initial_guess(conic);
        let mut last_step = f64::INFINITY;
        for _ in 0..self.max_iterations {
            let chi2 = chi * chi;
            let (c2, c3) = stumpff(problem.alpha * chi2);
            let r = problem.radius(chi, c2, c3);
            let f = problem.residual(chi, c2, c3);

            if f == 0.0 {
                return Ok(chi);
            }
            if f < 0.0 {
                lower = lower.max(chi);
            } else {
                upper = upper.min(chi);
            }

            let newton = chi - f / r;
            let next = if r.is_finite() && r > 0.0 && newton > lower && newton < upper {
                newton
            } else if lower.is_finite() && upper.is_finite() {
                0.5 * (lower + upper)
            } else if newton.is_finite() {
                newton
            } else {
                break;
            };

            last_step = (next - chi).abs();
            chi = next;
            if last_step * scale < self.tolerance {
                return Ok(chi);
            }
        }

        Err(PropagationError::NonConvergence {
            iterations: self.max_iterations,
            last_step: last_step * scale,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conic {
    Elliptic,
    Parabolic,
    Hyperbolic,
}

impl Conic {
    fn classify(alpha: f64, r0_mag: f64) -> Self {
        let x = alpha * r0_mag;
        if x > CONIC_EPS {
            Conic::Elliptic
        } else if x < -CONIC_EPS {
            Conic::Hyperbolic
        } else {
            Conic::Parabolic
        }
    }
}

struct UniversalKepler {
    r0_mag: f64,
    rdotv_over_sqrt_mu: f64,
    alpha: f64,
    sqrt_mu: f64,
    dt: f64,
}

impl UniversalKepler {
    fn initial_guess(&self, conic: Conic) -> f64 {
        let fallback = self.sqrt_mu * self.dt / self.r0_mag;
        match conic {
            Conic::Elliptic => self.sqrt_mu * self.dt * self.alpha,
            Conic::Hyperbolic => {
                let a = 1.0 / self.alpha;
                let sign = self.dt.signum();
                let numerator = -2.0 * self.sqrt_mu * self.sqrt_mu * self.alpha * self.dt;
                let denominator = self.rdotv_over_sqrt_mu * self.sqrt_mu
                    + sign * (-self.sqrt_mu * self.sqrt_mu * a).sqrt() * (1.0 - self.r0_mag * self.alpha);
                let guess = sign * (-a).sqrt() * (numerator / denominator).ln();
                if guess.is_finite() { guess } else { fallback }
            }
            Conic::Parabolic => fallback,
        }
    }

    fn radius(&self, chi: f64, c2: f64, c3: f64) -> f64 {
        let chi2 = chi * chi;
        let psi = self.alpha * chi2;
        chi2 * c2 + self.rdotv_over_sqrt_mu * chi * (1.0 - psi * c3) + self.r0_mag * (1.0 - psi * c2)
    }

    fn residual(&self, chi: f64, c2: f64, c3: f64) -> f64 {
        let chi2 = chi * chi;
        let psi = self.alpha * chi2;
        self.r0_mag * chi * (1.0 - psi * c3)
            + self.rdotv_over_sqrt_mu * chi2 * c2
            + chi2 * chi * c3
            - self.sqrt_mu * self.dt
    }
}

/// Period of a bound orbit from `alpha = 1 / a`.
pub(crate) fn bound_period(alpha: f64, mu: f64) -> f64 {
    2.0 * std::f64::consts::PI * (1.0 / alpha).powi(3).sqrt() / mu.sqrt()
}

fn combine(a: f64, u: &Vector3, b: f64, v: &Vector3) -> Vector3 {
    vector::add(&vector::scale(u, a), &vector::scale(v, b))
}

/// Stumpff functions c2(psi) and c3(psi).
fn stumpff(psi: f64) -> (f64, f64) {
    if psi > 1e-6 {
        let sqrt_psi = psi.sqrt();
        let c2 = (1.0 - sqrt_psi.cos()) / psi;
        let c3 = (sqrt_psi - sqrt_psi.sin()) / (psi * sqrt_psi);
        (c2, c3)
    } else if psi < -1e-6 {
        let sqrt_neg_psi = (-psi).sqrt();
        let c2 = (1.0 - sqrt_neg_psi.cosh()) / psi;
        let c3 = (sqrt_neg_psi.sinh() - sqrt_neg_psi) / (-psi * sqrt_neg_psi);
        (c2, c3)
    } else {
        let c2 = 0.5 - psi / 24.0 + psi * psi / 720.0;
        let c3 = 1.0 / 6.0 - psi / 120.0 + psi * psi / 5_040.0;
        (c2, c3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OrbitalElements, circular_state, orbital_period};
    use chrono::{DateTime, TimeZone, Utc};

    const MU_EARTH: f64 = 398_600.4418;
    const MU_SUN: f64 = 1.327_124_400_18e11;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    fn assert_close(a: &Vector3, b: &Vector3, tol: f64) {
        let err = vector::norm(&vector::sub(a, b));
        assert!(err < tol, "vectors differ by {err:e}: {a:?} vs {b:?}");
    }

    fn specific_energy(state: &StateVector, mu: f64) -> f64 {
        0.5 * state.speed_km_s().powi(2) - mu / state.radius_km()
    }

    #[test]
    fn zero_elapsed_returns_identical_state() {
        let state = StateVector::new([7_000.0, 10.0, -3.0], [0.1, 7.5, 0.2], epoch());
        let out = KeplerSolver::default().propagate(&state, MU_EARTH, 0.0).unwrap();
        assert_eq!(out, state);
    }

    #[test]
    fn quarter_circular_orbit_rotates_ninety_degrees() {
        let r = 6_871.0;
        let state = circular_state(MU_EARTH, r, epoch());
        let period = orbital_period(&state, MU_EARTH).unwrap();
        let out = KeplerSolver::default()
            .propagate(&state, MU_EARTH, period / 4.0)
            .unwrap();
        assert_close(&out.position_km, &[0.0, r, 0.0], 1e-5);
        assert!((out.radius_km() - r).abs() < 1e-8);
    }

    #[test]
    fn half_periods_compose_to_full_period() {
        let elements = OrbitalElements {
            semi_major_axis_km: 12_000.0,
            eccentricity: 0.4,
            inclination_rad: 0.5,
            raan_rad: 1.0,
            arg_periapsis_rad: 0.3,
            true_anomaly_rad: 0.7,
        };
        let (r, v) = elements.to_state_vectors(MU_EARTH);
        let state = StateVector::new(r, v, epoch());
        let period = orbital_period(&state, MU_EARTH).unwrap();
        let solver = KeplerSolver::default();

        let half = solver.propagate(&state, MU_EARTH, period / 2.0).unwrap();
        let full = solver.propagate(&half, MU_EARTH, period / 2.0).unwrap();
        assert_close(&full.position_km, &state.position_km, 1e-4);
        assert_close(&full.velocity_km_s, &state.velocity_km_s, 1e-7);
    }

    #[test]
    fn energy_is_conserved_on_eccentric_orbit() {
        let elements = OrbitalElements {
            semi_major_axis_km: 25_000.0,
            eccentricity: 0.7,
            inclination_rad: 0.1,
            raan_rad: 0.0,
            arg_periapsis_rad: 0.0,
            true_anomaly_rad: 0.0,
        };
        let (r, v) = elements.to_state_vectors(MU_EARTH);
        let state = StateVector::new(r, v, epoch());
        let e0 = specific_energy(&state, MU_EARTH);
        for dt in [600.0, 7_200.0, 20_000.0, -3_000.0] {
            let out = propagate_default(&state, dt);
            let e1 = specific_energy(&out, MU_EARTH);
            assert!((e1 - e0).abs() / e0.abs() < 1e-10, "dt={dt}: {e0} vs {e1}");
        }
    }

    #[test]
    fn hyperbolic_flyby_round_trips() {
        let state = StateVector::new([7_000.0, 0.0, 0.0], [0.0, 12.0, 0.5], epoch());
        let solver = KeplerSolver::default();
        let out = solver.propagate(&state, MU_EARTH, 5_000.0).unwrap();
        assert!(out.radius_km() > state.radius_km());
        let back = solver.propagate(&out, MU_EARTH, -5_000.0).unwrap();
        assert_close(&back.position_km, &state.position_km, 1e-4);
        assert_eq!(back.epoch, state.epoch);
    }

    #[test]
    fn heliocentric_transfer_arc_converges() {
        let state = StateVector::new([1.496e8, 0.0, 0.0], [0.0, 32.7, 0.0], epoch());
        let out = propagate_default_with(&state, MU_SUN, 259.0 * 86_400.0);
        assert!(out.radius_km() > 1.496e8);
    }

    #[test]
    fn radial_state_is_degenerate() {
        let state = StateVector::new([7_000.0, 0.0, 0.0], [3.0, 0.0, 0.0], epoch());
        let err = KeplerSolver::default()
            .propagate(&state, MU_EARTH, 60.0)
            .unwrap_err();
        assert!(matches!(err, PropagationError::DegenerateOrbit(_)));
    }

    #[test]
    fn non_positive_mu_is_degenerate() {
        let state = circular_state(MU_EARTH, 7_000.0, epoch());
        let err = KeplerSolver::default().propagate(&state, 0.0, 60.0).unwrap_err();
        assert!(matches!(err, PropagationError::DegenerateOrbit(_)));
    }

    #[test]
    fn exhausted_iteration_budget_is_reported() {
        let elements = OrbitalElements {
            semi_major_axis_km: 25_000.0,
            eccentricity: 0.7,
            inclination_rad: 0.0,
            raan_rad: 0.0,
            arg_periapsis_rad: 0.0,
            true_anomaly_rad: 0.0,
        };
        let (r, v) = elements.to_state_vectors(MU_EARTH);
        let state = StateVector::new(r, v, epoch());
        let solver = KeplerSolver {
            tolerance: 1e-8,
            max_iterations: 1,
        };
        let err = solver.propagate(&state, MU_EARTH, 9_000.0).unwrap_err();
        assert!(matches!(
            err,
            PropagationError::NonConvergence { iterations: 1, .. }
        ));
    }

    fn propagate_default(state: &StateVector, dt: f64) -> StateVector {
        propagate_default_with(state, MU_EARTH, dt)
    }

    fn propagate_default_with(state: &StateVector, mu: f64, dt: f64) -> StateVector {
        KeplerSolver::default().propagate(state, mu, dt).unwrap()
    }
}
