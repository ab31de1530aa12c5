//! Analytic estimators for impulsive transfers in the coplanar, circular limit.
//!
//! A Hohmann transfer between the departure radius and the target's reference radius is
//! what fixes both the burn and the time of flight of a simulated mission.

use std::f64::consts::PI;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransferError {
    #[error("{name} must be positive and finite (got {value})")]
    InvalidInput { name: &'static str, value: f64 },
}

/// Hohmann transfer between circular, coplanar orbits of radii `r1_km` and `r2_km`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HohmannTransfer {
    pub r1_km: f64,
    pub r2_km: f64,
    pub dv1_km_s: f64, // signed: negative for an inward (retrograde) departure burn
    pub dv2_km_s: f64, // signed: negative for a retrograde capture when arriving inward
    pub tof_seconds: f64,
}

impl HohmannTransfer {
    /// `|dv1| + |dv2|`.
    pub fn total_delta_v_km_s(&self) -> f64 {
        self.dv1_km_s.abs() + self.dv2_km_s.abs()
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, TransferError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(TransferError::InvalidInput { name, value })
    }
}

/// Compute the classical Hohmann transfer about a central body with parameter `mu_km3_s2`.
pub fn hohmann(r1_km: f64, r2_km: f64, mu_km3_s2: f64) -> Result<HohmannTransfer, TransferError> {
    let r1 = positive("departure radius", r1_km)?;
    let r2 = positive("target radius", r2_km)?;
    let mu = positive("gravitational parameter", mu_km3_s2)?;

    let v1 = (mu / r1).sqrt();
    let v2 = (mu / r2).sqrt();
    let a_t = 0.5 * (r1 + r2);

    // Transfer speed at r1 (periapsis when outbound) and at r2.
    let v_t1 = (mu * (2.0 / r1 - 1.0 / a_t)).sqrt();
    let v_t2 = (mu * (2.0 / r2 - 1.0 / a_t)).sqrt();

    Ok(HohmannTransfer {
        r1_km: r1,
        r2_km: r2,
        dv1_km_s: v_t1 - v1,
        dv2_km_s: v2 - v_t2,
        tof_seconds: PI * (a_t.powi(3) / mu).sqrt(),
    })
}
