//! Departure burn and time of flight from the configured transfer policies.

use iris_config::{BurnPolicy, TimeOfFlightPolicy, TransferConfig};
use iris_core::time::days_to_seconds;
use iris_impulsive::{HohmannTransfer, hohmann};
use iris_orbits::{Maneuver, PropagationError, StateVector};

use crate::SimulationError;
use crate::validate::validate_duration;

#[derive(Debug, Clone, PartialEq)]
pub struct TransferPlan {
    pub maneuver: Maneuver,
    pub time_of_flight_s: f64,
    /// Delta-v charged to the mission budget, km/s.
    pub delta_v_km_s: f64,
    pub hohmann: Option<HohmannTransfer>,
}

/// Plan the transfer from `departure` to a circular orbit of `target_radius_km`.
///
/// Hohmann burns are charged for both impulses; a fixed burn is charged its magnitude.
pub fn plan_transfer(
    config: &TransferConfig,
    departure: &StateVector,
    target_radius_km: f64,
    mu_km3_s2: f64,
) -> Result<TransferPlan, SimulationError> {
    let geometry = || hohmann(departure.radius_km(), target_radius_km, mu_km3_s2);
    let mut used: Option<HohmannTransfer> = None;

    let time_of_flight_s = match config.time_of_flight {
        TimeOfFlightPolicy::Fixed { days } => days_to_seconds(days),
        TimeOfFlightPolicy::Hohmann => {
            let transfer = geometry()?;
            used = Some(transfer);
            transfer.tof_seconds
        }
    };
    let time_of_flight_s = validate_duration(time_of_flight_s)?;

    let (maneuver, delta_v_km_s) = match config.burn {
        BurnPolicy::Fixed { delta_v_km_s } => {
            let burn = Maneuver::impulse(delta_v_km_s, departure.epoch);
            let magnitude = burn.magnitude_km_s();
            (burn, magnitude)
        }
        BurnPolicy::Hohmann => {
            let transfer = match used {
                Some(transfer) => transfer,
                None => geometry()?,
            };
            used = Some(transfer);
            let burn = Maneuver::along_velocity(departure, transfer.dv1_km_s).ok_or_else(|| {
                PropagationError::DegenerateOrbit("departure velocity is zero".to_string())
            })?;
            (burn, transfer.total_delta_v_km_s())
        }
    };

    Ok(TransferPlan {
        maneuver,
        time_of_flight_s,
        delta_v_km_s,
        hohmann: used,
    })
}
