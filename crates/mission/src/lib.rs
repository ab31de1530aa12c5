//! Mission simulation pipeline.
//!
//! [`MissionSimulator::run_simulation`] validates the request, asks the ephemeris for the
//! departure state, plans a Hohmann-style transfer toward the target, samples the
//! post-burn trajectory, estimates swarm propellant, and persists a write-once
//! [`MissionRecord`]. Collaborators (ephemeris, store, clock) are injected so the whole
//! pipeline runs deterministically in tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use iris_config::{BodyCatalog, Settings};
use iris_core::time::{Clock, SystemClock, seconds_to_days};
use iris_ephem::{Ephemeris, EphemerisError, KeplerianEphemeris};
use iris_impulsive::TransferError;
use iris_insights::{MissionMetrics, Summarizer, insights_or_fallback};
use iris_orbits::{OrbitalElements, PropagationError, apply_maneuver};
use iris_propulsion::{EngineCatalog, PropulsionError, Vehicle, swarm_propellant_kg};
use iris_store::{
    Calculations, MissionId, MissionIdGenerator, MissionParameters, MissionRecord, StoreError,
    TrajectoryStore,
};
use iris_trajectory::{SampleError, TrajectoryPoint, TrajectorySampler, TrajectoryStats};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod plan;
pub mod track;
pub mod validate;

pub use plan::{TransferPlan, plan_transfer};
pub use track::TrackBody;
pub use validate::ValidationError;

/// Identifier attempts before giving up on a run whose ids keep colliding.
const MAX_ID_ATTEMPTS: usize = 8;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("ephemeris error: {0}")]
    Ephemeris(#[from] EphemerisError),
    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),
    #[error("propagation error: {0}")]
    Propagation(#[from] PropagationError),
    #[error("sampling error: {0}")]
    Sampling(#[from] SampleError),
    #[error("propulsion error: {0}")]
    Propulsion(#[from] PropulsionError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("no free mission id after {0} attempts")]
    IdsExhausted(usize),
}

/// What a caller gets back from a run; the trajectory itself stays in the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionSummary {
    pub mission_id: MissionId,
    pub calculations: Calculations,
    pub point_count: usize,
    pub departure_utc: DateTime<Utc>,
    pub arrival_utc: DateTime<Utc>,
    /// Eccentricity of the post-burn heliocentric orbit.
    pub transfer_eccentricity: f64,
    pub stats: TrajectoryStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionInsights {
    pub mission_id: MissionId,
    pub metrics: MissionMetrics,
    pub insights: String,
}

pub struct MissionSimulator {
    settings: Settings,
    catalog: BodyCatalog,
    engines: EngineCatalog,
    ephemeris: Arc<dyn Ephemeris>,
    store: Arc<dyn TrajectoryStore>,
    ids: MissionIdGenerator,
    sampler: TrajectorySampler,
}

impl MissionSimulator {
    pub fn new(
        settings: Settings,
        catalog: BodyCatalog,
        ephemeris: Arc<dyn Ephemeris>,
        store: Arc<dyn TrajectoryStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let engines = EngineCatalog::from_settings(&settings.propulsion);
        Self {
            settings,
            catalog,
            engines,
            ephemeris,
            store,
            ids: MissionIdGenerator::new(clock),
            sampler: TrajectorySampler::default(),
        }
    }

    /// Keplerian ephemeris over `catalog` and the system clock.
    pub fn with_catalog(
        settings: Settings,
        catalog: BodyCatalog,
        store: Arc<dyn TrajectoryStore>,
    ) -> Self {
        let ephemeris = Arc::new(KeplerianEphemeris::new(catalog.clone()));
        Self::new(settings, catalog, ephemeris, store, Arc::new(SystemClock))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn run_simulation(
        &self,
        params: &MissionParameters,
    ) -> Result<MissionSummary, SimulationError> {
        let simulation = &self.settings.simulation;
        let central = validate::lookup_body(&self.catalog, &simulation.central_body)?;
        let (target, target_orbit) =
            validate::lookup_target(&self.catalog, &params.target_name, central)?;
        let target_radius_km = target_orbit.reference_radius_km().ok_or_else(|| {
            ValidationError::NoHeliocentricOrbit {
                body: target.name.clone(),
                center: central.name.clone(),
            }
        })?;
        let swarm_size = validate::validate_swarm_size(i64::from(params.swarm_size))?;
        let epoch = validate::validate_epoch(params.intercept_epoch)?;
        let engine = self
            .engines
            .find(&params.propulsion_type)
            .map_err(|_| ValidationError::UnknownPropulsion {
                name: params.propulsion_type.clone(),
                known: self.engines.names().collect::<Vec<_>>().join(", "),
            })?;
        if params.role_split.trim().is_empty() {
            return Err(ValidationError::EmptyRoleSplit.into());
        }
        let point_count = validate::validate_point_count(simulation.point_count)?;

        let departure =
            self.ephemeris
                .state_at(&simulation.departure_body, &central.name, epoch)?;
        let plan = plan_transfer(
            &self.settings.transfer,
            &departure,
            target_radius_km,
            central.mu_km3_s2,
        )?;
        let burned = apply_maneuver(&departure, &plan.maneuver);
        let transfer_orbit = OrbitalElements::from_state_vectors(
            &burned.position_km,
            &burned.velocity_km_s,
            central.mu_km3_s2,
        )?;
        debug!(
            departure_radius_km = departure.radius_km(),
            target_radius_km,
            transfer_sma_km = transfer_orbit.semi_major_axis_km,
            transfer_eccentricity = transfer_orbit.eccentricity,
            time_of_flight_days = seconds_to_days(plan.time_of_flight_s),
            "planned transfer"
        );

        let trajectory = self.sampler.sample(
            &departure,
            Some(&plan.maneuver),
            central.mu_km3_s2,
            plan.time_of_flight_s,
            point_count,
        )?;
        let stats = TrajectoryStats::from_points(&trajectory)?;

        let vehicle = Vehicle {
            dry_mass_kg: self.settings.swarm.dry_mass_per_craft_kg,
            engine: engine.clone(),
        };
        let calculations = Calculations {
            delta_v: plan.delta_v_km_s,
            time_of_flight: seconds_to_days(plan.time_of_flight_s),
            fuel_required: swarm_propellant_kg(&vehicle, swarm_size, plan.delta_v_km_s)?,
        };

        let departure_utc = trajectory.first().map_or(epoch, |p| p.datetime);
        let arrival_utc = trajectory.last().map_or(epoch, |p| p.datetime);
        let mut record = MissionRecord {
            mission_id: self.ids.next_id(),
            parameters: params.clone(),
            calculations,
            trajectory,
        };
        let mission_id = self.persist(&mut record)?;

        info!(
            mission_id = %mission_id,
            target = %target.name,
            swarm_size,
            propulsion = %engine.name,
            delta_v_km_s = calculations.delta_v,
            time_of_flight_days = calculations.time_of_flight,
            fuel_required_kg = calculations.fuel_required,
            points = record.trajectory.len(),
            final_distance_km = stats.last_distance,
            "mission simulated"
        );

        Ok(MissionSummary {
            mission_id,
            calculations,
            point_count: record.trajectory.len(),
            departure_utc,
            arrival_utc,
            transfer_eccentricity: transfer_orbit.eccentricity,
            stats,
        })
    }

    /// Create the record, drawing a fresh id whenever the store reports a collision.
    fn persist(&self, record: &mut MissionRecord) -> Result<MissionId, SimulationError> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            match self.store.create(record) {
                Ok(id) => return Ok(id),
                Err(StoreError::Conflict(id)) => {
                    warn!(mission_id = %id, attempt, "mission id already taken, retrying");
                    record.mission_id = self.ids.next_id();
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(SimulationError::IdsExhausted(MAX_ID_ATTEMPTS))
    }

    /// Read a stored mission. The first `sample` points (settings default when `None`)
    /// are echoed at info level as a quick look at the trajectory.
    pub fn retrieve(
        &self,
        id: &MissionId,
        sample: Option<usize>,
    ) -> Result<MissionRecord, SimulationError> {
        let record = self.store.read(id)?;
        let sample = sample.unwrap_or(self.settings.simulation.retrieval_sample);
        for (index, point) in record.trajectory.iter().take(sample).enumerate() {
            info!(
                mission_id = %id,
                index,
                datetime = %point.datetime,
                x = point.x,
                y = point.y,
                z = point.z,
                distance_km = point.distance,
                "trajectory sample"
            );
        }
        info!(mission_id = %id, points = record.trajectory.len(), "mission retrieved");
        Ok(record)
    }

    pub fn list_missions(&self) -> Result<Vec<MissionId>, SimulationError> {
        Ok(self.store.list()?)
    }

    /// Circular reference orbit around `body`, sampled over exactly one period.
    pub fn orbit_track(
        &self,
        body: &str,
        altitude_km: f64,
        points: Option<i64>,
    ) -> Result<Vec<TrajectoryPoint>, SimulationError> {
        let points = points.unwrap_or(self.settings.simulation.orbit_track_points);
        track::orbit_track(&self.catalog, &self.sampler, body, altitude_km, points)
    }

    /// Summarize a stored mission; summarizer failures degrade to the fallback text.
    pub fn mission_insights(
        &self,
        id: &MissionId,
        summarizer: &dyn Summarizer,
    ) -> Result<MissionInsights, SimulationError> {
        let record = self.store.read(id)?;
        let metrics = metrics_for(&record)?;
        let insights = insights_or_fallback(summarizer, &metrics);
        Ok(MissionInsights {
            mission_id: record.mission_id,
            metrics,
            insights,
        })
    }
}

pub fn metrics_for(record: &MissionRecord) -> Result<MissionMetrics, SimulationError> {
    let stats = TrajectoryStats::from_points(&record.trajectory)?;
    Ok(MissionMetrics {
        mission_id: record.mission_id.to_string(),
        target_name: record.parameters.target_name.clone(),
        swarm_size: record.parameters.swarm_size,
        propulsion_type: record.parameters.propulsion_type.clone(),
        delta_v_km_s: record.calculations.delta_v,
        time_of_flight_days: record.calculations.time_of_flight,
        fuel_required_kg: record.calculations.fuel_required,
        max_distance_km: stats.distance.max,
        final_distance_km: stats.last_distance,
    })
}
