//! Durable, write-once storage of mission records.
//!
//! Records are keyed by [`MissionId`] and stored as JSON. Every read decodes and
//! re-validates the document, so a truncated or hand-edited file surfaces as
//! [`StoreError::Corrupt`] rather than as a half-populated record.

use std::io;

use iris_trajectory::TrajectoryPoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod file;
pub mod id;
mod memory;

pub use file::FileStore;
pub use id::{MissionId, MissionIdGenerator};
pub use memory::MemoryStore;

/// Relative tolerance between a stored distance and the norm of its position.
pub const DISTANCE_TOLERANCE: f64 = 1e-6;

/// Inputs that defined a mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionParameters {
    pub target_name: String,
    /// Launch epoch as a Julian date.
    pub intercept_epoch: f64,
    pub swarm_size: u32,
    pub role_split: String,
    pub propulsion_type: String,
}

/// Derived mission figures: km/s, days, kg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calculations {
    pub delta_v: f64,
    pub time_of_flight: f64,
    pub fuel_required: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionRecord {
    pub mission_id: MissionId,
    pub parameters: MissionParameters,
    pub calculations: Calculations,
    pub trajectory: Vec<TrajectoryPoint>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mission '{0}' not found")]
    NotFound(MissionId),
    #[error("mission '{id}' is corrupt: {reason}")]
    Corrupt { id: String, reason: String },
    #[error("mission '{0}' already exists")]
    Conflict(MissionId),
    #[error("invalid mission id '{0}'")]
    InvalidKey(String),
    #[error("refusing to store invalid record: {0}")]
    InvalidRecord(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persistence boundary for mission records. No update or delete: records are write-once.
pub trait TrajectoryStore: Send + Sync {
    /// Persist a new record. An existing key yields [`StoreError::Conflict`].
    fn create(&self, record: &MissionRecord) -> Result<MissionId, StoreError>;
    fn read(&self, id: &MissionId) -> Result<MissionRecord, StoreError>;
    /// Stored ids in ascending order.
    fn list(&self) -> Result<Vec<MissionId>, StoreError>;
}

/// Check the structural invariants a committed record must satisfy.
pub fn validate_record(record: &MissionRecord) -> Result<(), String> {
    if record.trajectory.is_empty() {
        return Err("trajectory is empty".to_string());
    }
    if let Some(index) = record
        .trajectory
        .windows(2)
        .position(|pair| pair[1].datetime < pair[0].datetime)
    {
        return Err(format!("timestamps decrease after point {index}"));
    }
    if let Some(index) = record
        .trajectory
        .iter()
        .position(|point| !point.distance_is_consistent(DISTANCE_TOLERANCE))
    {
        return Err(format!(
            "point {index} distance disagrees with its position"
        ));
    }
    Ok(())
}

pub(crate) fn encode(record: &MissionRecord) -> Result<Vec<u8>, StoreError> {
    validate_record(record).map_err(StoreError::InvalidRecord)?;
    Ok(serde_json::to_vec_pretty(record)?)
}

pub(crate) fn decode(key: &MissionId, bytes: &[u8]) -> Result<MissionRecord, StoreError> {
    let corrupt = |reason: String| StoreError::Corrupt {
        id: key.to_string(),
        reason,
    };
    let record: MissionRecord =
        serde_json::from_slice(bytes).map_err(|err| corrupt(err.to_string()))?;
    if record.mission_id != *key {
        return Err(corrupt(format!(
            "stored id '{}' does not match key",
            record.mission_id
        )));
    }
    validate_record(&record).map_err(corrupt)?;
    Ok(record)
}
