use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::{MissionId, MissionRecord, StoreError, TrajectoryStore, decode, encode};

/// In-process store holding the serialized form of each record, so reads go through the
/// same decode and validation path as the file store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<MissionId, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TrajectoryStore for MemoryStore {
    fn create(&self, record: &MissionRecord) -> Result<MissionId, StoreError> {
        let bytes = encode(record)?;
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(&record.mission_id) {
            return Err(StoreError::Conflict(record.mission_id.clone()));
        }
        records.insert(record.mission_id.clone(), bytes);
        Ok(record.mission_id.clone())
    }

    fn read(&self, id: &MissionId) -> Result<MissionRecord, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let bytes = records
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        decode(id, bytes)
    }

    fn list(&self) -> Result<Vec<MissionId>, StoreError> {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<MissionId> = records.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
