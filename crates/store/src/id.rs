//! Mission identifiers and their generator.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use iris_core::time::{Clock, SystemClock};
use serde::{Deserialize, Serialize};

use crate::StoreError;

const PREFIX: &str = "mission_";
const MAX_LEN: usize = 128;

/// Validated mission identifier. Only `[A-Za-z0-9_-]` after the `mission_` prefix, so an
/// id can always be used as a file stem inside the store directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MissionId(String);

impl MissionId {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let rest = raw
            .strip_prefix(PREFIX)
            .ok_or_else(|| StoreError::InvalidKey(raw.to_string()))?;
        let valid = !rest.is_empty()
            && raw.len() <= MAX_LEN
            && rest
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(StoreError::InvalidKey(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MissionId {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MissionId> for String {
    fn from(id: MissionId) -> Self {
        id.0
    }
}

impl std::str::FromStr for MissionId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Issues `mission_<YYYYmmdd>_<HHMMSS>_<seq>` identifiers. The sequence restarts at zero
/// whenever the second changes and increments for ids issued within the same second.
pub struct MissionIdGenerator {
    clock: Arc<dyn Clock>,
    last: Mutex<Option<(String, u32)>>,
}

impl fmt::Debug for MissionIdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MissionIdGenerator").finish_non_exhaustive()
    }
}

impl Default for MissionIdGenerator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl MissionIdGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: Mutex::new(None),
        }
    }

    pub fn next_id(&self) -> MissionId {
        let stamp = self.clock.now().format("%Y%m%d_%H%M%S").to_string();
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        let seq = match last.as_ref() {
            Some((previous, seq)) if *previous == stamp => seq + 1,
            _ => 0,
        };
        let id = format!("{PREFIX}{stamp}_{seq:03}");
        *last = Some((stamp, seq));
        MissionId(id)
    }
}
