//! One JSON document per mission under a root directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{MissionId, MissionRecord, StoreError, TrajectoryStore, decode, encode};

const EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: &MissionId) -> PathBuf {
        self.root.join(format!("{}.{EXTENSION}", id.as_str()))
    }
}

impl TrajectoryStore for FileStore {
    fn create(&self, record: &MissionRecord) -> Result<MissionId, StoreError> {
        let bytes = encode(record)?;
        let target = self.path_for(&record.mission_id);

        // Readers only ever observe a complete document: write to a sibling temp file,
        // sync it, then link it into place without replacing an existing record.
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        match tmp.persist_noclobber(&target) {
            Ok(_) => {
                debug!(path = %target.display(), bytes = bytes.len(), "persisted mission record");
                Ok(record.mission_id.clone())
            }
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                Err(StoreError::Conflict(record.mission_id.clone()))
            }
            Err(err) => Err(StoreError::Io(err.error)),
        }
    }

    fn read(&self, id: &MissionId) -> Result<MissionRecord, StoreError> {
        let path = self.path_for(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        decode(id, &bytes)
    }

    fn list(&self) -> Result<Vec<MissionId>, StoreError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match MissionId::parse(stem) {
                Ok(id) => ids.push(id),
                Err(_) => warn!(path = %path.display(), "skipping file with invalid mission id"),
            }
        }
        ids.sort();
        Ok(ids)
    }
}
