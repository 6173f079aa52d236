//! File-based SlotRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::repository::{RepositoryError, Result, SlotRepository};
use crate::slots::SaveSlotsPayload;

/// File-based implementation of SlotRepository.
///
/// Stores the whole payload as `save_slots.json` under the base directory.
/// Writes go to a temp file first and are renamed into place.
pub struct FileSlotRepository {
    base_dir: PathBuf,
}

impl FileSlotRepository {
    pub const FILE_NAME: &'static str = "save_slots.json";

    /// Create a new file-based slot repository, creating `base_dir` if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    /// Path of the payload file.
    pub fn path(&self) -> PathBuf {
        self.base_dir.join(Self::FILE_NAME)
    }
}

impl SlotRepository for FileSlotRepository {
    fn load(&self) -> Result<SaveSlotsPayload> {
        let path = self.path();

        if !path.exists() {
            return Ok(SaveSlotsPayload::default());
        }

        let json = fs::read_to_string(&path).map_err(RepositoryError::Io)?;
        let (payload, assigned_ids) = SaveSlotsPayload::decode(&json, Utc::now());
        if assigned_ids {
            tracing::debug!("Writing back generated save slot ids to {}", path.display());
            self.persist(&payload)?;
        }

        tracing::debug!(
            "Loaded {} save slot(s) from {}",
            payload.slots.len(),
            path.display()
        );

        Ok(payload)
    }

    fn persist(&self, payload: &SaveSlotsPayload) -> Result<()> {
        let path = self.path();
        let temp_path = path.with_extension("json.tmp");

        let json = payload
            .to_json()
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        fs::write(&temp_path, json).map_err(RepositoryError::Io)?;
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!(
            "Saved {} save slot(s) to {}",
            payload.slots.len(),
            path.display()
        );

        Ok(())
    }
}
