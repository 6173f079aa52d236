//! In-memory SlotRepository implementation for tests and local runs.

use std::sync::RwLock;

use crate::repository::{RepositoryError, Result, SlotRepository};
use crate::slots::SaveSlotsPayload;

/// In-memory implementation of SlotRepository.
pub struct InMemorySlotRepo {
    payload: RwLock<SaveSlotsPayload>,
}

impl InMemorySlotRepo {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::with_payload(SaveSlotsPayload::default())
    }

    pub fn with_payload(payload: SaveSlotsPayload) -> Self {
        Self {
            payload: RwLock::new(payload),
        }
    }
}

impl Default for InMemorySlotRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotRepository for InMemorySlotRepo {
    fn load(&self) -> Result<SaveSlotsPayload> {
        let payload = self
            .payload
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(payload.clone())
    }

    fn persist(&self, payload: &SaveSlotsPayload) -> Result<()> {
        let mut stored = self
            .payload
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        *stored = payload.clone();
        Ok(())
    }
}
