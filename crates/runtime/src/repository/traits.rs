//! Repository contract for save slot persistence.

use crate::repository::Result;
use crate::slots::{SaveSlot, SaveSlotsPayload};

/// Storage for the whole save slot payload.
///
/// Implementations only need `load` and `persist`; the slot-level helpers
/// read, modify and write back the full payload.
pub trait SlotRepository: Send + Sync {
    /// Reads the stored payload. A store that was never written yields an
    /// empty payload.
    fn load(&self) -> Result<SaveSlotsPayload>;

    /// Replaces the stored payload.
    fn persist(&self, payload: &SaveSlotsPayload) -> Result<()>;

    /// Stores `slot` as the newest slot and returns the updated payload.
    fn save_slot(&self, slot: SaveSlot) -> Result<SaveSlotsPayload> {
        let mut payload = self.load()?;
        payload.insert(slot);
        self.persist(&payload)?;
        Ok(payload)
    }

    /// Removes a slot, returning whether it existed.
    fn delete_slot(&self, slot_id: &str) -> Result<bool> {
        let mut payload = self.load()?;
        if !payload.remove(slot_id) {
            return Ok(false);
        }
        self.persist(&payload)?;
        Ok(true)
    }

    fn find_slot(&self, slot_id: &str) -> Result<Option<SaveSlot>> {
        Ok(self.load()?.find(slot_id).cloned())
    }
}
