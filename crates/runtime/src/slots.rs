//! Named save slots wrapping engine snapshots.
//!
//! A slot file is `{schemaVersion, slots: [{id, name, savedAt, snapshot}]}`.
//! Reading is tolerant: anything that cannot be made sense of is dropped or
//! defaulted instead of failing the whole file, and every snapshot is migrated
//! to the current engine schema on the way in.

use chrono::{DateTime, Utc};
use quest_core::{EngineState, Snapshot, snapshot};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::clock::format_timestamp;

pub const SAVE_SLOTS_SCHEMA_VERSION: u32 = 1;

const UNTITLED_SLOT: &str = "Untitled slot";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSlot {
    pub id: String,
    pub name: String,
    pub saved_at: String,
    pub snapshot: Snapshot,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSlotsPayload {
    pub schema_version: u32,
    /// Newest first.
    pub slots: Vec<SaveSlot>,
}

impl Default for SaveSlotsPayload {
    fn default() -> Self {
        Self {
            schema_version: SAVE_SLOTS_SCHEMA_VERSION,
            slots: Vec::new(),
        }
    }
}

impl SaveSlotsPayload {
    /// Decodes a stored payload, falling back to an empty one when the text
    /// is not JSON at all.
    ///
    /// `now` fills in slot ids and save times missing from the record.
    pub fn from_json(json: &str, now: DateTime<Utc>) -> Self {
        Self::decode(json, now).0
    }

    /// Like [`from_json`](Self::from_json), also reporting whether any slot
    /// was given a fresh id. Such a payload has to be written back for those
    /// ids to stay stable across loads.
    pub fn decode(json: &str, now: DateTime<Utc>) -> (Self, bool) {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::decode_value(value, now),
            Err(err) => {
                tracing::debug!("Discarding unreadable save slots: {}", err);
                (Self::default(), false)
            }
        }
    }

    pub fn from_value(value: Value, now: DateTime<Utc>) -> Self {
        Self::decode_value(value, now).0
    }

    fn decode_value(value: Value, now: DateTime<Utc>) -> (Self, bool) {
        let Value::Object(record) = value else {
            return (Self::default(), false);
        };

        let mut assigned_ids = false;
        let slots = match record.get("slots") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| normalize_slot(item, now))
                .map(|(slot, assigned)| {
                    assigned_ids |= assigned;
                    slot
                })
                .collect(),
            _ => Vec::new(),
        };
        let schema_version = record
            .get("schemaVersion")
            .and_then(Value::as_u64)
            .and_then(|version| u32::try_from(version).ok())
            .unwrap_or(SAVE_SLOTS_SCHEMA_VERSION);

        let payload = migrate_save_slots(Self {
            schema_version,
            slots,
        });
        (payload, assigned_ids)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn find(&self, slot_id: &str) -> Option<&SaveSlot> {
        self.slots.iter().find(|slot| slot.id == slot_id)
    }

    /// Puts `slot` first, replacing any slot with the same id.
    pub fn insert(&mut self, slot: SaveSlot) {
        self.slots.retain(|existing| existing.id != slot.id);
        self.slots.insert(0, slot);
    }

    /// Removes the slot with `slot_id`, returning whether one existed.
    pub fn remove(&mut self, slot_id: &str) -> bool {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.id != slot_id);
        self.slots.len() != before
    }

    /// Name used when a slot is saved without one.
    pub fn next_default_name(&self) -> String {
        format!("Snapshot {}", self.slots.len() + 1)
    }
}

/// Brings a payload to the current slot-file version.
///
/// Version 1 is the only layout so far; older payloads are only re-stamped.
pub fn migrate_save_slots(payload: SaveSlotsPayload) -> SaveSlotsPayload {
    if payload.schema_version == SAVE_SLOTS_SCHEMA_VERSION {
        return payload;
    }
    SaveSlotsPayload {
        schema_version: SAVE_SLOTS_SCHEMA_VERSION,
        ..payload
    }
}

/// Freezes `state` into a new slot with a fresh id.
pub fn create_save_slot(
    name: impl Into<String>,
    state: &EngineState,
    now: DateTime<Utc>,
) -> SaveSlot {
    SaveSlot {
        id: create_slot_id(now),
        name: name.into(),
        saved_at: format_timestamp(now),
        snapshot: snapshot::serialize(state),
    }
}

/// Recovers the engine state stored in `slot`, migrating it if needed.
pub fn restore_engine_state(slot: &SaveSlot) -> EngineState {
    snapshot::deserialize(slot.snapshot.clone())
}

fn create_slot_id(now: DateTime<Utc>) -> String {
    format!("slot-{}-{:x}", now.timestamp_millis(), rand::random::<u32>())
}

/// Repairs one stored slot. The flag is set when the slot had no id.
fn normalize_slot(value: &Value, now: DateTime<Utc>) -> Option<(SaveSlot, bool)> {
    let Value::Object(record) = value else {
        return None;
    };

    let snapshot = match record.get("snapshot") {
        Some(raw) => match Snapshot::from_value(raw.clone()) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::debug!("Dropping save slot with unreadable snapshot: {}", err);
                return None;
            }
        },
        None => return None,
    };

    let stored_id = string_field(record, "id");
    let assigned = stored_id.is_none();
    let slot = SaveSlot {
        id: stored_id.unwrap_or_else(|| create_slot_id(now)),
        name: string_field(record, "name").unwrap_or_else(|| UNTITLED_SLOT.to_string()),
        saved_at: string_field(record, "savedAt").unwrap_or_else(|| format_timestamp(now)),
        snapshot,
    };
    Some((slot, assigned))
}

fn string_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::from_epoch_millis;
    use quest_core::CURRENT_SCHEMA_VERSION;
    use serde_json::json;

    fn create_test_now() -> DateTime<Utc> {
        from_epoch_millis(1_700_000_000_000).unwrap()
    }

    fn create_test_snapshot_value() -> Value {
        serde_json::to_value(snapshot::serialize(&EngineState::new(3, 4))).unwrap()
    }

    #[test]
    fn create_save_slot_stamps_time_and_id() {
        let slot = create_save_slot("first", &EngineState::new(3, 4), create_test_now());

        assert_eq!(slot.name, "first");
        assert_eq!(slot.saved_at, "2023-11-14T22:13:20.000Z");
        assert!(slot.id.starts_with("slot-1700000000000-"));
        assert_eq!(slot.snapshot.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn non_object_payload_is_empty_default() {
        let payload = SaveSlotsPayload::from_value(json!([1, 2, 3]), create_test_now());
        assert_eq!(payload, SaveSlotsPayload::default());

        let payload = SaveSlotsPayload::from_json("not json", create_test_now());
        assert_eq!(payload, SaveSlotsPayload::default());
    }

    #[test]
    fn malformed_slots_are_dropped_and_missing_fields_defaulted() {
        let value = json!({
            "schemaVersion": 1,
            "slots": [
                "garbage",
                { "id": "no-snapshot", "name": "x" },
                { "snapshot": { "schemaVersion": 1 } },
                { "snapshot": create_test_snapshot_value() },
            ]
        });

        let payload = SaveSlotsPayload::from_value(value, create_test_now());

        assert_eq!(payload.slots.len(), 1);
        let slot = &payload.slots[0];
        assert_eq!(slot.name, "Untitled slot");
        assert_eq!(slot.saved_at, "2023-11-14T22:13:20.000Z");
        assert!(slot.id.starts_with("slot-"));
    }

    #[test]
    fn decode_reports_assigned_ids() {
        let snapshot = create_test_snapshot_value();
        let with_id = json!({ "slots": [{ "id": "s1", "snapshot": snapshot }] });
        let (_, assigned) = SaveSlotsPayload::decode(&with_id.to_string(), create_test_now());
        assert!(!assigned);

        let without_id = json!({ "slots": [{ "name": "n", "snapshot": snapshot }] });
        let (payload, assigned) =
            SaveSlotsPayload::decode(&without_id.to_string(), create_test_now());
        assert!(assigned);
        assert_eq!(payload.slots.len(), 1);

        assert!(!SaveSlotsPayload::decode("nope", create_test_now()).1);
    }

    #[test]
    fn old_payload_and_snapshots_are_migrated() {
        let mut record = create_test_snapshot_value();
        let mut state = record["state"].take();
        state["runState"]["status"] = json!("RUNNING");
        let value = json!({
            "schemaVersion": 0,
            "slots": [{ "id": "s1", "name": "old", "savedAt": "then", "snapshot": { "state": state } }]
        });

        let payload = SaveSlotsPayload::from_value(value, create_test_now());

        assert_eq!(payload.schema_version, SAVE_SLOTS_SCHEMA_VERSION);
        let restored = restore_engine_state(payload.find("s1").unwrap());
        assert!(restored.run_state.is_running());
    }

    #[test]
    fn insert_puts_newest_first_and_replaces_same_id() {
        let now = create_test_now();
        let state = EngineState::new(1, 1);
        let mut payload = SaveSlotsPayload::default();
        let mut first = create_save_slot("a", &state, now);
        first.id = "one".into();
        let mut second = create_save_slot("b", &state, now);
        second.id = "two".into();

        payload.insert(first.clone());
        payload.insert(second);
        assert_eq!(payload.slots[0].id, "two");
        assert_eq!(payload.next_default_name(), "Snapshot 3");

        first.name = "renamed".into();
        payload.insert(first);
        assert_eq!(payload.slots.len(), 2);
        assert_eq!(payload.slots[0].name, "renamed");

        assert!(payload.remove("two"));
        assert!(!payload.remove("two"));
    }
}
