//! Versioned snapshots of [`EngineState`].
//!
//! A snapshot is the storage-agnostic shape `{schemaVersion, state}`. Older
//! records are upgraded by a pipeline of [`MigrationStep`]s that operate on the
//! raw JSON before it is decoded, so a step can repair fields the current
//! types would refuse.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::EngineState;

/// Schema version written by [`serialize`].
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(String),

    #[error("snapshot json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("migration {from} -> {to} failed: {reason}")]
    Migration { from: u32, to: u32, reason: String },
}

pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Typed snapshot at the current schema version.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub schema_version: u32,
    pub state: EngineState,
}

impl Snapshot {
    /// Parses a snapshot record, upgrading it to the current version.
    ///
    /// A missing `schemaVersion` is read as version 0.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let raw = RawSnapshot::from_value(value)?.migrate()?;
        Ok(Self {
            schema_version: raw.schema_version,
            state: serde_json::from_value(raw.state)?,
        })
    }

    /// Writes the record verbatim.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Snapshot record before typed decoding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    #[serde(default)]
    pub schema_version: u32,
    pub state: Value,
}

impl RawSnapshot {
    /// Reads `{schemaVersion?, state}` from an arbitrary JSON value.
    ///
    /// A non-numeric version is treated as 0.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut record) = value else {
            return Err(SnapshotError::Malformed("expected an object".into()));
        };
        let state = record
            .remove("state")
            .ok_or_else(|| SnapshotError::Malformed("missing state".into()))?;
        let schema_version = record
            .get("schemaVersion")
            .and_then(Value::as_u64)
            .and_then(|version| u32::try_from(version).ok())
            .unwrap_or(0);
        Ok(Self {
            schema_version,
            state,
        })
    }

    /// Runs registered steps until the record reaches the current version.
    ///
    /// A version with no registered step (including versions newer than this
    /// build) is stamped as current without touching the state.
    pub fn migrate(mut self) -> Result<Self> {
        for _ in 0..=MIGRATIONS.len() {
            if self.schema_version == CURRENT_SCHEMA_VERSION {
                return Ok(self);
            }
            let Some(step) = MIGRATIONS
                .iter()
                .find(|step| step.from == self.schema_version)
            else {
                break;
            };
            self.state = (step.transform)(self.state)?;
            self.schema_version = step.to;
        }
        self.schema_version = CURRENT_SCHEMA_VERSION;
        Ok(self)
    }
}

/// One upgrade of the raw state record from `from` to `to`.
#[derive(Clone, Copy, Debug)]
pub struct MigrationStep {
    pub from: u32,
    pub to: u32,
    pub transform: fn(Value) -> Result<Value>,
}

/// Registered steps, at most one per source version.
pub const MIGRATIONS: &[MigrationStep] = &[MigrationStep {
    from: 0,
    to: 1,
    transform: normalize_v0,
}];

fn lowercase_field(record: &mut serde_json::Map<String, Value>, key: &str) {
    if let Some(Value::String(text)) = record.get_mut(key) {
        *text = text.to_lowercase();
    }
}

/// Version 0 records predate the snake_case vocabulary: enum tags may be
/// capitalized and `ownedUpgrades` may be absent.
fn normalize_v0(state: Value) -> Result<Value> {
    let Value::Object(mut record) = state else {
        return Err(SnapshotError::Migration {
            from: 0,
            to: 1,
            reason: "state is not an object".into(),
        });
    };

    if let Some(Value::Array(blocks)) = record.get_mut("blocks") {
        for block in blocks.iter_mut().filter_map(Value::as_object_mut) {
            lowercase_field(block, "type");
        }
    }
    if let Some(Value::Object(run_state)) = record.get_mut("runState") {
        lowercase_field(run_state, "status");
    }
    record
        .entry("ownedUpgrades")
        .or_insert_with(|| Value::Array(Vec::new()));

    Ok(Value::Object(record))
}

/// Freezes `state` at the current schema version.
pub fn serialize(state: &EngineState) -> Snapshot {
    Snapshot {
        schema_version: CURRENT_SCHEMA_VERSION,
        state: state.clone(),
    }
}

/// Stamps a typed snapshot with the current version.
///
/// Typed snapshots have already been decoded, so structural repairs happen in
/// [`RawSnapshot::migrate`]; this only updates the version.
pub fn migrate(snapshot: Snapshot) -> Snapshot {
    if snapshot.schema_version == CURRENT_SCHEMA_VERSION {
        return snapshot;
    }
    Snapshot {
        schema_version: CURRENT_SCHEMA_VERSION,
        ..snapshot
    }
}

/// Extracts the state from a snapshot, migrating it first.
pub fn deserialize(snapshot: Snapshot) -> EngineState {
    migrate(snapshot).state
}
