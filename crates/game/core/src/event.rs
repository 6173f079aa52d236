//! Events emitted by the reducer.
//!
//! Events are append-only observations: the reducer never reads them back, so
//! hosts are free to log, stream, or discard them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::state::ContextBlock;

/// Kind tag carried on every [`EngineEvent`].
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EngineEventKind {
    /// Reserved; never emitted by the reducer.
    TicketCreated,
    /// Reserved; never emitted by the reducer.
    TicketUpdated,
    TicketSelected,
    ModelSelected,
    /// Reserved; never emitted by the reducer.
    VariantSelected,
    ToolInvoked,
    BlockAdded,
    BlockMoved,
    BlockRemoved,
    /// Reserved; never emitted by the reducer.
    ScoreComputed,
    RunStarted,
    RunTicked,
    RunCompleted,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineEvent {
    /// `evt_<n>` where `n` is the state's event counter after emission.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EngineEventKind,
    pub timestamp: String,
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    /// Id of the model selected when the event fired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
}

/// Result of one (simulated) tool invocation, ready to be fed back through
/// `invoke_tool`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolEvent {
    pub id: String,
    pub tool_id: String,
    pub tool_name: String,
    #[serde(default)]
    pub input: Map<String, Value>,
    #[serde(default)]
    pub output: Map<String, Value>,
    #[serde(default)]
    pub evidence_blocks: Vec<ContextBlock>,
}

impl ToolEvent {
    pub fn evidence_block_ids(&self) -> Vec<String> {
        self.evidence_blocks
            .iter()
            .map(|block| block.id.clone())
            .collect()
    }
}
