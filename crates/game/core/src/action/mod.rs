//! Action vocabulary accepted by the reducer.
//!
//! Actions are plain data. They serialize as a flat record tagged by `type`
//! (`{"type": "use_tool", "toolId": "...", "timestamp": "..."}`) so hosts can
//! log, replay, or accept them over any JSON transport.

use serde::{Deserialize, Serialize};

use crate::event::ToolEvent;
use crate::state::{ContextBlock, EngineState, GridPosition, ModelSpec};

/// Payload of an action, one variant per verb.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, strum::AsRefStr, strum::IntoStaticStr)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    SelectTicket {
        ticket_id: String,
    },
    SelectModel {
        model: Option<ModelSpec>,
    },
    /// Appends the evidence of an already simulated tool call.
    InvokeTool {
        tool_event: ToolEvent,
    },
    /// Spends one tool use of the running session.
    UseTool {
        tool_id: String,
    },
    PurchaseUpgrade {
        upgrade_id: String,
    },
    PlaceBlock {
        block: ContextBlock,
        position: GridPosition,
    },
    MoveBlock {
        block_id: String,
        position: GridPosition,
    },
    RemoveBlock {
        block_id: String,
    },
    StartRun,
    Tick,
    RunComplete,
    /// Replaces the whole state, e.g. after restoring a snapshot.
    LoadState {
        state: Box<EngineState>,
    },
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// An action plus the metadata every verb may carry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineAction {
    #[serde(flatten)]
    pub kind: ActionKind,
    /// Caller-supplied time; the core never reads a clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl EngineAction {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            timestamp: None,
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    #[must_use]
    pub fn at(mut self, timestamp: Option<String>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn select_ticket(ticket_id: impl Into<String>) -> Self {
        Self::new(ActionKind::SelectTicket {
            ticket_id: ticket_id.into(),
        })
    }

    pub fn select_model(model: Option<ModelSpec>) -> Self {
        Self::new(ActionKind::SelectModel { model })
    }

    pub fn invoke_tool(tool_event: ToolEvent) -> Self {
        Self::new(ActionKind::InvokeTool { tool_event })
    }

    pub fn use_tool(tool_id: impl Into<String>) -> Self {
        Self::new(ActionKind::UseTool {
            tool_id: tool_id.into(),
        })
    }

    pub fn purchase_upgrade(upgrade_id: impl Into<String>) -> Self {
        Self::new(ActionKind::PurchaseUpgrade {
            upgrade_id: upgrade_id.into(),
        })
    }

    pub fn place_block(block: ContextBlock, position: GridPosition) -> Self {
        Self::new(ActionKind::PlaceBlock { block, position })
    }

    pub fn move_block(block_id: impl Into<String>, position: GridPosition) -> Self {
        Self::new(ActionKind::MoveBlock {
            block_id: block_id.into(),
            position,
        })
    }

    pub fn remove_block(block_id: impl Into<String>) -> Self {
        Self::new(ActionKind::RemoveBlock {
            block_id: block_id.into(),
        })
    }

    pub fn start_run() -> Self {
        Self::new(ActionKind::StartRun)
    }

    pub fn tick() -> Self {
        Self::new(ActionKind::Tick)
    }

    pub fn run_complete() -> Self {
        Self::new(ActionKind::RunComplete)
    }

    pub fn load_state(state: EngineState) -> Self {
        Self::new(ActionKind::LoadState {
            state: Box::new(state),
        })
    }

    pub fn as_str(&self) -> &'static str {
        self.kind.as_str()
    }
}

impl From<ActionKind> for EngineAction {
    fn from(kind: ActionKind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_flat_tagged_record() {
        let action = EngineAction::use_tool("tool-build").with_timestamp("2026-01-01T00:00:00Z");
        let value = serde_json::to_value(&action).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "type": "use_tool",
                "toolId": "tool-build",
                "timestamp": "2026-01-01T00:00:00Z",
            })
        );
    }

    #[test]
    fn parses_unit_verbs_without_timestamp() {
        let action: EngineAction = serde_json::from_str(r#"{"type":"start_run"}"#).unwrap();
        assert_eq!(action, EngineAction::start_run());
        assert_eq!(action.as_str(), "start_run");
    }

    #[test]
    fn select_model_accepts_null() {
        let action: EngineAction =
            serde_json::from_str(r#"{"type":"select_model","model":null,"timestamp":"t"}"#)
                .unwrap();
        assert_eq!(action.kind, ActionKind::SelectModel { model: None });
        assert_eq!(action.timestamp.as_deref(), Some("t"));
    }
}
