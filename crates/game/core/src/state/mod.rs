//! Authoritative game state representation.
//!
//! [`EngineState`] is a plain value: hosts clone or query it, and only
//! [`engine::reduce`](crate::engine::reduce) produces successor states.
pub mod types;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{EconomyState, GameConfig};
pub use types::{
    ContextBlock, ContextBlockKind, ModelProvider, ModelSpec, QuestStage, SchemaFieldType, Tag,
    Ticket, TicketStatus, ToolDefinition, ToolSchema, ToolSchemaField, Upgrade,
    UpgradeCatalogItem, UpgradeEffect, UpgradeTarget, Variant, VariantType,
};

/// Top-left cell of a placed block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub row: i32,
    pub column: i32,
}

impl GridPosition {
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }
}

/// Board dimensions plus the current placement of every block on it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridState {
    pub rows: i32,
    pub columns: i32,
    /// Keyed by block id; ordered for stable serialization.
    #[serde(default)]
    pub placements: BTreeMap<String, GridPosition>,
}

impl GridState {
    pub fn new(rows: i32, columns: i32) -> Self {
        Self {
            rows,
            columns,
            placements: BTreeMap::new(),
        }
    }

    /// Returns true when a `width`x`height` block anchored at `position` lies
    /// entirely inside the board.
    pub fn fits(&self, position: GridPosition, width: u32, height: u32) -> bool {
        let bottom = i64::from(position.row) + i64::from(height);
        let right = i64::from(position.column) + i64::from(width);
        position.row >= 0
            && position.column >= 0
            && bottom <= i64::from(self.rows)
            && right <= i64::from(self.columns)
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Completed,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub status: RunStatus,
    pub tick: u64,
    pub score: f64,
    pub remaining_tools: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl RunState {
    /// A freshly started run with the given tool allowance.
    pub fn running(remaining_tools: u64) -> Self {
        Self {
            status: RunStatus::Running,
            tick: 0,
            score: 0.0,
            remaining_tools,
            last_updated: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }
}

/// Canonical snapshot of the whole game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineState {
    pub tickets: Vec<Ticket>,
    pub grid: GridState,
    pub blocks: Vec<ContextBlock>,
    pub models: Vec<ModelSpec>,
    /// Currently selected model; its id doubles as the event variant id.
    pub model: Option<ModelSpec>,
    pub tools: Vec<ToolDefinition>,
    pub upgrades: Vec<UpgradeCatalogItem>,
    #[serde(default)]
    pub owned_upgrades: Vec<String>,
    pub economy: EconomyState,
    pub game_config: GameConfig,
    pub run_state: RunState,
    /// Number of events ever emitted from this state's history.
    pub event_counter: u64,
    pub selected_ticket_id: Option<String>,
}

impl EngineState {
    /// An empty board of the given size with default economy and config.
    pub fn new(rows: i32, columns: i32) -> Self {
        Self {
            tickets: Vec::new(),
            grid: GridState::new(rows, columns),
            blocks: Vec::new(),
            models: Vec::new(),
            model: None,
            tools: Vec::new(),
            upgrades: Vec::new(),
            owned_upgrades: Vec::new(),
            economy: EconomyState::new(),
            game_config: GameConfig::new(),
            run_state: RunState::default(),
            event_counter: 0,
            selected_ticket_id: None,
        }
    }

    pub fn block(&self, block_id: &str) -> Option<&ContextBlock> {
        self.blocks.iter().find(|block| block.id == block_id)
    }

    pub fn tool(&self, tool_id: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|tool| tool.id == tool_id)
    }

    pub fn upgrade(&self, upgrade_id: &str) -> Option<&UpgradeCatalogItem> {
        self.upgrades.iter().find(|upgrade| upgrade.id == upgrade_id)
    }

    pub fn owns_upgrade(&self, upgrade_id: &str) -> bool {
        self.owned_upgrades.iter().any(|owned| owned == upgrade_id)
    }

    pub fn selected_model_id(&self) -> Option<&str> {
        self.model.as_ref().map(|model| model.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_rejects_negative_and_overhanging_positions() {
        let grid = GridState::new(3, 4);

        assert!(grid.fits(GridPosition::new(0, 0), 4, 3));
        assert!(grid.fits(GridPosition::new(2, 3), 1, 1));
        assert!(!grid.fits(GridPosition::new(-1, 0), 1, 1));
        assert!(!grid.fits(GridPosition::new(2, 3), 2, 1));
        assert!(!grid.fits(GridPosition::new(3, 0), 1, 1));
    }

    #[test]
    fn state_serializes_with_wire_field_names() {
        let mut state = EngineState::new(3, 4);
        state.selected_ticket_id = Some("ticket-1".into());
        let value = serde_json::to_value(&state).unwrap();

        assert_eq!(value["runState"]["status"], "idle");
        assert_eq!(value["selectedTicketId"], "ticket-1");
        assert_eq!(value["eventCounter"], 0);
        assert_eq!(value["economy"]["toolBudget"], 6);
        assert!(value["model"].is_null());
    }
}
