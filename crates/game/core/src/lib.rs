//! Deterministic simulation rules for ContextQuest.
//!
//! `quest-core` defines the canonical game state, the action vocabulary, and
//! the pure functions that drive a session: seeded randomness, grid packing,
//! tool simulation, variant selection, the state reducer, and versioned
//! snapshots. It performs no I/O; hosts own the current state and feed actions
//! through [`engine::reduce`].
pub mod action;
pub mod config;
pub mod engine;
pub mod event;
pub mod grid;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod tool;
pub mod variant;

pub use action::{ActionKind, EngineAction};
pub use config::{EconomyState, GameConfig};
pub use engine::{Rejection, RunOutcome, Transition, reduce};
pub use event::{EngineEvent, EngineEventKind, ToolEvent};
pub use grid::{CompressionOptions, GridBlock, GridDimensions, PackResult, PackedBlock, pack};
pub use rng::{RandomSource, RngError, SeededRng};
pub use snapshot::{
    CURRENT_SCHEMA_VERSION, MigrationStep, RawSnapshot, Snapshot, SnapshotError,
};
pub use state::{
    ContextBlock, ContextBlockKind, EngineState, GridPosition, GridState, ModelProvider,
    ModelSpec, QuestStage, RunState, RunStatus, SchemaFieldType, Tag, Ticket, TicketStatus,
    ToolDefinition, ToolSchema, ToolSchemaField, Upgrade, UpgradeCatalogItem, UpgradeEffect,
    UpgradeTarget, Variant, VariantType,
};
pub use tool::simulate;
pub use variant::{VariantError, select_variant};
