//! Per-action validation and application.
//!
//! Every action goes through two phases:
//! 1. `pre_validate` - check preconditions against the untouched state
//! 2. `apply` - mutate the state and return the emitted events
//!
//! `apply` only runs after `pre_validate` succeeds and itself never fails, so
//! a rejected action can never leave a partially mutated state behind.

use serde_json::{Value, json};

use crate::action::ActionKind;
use crate::config::GameConfig;
use crate::event::{EngineEvent, EngineEventKind};
use crate::state::{
    ContextBlock, ContextBlockKind, EngineState, GridPosition, RunState, RunStatus,
    UpgradeCatalogItem, UpgradeEffect, UpgradeTarget,
};

use super::RunOutcome;
use super::errors::Rejection;

const TOOL_BLOCK_TOKEN_ESTIMATE: u32 = 12;
const TOOL_BLOCK_FIDELITY: f64 = 0.9;
const TOOL_BLOCK_NOISE: f64 = 0.1;

pub(super) fn pre_validate(state: &EngineState, kind: &ActionKind) -> Result<(), Rejection> {
    match kind {
        ActionKind::UseTool { tool_id } => {
            if !state.run_state.is_running() {
                return Err(Rejection::RunNotActive);
            }
            if state.run_state.remaining_tools == 0 {
                return Err(Rejection::NoToolsRemaining);
            }
            if state.tool(tool_id).is_none() {
                return Err(Rejection::UnknownTool(tool_id.clone()));
            }
            Ok(())
        }
        ActionKind::PurchaseUpgrade { upgrade_id } => {
            if state.owns_upgrade(upgrade_id) {
                return Err(Rejection::UpgradeAlreadyOwned(upgrade_id.clone()));
            }
            let upgrade = state
                .upgrade(upgrade_id)
                .ok_or_else(|| Rejection::UnknownUpgrade(upgrade_id.clone()))?;
            if state.economy.credits < upgrade.cost {
                return Err(Rejection::InsufficientCredits {
                    cost: upgrade.cost,
                    credits: state.economy.credits,
                });
            }
            Ok(())
        }
        ActionKind::PlaceBlock { block, position } => {
            ensure_fits(state, &block.id, *position, block.width, block.height)
        }
        ActionKind::MoveBlock { block_id, position } => {
            let block = state
                .block(block_id)
                .ok_or_else(|| Rejection::UnknownBlock(block_id.clone()))?;
            ensure_fits(state, block_id, *position, block.width, block.height)
        }
        ActionKind::SelectTicket { .. }
        | ActionKind::SelectModel { .. }
        | ActionKind::InvokeTool { .. }
        | ActionKind::RemoveBlock { .. }
        | ActionKind::StartRun
        | ActionKind::Tick
        | ActionKind::RunComplete
        | ActionKind::LoadState { .. } => Ok(()),
    }
}

fn ensure_fits(
    state: &EngineState,
    block_id: &str,
    position: GridPosition,
    width: u32,
    height: u32,
) -> Result<(), Rejection> {
    if state.grid.fits(position, width, height) {
        Ok(())
    } else {
        Err(Rejection::BlockDoesNotFit {
            block_id: block_id.to_string(),
            row: position.row,
            column: position.column,
        })
    }
}

/// Allocates the next event id and builds the event from the current
/// selection. Call before changing the selection so the event reflects the
/// context the action was issued in.
fn emit(
    state: &mut EngineState,
    kind: EngineEventKind,
    payload: Value,
    timestamp: Option<&str>,
) -> EngineEvent {
    state.event_counter += 1;
    EngineEvent {
        id: format!("evt_{}", state.event_counter),
        kind,
        timestamp: timestamp
            .or(state.run_state.last_updated.as_deref())
            .unwrap_or_default()
            .to_string(),
        payload,
        ticket_id: state.selected_ticket_id.clone(),
        variant_id: state.selected_model_id().map(str::to_string),
    }
}

fn stamp(run_state: &mut RunState, timestamp: Option<&str>) {
    if let Some(timestamp) = timestamp {
        run_state.last_updated = Some(timestamp.to_string());
    }
}

pub(super) fn apply(
    state: &mut EngineState,
    kind: ActionKind,
    timestamp: Option<&str>,
) -> Vec<EngineEvent> {
    match kind {
        ActionKind::SelectTicket { ticket_id } => {
            let event = emit(
                state,
                EngineEventKind::TicketSelected,
                json!({ "ticketId": ticket_id }),
                timestamp,
            );
            state.selected_ticket_id = Some(ticket_id);
            stamp(&mut state.run_state, timestamp);
            vec![event]
        }
        ActionKind::SelectModel { model } => {
            let model_id = model.as_ref().map(|model| model.id.clone());
            let event = emit(
                state,
                EngineEventKind::ModelSelected,
                json!({ "modelId": model_id }),
                timestamp,
            );
            state.model = model;
            stamp(&mut state.run_state, timestamp);
            vec![event]
        }
        ActionKind::InvokeTool { tool_event } => {
            let event = emit(
                state,
                EngineEventKind::ToolInvoked,
                json!({
                    "toolEventId": tool_event.id,
                    "toolId": tool_event.tool_id,
                    "toolName": tool_event.tool_name,
                    "output": tool_event.output,
                    "evidenceBlockIds": tool_event.evidence_block_ids(),
                }),
                timestamp,
            );
            state.blocks.extend(tool_event.evidence_blocks);
            stamp(&mut state.run_state, timestamp);
            vec![event]
        }
        ActionKind::UseTool { tool_id } => apply_use_tool(state, &tool_id, timestamp),
        ActionKind::PurchaseUpgrade { upgrade_id } => {
            if let Some(upgrade) = state.upgrade(&upgrade_id).cloned() {
                apply_upgrade(state, &upgrade);
            }
            stamp(&mut state.run_state, timestamp);
            Vec::new()
        }
        ActionKind::PlaceBlock { block, position } => {
            let event = emit(
                state,
                EngineEventKind::BlockAdded,
                json!({ "blockId": block.id, "position": position }),
                timestamp,
            );
            state.grid.placements.insert(block.id.clone(), position);
            state.blocks.push(block);
            stamp(&mut state.run_state, timestamp);
            vec![event]
        }
        ActionKind::MoveBlock { block_id, position } => {
            let event = emit(
                state,
                EngineEventKind::BlockMoved,
                json!({ "blockId": block_id, "position": position }),
                timestamp,
            );
            state.grid.placements.insert(block_id, position);
            stamp(&mut state.run_state, timestamp);
            vec![event]
        }
        ActionKind::RemoveBlock { block_id } => {
            let event = emit(
                state,
                EngineEventKind::BlockRemoved,
                json!({ "blockId": block_id }),
                timestamp,
            );
            state.blocks.retain(|block| block.id != block_id);
            state.grid.placements.remove(&block_id);
            stamp(&mut state.run_state, timestamp);
            vec![event]
        }
        ActionKind::StartRun => {
            let event = emit(
                state,
                EngineEventKind::RunStarted,
                json!({ "tick": 0 }),
                timestamp,
            );
            let last_updated = state.run_state.last_updated.take();
            state.run_state = RunState {
                last_updated,
                ..RunState::running(state.economy.tool_budget)
            };
            stamp(&mut state.run_state, timestamp);
            vec![event]
        }
        ActionKind::Tick => {
            let tick = state.run_state.tick + 1;
            let event = emit(
                state,
                EngineEventKind::RunTicked,
                json!({ "tick": tick }),
                timestamp,
            );
            state.run_state.tick = tick;
            stamp(&mut state.run_state, timestamp);
            vec![event]
        }
        ActionKind::RunComplete => {
            let outcome = RunOutcome::evaluate(state);
            let tick = state.run_state.tick;
            let event = emit(
                state,
                EngineEventKind::RunCompleted,
                json!({ "tick": tick, "outcome": outcome }),
                timestamp,
            );
            state.run_state.status = RunStatus::Completed;
            state.economy.adjust_credits(outcome.credit_delta());
            stamp(&mut state.run_state, timestamp);
            vec![event]
        }
        ActionKind::LoadState { state: loaded } => {
            *state = *loaded;
            Vec::new()
        }
    }
}

fn apply_use_tool(
    state: &mut EngineState,
    tool_id: &str,
    timestamp: Option<&str>,
) -> Vec<EngineEvent> {
    let Some(tool_name) = state.tool(tool_id).map(|tool| tool.name.clone()) else {
        return Vec::new();
    };

    let n = state.event_counter + 1;
    let block_id = format!("tool-block-{n}");
    let event = emit(
        state,
        EngineEventKind::ToolInvoked,
        json!({
            "toolEventId": format!("tool_evt_{n}"),
            "toolId": tool_id,
            "toolName": tool_name,
            "output": { "status": "ok" },
            "evidenceBlockIds": [block_id],
        }),
        timestamp,
    );

    let block = ContextBlock::new(
        block_id,
        ContextBlockKind::Tool,
        format!("Tool output: {tool_name} cached new evidence."),
    )
    .with_quality(TOOL_BLOCK_FIDELITY, TOOL_BLOCK_NOISE)
    .with_token_estimate(TOOL_BLOCK_TOKEN_ESTIMATE)
    .with_created_at(timestamp.map(str::to_string));
    state.blocks.push(block);

    state.economy.credits = state.economy.credits.saturating_sub(state.economy.tool_cost);
    state.run_state.score += state.game_config.score_per_tool;
    state.run_state.remaining_tools -= 1;
    stamp(&mut state.run_state, timestamp);
    vec![event]
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds a scaled amount back to a non-negative integer.
fn scale_amount(amount: u64, factor: f64) -> u64 {
    (amount as f64 * factor).round().max(0.0) as u64
}

fn apply_effect(state: &mut EngineState, effect: &UpgradeEffect) {
    let modifier = effect.modifier;
    match effect.target {
        UpgradeTarget::TokenBudget => {
            state.economy.token_budget = scale_amount(state.economy.token_budget, 1.0 + modifier);
        }
        UpgradeTarget::Cost => {
            state.economy.tool_cost = scale_amount(state.economy.tool_cost, 1.0 + modifier);
        }
        UpgradeTarget::Latency => {
            let scaled = (f64::from(state.game_config.max_ticks) * (1.0 - modifier)).round();
            state.game_config.max_ticks =
                (scaled.max(0.0) as u32).max(GameConfig::MIN_MAX_TICKS);
        }
        UpgradeTarget::Accuracy | UpgradeTarget::ContextQuality => {
            state.game_config.score_per_tool = round2(state.game_config.score_per_tool + modifier)
                .max(GameConfig::MIN_SCORE_PER_TOOL);
        }
    }
}

fn apply_upgrade(state: &mut EngineState, upgrade: &UpgradeCatalogItem) {
    state.economy.credits -= upgrade.cost;
    state.owned_upgrades.push(upgrade.id.clone());
    for effect in &upgrade.effects {
        apply_effect(state, effect);
    }
}
