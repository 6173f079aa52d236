//! The state reducer.
//!
//! [`reduce`] is the only way game state changes. It consumes the current
//! [`EngineState`], validates the action against it, and returns the successor
//! state along with the events the action produced. Rejected actions hand the
//! input state back untouched with no events.

mod errors;
mod transition;

pub use errors::Rejection;

use serde::{Deserialize, Serialize};

use crate::action::EngineAction;
use crate::config::EconomyState;
use crate::event::EngineEvent;
use crate::state::EngineState;

/// Result of reducing one action.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: EngineState,
    pub events: Vec<EngineEvent>,
    /// Set when the action was declined; `state` is then the input state.
    pub rejection: Option<Rejection>,
}

impl Transition {
    fn accepted(state: EngineState, events: Vec<EngineEvent>) -> Self {
        Self {
            state,
            events,
            rejection: None,
        }
    }

    fn rejected(state: EngineState, rejection: Rejection) -> Self {
        Self {
            state,
            events: Vec::new(),
            rejection: Some(rejection),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

/// Applies `action` to `state`.
pub fn reduce(state: EngineState, action: EngineAction) -> Transition {
    if let Err(rejection) = transition::pre_validate(&state, &action.kind) {
        return Transition::rejected(state, rejection);
    }

    let mut state = state;
    let events = transition::apply(&mut state, action.kind, action.timestamp.as_deref());
    Transition::accepted(state, events)
}

/// How a completed run is scored.
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
pub enum RunOutcome {
    Success,
    Partial,
    Fail,
}

impl RunOutcome {
    /// Scores the current run.
    ///
    /// A run without both a ticket and a model always fails. Otherwise reaching
    /// the target score wins, running out of ticks loses, and anything else is
    /// a partial result.
    pub fn evaluate(state: &EngineState) -> Self {
        if state.selected_ticket_id.is_none() || state.model.is_none() {
            return RunOutcome::Fail;
        }
        if state.run_state.score >= state.game_config.target_score {
            return RunOutcome::Success;
        }
        if state.run_state.tick >= u64::from(state.game_config.max_ticks) {
            return RunOutcome::Fail;
        }
        RunOutcome::Partial
    }

    /// Signed credit change paid out on completion.
    pub const fn credit_delta(self) -> i64 {
        match self {
            RunOutcome::Success => EconomyState::SUCCESS_REWARD,
            RunOutcome::Partial => EconomyState::PARTIAL_REWARD,
            RunOutcome::Fail => EconomyState::FAIL_PENALTY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EngineEventKind;
    use crate::state::{
        ContextBlock, ContextBlockKind, GridPosition, ModelSpec, RunStatus, ToolDefinition,
        UpgradeCatalogItem, UpgradeEffect, UpgradeTarget,
    };

    fn create_test_state() -> EngineState {
        let mut state = EngineState::new(3, 4);
        state.tools = vec![ToolDefinition::new("tool-build", "build")];
        state.models = vec![ModelSpec::custom("model-a")];
        state.model = Some(ModelSpec::custom("model-a"));
        state.selected_ticket_id = Some("ticket-1".into());
        state.upgrades = vec![UpgradeCatalogItem {
            id: "upgrade-cache".into(),
            title: "Token Cache".into(),
            description: String::new(),
            cost: 120,
            tag: "Throughput Boost".into(),
            effects: vec![UpgradeEffect {
                id: "effect-cache".into(),
                description: String::new(),
                modifier: 0.15,
                target: UpgradeTarget::TokenBudget,
            }],
        }];
        state
    }

    fn dispatch(state: EngineState, action: EngineAction) -> EngineState {
        reduce(state, action).state
    }

    #[test]
    fn select_ticket_emits_event_with_previous_context() {
        let state = create_test_state();
        let transition = reduce(state, EngineAction::select_ticket("ticket-2").with_timestamp("t1"));

        assert_eq!(transition.state.selected_ticket_id.as_deref(), Some("ticket-2"));
        assert_eq!(transition.state.event_counter, 1);
        assert_eq!(transition.state.run_state.last_updated.as_deref(), Some("t1"));

        let event = &transition.events[0];
        assert_eq!(event.id, "evt_1");
        assert_eq!(event.timestamp, "t1");
        assert_eq!(event.payload["ticketId"], "ticket-2");
        assert_eq!(event.ticket_id.as_deref(), Some("ticket-1"));
        assert_eq!(event.variant_id.as_deref(), Some("model-a"));
    }

    #[test]
    fn event_timestamp_falls_back_to_last_updated_then_empty() {
        let state = create_test_state();
        let transition = reduce(state, EngineAction::tick());
        assert_eq!(transition.events[0].timestamp, "");

        let state = dispatch(transition.state, EngineAction::tick().with_timestamp("t2"));
        let transition = reduce(state, EngineAction::tick());
        assert_eq!(transition.events[0].timestamp, "t2");
        assert_eq!(transition.state.run_state.tick, 3);
    }

    #[test]
    fn use_tool_requires_running_session() {
        let state = create_test_state();
        let transition = reduce(state.clone(), EngineAction::use_tool("tool-build"));

        assert_eq!(transition.rejection, Some(Rejection::RunNotActive));
        assert!(transition.events.is_empty());
        assert_eq!(transition.state, state);
    }

    #[test]
    fn use_tool_spends_budget_and_adds_evidence() {
        let state = dispatch(create_test_state(), EngineAction::start_run());
        let transition = reduce(state, EngineAction::use_tool("tool-build").with_timestamp("t"));
        let state = &transition.state;

        assert_eq!(state.economy.credits, 1160);
        assert_eq!(state.run_state.score, 1.0);
        assert_eq!(state.run_state.remaining_tools, 5);

        let block = state.blocks.last().unwrap();
        assert_eq!(block.id, "tool-block-2");
        assert_eq!(block.content, "Tool output: build cached new evidence.");
        assert_eq!(block.token_estimate, Some(12));
        assert_eq!(block.created_at.as_deref(), Some("t"));

        let payload = &transition.events[0].payload;
        assert_eq!(payload["toolEventId"], "tool_evt_2");
        assert_eq!(payload["output"]["status"], "ok");
        assert_eq!(payload["evidenceBlockIds"][0], "tool-block-2");
    }

    #[test]
    fn use_tool_rejects_unknown_tool_and_empty_budget() {
        let mut state = dispatch(create_test_state(), EngineAction::start_run());
        let transition = reduce(state.clone(), EngineAction::use_tool("tool-missing"));
        assert_eq!(
            transition.rejection,
            Some(Rejection::UnknownTool("tool-missing".into()))
        );

        state.run_state.remaining_tools = 0;
        let transition = reduce(state.clone(), EngineAction::use_tool("tool-build"));
        assert_eq!(transition.rejection, Some(Rejection::NoToolsRemaining));
        assert_eq!(transition.state, state);
    }

    #[test]
    fn purchase_upgrade_applies_effects_without_event() {
        let state = create_test_state();
        let transition = reduce(state, EngineAction::purchase_upgrade("upgrade-cache"));

        assert!(transition.events.is_empty());
        assert!(!transition.is_rejected());
        assert_eq!(transition.state.economy.credits, 1120);
        assert_eq!(transition.state.economy.token_budget, 94_691);
        assert_eq!(transition.state.owned_upgrades, vec!["upgrade-cache".to_string()]);
        assert_eq!(transition.state.event_counter, 0);

        let again = reduce(transition.state, EngineAction::purchase_upgrade("upgrade-cache"));
        assert_eq!(
            again.rejection,
            Some(Rejection::UpgradeAlreadyOwned("upgrade-cache".into()))
        );
    }

    #[test]
    fn purchase_upgrade_requires_credits() {
        let mut state = create_test_state();
        state.economy.credits = 100;
        let transition = reduce(state, EngineAction::purchase_upgrade("upgrade-cache"));
        assert_eq!(
            transition.rejection,
            Some(Rejection::InsufficientCredits {
                cost: 120,
                credits: 100
            })
        );
    }

    #[test]
    fn place_move_and_remove_block() {
        let block = ContextBlock::new("b1", ContextBlockKind::User, "hi").with_size(2, 1);
        let state = dispatch(
            create_test_state(),
            EngineAction::place_block(block, GridPosition::new(0, 2)),
        );
        assert_eq!(state.grid.placements["b1"], GridPosition::new(0, 2));

        let rejected = reduce(state.clone(), EngineAction::move_block("b1", GridPosition::new(0, 3)));
        assert!(rejected.is_rejected());

        let moved = reduce(state, EngineAction::move_block("b1", GridPosition::new(2, 0)));
        assert_eq!(moved.state.grid.placements["b1"], GridPosition::new(2, 0));
        assert_eq!(moved.events[0].payload["position"]["row"], 2);

        let removed = reduce(moved.state, EngineAction::remove_block("b1"));
        assert!(removed.state.block("b1").is_none());
        assert!(removed.state.grid.placements.is_empty());
        assert_eq!(removed.state.event_counter, 3);
    }

    #[test]
    fn place_block_rejects_out_of_bounds() {
        let block = ContextBlock::new("b1", ContextBlockKind::User, "hi");
        let state = create_test_state();
        let transition = reduce(
            state.clone(),
            EngineAction::place_block(block, GridPosition::new(3, 0)),
        );

        assert!(matches!(
            transition.rejection,
            Some(Rejection::BlockDoesNotFit { .. })
        ));
        assert_eq!(transition.state, state);
    }

    #[test]
    fn remove_unknown_block_still_emits() {
        let transition = reduce(create_test_state(), EngineAction::remove_block("ghost"));
        assert_eq!(transition.events.len(), 1);
        assert_eq!(transition.state.event_counter, 1);
    }

    #[test]
    fn run_complete_pays_out_by_outcome() {
        let mut state = dispatch(create_test_state(), EngineAction::start_run());
        state.run_state.score = 4.0;
        let transition = reduce(state, EngineAction::run_complete());

        assert_eq!(transition.state.run_state.status, RunStatus::Completed);
        assert_eq!(transition.state.economy.credits, 1360);
        assert_eq!(transition.events[0].payload["outcome"], "success");

        let again = reduce(transition.state, EngineAction::run_complete());
        assert!(again.rejection.is_none());
        assert_eq!(again.events.len(), 1);
        assert_eq!(again.events[0].kind, EngineEventKind::RunCompleted);
        assert_eq!(again.state.run_state.status, RunStatus::Completed);
        assert_eq!(again.state.economy.credits, 1480);
    }

    #[test]
    fn outcome_rules() {
        let mut state = create_test_state();
        assert_eq!(RunOutcome::evaluate(&state), RunOutcome::Partial);

        state.run_state.tick = 3;
        assert_eq!(RunOutcome::evaluate(&state), RunOutcome::Fail);

        state.run_state.score = 4.0;
        assert_eq!(RunOutcome::evaluate(&state), RunOutcome::Success);

        state.model = None;
        assert_eq!(RunOutcome::evaluate(&state), RunOutcome::Fail);
    }

    #[test]
    fn load_state_replaces_everything_silently() {
        let replacement = EngineState::new(5, 5);
        let transition = reduce(
            create_test_state(),
            EngineAction::load_state(replacement.clone()),
        );
        assert_eq!(transition.state, replacement);
        assert!(transition.events.is_empty());
    }
}
