//! A single player's game session.
//!
//! [`Session`] owns the current [`EngineState`] and the cumulative event log,
//! and routes every change through [`quest_core::reduce`]. On top of the bare
//! reducer it can stamp missing timestamps from a [`Clock`], end runs that can
//! no longer progress, and bridge the simulator, the variant selector and the
//! save slot repositories.

use quest_content::{ContentFactory, LoadResult};
use quest_core::{
    ActionKind, EngineAction, EngineEvent, EngineEventKind, EngineState, RunOutcome, Snapshot,
    Transition, Variant, VariantError, reduce, select_variant, simulate, snapshot,
};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::repository::{RepositoryError, SlotRepository};
use crate::slots::{SaveSlot, create_save_slot, restore_engine_state};

pub const DEFAULT_SEED: &str = "contextquest";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown tool {0}")]
    UnknownTool(String),

    #[error("unknown save slot {0}")]
    UnknownSlot(String),

    #[error(transparent)]
    Variant(#[from] VariantError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    /// Player seed for tool simulation and variant assignment.
    pub seed: String,
    /// Fill in missing action timestamps from the session clock.
    pub stamp_timestamps: bool,
    /// Complete a running run as soon as it reaches the target score, the
    /// tick limit, or runs out of tools.
    pub auto_complete: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED.to_string(),
            stamp_timestamps: false,
            auto_complete: false,
        }
    }
}

pub struct Session {
    state: EngineState,
    events: Vec<EngineEvent>,
    options: SessionOptions,
    clock: Box<dyn Clock>,
}

impl Session {
    pub fn new(state: EngineState, options: SessionOptions) -> Self {
        Self {
            state,
            events: Vec::new(),
            options,
            clock: Box::new(SystemClock),
        }
    }

    /// Session over the starting state built from `factory`.
    pub fn from_content(factory: &ContentFactory, options: SessionOptions) -> LoadResult<Self> {
        let state = factory.initial_state()?;
        tracing::info!(
            "Session started: {} ticket(s), {} tool(s), seed={}",
            state.tickets.len(),
            state.tools.len(),
            options.seed
        );
        Ok(Self::new(state, options))
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Every event emitted since the session started, oldest first.
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Reduces `action` against the current state.
    ///
    /// The returned transition carries the successor state and every event
    /// the dispatch produced, including an automatic `run_complete`.
    pub fn dispatch(&mut self, action: EngineAction) -> Transition {
        let mut action = action;
        if self.options.stamp_timestamps && action.timestamp.is_none() {
            action.timestamp = Some(self.clock.timestamp());
        }
        let timestamp = action.timestamp.clone();
        let may_auto_complete = !matches!(
            action.kind,
            ActionKind::RunComplete | ActionKind::LoadState { .. }
        );
        let verb = action.as_str();

        let mut transition = self.apply(action);
        if let Some(rejection) = &transition.rejection {
            tracing::debug!("Rejected {}: {}", verb, rejection.as_str());
            return transition;
        }

        if may_auto_complete && self.should_auto_complete() {
            tracing::debug!("Auto-completing run at tick {}", self.state.run_state.tick);
            let completion = self.apply(EngineAction::run_complete().at(timestamp));
            transition.events.extend(completion.events);
            transition.state = completion.state;
        }

        transition
    }

    /// Runs the simulator for `tool_id` and feeds the result back as
    /// `invoke_tool`.
    ///
    /// Each call draws from `<seed>:<event counter>`, so repeated invocations
    /// differ while a replayed session reproduces them.
    pub fn simulate_tool(
        &mut self,
        tool_id: &str,
        input: &Map<String, Value>,
    ) -> Result<Transition> {
        let tool = self
            .state
            .tool(tool_id)
            .ok_or_else(|| SessionError::UnknownTool(tool_id.to_string()))?;
        let seed = format!("{}:{}", self.options.seed, self.state.event_counter);
        let tool_event = simulate(tool, input, &seed);
        Ok(self.dispatch(EngineAction::invoke_tool(tool_event)))
    }

    /// Picks this player's variant for `ticket_id`, then selects the ticket
    /// and the variant's model.
    pub fn assign_variant(&mut self, ticket_id: &str, variants: &[Variant]) -> Result<Variant> {
        let variant = select_variant(&self.options.seed, ticket_id, variants)?.clone();
        self.dispatch(EngineAction::select_ticket(ticket_id));
        self.dispatch(EngineAction::select_model(Some(variant.model.clone())));
        Ok(variant)
    }

    /// Scores the current run as it stands.
    pub fn outcome(&self) -> RunOutcome {
        RunOutcome::evaluate(&self.state)
    }

    pub fn snapshot(&self) -> Snapshot {
        snapshot::serialize(&self.state)
    }

    /// Replaces the current state with the one in `snapshot`.
    pub fn restore(&mut self, snapshot: Snapshot) -> Transition {
        self.dispatch(EngineAction::load_state(snapshot::deserialize(snapshot)))
    }

    /// Saves the current state as the newest slot in `repo`.
    ///
    /// A blank `name` falls back to `Snapshot <n>`.
    pub fn save_to(&self, repo: &dyn SlotRepository, name: &str) -> Result<SaveSlot> {
        let name = match name.trim() {
            "" => repo.load()?.next_default_name(),
            trimmed => trimmed.to_string(),
        };
        let slot = create_save_slot(name, &self.state, self.clock.now());
        repo.save_slot(slot.clone())?;
        tracing::info!("Saved slot {} ({})", slot.id, slot.name);
        Ok(slot)
    }

    /// Restores the state saved in slot `slot_id` of `repo`.
    pub fn load_from(&mut self, repo: &dyn SlotRepository, slot_id: &str) -> Result<Transition> {
        let slot = repo
            .find_slot(slot_id)?
            .ok_or_else(|| SessionError::UnknownSlot(slot_id.to_string()))?;
        tracing::info!("Loading slot {} ({})", slot.id, slot.name);
        Ok(self.dispatch(EngineAction::load_state(restore_engine_state(&slot))))
    }

    fn apply(&mut self, action: EngineAction) -> Transition {
        let transition = reduce(self.state.clone(), action);
        if transition.is_rejected() {
            return transition;
        }

        self.state = transition.state.clone();
        self.events.extend(transition.events.iter().cloned());
        if let Some(event) = transition
            .events
            .iter()
            .find(|event| event.kind == EngineEventKind::RunCompleted)
        {
            tracing::info!(
                "Run completed at tick {} with score {}: {}",
                self.state.run_state.tick,
                self.state.run_state.score,
                event.payload["outcome"]
            );
        }
        transition
    }

    fn should_auto_complete(&self) -> bool {
        if !self.options.auto_complete || !self.state.run_state.is_running() {
            return false;
        }
        let run = &self.state.run_state;
        let config = &self.state.game_config;
        run.score >= config.target_score
            || run.tick >= u64::from(config.max_ticks)
            || run.remaining_tools == 0
    }
}
