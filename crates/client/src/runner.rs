//! Command parsing and dispatch.
//!
//! Every non-blank line is one command: a verb followed by whitespace
//! separated arguments. Recognized commands answer with a [`CliResult`];
//! malformed ones answer with an error message instead of touching the
//! session.

use quest_core::{
    ContextBlock, ContextBlockKind, EngineAction, EngineEvent, EngineState, GridPosition,
    ModelSpec, Transition,
};
use quest_runtime::clock::{format_timestamp, from_epoch_millis};
use quest_runtime::{SaveSlot, Session, SlotRepository};
use serde::Serialize;
use serde_json::{Map, Value};

const PLACED_BLOCK_WIDTH: u32 = 1;
const PLACED_BLOCK_HEIGHT: u32 = 1;

/// Slot listing entry; the snapshot itself is never echoed.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSummary {
    pub id: String,
    pub name: String,
    pub saved_at: String,
}

impl From<&SaveSlot> for SlotSummary {
    fn from(slot: &SaveSlot) -> Self {
        Self {
            id: slot.id.clone(),
            name: slot.name.clone(),
            saved_at: slot.saved_at.clone(),
        }
    }
}

/// A command that reached the session.
///
/// Actions the reducer declined still land here with `rejection` set and
/// `state` unchanged.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput {
    ok: bool,
    pub command: String,
    pub state: EngineState,
    pub events: Vec<EngineEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<SlotSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<SlotSummary>>,
}

impl CommandOutput {
    fn new(command: &str, state: EngineState, events: Vec<EngineEvent>) -> Self {
        Self {
            ok: true,
            command: command.to_string(),
            state,
            events,
            rejection: None,
            slot: None,
            slots: None,
        }
    }
}

/// A command that could not be parsed or carried out.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommandError {
    ok: bool,
    pub command: String,
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CliResult {
    Ok(CommandOutput),
    Err(CommandError),
}

impl CliResult {
    fn error(command: &str, error: impl Into<String>) -> Self {
        CliResult::Err(CommandError {
            ok: false,
            command: command.to_string(),
            error: error.into(),
        })
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CliResult::Ok(_))
    }

    /// One-line JSON encoding written to stdout.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Stateful interpreter for command lines.
pub struct CliRunner {
    session: Session,
    slots: Box<dyn SlotRepository>,
    block_counter: u64,
}

impl CliRunner {
    pub fn new(session: Session, slots: Box<dyn SlotRepository>) -> Self {
        Self {
            session,
            slots,
            block_counter: 0,
        }
    }

    pub fn state(&self) -> &EngineState {
        self.session.state()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs one input line. Blank lines produce no result.
    pub fn handle_line(&mut self, raw_line: &str) -> Option<CliResult> {
        let line = raw_line.trim();
        let mut tokens = line.split_whitespace();
        let command = tokens.next()?;
        let args: Vec<&str> = tokens.collect();

        let result = match command {
            "state" => {
                tracing::info!("state requested");
                CliResult::Ok(CommandOutput::new(line, self.state().clone(), Vec::new()))
            }
            "tick" => {
                let timestamp = self.timestamp(arg(&args, 0));
                self.apply(line, EngineAction::tick().at(timestamp))
            }
            "ticket" => self.ticket(line, &args),
            "model" => self.model(line, &args),
            "block" => self.block(line, &args),
            "run" => self.run(line, &args),
            "tool" => self.tool(line, &args),
            "save" => self.save(line, &args),
            "load" => self.load(line, &args),
            "slots" => self.list_slots(line),
            _ => CliResult::error(line, "Unknown command."),
        };
        Some(result)
    }

    fn ticket(&mut self, line: &str, args: &[&str]) -> CliResult {
        if arg(args, 0) != Some("select") {
            return CliResult::error(line, "Unknown ticket command.");
        }
        let Some(ticket_id) = arg(args, 1) else {
            return CliResult::error(line, "Missing ticket id.");
        };
        let timestamp = self.timestamp(arg(args, 2));
        self.apply(line, EngineAction::select_ticket(ticket_id).at(timestamp))
    }

    fn model(&mut self, line: &str, args: &[&str]) -> CliResult {
        if arg(args, 0) != Some("select") {
            return CliResult::error(line, "Unknown model command.");
        }
        let Some(model_id) = arg(args, 1) else {
            return CliResult::error(line, "Missing model id.");
        };
        let model = match model_id.to_lowercase().as_str() {
            "none" | "null" => None,
            _ => Some(ModelSpec::custom(model_id)),
        };
        let timestamp = self.timestamp(arg(args, 2));
        self.apply(line, EngineAction::select_model(model).at(timestamp))
    }

    fn block(&mut self, line: &str, args: &[&str]) -> CliResult {
        if arg(args, 0) != Some("place") {
            return CliResult::error(line, "Unknown block command.");
        }
        let (Some(kind_token), Some(row_token), Some(column_token)) =
            (arg(args, 1), arg(args, 2), arg(args, 3))
        else {
            return CliResult::error(line, "Missing block arguments.");
        };
        let (Some(row), Some(column)) =
            (parse_coordinate(row_token), parse_coordinate(column_token))
        else {
            return CliResult::error(line, "Invalid grid position.");
        };
        let position = GridPosition::new(row, column);
        if !self
            .state()
            .grid
            .fits(position, PLACED_BLOCK_WIDTH, PLACED_BLOCK_HEIGHT)
        {
            return CliResult::error(line, "Block does not fit grid.");
        }

        self.block_counter += 1;
        let block_id = format!("block_{}", self.block_counter);
        let kind: ContextBlockKind = kind_token.parse().unwrap_or_default();
        let content = match args[4..].join(" ") {
            text if text.is_empty() => format!("{kind} block {block_id}"),
            text => text,
        };
        let block = ContextBlock::new(block_id, kind, content)
            .with_size(PLACED_BLOCK_WIDTH, PLACED_BLOCK_HEIGHT)
            .with_created_at(self.timestamp(None));
        self.apply(line, EngineAction::place_block(block, position))
    }

    fn run(&mut self, line: &str, args: &[&str]) -> CliResult {
        let action = match arg(args, 0) {
            Some("start") => EngineAction::start_run(),
            Some("complete") => EngineAction::run_complete(),
            _ => return CliResult::error(line, "Unknown run command."),
        };
        let timestamp = self.timestamp(arg(args, 1));
        self.apply(line, action.at(timestamp))
    }

    fn tool(&mut self, line: &str, args: &[&str]) -> CliResult {
        let subcommand = arg(args, 0);
        if !matches!(subcommand, Some("use" | "sim")) {
            return CliResult::error(line, "Unknown tool command.");
        }
        let Some(tool_id) = arg(args, 1) else {
            return CliResult::error(line, "Missing tool id.");
        };

        if subcommand == Some("use") {
            let timestamp = self.timestamp(arg(args, 2));
            return self.apply(line, EngineAction::use_tool(tool_id).at(timestamp));
        }

        let input = parse_tool_input(&args[2..]);
        match self.session.simulate_tool(tool_id, &input) {
            Ok(transition) => self.report(line, transition),
            Err(err) => CliResult::error(line, err.to_string()),
        }
    }

    fn save(&mut self, line: &str, args: &[&str]) -> CliResult {
        let name = args.join(" ");
        match self.session.save_to(self.slots.as_ref(), &name) {
            Ok(slot) => {
                let mut output = CommandOutput::new(line, self.state().clone(), Vec::new());
                output.slot = Some(SlotSummary::from(&slot));
                CliResult::Ok(output)
            }
            Err(err) => CliResult::error(line, err.to_string()),
        }
    }

    fn load(&mut self, line: &str, args: &[&str]) -> CliResult {
        let Some(slot_id) = arg(args, 0) else {
            return CliResult::error(line, "Missing slot id.");
        };
        match self.session.load_from(self.slots.as_ref(), slot_id) {
            Ok(transition) => self.report(line, transition),
            Err(err) => CliResult::error(line, err.to_string()),
        }
    }

    fn list_slots(&mut self, line: &str) -> CliResult {
        match self.slots.load() {
            Ok(payload) => {
                let mut output = CommandOutput::new(line, self.state().clone(), Vec::new());
                output.slots = Some(payload.slots.iter().map(SlotSummary::from).collect());
                CliResult::Ok(output)
            }
            Err(err) => CliResult::error(line, err.to_string()),
        }
    }

    fn apply(&mut self, line: &str, action: EngineAction) -> CliResult {
        let transition = self.session.dispatch(action);
        self.report(line, transition)
    }

    fn report(&self, line: &str, transition: Transition) -> CliResult {
        tracing::info!("{} -> {} event(s)", line, transition.events.len());
        let mut output = CommandOutput::new(line, transition.state, transition.events);
        output.rejection = transition
            .rejection
            .map(|rejection| rejection.as_str().to_string());
        CliResult::Ok(output)
    }

    /// Timestamp for an action: the parsed token when given, otherwise empty,
    /// or left for the session to stamp when it does so.
    fn timestamp(&self, token: Option<&str>) -> Option<String> {
        match token {
            Some(token) => Some(parse_timestamp(token)),
            None if self.session.options().stamp_timestamps => None,
            None => Some(String::new()),
        }
    }
}

fn arg<'a>(args: &[&'a str], index: usize) -> Option<&'a str> {
    args.get(index).copied()
}

/// Reads an all-digit token as epoch milliseconds; anything else is kept
/// verbatim.
pub fn parse_timestamp(token: &str) -> String {
    if !token.is_empty()
        && token.bytes().all(|byte| byte.is_ascii_digit())
        && let Some(instant) = token.parse::<i64>().ok().and_then(from_epoch_millis)
    {
        return format_timestamp(instant);
    }
    token.to_string()
}

/// Whole-number grid coordinate. Out-of-range values saturate so the fit
/// check rejects them; fractions and non-numbers are invalid.
fn parse_coordinate(token: &str) -> Option<i32> {
    let value = token.parse::<f64>().ok()?;
    if value.is_nan() || (value.is_finite() && value.fract() != 0.0) {
        return None;
    }
    Some(value as i32)
}

/// Builds simulator input from `key=value` tokens.
///
/// Values that read as JSON (numbers, booleans) keep that type; everything
/// else is a string. Tokens without `=` are ignored.
fn parse_tool_input(tokens: &[&str]) -> Map<String, Value> {
    tokens
        .iter()
        .filter_map(|token| token.split_once('='))
        .map(|(key, raw)| {
            let value = serde_json::from_str::<Value>(raw)
                .unwrap_or_else(|_| Value::String(raw.to_string()));
            (key.to_string(), value)
        })
        .collect()
}
