//! Deterministic stand-ins for real tool execution.
//!
//! [`simulate`] fabricates a plausible output record for the handful of tools
//! the game knows about and wraps it in a single evidence block. The result is
//! a [`ToolEvent`] that hosts dispatch back through `invoke_tool`.

use serde_json::{Map, Number, Value, json};

use crate::event::ToolEvent;
use crate::rng::{RandomSource, SeededRng};
use crate::state::{ContextBlock, ContextBlockKind, ToolDefinition};

const DEFAULT_VIEWPORT_WIDTH: i64 = 1280;
const DEFAULT_VIEWPORT_HEIGHT: i64 = 720;
const DEFAULT_BUILD_TARGET: &str = "web";
const DEFAULT_TEST_SUITE: &str = "unit";

const EVIDENCE_WIDTH: u32 = 2;
const EVIDENCE_HEIGHT: u32 = 1;
const EVIDENCE_FIDELITY: f64 = 0.85;
const EVIDENCE_NOISE: f64 = 0.15;

/// Tools with a dedicated output generator, keyed by lower-cased name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
enum SimulatedTool {
    DomSnapshot,
    Build,
    Test,
}

/// Draws from a constant, non-empty range.
fn draw(rng: &mut SeededRng, min: i64, max: i64) -> i64 {
    rng.next_int(min, max).unwrap_or(min)
}

/// Reads a numeric input field the way a loose numeric cast would: booleans
/// count as 0/1 and blank strings as 0. Unreadable values yield `None`, which
/// is written as `null`.
fn numeric_input(input: &Map<String, Value>, key: &str, default: i64) -> Option<Number> {
    let parsed = match input.get(key) {
        None | Some(Value::Null) => return Some(Number::from(default)),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) if text.trim().is_empty() => Some(0.0),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(Value::Bool(flag)) => Some(if *flag { 1.0 } else { 0.0 }),
        Some(_) => None,
    };
    let value = parsed.filter(|value| value.is_finite())?;
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

fn display_number(number: Option<&Number>) -> String {
    number.map_or_else(|| "NaN".to_string(), Number::to_string)
}

fn string_input<'a>(input: &'a Map<String, Value>, key: &str, default: &'a str) -> &'a str {
    input.get(key).and_then(Value::as_str).unwrap_or(default)
}

fn into_record(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn dom_snapshot_output(rng: &mut SeededRng, input: &Map<String, Value>, event_id: &str) -> Value {
    let width = numeric_input(input, "viewportWidth", DEFAULT_VIEWPORT_WIDTH);
    let height = numeric_input(input, "viewportHeight", DEFAULT_VIEWPORT_HEIGHT);
    let nodes = draw(rng, 120, 240);
    json!({
        "snapshotId": format!("snap_{event_id}"),
        "nodes": nodes,
        "viewport": { "width": width, "height": height },
        "summary": format!(
            "Captured {nodes} nodes at {}x{}.",
            display_number(width.as_ref()),
            display_number(height.as_ref())
        ),
    })
}

fn build_output(rng: &mut SeededRng, input: &Map<String, Value>) -> Value {
    let duration_ms = draw(rng, 1800, 4200);
    let warnings = draw(rng, 0, 3);
    let target = string_input(input, "target", DEFAULT_BUILD_TARGET);
    json!({
        "status": "success",
        "target": target,
        "durationMs": duration_ms,
        "warnings": warnings,
        "artifacts": [format!("dist/{target}/bundle.js")],
    })
}

fn test_output(rng: &mut SeededRng, input: &Map<String, Value>) -> Value {
    let total = draw(rng, 12, 24);
    let failed = draw(rng, 0, 2);
    let duration_ms = draw(rng, 450, 1200);
    let suite = string_input(input, "suite", DEFAULT_TEST_SUITE);
    json!({
        "status": if failed > 0 { "failed" } else { "passed" },
        "suite": suite,
        "total": total,
        "passed": total - failed,
        "failed": failed,
        "durationMs": duration_ms,
    })
}

fn tool_output(
    tool_name: &str,
    rng: &mut SeededRng,
    input: &Map<String, Value>,
    event_id: &str,
) -> Value {
    match tool_name.parse::<SimulatedTool>() {
        Ok(SimulatedTool::DomSnapshot) => dom_snapshot_output(rng, input, event_id),
        Ok(SimulatedTool::Build) => build_output(rng, input),
        Ok(SimulatedTool::Test) => test_output(rng, input),
        Err(_) => json!({
            "status": "unsupported",
            "message": format!("Tool {tool_name} is not simulated."),
        }),
    }
}

fn evidence_block(id: String, tool_name: &str, content: String) -> ContextBlock {
    ContextBlock::new(id, ContextBlockKind::Tool, content)
        .with_size(EVIDENCE_WIDTH, EVIDENCE_HEIGHT)
        .with_quality(EVIDENCE_FIDELITY, EVIDENCE_NOISE)
        .with_source(tool_name)
}

/// Simulates invoking `tool` with `input`.
///
/// The same `(tool, input, seed)` always yields an identical event.
pub fn simulate(tool: &ToolDefinition, input: &Map<String, Value>, seed: &str) -> ToolEvent {
    let mut rng = SeededRng::new(&format!("{seed}:{}:{}", tool.id, tool.name));
    let event_id = format!("tool_evt_{}", draw(&mut rng, 1000, 9999));
    let output = into_record(tool_output(&tool.name, &mut rng, input, &event_id));
    let content = serde_json::to_string_pretty(&output).unwrap_or_default();

    ToolEvent {
        evidence_blocks: vec![evidence_block(
            format!("evidence_{event_id}_0"),
            &tool.name,
            content,
        )],
        id: event_id,
        tool_id: tool.id.clone(),
        tool_name: tool.name.clone(),
        input: input.clone(),
        output,
    }
}
