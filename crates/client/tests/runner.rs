use quest_client::{CliResult, CliRunner};
use quest_content::ContentFactory;
use quest_core::{ContextBlockKind, EngineEventKind, ModelProvider, RunStatus};
use quest_runtime::{FileSlotRepository, InMemorySlotRepo, Session, SessionOptions};
use serde_json::Value;

fn create_runner() -> CliRunner {
    let state = ContentFactory::builtin()
        .initial_state()
        .expect("builtin content should load");
    CliRunner::new(
        Session::new(state, SessionOptions::default()),
        Box::new(InMemorySlotRepo::new()),
    )
}

fn run(runner: &mut CliRunner, line: &str) -> Value {
    let result = runner.handle_line(line).expect("command should produce output");
    serde_json::from_str(&result.to_json().expect("result should encode")).expect("valid json")
}

fn expect_error(runner: &mut CliRunner, line: &str, message: &str) {
    let output = run(runner, line);
    assert_eq!(output["ok"], false, "{line}");
    assert_eq!(output["command"], line.trim());
    assert_eq!(output["error"], message, "{line}");
}

#[test]
fn test_blank_lines_produce_nothing() {
    let mut runner = create_runner();
    assert!(runner.handle_line("").is_none());
    assert!(runner.handle_line("   \t ").is_none());
}

#[test]
fn test_state_reports_without_events() {
    let mut runner = create_runner();
    let output = run(&mut runner, "  state  ");

    assert_eq!(output["ok"], true);
    assert_eq!(output["command"], "state");
    assert_eq!(output["events"], Value::Array(Vec::new()));
    assert_eq!(output["state"]["grid"]["rows"], 3);
    assert_eq!(output["state"]["economy"]["credits"], 1240);
}

#[test]
fn test_timestamps() {
    let mut runner = create_runner();

    let output = run(&mut runner, "tick 0");
    assert_eq!(output["events"][0]["timestamp"], "1970-01-01T00:00:00.000Z");

    let output = run(&mut runner, "tick 2024-05-01T10:00:00Z");
    assert_eq!(output["events"][0]["timestamp"], "2024-05-01T10:00:00Z");

    let output = run(&mut runner, "tick");
    assert_eq!(output["events"][0]["timestamp"], "");
    assert_eq!(output["events"][0]["id"], "evt_3");
}

#[test]
fn test_parse_errors() {
    let mut runner = create_runner();

    expect_error(&mut runner, "ticket open ticket-1", "Unknown ticket command.");
    expect_error(&mut runner, "ticket select", "Missing ticket id.");
    expect_error(&mut runner, "model pick x", "Unknown model command.");
    expect_error(&mut runner, "model select", "Missing model id.");
    expect_error(&mut runner, "block move memory 0 0", "Unknown block command.");
    expect_error(&mut runner, "block place memory 0", "Missing block arguments.");
    expect_error(&mut runner, "block place memory a 0", "Invalid grid position.");
    expect_error(&mut runner, "block place memory 3 0", "Block does not fit grid.");
    expect_error(&mut runner, "block place memory -1 0", "Block does not fit grid.");
    expect_error(&mut runner, "run stop", "Unknown run command.");
    expect_error(&mut runner, "tool drop x", "Unknown tool command.");
    expect_error(&mut runner, "tool use", "Missing tool id.");
    expect_error(&mut runner, "dance", "Unknown command.");

    // None of the above reached the reducer.
    assert_eq!(runner.state().event_counter, 0);
}

#[test]
fn test_model_select() {
    let mut runner = create_runner();

    run(&mut runner, "model select my-model 5");
    let model = runner.state().model.clone().expect("model selected");
    assert_eq!(model.id, "my-model");
    assert_eq!(model.name, "my-model");
    assert_eq!(model.provider, ModelProvider::Custom);

    let output = run(&mut runner, "model select NULL");
    assert_eq!(output["events"][0]["type"], "model_selected");
    assert!(runner.state().model.is_none());
}

#[test]
fn test_block_place_numbers_blocks() {
    let mut runner = create_runner();
    let seeded = runner.state().blocks.len();

    run(&mut runner, "block place Memory 0 0");
    expect_error(&mut runner, "block place memory 9 9", "Block does not fit grid.");
    run(&mut runner, "block place gadget 2 3 release notes draft");

    let blocks = &runner.state().blocks[seeded..];
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].id, "block_1");
    assert_eq!(blocks[0].kind, ContextBlockKind::Memory);
    assert_eq!(blocks[0].content, "memory block block_1");
    assert_eq!(blocks[1].id, "block_2");
    assert_eq!(blocks[1].kind, ContextBlockKind::Reference);
    assert_eq!(blocks[1].content, "release notes draft");
    assert_eq!((blocks[1].width, blocks[1].height), (1, 1));
}

#[test]
fn test_run_lifecycle_and_rejections() {
    let mut runner = create_runner();

    let output = run(&mut runner, "tool use tool-build");
    assert_eq!(output["ok"], true);
    assert_eq!(output["rejection"], "run_not_active");
    assert_eq!(output["events"], Value::Array(Vec::new()));

    run(&mut runner, "run start 1000");
    let output = run(&mut runner, "tool use tool-build 2000");
    assert!(output.get("rejection").is_none());
    assert_eq!(output["events"][0]["type"], "tool_invoked");
    assert_eq!(output["state"]["runState"]["remainingTools"], 5);

    let output = run(&mut runner, "run complete 3000");
    assert_eq!(output["events"][0]["type"], "run_completed");
    assert_eq!(output["events"][0]["payload"]["outcome"], "partial");
    assert_eq!(runner.state().run_state.status, RunStatus::Completed);

    let credits = runner.state().economy.credits;
    let output = run(&mut runner, "run complete");
    assert!(output.get("rejection").is_none());
    assert_eq!(output["events"][0]["type"], "run_completed");
    assert_eq!(runner.state().economy.credits, credits + 40);
}

#[test]
fn test_tool_sim_dispatches_invoke_tool() {
    let mut runner = create_runner();

    let output = run(&mut runner, "tool sim tool-dom-snapshot viewportWidth=1024 viewportHeight=768");
    let event = &output["events"][0];
    assert_eq!(event["type"], "tool_invoked");
    assert_eq!(event["payload"]["output"]["viewport"]["width"], 1024);

    let result = runner.handle_line("tool sim missing-tool").expect("output");
    assert!(matches!(result, CliResult::Err(error) if error.error.contains("missing-tool")));
    assert!(
        runner
            .session()
            .events()
            .iter()
            .all(|event| event.kind == EngineEventKind::ToolInvoked)
    );
}

#[test]
fn test_save_list_and_load_slots() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = ContentFactory::builtin()
        .initial_state()
        .expect("builtin content should load");
    let repo = FileSlotRepository::new(dir.path()).expect("repository");
    let mut runner = CliRunner::new(
        Session::new(state, SessionOptions::default()),
        Box::new(repo),
    );

    run(&mut runner, "ticket select ticket-4");
    let output = run(&mut runner, "save before the run");
    assert_eq!(output["slot"]["name"], "before the run");
    let slot_id = output["slot"]["id"].as_str().expect("slot id").to_string();

    let output = run(&mut runner, "save");
    assert_eq!(output["slot"]["name"], "Snapshot 2");

    let output = run(&mut runner, "slots");
    let names: Vec<_> = output["slots"]
        .as_array()
        .expect("slot list")
        .iter()
        .map(|slot| slot["name"].as_str().expect("name").to_string())
        .collect();
    assert_eq!(names, ["Snapshot 2", "before the run"]);

    run(&mut runner, "ticket select ticket-6");
    run(&mut runner, &format!("load {slot_id}"));
    assert_eq!(runner.state().selected_ticket_id.as_deref(), Some("ticket-4"));

    expect_error(&mut runner, "load", "Missing slot id.");
    let output = run(&mut runner, "load slot-nope");
    assert_eq!(output["ok"], false);
}
