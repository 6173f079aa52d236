use quest_content::ContentFactory;
use quest_core::{EngineAction, EngineEventKind, RunOutcome, RunStatus};
use quest_runtime::{FixedClock, InMemorySlotRepo, Session, SessionOptions, SlotRepository};
use serde_json::{Map, json};

fn create_session(auto_complete: bool) -> Session {
    let options = SessionOptions {
        seed: "player-42".into(),
        stamp_timestamps: true,
        auto_complete,
    };
    Session::from_content(&ContentFactory::builtin(), options)
        .expect("builtin content should load")
        .with_clock(FixedClock::from_epoch_millis(1_700_000_000_000).expect("valid instant"))
}

/// A full run on the builtin catalog: variant assignment, tool use until the
/// target score, automatic completion, then a save and restore.
#[test]
fn test_complete_run_scenario() {
    let mut session = create_session(true);
    let factory_catalog = ContentFactory::builtin()
        .load_catalog()
        .expect("builtin catalog should load");

    // ================================================================
    // PHASE 1: Variant assignment
    // ================================================================
    let variants = factory_catalog.variants_for("ticket-2");
    let variant = session
        .assign_variant("ticket-2", variants)
        .expect("ticket-2 offers two variants");

    assert_eq!(session.state().selected_ticket_id.as_deref(), Some("ticket-2"));
    assert_eq!(session.state().selected_model_id(), Some(variant.model.id.as_str()));

    // ================================================================
    // PHASE 2: Run until the target score
    // ================================================================
    session.dispatch(EngineAction::start_run());
    for _ in 0..4 {
        let transition = session.dispatch(EngineAction::use_tool("tool-build"));
        assert!(!transition.is_rejected());
    }

    let state = session.state();
    assert_eq!(state.run_state.status, RunStatus::Completed);
    assert_eq!(state.run_state.score, 4.0);
    assert_eq!(state.run_state.remaining_tools, 2);
    // 4 tool uses at 80 credits, then the success reward.
    assert_eq!(state.economy.credits, 1240 - 4 * 80 + 120);
    assert_eq!(session.outcome(), RunOutcome::Success);

    let completed = session
        .events()
        .iter()
        .filter(|event| event.kind == EngineEventKind::RunCompleted)
        .count();
    assert_eq!(completed, 1);
    assert!(
        session
            .events()
            .iter()
            .all(|event| event.timestamp == "2023-11-14T22:13:20.000Z")
    );

    // ================================================================
    // PHASE 3: Save, diverge, restore
    // ================================================================
    let repo = InMemorySlotRepo::new();
    let slot = session.save_to(&repo, "  ").expect("save should succeed");
    assert_eq!(slot.name, "Snapshot 1");
    assert_eq!(slot.saved_at, "2023-11-14T22:13:20.000Z");

    let saved_state = session.state().clone();
    session.dispatch(EngineAction::start_run());
    assert!(session.state().run_state.is_running());

    session
        .load_from(&repo, &slot.id)
        .expect("slot should restore");
    assert_eq!(session.state(), &saved_state);
    assert_eq!(repo.load().expect("payload").slots.len(), 1);
}

#[test]
fn test_simulated_tools_feed_invoke_tool() {
    let mut session = create_session(false);
    let input: Map<_, _> = json!({ "target": "node" })
        .as_object()
        .cloned()
        .expect("object literal");

    let first = session
        .simulate_tool("tool-build", &input)
        .expect("tool-build exists");
    let second = session
        .simulate_tool("tool-build", &input)
        .expect("tool-build exists");

    assert_eq!(first.events[0].kind, EngineEventKind::ToolInvoked);
    assert_eq!(first.events[0].payload["toolId"], "tool-build");
    // Evidence blocks from both invocations land on the board.
    let evidence = session
        .state()
        .blocks
        .iter()
        .filter(|block| block.source.as_deref() == Some("build"))
        .count();
    assert_eq!(evidence, 2);
    assert_eq!(second.events[0].id, "evt_2");
}

#[test]
fn test_snapshot_restore_round_trip() {
    let mut session = create_session(false);
    session.dispatch(EngineAction::select_ticket("ticket-3"));
    let snapshot = session.snapshot();

    session.dispatch(EngineAction::select_ticket("ticket-5"));
    session.restore(snapshot);

    assert_eq!(session.state().selected_ticket_id.as_deref(), Some("ticket-3"));
}
