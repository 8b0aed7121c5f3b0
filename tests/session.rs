//! Integration tests for the Codex session.

use agent_event_bridge::permission::CompletionStatus;
use agent_event_bridge::{
    CodexSession, DomainEvent, InMemoryStateStore, ReasoningOutput, ReasoningStatus, SessionConfig, SessionEvent,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn session() -> (CodexSession<Arc<InMemoryStateStore>>, Arc<InMemoryStateStore>) {
    let store = Arc::new(InMemoryStateStore::new());
    (CodexSession::new(Arc::clone(&store)), store)
}

#[test]
fn test_config_builder() {
    let config = SessionConfig::new()
        .with_reset_completed_reason("Conversation cleared")
        .with_reset_reject_message("cleared")
        .with_reasoning_tool_name("Thinking");
    assert_eq!(config.reset_completed_reason, "Conversation cleared");
    assert_eq!(config.reset_reject_message, "cleared");
    assert_eq!(config.reasoning_tool_name, "Thinking");
    assert_eq!(SessionConfig::default().reasoning_tool_name, "CodexReasoning");
}

#[test]
fn test_reasoning_closes_before_task_complete() {
    let (mut session, _store) = session();
    session.handle_notification("turn/started", &json!({"turn": {"id": "t1"}}));
    let opened = session.handle_notification("item/reasoning/textDelta", &json!({"itemId": "r", "delta": "**Plan**"}));
    assert_eq!(opened.len(), 2);
    assert!(matches!(opened[0], SessionEvent::Domain(DomainEvent::AgentReasoningDelta { .. })));
    assert!(matches!(opened[1], SessionEvent::Reasoning(ReasoningOutput::ToolCall { .. })));

    session.handle_notification("item/reasoning/textDelta", &json!({"itemId": "r", "delta": " read files"}));
    session.handle_notification("item/completed", &json!({"item": {"id": "r", "type": "reasoning"}}));
    assert!(session.is_turn_drained());

    let done = session.handle_notification("turn/completed", &json!({"turn": {"id": "t1"}, "status": "Completed"}));
    assert_eq!(done.len(), 2);
    let SessionEvent::Reasoning(ReasoningOutput::ToolCallResult { output, .. }) = &done[0] else {
        panic!("expected reasoning result first, got {:?}", done[0]);
    };
    assert_eq!(output.content, " read files");
    assert_eq!(output.status, ReasoningStatus::Completed);
    assert_eq!(
        done[1],
        SessionEvent::Domain(DomainEvent::TaskComplete {
            turn_id: Some("t1".to_string())
        })
    );
}

#[test]
fn test_interrupted_turn_cancels_reasoning() {
    let (mut session, _store) = session();
    session.handle_notification("item/reasoning/summaryTextDelta", &json!({"itemId": "r", "delta": "**Look**"}));
    let aborted = session.handle_notification("turn/completed", &json!({"status": "Interrupted"}));
    let SessionEvent::Reasoning(ReasoningOutput::ToolCallResult { output, .. }) = &aborted[0] else {
        panic!("expected reasoning result first, got {:?}", aborted[0]);
    };
    assert_eq!(output.status, ReasoningStatus::Canceled);
    assert_eq!(aborted[1], SessionEvent::Domain(DomainEvent::TurnAborted { turn_id: None }));
}

#[test]
fn test_pending_items_gate_turn_drain() {
    let (mut session, _store) = session();
    session.handle_notification(
        "item/started",
        &json!({"item": {"id": "cmd-1", "type": "commandExecution", "command": "ls"}}),
    );
    assert!(!session.is_turn_drained());
    assert_eq!(session.pending_item_count(), 1);
    session.handle_notification("item/completed", &json!({"item": {"id": "cmd-1", "type": "commandExecution"}}));
    assert!(session.is_turn_drained());
}

#[tokio::test]
async fn test_reset_cancels_permissions_and_state() {
    let store = Arc::new(InMemoryStateStore::new());
    let config = SessionConfig::new().with_reset_reject_message("cleared");
    let mut session = CodexSession::with_config(Arc::clone(&store), &config);
    let pending = session
        .permissions()
        .handle_tool_call("call-1", "shell", json!({}))
        .expect("register");
    session.handle_notification("item/agentMessage/delta", &json!({"itemId": "m", "delta": "partial"}));

    let closed = session.reset();
    assert!(closed.is_empty());
    assert!(session.is_turn_drained());

    let err = pending.await.expect_err("canceled");
    assert_eq!(err.to_string(), "permission request canceled: cleared");
    assert_eq!(
        store.snapshot().completed_requests["call-1"].completion.status,
        CompletionStatus::Canceled
    );
}
