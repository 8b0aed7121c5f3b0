//! Integration tests for reasoning section grouping.

use agent_event_bridge::{ReasoningInput, ReasoningOutput, ReasoningProcessor, ReasoningResult, ReasoningStatus};
use pretty_assertions::assert_eq;

fn feed(processor: &mut ReasoningProcessor, deltas: &[&str]) -> Vec<ReasoningOutput> {
    deltas.iter().flat_map(|delta| processor.process_delta(delta)).collect()
}

#[test]
fn test_finalize_completed_closes_titled_section() {
    let mut processor = ReasoningProcessor::default();
    let mut events = feed(&mut processor, &["**", "Foo", "**", " bar"]);
    assert_eq!(events.len(), 1);
    assert!(processor.has_open_section());

    events.extend(processor.finalize(ReasoningStatus::Completed));
    assert_eq!(events.len(), 2);

    let ReasoningOutput::ToolCall { call_id, name, input } = &events[0] else {
        panic!("expected tool-call, got {:?}", events[0]);
    };
    assert_eq!(name, "CodexReasoning");
    assert_eq!(
        input,
        &ReasoningInput {
            title: "Foo".to_string()
        }
    );
    assert_eq!(
        events[1],
        ReasoningOutput::ToolCallResult {
            call_id: call_id.clone(),
            output: ReasoningResult {
                content: " bar".to_string(),
                status: ReasoningStatus::Completed,
            },
        }
    );
    assert!(!processor.has_open_section());
}

#[test]
fn test_finalize_canceled_closes_titled_section() {
    let mut processor = ReasoningProcessor::default();
    let mut events = feed(&mut processor, &["**", "Foo", "**"]);
    events.extend(processor.finalize(ReasoningStatus::Canceled));

    assert_eq!(events.len(), 2);
    let ReasoningOutput::ToolCallResult { output, .. } = &events[1] else {
        panic!("expected tool-call-result, got {:?}", events[1]);
    };
    assert_eq!(output.status, ReasoningStatus::Canceled);
    assert_eq!(events[0].call_id(), events[1].call_id());
}

#[test]
fn test_untitled_text_is_plain_reasoning() {
    let mut processor = ReasoningProcessor::default();
    assert!(feed(&mut processor, &["thinking ", "about it"]).is_empty());
    assert_eq!(
        processor.handle_section_break(),
        vec![ReasoningOutput::Reasoning {
            text: "thinking about it".to_string()
        }]
    );
    assert!(processor.finalize(ReasoningStatus::Completed).is_empty());
}

#[test]
fn test_abort_drops_untitled_text() {
    let mut processor = ReasoningProcessor::default();
    feed(&mut processor, &["half a thought"]);
    assert!(processor.abort().is_empty());
}

#[test]
fn test_sections_get_distinct_call_ids() {
    let mut processor = ReasoningProcessor::new("Thinking");
    let mut events = feed(&mut processor, &["**One**", "a"]);
    events.extend(processor.handle_section_break());
    events.extend(feed(&mut processor, &["**Two**", "b"]));
    events.extend(processor.finalize(ReasoningStatus::Completed));

    assert_eq!(events.len(), 4);
    assert_eq!(events[0].call_id(), events[1].call_id());
    assert_eq!(events[2].call_id(), events[3].call_id());
    assert_ne!(events[0].call_id(), events[2].call_id());
    assert!(matches!(&events[2], ReasoningOutput::ToolCall { name, .. } if name == "Thinking"));
}

#[test]
fn test_reasoning_output_wire_format() {
    let output = ReasoningOutput::ToolCallResult {
        call_id: "c1".to_string(),
        output: ReasoningResult {
            content: "body".to_string(),
            status: ReasoningStatus::Canceled,
        },
    };
    assert_eq!(
        serde_json::to_value(&output).unwrap_or_default(),
        serde_json::json!({
            "type": "tool-call-result",
            "callId": "c1",
            "output": {"content": "body", "status": "canceled"}
        })
    );
}

#[test]
fn test_second_title_stays_in_open_section() {
    let mut processor = ReasoningProcessor::default();
    let events = feed(&mut processor, &["**Plan**", " step one ", "**Check**", " step two"]);
    assert_eq!(events.len(), 1);

    let closed = processor.finalize(ReasoningStatus::Completed);
    let [ReasoningOutput::ToolCallResult { output, .. }] = closed.as_slice() else {
        panic!("expected a single tool-call-result, got {closed:?}");
    };
    assert_eq!(output.content, " step one **Check** step two");

    let reopened = feed(&mut processor, &["**Check**"]);
    assert!(matches!(&reopened[..], [ReasoningOutput::ToolCall { input, .. }] if input.title == "Check"));
}
