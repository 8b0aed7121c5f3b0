//! Stateful conversion of app-server notifications into domain events.
//!
//! Items stream their content as deltas between an `item/started` and an
//! `item/completed` notification. The converter buffers message and output
//! deltas per item id and emits a single terminal event once the item
//! completes. Reasoning deltas are the exception: they are forwarded as they
//! arrive.

use crate::events::DomainEvent;
use crate::notification::{ItemKind, NotificationMethod};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Per-item accumulation state for an item that has not completed yet.
#[derive(Debug, Clone)]
struct PendingItem {
    kind: ItemKind,
    buffer: String,
    command: Option<String>,
}

impl PendingItem {
    const fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            buffer: String::new(),
            command: None,
        }
    }
}

/// Converts notifications into [`DomainEvent`]s.
///
/// One converter belongs to one session; it owns the pending-item map and
/// nothing else.
#[derive(Debug, Default)]
pub struct EventConverter {
    pending_items: HashMap<String, PendingItem>,
}

impl EventConverter {
    /// Creates a converter with no pending items.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles one notification and returns the events it produces.
    ///
    /// Unknown method names and payloads missing the fields a rule needs
    /// produce no events.
    pub fn handle_notification(&mut self, method: &str, params: &Value) -> Vec<DomainEvent> {
        let Ok(method) = method.parse::<NotificationMethod>() else {
            debug!(method, "ignoring unknown notification");
            return Vec::new();
        };
        let mut events = Vec::new();
        match method {
            NotificationMethod::ThreadStarted | NotificationMethod::ThreadResumed => {
                parse_thread_started(params, &mut events);
            }
            NotificationMethod::TurnStarted => events.push(DomainEvent::TaskStarted {
                turn_id: turn_id(params),
            }),
            NotificationMethod::TurnCompleted => parse_turn_completed(params, &mut events),
            NotificationMethod::TurnDiffUpdated => parse_turn_diff(params, &mut events),
            NotificationMethod::ItemStarted => self.handle_item_started(params, &mut events),
            NotificationMethod::ItemCompleted => self.handle_item_completed(params, &mut events),
            NotificationMethod::AgentMessageDelta
            | NotificationMethod::CommandExecutionOutputDelta
            | NotificationMethod::FileChangeOutputDelta
            | NotificationMethod::ReasoningTextDelta
            | NotificationMethod::ReasoningSummaryTextDelta => {
                if let Some(kind) = method.delta_kind() {
                    self.handle_delta(kind, params, &mut events);
                }
            }
            NotificationMethod::ReasoningSummaryPartAdded => {
                events.push(DomainEvent::AgentReasoningSectionBreak);
            }
            NotificationMethod::Error => parse_error(params, &mut events),
        }
        events
    }

    /// Returns true if any started item has not completed yet.
    #[must_use]
    pub fn has_pending_items(&self) -> bool {
        !self.pending_items.is_empty()
    }

    /// Returns the number of started items that have not completed yet.
    #[must_use]
    pub fn pending_item_count(&self) -> usize {
        self.pending_items.len()
    }

    /// Drops all pending item state.
    pub fn reset(&mut self) {
        self.pending_items.clear();
    }

    fn handle_item_started(&mut self, params: &Value, events: &mut Vec<DomainEvent>) {
        let Some(item) = params.get("item") else {
            return;
        };
        let Some(id) = item.get("id").and_then(Value::as_str) else {
            return;
        };
        let kind = item_kind(item).unwrap_or_else(|| ItemKind::Other(String::new()));
        let command = extract_command(item);
        let pending = self
            .pending_items
            .entry(id.to_string())
            .or_insert_with(|| PendingItem::new(kind.clone()));
        pending.kind = kind.clone();
        pending.command.clone_from(&command);

        match kind {
            ItemKind::CommandExecution => events.push(DomainEvent::ExecCommandBegin {
                call_id: id.to_string(),
                command: command.unwrap_or_default(),
            }),
            ItemKind::FileChange => events.push(DomainEvent::PatchApplyBegin {
                call_id: id.to_string(),
                changes: item.get("changes").cloned().unwrap_or(Value::Null),
            }),
            _ => {}
        }
    }

    fn handle_delta(&mut self, kind: ItemKind, params: &Value, events: &mut Vec<DomainEvent>) {
        let Some(id) = params.get("itemId").and_then(Value::as_str) else {
            return;
        };
        let delta = params.get("delta").and_then(Value::as_str).unwrap_or("");
        let is_reasoning = kind == ItemKind::Reasoning;
        self.pending_items
            .entry(id.to_string())
            .or_insert_with(|| PendingItem::new(kind))
            .buffer
            .push_str(delta);
        if is_reasoning {
            events.push(DomainEvent::AgentReasoningDelta {
                delta: delta.to_string(),
            });
        }
    }

    fn handle_item_completed(&mut self, params: &Value, events: &mut Vec<DomainEvent>) {
        let Some(item) = params.get("item") else {
            return;
        };
        let Some(id) = item.get("id").and_then(Value::as_str) else {
            return;
        };
        let pending = self.pending_items.remove(id);
        let kind = item_kind(item)
            .or_else(|| pending.as_ref().map(|p| p.kind.clone()))
            .unwrap_or_else(|| ItemKind::Other(String::new()));
        let (buffer, started_command) =
            pending.map_or_else(|| (String::new(), None), |p| (p.buffer, p.command));

        match kind {
            ItemKind::AgentMessage => {
                let message = if buffer.is_empty() {
                    string_field(item, "text").unwrap_or_default()
                } else {
                    buffer
                };
                events.push(DomainEvent::AgentMessage { message });
            }
            ItemKind::CommandExecution => {
                let output = if buffer.is_empty() {
                    string_field(item, "aggregatedOutput").unwrap_or_default()
                } else {
                    buffer
                };
                events.push(DomainEvent::ExecCommandEnd {
                    call_id: id.to_string(),
                    command: started_command
                        .or_else(|| extract_command(item))
                        .unwrap_or_default(),
                    output,
                    exit_code: item.get("exitCode").and_then(Value::as_i64),
                });
            }
            ItemKind::FileChange => {
                let success = item
                    .get("status")
                    .and_then(Value::as_str)
                    .is_none_or(|status| status.eq_ignore_ascii_case("completed"));
                events.push(DomainEvent::PatchApplyEnd {
                    call_id: id.to_string(),
                    output: buffer,
                    success,
                });
            }
            ItemKind::Reasoning | ItemKind::Other(_) => {}
        }
    }
}

fn parse_thread_started(params: &Value, events: &mut Vec<DomainEvent>) {
    let thread_id = params
        .get("thread")
        .and_then(|thread| thread.get("id"))
        .or_else(|| params.get("threadId"))
        .and_then(Value::as_str);
    if let Some(thread_id) = thread_id {
        events.push(DomainEvent::ThreadStarted {
            thread_id: thread_id.to_string(),
        });
    }
}

fn parse_turn_completed(params: &Value, events: &mut Vec<DomainEvent>) {
    let turn = params.get("turn");
    let status = params
        .get("status")
        .or_else(|| turn.and_then(|t| t.get("status")))
        .and_then(Value::as_str)
        .unwrap_or("");
    let turn_id = turn_id(params);
    if status.eq_ignore_ascii_case("completed") {
        events.push(DomainEvent::TaskComplete { turn_id });
    } else if status.eq_ignore_ascii_case("interrupted") {
        events.push(DomainEvent::TurnAborted { turn_id });
    } else if status.eq_ignore_ascii_case("failed") {
        let error = failure_message(params).unwrap_or_else(|| "Turn failed".to_string());
        events.push(DomainEvent::TaskFailed { turn_id, error });
    } else {
        debug!(status, "ignoring turn completion with unknown status");
    }
}

fn parse_turn_diff(params: &Value, events: &mut Vec<DomainEvent>) {
    if let Some(diff) = string_field(params, "diff") {
        events.push(DomainEvent::TurnDiff { unified_diff: diff });
    }
}

fn parse_error(params: &Value, events: &mut Vec<DomainEvent>) {
    let message = params
        .get("error")
        .and_then(|error| error.get("message"))
        .or_else(|| params.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("Unknown error")
        .to_string();
    let will_retry = params
        .get("willRetry")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    events.push(DomainEvent::Error {
        message,
        will_retry,
    });
}

fn turn_id(params: &Value) -> Option<String> {
    params
        .get("turn")
        .and_then(|turn| turn.get("id"))
        .or_else(|| params.get("turnId"))
        .and_then(Value::as_str)
        .map(String::from)
}

fn failure_message(params: &Value) -> Option<String> {
    let turn_error = params
        .get("turn")
        .and_then(|turn| turn.get("error"))
        .and_then(|error| error.get("message"));
    params
        .get("message")
        .or(turn_error)
        .or_else(|| params.get("error").and_then(|error| error.get("message")))
        .and_then(Value::as_str)
        .map(String::from)
}

fn item_kind(item: &Value) -> Option<ItemKind> {
    item.get("type")
        .and_then(Value::as_str)
        .map(ItemKind::from_type)
}

fn extract_command(item: &Value) -> Option<String> {
    match item.get("command")? {
        Value::String(command) => Some(command.clone()),
        Value::Array(parts) => Some(
            parts
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        ),
        _ => None,
    }
}

fn string_field(json: &Value, key: &str) -> Option<String> {
    json.get(key).and_then(Value::as_str).map(String::from)
}
