//! Codex session state shared by the notification and permission paths.

use crate::config::SessionConfig;
use crate::converter::EventConverter;
use crate::events::{DomainEvent, ReasoningOutput, ReasoningStatus};
use crate::permission::{AgentStateStore, CodexPermissionHandler};
use crate::reasoning::ReasoningProcessor;
use serde_json::Value;
use std::sync::Arc;

/// An event surfaced by a [`CodexSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A converted protocol event.
    Domain(DomainEvent),
    /// A reasoning section event.
    Reasoning(ReasoningOutput),
}

/// A Codex session.
///
/// Notifications flow through the converter, and reasoning deltas through the
/// reasoning processor. The permission handler is shared so tool tasks can
/// await approvals while the transport keeps delivering notifications.
pub struct CodexSession<S> {
    converter: EventConverter,
    reasoning: ReasoningProcessor,
    permissions: Arc<CodexPermissionHandler<S>>,
}

impl<S: AgentStateStore> CodexSession<S> {
    /// Creates a session with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, &SessionConfig::default())
    }

    /// Creates a session with the given configuration.
    pub fn with_config(store: S, config: &SessionConfig) -> Self {
        Self {
            converter: EventConverter::new(),
            reasoning: ReasoningProcessor::new(config.reasoning_tool_name.clone()),
            permissions: Arc::new(CodexPermissionHandler::with_config(store, config)),
        }
    }

    /// Handles one notification and returns the resulting session events.
    pub fn handle_notification(&mut self, method: &str, params: &Value) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        for event in self.converter.handle_notification(method, params) {
            let reasoning = match &event {
                DomainEvent::AgentReasoningDelta { delta } => self.reasoning.process_delta(delta),
                DomainEvent::AgentReasoningSectionBreak => self.reasoning.handle_section_break(),
                DomainEvent::TaskComplete { .. } => self.reasoning.finalize(ReasoningStatus::Completed),
                DomainEvent::TurnAborted { .. } | DomainEvent::TaskFailed { .. } => self.reasoning.abort(),
                _ => Vec::new(),
            };
            let closes_turn = matches!(
                event,
                DomainEvent::TaskComplete { .. } | DomainEvent::TurnAborted { .. } | DomainEvent::TaskFailed { .. }
            );
            if closes_turn {
                out.extend(reasoning.into_iter().map(SessionEvent::Reasoning));
                out.push(SessionEvent::Domain(event));
            } else {
                out.push(SessionEvent::Domain(event));
                out.extend(reasoning.into_iter().map(SessionEvent::Reasoning));
            }
        }
        out
    }

    /// Returns true once every started item has completed.
    #[must_use]
    pub fn is_turn_drained(&self) -> bool {
        !self.converter.has_pending_items()
    }

    /// Returns the number of items still streaming.
    #[must_use]
    pub fn pending_item_count(&self) -> usize {
        self.converter.pending_item_count()
    }

    /// Returns a shared handle to the permission handler.
    #[must_use]
    pub fn permissions(&self) -> Arc<CodexPermissionHandler<S>> {
        Arc::clone(&self.permissions)
    }

    /// Resets the session for a new conversation.
    ///
    /// Pending permission waiters are rejected, an open reasoning section is
    /// closed as canceled, and buffered item state is dropped.
    pub fn reset(&mut self) -> Vec<SessionEvent> {
        self.permissions.reset();
        self.converter.reset();
        self.reasoning
            .abort()
            .into_iter()
            .map(SessionEvent::Reasoning)
            .collect()
    }
}
