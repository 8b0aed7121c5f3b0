//! Application state records mirrored by the permission lifecycle.
//!
//! Pending requests are written under `requests` when registered and moved to
//! `completedRequests` once they resolve or are canceled, so a UI can render
//! them and a resumed session can tell what was still outstanding.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Terminal status of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    /// The request was approved.
    Approved,
    /// The request was denied.
    Denied,
    /// The request was canceled before a response arrived.
    Canceled,
}

/// The decision delivered for a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Allow this invocation.
    Approved,
    /// Allow this and matching invocations for the rest of the session.
    ApprovedForSession,
    /// Deny this invocation and let the agent continue.
    Denied,
    /// Deny this invocation and stop the turn.
    Abort,
}

impl Decision {
    /// Parses a wire decision, returning `None` for unrecognized values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "approved" => Some(Self::Approved),
            "approved_for_session" => Some(Self::ApprovedForSession),
            "denied" => Some(Self::Denied),
            "abort" => Some(Self::Abort),
            _ => None,
        }
    }
}

/// The outcome of a request, as recorded in the state store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCompletion {
    /// Terminal status.
    pub status: CompletionStatus,
    /// Free-form reason supplied with the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Permission mode selected with the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Decision delivered to the waiter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    /// Tools allowed for the rest of the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_tools: Option<Vec<String>>,
    /// Answers to questions asked through the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<BTreeMap<String, Vec<String>>>,
}

impl PermissionCompletion {
    /// Creates a completion with only a status.
    #[must_use]
    pub const fn new(status: CompletionStatus) -> Self {
        Self {
            status,
            reason: None,
            mode: None,
            decision: None,
            allow_tools: None,
            answers: None,
        }
    }

    /// Sets the decision.
    #[must_use]
    pub const fn with_decision(mut self, decision: Decision) -> Self {
        self.decision = Some(decision);
        self
    }

    /// Sets the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }
}

/// A request that is waiting for a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    /// The tool the agent wants to run.
    pub tool: String,
    /// The tool input.
    pub arguments: Value,
    /// Registration time in epoch milliseconds.
    pub created_at: i64,
}

/// A request that has resolved or been canceled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedRequestRecord {
    /// The tool the agent wanted to run.
    pub tool: String,
    /// The tool input.
    pub arguments: Value,
    /// Registration time in epoch milliseconds.
    pub created_at: i64,
    /// Completion time in epoch milliseconds.
    pub completed_at: i64,
    /// The recorded outcome.
    #[serde(flatten)]
    pub completion: PermissionCompletion,
}

impl CompletedRequestRecord {
    /// Completes a pending record with the given outcome.
    #[must_use]
    pub fn from_request(request: RequestRecord, completion: PermissionCompletion, completed_at: i64) -> Self {
        Self {
            tool: request.tool,
            arguments: request.arguments,
            created_at: request.created_at,
            completed_at,
            completion,
        }
    }
}

/// The slice of agent state owned by the permission lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentState {
    /// Requests waiting for a response, by request id.
    #[serde(default)]
    pub requests: BTreeMap<String, RequestRecord>,
    /// Requests that resolved or were canceled, by request id.
    #[serde(default)]
    pub completed_requests: BTreeMap<String, CompletedRequestRecord>,
}

/// A store that applies read-modify-write updates to [`AgentState`].
///
/// Implementations must apply each update atomically.
pub trait AgentStateStore {
    /// Applies `apply` to the current state.
    fn update(&self, apply: &mut dyn FnMut(&mut AgentState));
}

impl<T: AgentStateStore + ?Sized> AgentStateStore for Arc<T> {
    fn update(&self, apply: &mut dyn FnMut(&mut AgentState)) {
        (**self).update(apply);
    }
}

/// A mutex-guarded in-memory [`AgentStateStore`].
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    state: Mutex<AgentState>,
}

impl InMemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> AgentState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AgentStateStore for InMemoryStateStore {
    fn update(&self, apply: &mut dyn FnMut(&mut AgentState)) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut state);
    }
}
