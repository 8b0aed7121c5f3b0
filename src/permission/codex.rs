//! Permission handling for Codex tool approvals.
//!
//! Codex identifies each approval by its tool call id, so responses correlate
//! directly and carry a simple approve/deny flag plus an optional decision.

use super::{
    AgentStateStore, CancelOptions, CompletionStatus, Decision, PendingPermission, PendingRequest,
    PermissionCompletion, PermissionLifecycleManager, PermissionPolicy, PermissionResponse, Resolution,
};
use crate::config::SessionConfig;
use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// A permission response sent by the client for a Codex tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodexPermissionResponse {
    /// The tool call id being answered.
    pub id: String,
    /// Whether the tool call is allowed.
    pub approved: bool,
    /// A finer-grained decision; unrecognized values are ignored.
    #[serde(default, deserialize_with = "lenient_decision", skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    /// Free-form reason supplied by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CodexPermissionResponse {
    /// Creates an approving response.
    #[must_use]
    pub fn approved(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            approved: true,
            decision: None,
            reason: None,
        }
    }

    /// Creates a denying response.
    #[must_use]
    pub fn denied(id: impl Into<String>) -> Self {
        Self {
            approved: false,
            ..Self::approved(id)
        }
    }

    /// Sets the requested decision.
    #[must_use]
    pub const fn with_decision(mut self, decision: Decision) -> Self {
        self.decision = Some(decision);
        self
    }

    /// Sets the reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl PermissionResponse for CodexPermissionResponse {
    fn id(&self) -> &str {
        &self.id
    }
}

fn lenient_decision<'de, D>(deserializer: D) -> std::result::Result<Option<Decision>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_str).and_then(Decision::parse))
}

/// The result delivered to a Codex tool call awaiting permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionResult {
    /// The decision to apply.
    pub decision: Decision,
    /// Free-form reason supplied by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Maps Codex approve/deny responses to decisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodexPermissionPolicy;

impl PermissionPolicy for CodexPermissionPolicy {
    type Response = CodexPermissionResponse;
    type Outcome = PermissionResult;

    fn resolve_response(&self, response: &Self::Response, request: &PendingRequest) -> Resolution<Self::Outcome> {
        let (status, decision) = if response.approved {
            let decision = match response.decision {
                Some(Decision::ApprovedForSession) => Decision::ApprovedForSession,
                _ => Decision::Approved,
            };
            (CompletionStatus::Approved, decision)
        } else {
            let decision = match response.decision {
                Some(Decision::Denied) => Decision::Denied,
                _ => Decision::Abort,
            };
            (CompletionStatus::Denied, decision)
        };
        debug!(
            tool = %request.tool_name,
            approved = response.approved,
            "codex permission answered"
        );
        Resolution {
            outcome: PermissionResult {
                decision,
                reason: response.reason.clone(),
            },
            completion: PermissionCompletion::new(status)
                .with_decision(decision)
                .with_reason(response.reason.clone()),
        }
    }

    fn on_missing_response(&self, response: &Self::Response) {
        debug!(id = %response.id, "codex permission request not found or already resolved");
    }
}

/// Permission handler for a Codex session.
pub struct CodexPermissionHandler<S> {
    manager: PermissionLifecycleManager<CodexPermissionPolicy, S>,
    reset_options: CancelOptions,
}

impl<S: AgentStateStore> CodexPermissionHandler<S> {
    /// Creates a handler with the default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, &SessionConfig::default())
    }

    /// Creates a handler whose reset uses the configured messages.
    pub fn with_config(store: S, config: &SessionConfig) -> Self {
        Self {
            manager: PermissionLifecycleManager::new(CodexPermissionPolicy, store),
            reset_options: CancelOptions::new(
                config.reset_completed_reason.clone(),
                config.reset_reject_message.clone(),
            ),
        }
    }

    /// Registers a permission request for a tool call.
    ///
    /// The returned future completes once the client answers or the handler
    /// is reset.
    ///
    /// # Errors
    ///
    /// Returns an error if `tool_call_id` is already awaiting permission.
    pub fn handle_tool_call(
        &self,
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        input: Value,
    ) -> Result<PendingPermission<PermissionResult>> {
        self.manager.register_request(tool_call_id, tool_name, input)
    }

    /// Applies a client response.
    pub fn handle_response(&self, response: &CodexPermissionResponse) {
        self.manager.resolve(response);
    }

    /// Applies a raw `permission` RPC payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a valid response.
    pub fn handle_rpc(&self, params: Value) -> Result<()> {
        self.manager.handle_rpc(params)
    }

    /// Cancels every pending request for a new session.
    pub fn reset(&self) {
        self.manager.cancel_all(&self.reset_options);
        debug!("codex permission handler reset");
    }

    /// Returns the underlying lifecycle manager.
    pub const fn manager(&self) -> &PermissionLifecycleManager<CodexPermissionPolicy, S> {
        &self.manager
    }
}
