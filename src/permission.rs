//! Lifecycle of out-of-band permission requests.
//!
//! A request moves from registered to exactly one of resolved or canceled.
//! The manager removes a request from its in-flight map before acting on it,
//! so a response racing a bulk cancellation completes the waiter at most once.
//! Map changes and their state store writes happen under the same lock, so
//! store updates must not call back into the manager.
//! Protocol-specific behavior lives in a [`PermissionPolicy`].

mod codex;
mod state;

pub use codex::{CodexPermissionHandler, CodexPermissionPolicy, CodexPermissionResponse, PermissionResult};
pub use state::{
    AgentState, AgentStateStore, CompletedRequestRecord, CompletionStatus, Decision, InMemoryStateStore,
    PermissionCompletion, RequestRecord,
};

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// RPC method the transport routes permission responses through.
pub const PERMISSION_RPC_METHOD: &str = "permission";

/// A response correlated to a pending request by id.
pub trait PermissionResponse {
    /// The id of the request this response answers.
    fn id(&self) -> &str;
}

/// Describes a registered request to policy hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    /// The caller-supplied request id.
    pub id: String,
    /// The tool awaiting permission.
    pub tool_name: String,
    /// The tool input.
    pub input: Value,
}

/// What a policy produces for a correlated response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<O> {
    /// The value delivered to the waiter.
    pub outcome: O,
    /// The record written to the state store.
    pub completion: PermissionCompletion,
}

/// Protocol-specific customization of the permission lifecycle.
pub trait PermissionPolicy {
    /// Response payload delivered by the transport.
    type Response: PermissionResponse + DeserializeOwned;
    /// Value the waiter receives on resolution.
    type Outcome;

    /// Maps a correlated response to the waiter's outcome and a store record.
    fn resolve_response(&self, response: &Self::Response, request: &PendingRequest) -> Resolution<Self::Outcome>;

    /// Called when a response arrives for an id that is not pending.
    fn on_missing_response(&self, response: &Self::Response);

    /// Called after a request has been registered.
    fn on_request_registered(&self, _request: &PendingRequest) {}

    /// Called when a response is matched to a pending request.
    fn on_response_received(&self, _response: &Self::Response) {}
}

/// Messages used when canceling every pending request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOptions {
    /// Reason recorded in the state store.
    pub completed_reason: String,
    /// Message delivered to each rejected waiter.
    pub reject_message: String,
}

impl CancelOptions {
    /// Creates cancel options.
    #[must_use]
    pub fn new(completed_reason: impl Into<String>, reject_message: impl Into<String>) -> Self {
        Self {
            completed_reason: completed_reason.into(),
            reject_message: reject_message.into(),
        }
    }
}

type Completer<O> = oneshot::Sender<std::result::Result<O, String>>;

struct InFlight<O> {
    request: PendingRequest,
    completer: Completer<O>,
}

/// Tracks in-flight permission requests and completes their waiters.
pub struct PermissionLifecycleManager<P: PermissionPolicy, S> {
    policy: P,
    store: S,
    pending: Mutex<HashMap<String, InFlight<P::Outcome>>>,
}

impl<P: PermissionPolicy, S: AgentStateStore> PermissionLifecycleManager<P, S> {
    /// Creates a manager with no pending requests.
    pub fn new(policy: P, store: S) -> Self {
        Self {
            policy,
            store,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a request and returns a future that completes on resolution.
    ///
    /// The in-flight map and the store record change under one lock, so a
    /// concurrent `resolve` or `cancel_all` always sees both or neither.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRequest`] if `id` is already pending; the
    /// existing request is left untouched.
    pub fn register_request(
        &self,
        id: impl Into<String>,
        tool_name: impl Into<String>,
        input: Value,
    ) -> Result<PendingPermission<P::Outcome>> {
        let request = PendingRequest {
            id: id.into(),
            tool_name: tool_name.into(),
            input,
        };
        let (completer, receiver) = oneshot::channel();
        {
            let mut pending = self.lock_pending();
            if pending.contains_key(&request.id) {
                return Err(Error::DuplicateRequest { id: request.id });
            }
            pending.insert(
                request.id.clone(),
                InFlight {
                    request: request.clone(),
                    completer,
                },
            );
            let record = RequestRecord {
                tool: request.tool_name.clone(),
                arguments: request.input.clone(),
                created_at: now_millis(),
            };
            self.store.update(&mut |state: &mut AgentState| {
                state.requests.insert(request.id.clone(), record.clone());
            });
        }
        self.policy.on_request_registered(&request);
        debug!(id = %request.id, tool = %request.tool_name, "permission request registered");

        Ok(PendingPermission {
            id: request.id,
            receiver,
        })
    }

    /// Resolves the pending request the response answers.
    ///
    /// A response for an id that is not pending goes to the policy's
    /// missing-response hook and changes nothing.
    pub fn resolve(&self, response: &P::Response) {
        let mut pending = self.lock_pending();
        let Some(InFlight { request, completer }) = pending.remove(response.id()) else {
            drop(pending);
            self.policy.on_missing_response(response);
            return;
        };
        self.policy.on_response_received(response);

        let Resolution { outcome, completion } = self.policy.resolve_response(response, &request);
        if completer.send(Ok(outcome)).is_err() {
            warn!(id = %request.id, "permission waiter dropped before resolution");
        }
        debug!(id = %request.id, status = ?completion.status, "permission request resolved");
        self.finalize_request(&request.id, &completion);
        drop(pending);
    }

    /// Decodes a raw RPC payload and resolves the request it answers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResponse`] if the payload does not decode.
    pub fn handle_rpc(&self, params: Value) -> Result<()> {
        let response: P::Response = serde_json::from_value(params).map_err(|e| {
            warn!(error = %e, "malformed permission response");
            Error::InvalidResponse(e)
        })?;
        self.resolve(&response);
        Ok(())
    }

    /// Rejects every pending request and records it as canceled.
    ///
    /// Leaves the manager equivalent to a fresh instance.
    pub fn cancel_all(&self, options: &CancelOptions) {
        let mut pending = self.lock_pending();
        let count = pending.len();
        for (_, InFlight { request, completer }) in pending.drain() {
            if completer.send(Err(options.reject_message.clone())).is_err() {
                debug!(id = %request.id, "canceled permission waiter already gone");
            }
        }

        let completed_at = now_millis();
        self.store.update(&mut |state: &mut AgentState| {
            for (id, request) in std::mem::take(&mut state.requests) {
                let completion = PermissionCompletion::new(CompletionStatus::Canceled)
                    .with_reason(Some(options.completed_reason.clone()));
                state
                    .completed_requests
                    .insert(id, CompletedRequestRecord::from_request(request, completion, completed_at));
            }
        });
        drop(pending);
        debug!(count, reason = %options.completed_reason, "canceled pending permission requests");
    }

    /// Returns the number of requests waiting for a response.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock_pending().len()
    }

    /// Returns true if `id` is waiting for a response.
    #[must_use]
    pub fn is_pending(&self, id: &str) -> bool {
        self.lock_pending().contains_key(id)
    }

    /// Returns the policy.
    #[must_use]
    pub const fn policy(&self) -> &P {
        &self.policy
    }

    /// Returns the state store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn finalize_request(&self, id: &str, completion: &PermissionCompletion) {
        let completed_at = now_millis();
        self.store.update(&mut |state: &mut AgentState| {
            let Some(request) = state.requests.remove(id) else {
                return;
            };
            state.completed_requests.insert(
                id.to_string(),
                CompletedRequestRecord::from_request(request, completion.clone(), completed_at),
            );
        });
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<String, InFlight<P::Outcome>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A future that completes when its permission request is resolved or canceled.
#[derive(Debug)]
#[must_use = "a pending permission does nothing unless awaited"]
pub struct PendingPermission<O> {
    id: String,
    receiver: oneshot::Receiver<std::result::Result<O, String>>,
}

impl<O> PendingPermission<O> {
    /// Returns the request id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl<O> Future for PendingPermission<O> {
    type Output = Result<O>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(Ok(outcome))) => Poll::Ready(Ok(outcome)),
            Poll::Ready(Ok(Err(message))) => Poll::Ready(Err(Error::Canceled { message })),
            Poll::Ready(Err(_)) => Poll::Ready(Err(Error::ManagerDropped { id: this.id.clone() })),
        }
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
