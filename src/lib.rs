//! # agent-event-bridge
//!
//! Session-side plumbing for the Codex app-server protocol: converts its
//! notifications into a stable event stream and manages the lifecycle of the
//! permission requests it issues.
//!
//! ## Features
//!
//! - Stateful notification-to-event conversion with per-item delta buffering
//! - Reasoning sections reported as correlated tool call pairs
//! - Permission requests that complete exactly once, with bulk cancellation
//! - Request records mirrored into a pluggable application state store
//!
//! ## Example
//!
//! ```
//! use agent_event_bridge::{DomainEvent, EventConverter};
//! use serde_json::json;
//!
//! let mut converter = EventConverter::new();
//! converter.handle_notification("item/agentMessage/delta", &json!({"itemId": "m1", "delta": "Hi"}));
//! let events = converter.handle_notification(
//!     "item/completed",
//!     &json!({"item": {"id": "m1", "type": "agentMessage"}}),
//! );
//!
//! assert_eq!(events, vec![DomainEvent::AgentMessage { message: "Hi".to_string() }]);
//! assert!(!converter.has_pending_items());
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]

mod config;
mod converter;
mod error;
mod events;
mod notification;
pub mod permission;
mod reasoning;
mod session;

pub use config::{SessionConfig, DEFAULT_REASONING_TOOL_NAME, DEFAULT_RESET_REASON};
pub use converter::EventConverter;
pub use error::{Error, Result};
pub use events::{DomainEvent, ReasoningInput, ReasoningOutput, ReasoningResult, ReasoningStatus};
pub use notification::{ItemKind, NotificationMethod, UnknownMethod};
pub use permission::{
    CancelOptions, CodexPermissionHandler, CodexPermissionResponse, InMemoryStateStore, PendingPermission,
    PermissionLifecycleManager, PermissionResult,
};
pub use reasoning::ReasoningProcessor;
pub use session::{CodexSession, SessionEvent};
