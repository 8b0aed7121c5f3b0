//! Error types for the agent-event-bridge library.

use thiserror::Error;

/// The result type for agent-event-bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of the permission lifecycle.
///
/// Protocol anomalies such as unknown notifications or responses for ids that
/// are no longer pending are absorbed and logged, never returned.
#[derive(Debug, Error)]
pub enum Error {
    /// A permission request with this id is already waiting for a response.
    #[error("permission request already pending: {id}")]
    DuplicateRequest {
        /// The colliding request id.
        id: String,
    },
    /// The pending request was canceled before a response arrived.
    #[error("permission request canceled: {message}")]
    Canceled {
        /// The rejection message configured for the cancellation.
        message: String,
    },
    /// The manager was dropped while the request was still pending.
    #[error("permission manager dropped before request {id} completed")]
    ManagerDropped {
        /// The id of the orphaned request.
        id: String,
    },
    /// A raw permission response payload could not be decoded.
    #[error("invalid permission response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

impl Error {
    /// Returns true if this error is the modeled cancellation outcome.
    #[must_use]
    pub const fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled { .. })
    }
}
