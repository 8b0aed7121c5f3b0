//! Configuration for agent sessions.

/// Default reason recorded on requests canceled by a session reset.
pub const DEFAULT_RESET_REASON: &str = "Session reset";

/// Default tool name used for titled reasoning sections.
pub const DEFAULT_REASONING_TOOL_NAME: &str = "CodexReasoning";

/// Configuration for a Codex session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Reason written to the state store for requests canceled on reset.
    pub reset_completed_reason: String,
    /// Message delivered to waiters rejected on reset.
    pub reset_reject_message: String,
    /// Tool name reported for titled reasoning sections.
    pub reasoning_tool_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    /// Creates a configuration with the default reset messages.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reset_completed_reason: DEFAULT_RESET_REASON.to_string(),
            reset_reject_message: DEFAULT_RESET_REASON.to_string(),
            reasoning_tool_name: DEFAULT_REASONING_TOOL_NAME.to_string(),
        }
    }

    /// Sets the reason recorded for requests canceled on reset.
    #[must_use]
    pub fn with_reset_completed_reason(mut self, reason: impl Into<String>) -> Self {
        self.reset_completed_reason = reason.into();
        self
    }

    /// Sets the message delivered to waiters rejected on reset.
    #[must_use]
    pub fn with_reset_reject_message(mut self, message: impl Into<String>) -> Self {
        self.reset_reject_message = message.into();
        self
    }

    /// Sets the tool name reported for titled reasoning sections.
    #[must_use]
    pub fn with_reasoning_tool_name(mut self, name: impl Into<String>) -> Self {
        self.reasoning_tool_name = name.into();
        self
    }
}
