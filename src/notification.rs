//! Notification method names understood by the event converter.
//!
//! The Codex app-server emits JSON-RPC notifications whose `method` field
//! identifies the kind of state change. Known methods include:
//! - `thread/started`, `thread/resumed`: thread lifecycle
//! - `turn/started`, `turn/completed`, `turn/diff/updated`: turn lifecycle
//! - `item/started`, `item/completed`: item lifecycle
//! - `item/<kind>/delta` variants: streamed item content

use std::fmt;
use std::str::FromStr;

/// A notification method recognized by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationMethod {
    /// `thread/started`
    ThreadStarted,
    /// `thread/resumed`
    ThreadResumed,
    /// `turn/started`
    TurnStarted,
    /// `turn/completed`
    TurnCompleted,
    /// `turn/diff/updated`
    TurnDiffUpdated,
    /// `item/started`
    ItemStarted,
    /// `item/completed`
    ItemCompleted,
    /// `item/agentMessage/delta`
    AgentMessageDelta,
    /// `item/commandExecution/outputDelta`
    CommandExecutionOutputDelta,
    /// `item/fileChange/outputDelta`
    FileChangeOutputDelta,
    /// `item/reasoning/textDelta`
    ReasoningTextDelta,
    /// `item/reasoning/summaryTextDelta`
    ReasoningSummaryTextDelta,
    /// `item/reasoning/summaryPartAdded`
    ReasoningSummaryPartAdded,
    /// `error`
    Error,
}

impl NotificationMethod {
    /// Every recognized method, in protocol order.
    pub const ALL: [Self; 14] = [
        Self::ThreadStarted,
        Self::ThreadResumed,
        Self::TurnStarted,
        Self::TurnCompleted,
        Self::TurnDiffUpdated,
        Self::ItemStarted,
        Self::ItemCompleted,
        Self::AgentMessageDelta,
        Self::CommandExecutionOutputDelta,
        Self::FileChangeOutputDelta,
        Self::ReasoningTextDelta,
        Self::ReasoningSummaryTextDelta,
        Self::ReasoningSummaryPartAdded,
        Self::Error,
    ];

    /// Returns the wire name of this method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ThreadStarted => "thread/started",
            Self::ThreadResumed => "thread/resumed",
            Self::TurnStarted => "turn/started",
            Self::TurnCompleted => "turn/completed",
            Self::TurnDiffUpdated => "turn/diff/updated",
            Self::ItemStarted => "item/started",
            Self::ItemCompleted => "item/completed",
            Self::AgentMessageDelta => "item/agentMessage/delta",
            Self::CommandExecutionOutputDelta => "item/commandExecution/outputDelta",
            Self::FileChangeOutputDelta => "item/fileChange/outputDelta",
            Self::ReasoningTextDelta => "item/reasoning/textDelta",
            Self::ReasoningSummaryTextDelta => "item/reasoning/summaryTextDelta",
            Self::ReasoningSummaryPartAdded => "item/reasoning/summaryPartAdded",
            Self::Error => "error",
        }
    }

    /// Returns the item kind a delta method streams into, if it is a delta.
    #[must_use]
    pub const fn delta_kind(self) -> Option<ItemKind> {
        match self {
            Self::AgentMessageDelta => Some(ItemKind::AgentMessage),
            Self::CommandExecutionOutputDelta => Some(ItemKind::CommandExecution),
            Self::FileChangeOutputDelta => Some(ItemKind::FileChange),
            Self::ReasoningTextDelta | Self::ReasoningSummaryTextDelta => Some(ItemKind::Reasoning),
            _ => None,
        }
    }
}

impl fmt::Display for NotificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a method name is not one the converter handles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown notification method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for NotificationMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// The kind of an item as reported in its `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// `agentMessage`
    AgentMessage,
    /// `commandExecution`
    CommandExecution,
    /// `reasoning`
    Reasoning,
    /// `fileChange`
    FileChange,
    /// Any other item type, kept verbatim.
    Other(String),
}

impl ItemKind {
    /// Parses the `type` field of an item.
    #[must_use]
    pub fn from_type(value: &str) -> Self {
        match value {
            "agentMessage" => Self::AgentMessage,
            "commandExecution" => Self::CommandExecution,
            "reasoning" => Self::Reasoning,
            "fileChange" => Self::FileChange,
            other => Self::Other(other.to_string()),
        }
    }
}
