//! Normalized event model produced from agent protocol notifications.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A normalized event derived from one or more protocol notifications.
///
/// Events are produced once and handed to the caller; the converter keeps no
/// history of what it emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A thread was started or resumed.
    ThreadStarted {
        /// The thread identifier.
        thread_id: String,
    },
    /// A turn started.
    TaskStarted {
        /// The turn identifier, if the notification carried one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        turn_id: Option<String>,
    },
    /// A turn finished normally.
    TaskComplete {
        /// The turn identifier, if the notification carried one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        turn_id: Option<String>,
    },
    /// A turn was interrupted.
    TurnAborted {
        /// The turn identifier, if the notification carried one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        turn_id: Option<String>,
    },
    /// A turn failed.
    TaskFailed {
        /// The turn identifier, if the notification carried one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        turn_id: Option<String>,
        /// The failure message.
        error: String,
    },
    /// A complete agent message, assembled from its streamed deltas.
    AgentMessage {
        /// The full message text.
        message: String,
    },
    /// A fragment of streamed reasoning text.
    AgentReasoningDelta {
        /// The reasoning fragment.
        delta: String,
    },
    /// A new reasoning summary part started.
    AgentReasoningSectionBreak,
    /// A command execution started.
    ExecCommandBegin {
        /// The item id of the command execution.
        call_id: String,
        /// The command line being executed.
        command: String,
    },
    /// A command execution finished.
    ExecCommandEnd {
        /// The item id of the command execution.
        call_id: String,
        /// The command line that was executed.
        command: String,
        /// The accumulated output of the command.
        output: String,
        /// The exit code, if the command reported one.
        exit_code: Option<i64>,
    },
    /// A file change started applying.
    PatchApplyBegin {
        /// The item id of the file change.
        call_id: String,
        /// The raw change set as reported by the agent.
        changes: Value,
    },
    /// A file change finished applying.
    PatchApplyEnd {
        /// The item id of the file change.
        call_id: String,
        /// The accumulated output of the change.
        output: String,
        /// Whether the change applied successfully.
        success: bool,
    },
    /// The aggregated diff for the current turn changed.
    TurnDiff {
        /// The unified diff text.
        unified_diff: String,
    },
    /// The agent reported an error outside of a turn result.
    Error {
        /// The error message.
        message: String,
        /// Whether the agent will retry on its own.
        will_retry: bool,
    },
}

impl DomainEvent {
    /// Returns the wire name of this event's `type` tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ThreadStarted { .. } => "thread_started",
            Self::TaskStarted { .. } => "task_started",
            Self::TaskComplete { .. } => "task_complete",
            Self::TurnAborted { .. } => "turn_aborted",
            Self::TaskFailed { .. } => "task_failed",
            Self::AgentMessage { .. } => "agent_message",
            Self::AgentReasoningDelta { .. } => "agent_reasoning_delta",
            Self::AgentReasoningSectionBreak => "agent_reasoning_section_break",
            Self::ExecCommandBegin { .. } => "exec_command_begin",
            Self::ExecCommandEnd { .. } => "exec_command_end",
            Self::PatchApplyBegin { .. } => "patch_apply_begin",
            Self::PatchApplyEnd { .. } => "patch_apply_end",
            Self::TurnDiff { .. } => "turn_diff",
            Self::Error { .. } => "error",
        }
    }
}

/// How a reasoning section was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningStatus {
    /// The section ended normally.
    Completed,
    /// The section was cut short by an abort or failure.
    Canceled,
}

/// Output of the reasoning processor.
///
/// Titled reasoning sections are reported as a tool call pair sharing one
/// `call_id`; untitled text is reported as plain reasoning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReasoningOutput {
    /// A titled reasoning section opened.
    #[serde(rename = "tool-call")]
    ToolCall {
        /// Correlation id shared with the closing result.
        #[serde(rename = "callId")]
        call_id: String,
        /// The tool name reported for reasoning sections.
        name: String,
        /// The section title.
        input: ReasoningInput,
    },
    /// A titled reasoning section closed.
    #[serde(rename = "tool-call-result")]
    ToolCallResult {
        /// Correlation id shared with the opening call.
        #[serde(rename = "callId")]
        call_id: String,
        /// The section body and closing status.
        output: ReasoningResult,
    },
    /// Reasoning text that never carried a title.
    #[serde(rename = "reasoning")]
    Reasoning {
        /// The reasoning text.
        text: String,
    },
}

impl ReasoningOutput {
    /// Returns the correlation id for tool call outputs.
    #[must_use]
    pub fn call_id(&self) -> Option<&str> {
        match self {
            Self::ToolCall { call_id, .. } | Self::ToolCallResult { call_id, .. } => Some(call_id.as_str()),
            Self::Reasoning { .. } => None,
        }
    }
}

/// Input of a reasoning tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningInput {
    /// The bold title that opened the section.
    pub title: String,
}

/// Output of a reasoning tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningResult {
    /// The section text following the title.
    pub content: String,
    /// How the section was closed.
    pub status: ReasoningStatus,
}
