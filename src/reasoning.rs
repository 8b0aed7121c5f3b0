//! Grouping of streamed reasoning text into titled sections.
//!
//! Codex reasoning summaries usually open with a bold markdown title such as
//! `**Inspecting files**`. A titled section is reported as a reasoning tool
//! call that opens when the title is complete and closes when the section
//! ends. Text that never carried a title is reported as plain reasoning.

use crate::config::DEFAULT_REASONING_TOOL_NAME;
use crate::events::{ReasoningInput, ReasoningOutput, ReasoningResult, ReasoningStatus};
use uuid::Uuid;

const TITLE_MARKER: &str = "**";

#[derive(Debug, Clone)]
struct OpenSection {
    call_id: String,
    content: String,
}

/// Accumulates reasoning deltas and emits [`ReasoningOutput`]s.
#[derive(Debug)]
pub struct ReasoningProcessor {
    tool_name: String,
    buffer: String,
    section: Option<OpenSection>,
}

impl Default for ReasoningProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_REASONING_TOOL_NAME)
    }
}

impl ReasoningProcessor {
    /// Creates a processor that reports titled sections under `tool_name`.
    #[must_use]
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            buffer: String::new(),
            section: None,
        }
    }

    /// Appends a reasoning delta.
    ///
    /// Returns the opening tool call once the first bold title is complete,
    /// and nothing otherwise. Only a section break starts a new section: a
    /// later bold title in the same part is kept verbatim in the content.
    pub fn process_delta(&mut self, delta: &str) -> Vec<ReasoningOutput> {
        if let Some(section) = self.section.as_mut() {
            section.content.push_str(delta);
            return Vec::new();
        }
        self.buffer.push_str(delta);
        let Some((title, rest)) = split_title(&self.buffer) else {
            return Vec::new();
        };
        let call_id = Uuid::new_v4().to_string();
        let output = ReasoningOutput::ToolCall {
            call_id: call_id.clone(),
            name: self.tool_name.clone(),
            input: ReasoningInput { title },
        };
        self.section = Some(OpenSection {
            call_id,
            content: rest,
        });
        self.buffer.clear();
        vec![output]
    }

    /// Closes the current section because a new summary part started.
    pub fn handle_section_break(&mut self) -> Vec<ReasoningOutput> {
        self.finalize(ReasoningStatus::Completed)
    }

    /// Closes the current section with the given status.
    ///
    /// An open titled section yields its closing result. Untitled text is
    /// only reported when the section completed normally.
    pub fn finalize(&mut self, status: ReasoningStatus) -> Vec<ReasoningOutput> {
        let buffer = std::mem::take(&mut self.buffer);
        match self.section.take() {
            Some(section) => vec![ReasoningOutput::ToolCallResult {
                call_id: section.call_id,
                output: ReasoningResult {
                    content: section.content,
                    status,
                },
            }],
            None if status == ReasoningStatus::Completed && !buffer.trim().is_empty() => {
                vec![ReasoningOutput::Reasoning { text: buffer }]
            }
            None => Vec::new(),
        }
    }

    /// Closes the current section as canceled.
    pub fn abort(&mut self) -> Vec<ReasoningOutput> {
        self.finalize(ReasoningStatus::Canceled)
    }

    /// Returns true if a titled section is open.
    #[must_use]
    pub const fn has_open_section(&self) -> bool {
        self.section.is_some()
    }
}

/// Splits `**title**rest` into its title and remainder.
///
/// Returns `None` while the closing marker has not arrived, when the text does
/// not open with a marker, or when the title is blank.
fn split_title(buffer: &str) -> Option<(String, String)> {
    let opened = buffer.trim_start().strip_prefix(TITLE_MARKER)?;
    let end = opened.find(TITLE_MARKER)?;
    let title = opened[..end].trim();
    if title.is_empty() {
        return None;
    }
    Some((title.to_string(), opened[end + TITLE_MARKER.len()..].to_string()))
}
