use serde::{Deserialize, Serialize};

/// A single parsed chat message. Immutable once parsed; every later stage
/// refers to it by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Monotonic index within the run
    pub id: usize,
    /// Sender display name, cleaned of phone numbers and role tags
    pub sender: String,
    /// Message body with multi-line continuations re-joined
    pub body: String,
    /// Timestamp string from the message header, if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// An ordered, contiguous, possibly-overlapping slice of the message
/// sequence. Overlap ensures content spanning a chunk boundary is visible to
/// at least one chunk in full.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of this chunk in the chunk sequence
    pub index: usize,
    /// Messages in this chunk, in original order
    pub messages: Vec<Message>,
}

impl Chunk {
    /// Format the chunk for embedding in a prompt: one `[id] sender: body`
    /// line per message.
    pub fn to_prompt_lines(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("[{}] {}: {}", m.id, m.sender, m.body))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
