use once_cell::sync::Lazy;
use regex::Regex;

use crate::heuristics::clean_sender_name;
use crate::models::Message;

/// Zoom chat header: `[optional date] time From <sender> to Everyone: <body>`
static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)((?:\d{4}-\d{2}-\d{2}\s+)?\d{1,2}:\d{2}(?::\d{2})?)\s+From\s+(.+?)\s+to\s+Everyone:\s*(.*)",
    )
    .unwrap()
});

/// Parse raw transcript text into an ordered message sequence.
///
/// A line matching the header pattern opens a new message with the next
/// sequential id; subsequent non-header, non-blank lines are space-joined
/// onto the open message's body, so wrapped multi-line messages are captured
/// whole. Lines with no open message are dropped. Pure and deterministic.
pub fn parse_transcript(text: &str) -> Vec<Message> {
    let mut messages: Vec<Message> = Vec::new();
    let mut current: Option<Message> = None;

    for line in text.lines() {
        if let Some(caps) = HEADER_RE.captures(line) {
            if let Some(message) = current.take() {
                messages.push(message);
            }

            let timestamp = caps.get(1).map(|m| m.as_str().trim().to_string());
            let raw_sender = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
            let body = caps.get(3).map(|m| m.as_str().trim()).unwrap_or_default();

            current = Some(Message {
                id: messages.len(),
                sender: clean_sender_name(raw_sender),
                body: body.to_string(),
                timestamp,
            });
        } else if let Some(message) = current.as_mut() {
            let continuation = line.trim();
            if !continuation.is_empty() {
                if !message.body.is_empty() {
                    message.body.push(' ');
                }
                message.body.push_str(continuation);
            }
        }
    }

    if let Some(message) = current {
        messages.push(message);
    }

    messages
}
