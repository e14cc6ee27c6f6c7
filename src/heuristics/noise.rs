use std::collections::HashSet;

use once_cell::sync::Lazy;

use super::{EMAIL_RE, PHONE_RE};

/// Messages at or below this many characters (after trimming) are candidates
/// for the deterministic filler filter.
pub const SHORT_MESSAGE_THRESHOLD: usize = 20;

/// Filler words and acronyms the model routinely fails to flag.
static FILLER_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "yes", "no", "ok", "okay", "yep", "yeah", "nope", "lol", "haha", "same", "true", "me",
        "mine", "less", "guilty", "agreed", "interested", "amen", "nice", "wow", "thanks",
        "thank you", "sure", "right", "love it", "love this", "so true", "me too", "good morning",
        "gm", "hi", "hello", "hey", "bye", "congrats", "awesome", "facts", "this", "heck yeah",
    ]
    .into_iter()
    .collect()
});

/// Deterministic post-filter for very short filler messages ("yes", "ok",
/// "lol") the model missed. Never flags a message carrying a phone number or
/// email: hard contact data must survive.
pub fn is_filler_message(body: &str) -> bool {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return true;
    }
    if trimmed.len() > SHORT_MESSAGE_THRESHOLD {
        return false;
    }
    if PHONE_RE.is_match(trimmed) || EMAIL_RE.is_match(trimmed) {
        return false;
    }

    let normalized: String = trimmed
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    let normalized = normalized.trim();

    FILLER_WORDS.contains(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_fillers_flagged() {
        assert!(is_filler_message("yes"));
        assert!(is_filler_message("Yes!!"));
        assert!(is_filler_message("  OK. "));
        assert!(is_filler_message("lol"));
    }

    #[test]
    fn test_contact_data_never_flagged() {
        assert!(!is_filler_message("a@b.co"));
        assert!(!is_filler_message("555-010-0199"));
    }

    #[test]
    fn test_substantive_messages_pass() {
        assert!(!is_filler_message("I am a buyer in Atlanta"));
        // Short but not in the filler list
        assert!(!is_filler_message("deal?"));
    }

    #[test]
    fn test_long_messages_never_flagged() {
        assert!(!is_filler_message("yes I would love to take that deal off your hands"));
    }
}
