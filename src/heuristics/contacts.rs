use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Message;

pub static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}").unwrap());

pub static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());

pub static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s]+").unwrap());

/// Community/role markers that appear in sender names and message bodies.
/// Emoji markers match by containment; alphabetic codes by word boundary.
const ROLE_MARKERS: &[(&str, &str)] = &[
    ("TC", "Transaction Coordinator"),
    ("TTTC", "Top Tier Transaction Coordinator"),
    ("TTC", "Transaction Coordinator"),
    ("Gator", "Gator Lender"),
    ("\u{1F40A}", "Gator Lender"),
    ("Subto", "Subto Student"),
    ("\u{270C}\u{FE0F}", "Subto Student"),
    ("\u{270C}\u{1F3FC}", "Subto Student"),
    ("\u{270C}\u{1F3FD}", "Subto Student"),
    ("\u{270C}\u{1F3FE}", "Subto Student"),
    ("\u{270C}", "Subto Student"),
    ("OC", "Owners Club"),
    ("Bird Dog", "Bird Dog"),
    ("BirdDog", "Bird Dog"),
    ("\u{1F415}", "Bird Dog"),
    ("\u{1F436}", "Bird Dog"),
    ("\u{1F426}", "Bird Dog"),
    ("DTS", "Direct To Seller"),
    ("DTA", "Direct To Agent"),
    ("ZD", "Zero Down Business"),
    ("ZDB", "Zero Down Business"),
    ("Zero Down", "Zero Down Business"),
];

/// Role acronyms commonly embedded in Zoom display names.
static NAME_ROLE_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:TTTC|TC|TM|EA|VA|DTS|DTA|ZDB|OC)\b").unwrap());

/// Marker patterns compiled once: emoji markers have no regex and match by
/// containment.
static ROLE_PATTERNS: Lazy<Vec<(&'static str, &'static str, Option<Regex>)>> = Lazy::new(|| {
    ROLE_MARKERS
        .iter()
        .map(|&(marker, role)| {
            let pattern = if !marker.is_ascii() {
                None
            } else if marker.len() > 2 && marker.chars().all(|c| c.is_alphabetic() || c == ' ') {
                // Longer text codes: word boundary, case-insensitive
                Some(Regex::new(&format!(r"(?i)\b{}\b", regex::escape(marker))).unwrap())
            } else {
                // Short acronyms (TC, OC, ZD): case-sensitive with boundary
                Some(Regex::new(&format!(r"\b{}\b", regex::escape(marker))).unwrap())
            };
            (marker, role, pattern)
        })
        .collect()
});

const US_STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY",
];

static LONG_DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{10,}\b").unwrap());
static FORMATTED_PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}[-.)\s]?\d{3}[-.)\s]?\d{4}\b").unwrap());
static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Regex-derived hard facts for one sender, accumulated over their messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HardContact {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub links: BTreeSet<String>,
    pub roles: BTreeSet<String>,
}

impl HardContact {
    pub fn has_contact_data(&self) -> bool {
        self.email.is_some() || self.phone.is_some() || !self.roles.is_empty()
    }
}

/// Clean a sender display name by stripping phone numbers, role acronyms,
/// emoji, and trailing state codes.
///
/// Zoom display names routinely look like "Micah Wylie TC 3852082523" or
/// "Dr. Tami Romriell 208-589-7775"; downstream attribution needs the bare
/// person name. Falls back to the raw name if cleaning leaves too little.
pub fn clean_sender_name(raw_name: &str) -> String {
    let mut name = raw_name.trim().to_string();

    name = LONG_DIGIT_RUN_RE.replace_all(&name, "").into_owned();
    name = FORMATTED_PHONE_RE.replace_all(&name, "").into_owned();
    name = NAME_ROLE_TAG_RE.replace_all(&name, "").into_owned();

    // Emoji in display names are almost always role markers
    name.retain(|c| c.is_ascii());

    for state in US_STATE_CODES {
        if let Some(stripped) = name
            .trim_end()
            .strip_suffix(state)
            .filter(|s| s.ends_with(char::is_whitespace))
        {
            name = stripped.to_string();
            break;
        }
    }

    let name = MULTI_SPACE_RE.replace_all(name.trim(), " ").into_owned();

    // Better a weird name than no name
    if name.len() < 2 {
        return raw_name.trim().to_string();
    }
    name
}

/// Extract canonical role names from text using the marker map.
pub fn extract_roles(text: &str) -> BTreeSet<String> {
    let mut roles = BTreeSet::new();

    for (marker, role, pattern) in ROLE_PATTERNS.iter() {
        let matched = match pattern {
            Some(re) => re.is_match(text),
            None => text.contains(marker),
        };
        if matched {
            roles.insert((*role).to_string());
        }
    }

    roles
}

/// Deterministic pass over all messages: phone, email, links, and roles per
/// sender, scanned over the sender name and body combined. First value wins
/// for email/phone; links and roles accumulate.
pub fn extract_hard_contacts(messages: &[Message]) -> BTreeMap<String, HardContact> {
    let mut contacts: BTreeMap<String, HardContact> = BTreeMap::new();

    for message in messages {
        let entry = contacts.entry(message.sender.clone()).or_default();
        let combined = format!("{} {}", message.sender, message.body);

        if entry.phone.is_none() {
            if let Some(m) = PHONE_RE.find(&combined) {
                entry.phone = Some(m.as_str().to_string());
            }
        }
        if entry.email.is_none() {
            if let Some(m) = EMAIL_RE.find(&combined) {
                entry.email = Some(m.as_str().to_string());
            }
        }
        for m in URL_RE.find_iter(&combined) {
            entry.links.insert(m.as_str().to_string());
        }

        entry.roles.extend(extract_roles(&message.sender));
        entry.roles.extend(extract_roles(&message.body));
    }

    contacts
}
