use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Hard contact facts for one participant. Email/phone/roles derived by
/// regex are the ground-truth fallback when the model produces nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    /// URLs they shared (business cards, calendars, deal links)
    #[serde(default)]
    pub links: BTreeSet<String>,
}

impl ContactRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Whether any hard contact data was found for this person.
    pub fn has_contact_data(&self) -> bool {
        self.email.is_some() || self.phone.is_some() || !self.roles.is_empty()
    }
}
