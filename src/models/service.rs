use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Number of description characters that participate in the dedup key.
/// Overlapping chunks produce near-identical records whose descriptions
/// agree on a long prefix even when trailing detail differs.
const DEDUP_DESCRIPTION_CHARS: usize = 50;

/// The two classified intents a message can carry; anything else is noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Explicit provision of a service, product, or professional resource
    Offer,
    /// Explicit need, or a specific business question
    Request,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Offer => "offer",
            ServiceKind::Request => "request",
        }
    }
}

/// A business offer or request extracted from the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub kind: ServiceKind,
    /// Verbatim (or lightly cleaned) message content, detail preserved
    pub description: String,
    /// Literal sender name this service is attributed to
    pub owner_name: String,
    /// URLs mentioned in the context of this service
    #[serde(default)]
    pub links: BTreeSet<String>,
}

impl ServiceRecord {
    /// Composite key used to deduplicate near-identical records produced by
    /// overlapping chunks.
    pub fn dedup_key(&self) -> String {
        let prefix: String = self
            .description
            .chars()
            .take(DEDUP_DESCRIPTION_CHARS)
            .collect();
        format!("{}|{}|{}", self.kind.as_str(), self.owner_name, prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(kind: ServiceKind, owner: &str, description: &str) -> ServiceRecord {
        ServiceRecord {
            kind,
            description: description.to_string(),
            owner_name: owner.to_string(),
            links: BTreeSet::new(),
        }
    }

    #[test]
    fn test_dedup_key_ignores_trailing_detail() {
        let long = "a".repeat(60);
        let longer = format!("{}{}", "a".repeat(60), "extra tail");
        let a = service(ServiceKind::Offer, "Carly", &long);
        let b = service(ServiceKind::Offer, "Carly", &longer);
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_dedup_key_distinguishes_kind_and_owner() {
        let a = service(ServiceKind::Offer, "Carly", "funding available");
        let b = service(ServiceKind::Request, "Carly", "funding available");
        let c = service(ServiceKind::Offer, "Isaac", "funding available");
        assert_ne!(a.dedup_key(), b.dedup_key());
        assert_ne!(a.dedup_key(), c.dedup_key());
    }

    #[test]
    fn test_kind_deserializes_lowercase() {
        let record: ServiceRecord = serde_json::from_str(
            r#"{"kind": "request", "description": "need a TC", "owner_name": "Ana"}"#,
        )
        .unwrap();
        assert_eq!(record.kind, ServiceKind::Request);
        assert!(record.links.is_empty());
    }
}
