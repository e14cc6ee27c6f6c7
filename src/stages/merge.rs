use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::heuristics::{is_filler_message, EMAIL_RE, PHONE_RE};
use crate::models::{ChunkAnalysis, Message, ProfileFragment, ServiceRecord};

/// Combined output of all chunk analyses. Pure, synchronous, CPU-bound.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeOutput {
    /// Deduplicated services, first occurrence kept, order preserved
    pub services: Vec<ServiceRecord>,
    /// One merged profile per name
    pub profiles: BTreeMap<String, ProfileFragment>,
    /// Final noise set over message ids
    pub noise_ids: BTreeSet<usize>,
}

/// Merge chunk results in chunk index order.
///
/// Services dedup by composite key. Profile fragments for the same name
/// merge per the fragment rules. Noise ids union across chunks, then a
/// deterministic post-filter adds short filler messages the model missed —
/// and removes any id whose message carries a phone number or email, since
/// hard contact data must survive.
pub fn merge_chunk_results(messages: &[Message], results: &[ChunkAnalysis]) -> MergeOutput {
    let mut services = Vec::new();
    let mut seen_keys: HashSet<String> = HashSet::new();
    let mut profiles: BTreeMap<String, ProfileFragment> = BTreeMap::new();
    let mut noise_ids: BTreeSet<usize> = BTreeSet::new();

    for analysis in results {
        for service in &analysis.services {
            if seen_keys.insert(service.dedup_key()) {
                services.push(service.clone());
            }
        }

        for fragment in &analysis.profiles {
            if fragment.name.trim().is_empty() {
                continue;
            }
            match profiles.get_mut(&fragment.name) {
                Some(existing) => existing.merge_from(fragment.clone()),
                None => {
                    profiles.insert(fragment.name.clone(), fragment.clone());
                }
            }
        }

        noise_ids.extend(analysis.noise_message_ids.iter().copied());
    }

    for message in messages {
        if is_filler_message(&message.body) {
            noise_ids.insert(message.id);
        }
        if PHONE_RE.is_match(&message.body) || EMAIL_RE.is_match(&message.body) {
            noise_ids.remove(&message.id);
        }
    }

    // Ids the model hallucinated outside the message range are meaningless
    let max_id = messages.len();
    noise_ids.retain(|&id| id < max_id);

    info!(
        "Merged {} chunk results: {} services, {} profiles, {} noise ids",
        results.len(),
        services.len(),
        profiles.len(),
        noise_ids.len()
    );

    MergeOutput {
        services,
        profiles,
        noise_ids,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::ServiceKind;

    fn message(id: usize, body: &str) -> Message {
        Message {
            id,
            sender: "A".to_string(),
            body: body.to_string(),
            timestamp: None,
        }
    }

    fn service(owner: &str, description: &str) -> ServiceRecord {
        ServiceRecord {
            kind: ServiceKind::Offer,
            description: description.to_string(),
            owner_name: owner.to_string(),
            links: BTreeSet::new(),
        }
    }

    #[test]
    fn test_services_dedup_order_preserving() {
        let results = vec![
            ChunkAnalysis {
                services: vec![service("Carly", "funding"), service("Bo", "title work")],
                ..Default::default()
            },
            ChunkAnalysis {
                // Duplicate from the overlap region
                services: vec![service("Carly", "funding"), service("Ana", "TC help")],
                ..Default::default()
            },
        ];

        let merged = merge_chunk_results(&[], &results);
        let owners: Vec<&str> = merged.services.iter().map(|s| s.owner_name.as_str()).collect();
        assert_eq!(owners, vec!["Carly", "Bo", "Ana"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let results = vec![ChunkAnalysis {
            services: vec![service("Carly", "funding")],
            ..Default::default()
        }];

        let once = merge_chunk_results(&[], &results);
        let twice = merge_chunk_results(&[], &[results[0].clone(), results[0].clone()]);
        assert_eq!(once.services.len(), twice.services.len());
    }

    #[test]
    fn test_profiles_grouped_by_name() {
        let mut frag_a = ProfileFragment {
            name: "Carly".to_string(),
            ..Default::default()
        };
        frag_a.communities.insert("Subto".to_string());

        let mut frag_b = ProfileFragment {
            name: "Carly".to_string(),
            ..Default::default()
        };
        frag_b.communities.insert("Gator".to_string());

        let results = vec![
            ChunkAnalysis {
                profiles: vec![frag_a],
                ..Default::default()
            },
            ChunkAnalysis {
                profiles: vec![frag_b],
                ..Default::default()
            },
        ];

        let merged = merge_chunk_results(&[], &results);
        assert_eq!(merged.profiles.len(), 1);
        assert_eq!(merged.profiles["Carly"].communities.len(), 2);
    }

    #[test]
    fn test_filler_post_filter_catches_missed_noise() {
        let messages = vec![message(0, "yes"), message(1, "I am a buyer in Atlanta")];
        // Model flagged nothing
        let merged = merge_chunk_results(&messages, &[ChunkAnalysis::default()]);

        assert!(merged.noise_ids.contains(&0));
        assert!(!merged.noise_ids.contains(&1));
    }

    #[test]
    fn test_contact_bearing_message_never_noise() {
        let messages = vec![message(0, "reach me at carly@example.com")];
        // Even if the model flagged it
        let results = vec![ChunkAnalysis {
            noise_message_ids: vec![0],
            ..Default::default()
        }];

        let merged = merge_chunk_results(&messages, &results);
        assert!(merged.noise_ids.is_empty());
    }

    #[test]
    fn test_out_of_range_noise_ids_dropped() {
        let messages = vec![message(0, "hello everyone this is a long message")];
        let results = vec![ChunkAnalysis {
            noise_message_ids: vec![0, 99],
            ..Default::default()
        }];

        let merged = merge_chunk_results(&messages, &results);
        assert_eq!(merged.noise_ids, BTreeSet::from([0]));
    }
}
