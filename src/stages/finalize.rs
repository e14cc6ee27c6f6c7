use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use crate::heuristics::HardContact;
use crate::models::{
    ContactRecord, MeetingSummary, Message, PipelineResult, ProfileFragment, ServiceRecord,
};

/// Build the canonical result from the regex-derived contact map, the merged
/// AI profiles, the validated services, and the final noise set.
///
/// A name earns a contact entry if it has at least one validated service,
/// non-empty hard contact data, or a profile fragment with substantive
/// content. Email/phone prefer the regex-derived value and fall back to the
/// profile assertion. Every service owner ends up with exactly one contact:
/// contacts are synthesized on demand, never left dangling.
pub fn finalize(
    messages: &[Message],
    hard_contacts: &BTreeMap<String, HardContact>,
    profiles: &BTreeMap<String, ProfileFragment>,
    services: Vec<ServiceRecord>,
    noise_ids: &BTreeSet<usize>,
    summary: MeetingSummary,
) -> PipelineResult {
    let owners: BTreeSet<&str> = services.iter().map(|s| s.owner_name.as_str()).collect();

    let mut all_names: BTreeSet<String> = BTreeSet::new();
    all_names.extend(hard_contacts.keys().cloned());
    all_names.extend(profiles.keys().cloned());
    all_names.extend(owners.iter().map(|s| s.to_string()));

    let mut contacts = Vec::new();
    let mut final_profiles = Vec::new();

    for name in &all_names {
        let hard = hard_contacts.get(name);
        let profile = profiles.get(name);

        let has_service = owners.contains(name.as_str());
        let has_contact_data = hard.is_some_and(|h| h.has_contact_data());
        let has_rich_data = profile.is_some_and(|p| p.has_substance());

        if !(has_service || has_contact_data || has_rich_data) {
            continue;
        }

        let mut roles: BTreeSet<String> = hard.map(|h| h.roles.clone()).unwrap_or_default();
        if let Some(p) = profile {
            roles.extend(p.role_tags.iter().cloned());
        }

        // Regex wins for email/phone; the profile is the fallback
        let email = hard
            .and_then(|h| h.email.clone())
            .or_else(|| profile.and_then(|p| p.email.clone()));
        let phone = hard
            .and_then(|h| h.phone.clone())
            .or_else(|| profile.and_then(|p| p.phone.clone()));

        contacts.push(ContactRecord {
            name: name.clone(),
            email,
            phone,
            roles,
            links: hard.map(|h| h.links.clone()).unwrap_or_default(),
        });

        if let Some(p) = profile {
            final_profiles.push(p.clone());
        }
    }

    let filtered_transcript: Vec<Message> = messages
        .iter()
        .filter(|m| !noise_ids.contains(&m.id))
        .cloned()
        .collect();

    info!(
        "Finalized: {} contacts, {} services, {} profiles, {} messages kept",
        contacts.len(),
        services.len(),
        final_profiles.len(),
        filtered_transcript.len()
    );

    PipelineResult {
        contacts,
        services,
        profiles: final_profiles,
        summary,
        filtered_transcript,
        partial: false,
        errors: vec![],
    }
}
