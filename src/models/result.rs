use serde::{Deserialize, Serialize};

use super::{ContactRecord, Message, ProfileFragment, ServiceRecord};

/// Structured output contract for a single chunk analysis call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkAnalysis {
    /// Offers and requests found in the chunk
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
    /// Rich profile fragments found in the chunk
    #[serde(default)]
    pub profiles: Vec<ProfileFragment>,
    /// Ids of messages judged irrelevant noise
    #[serde(default)]
    pub noise_message_ids: Vec<usize>,
}

/// Summary of the meeting discussion, produced by a single completion call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingSummary {
    /// A concise summary of the discussion (3-5 sentences)
    pub summary: String,
    /// Key topics discussed
    #[serde(default)]
    pub key_topics: Vec<String>,
}

impl MeetingSummary {
    /// Sentinel returned when summary generation fails; the run continues.
    pub fn unavailable() -> Self {
        Self {
            summary: "Summary generation failed.".to_string(),
            key_topics: vec![],
        }
    }
}

/// Verdict for a single service in a validation batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationVerdict {
    /// True if this is a legitimate business offer/request
    pub is_valid: bool,
    /// Reason for invalidity when false
    #[serde(default)]
    pub reason: String,
}

/// Batched validation response: a parallel array of verdicts, expected to
/// match the input batch length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationBatch {
    pub results: Vec<ValidationVerdict>,
}

/// The canonical result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub contacts: Vec<ContactRecord>,
    pub services: Vec<ServiceRecord>,
    pub profiles: Vec<ProfileFragment>,
    pub summary: MeetingSummary,
    /// Original messages minus the final noise set, order and ids preserved
    pub filtered_transcript: Vec<Message>,
    /// True when a deadline or repeated-failure truncation occurred
    pub partial: bool,
    /// Recovered errors, accumulated for observability rather than thrown
    pub errors: Vec<String>,
}

impl PipelineResult {
    /// Empty-but-valid result for transcripts with no recognizable messages.
    pub fn empty(errors: Vec<String>) -> Self {
        Self {
            contacts: vec![],
            services: vec![],
            profiles: vec![],
            summary: MeetingSummary {
                summary: String::new(),
                key_topics: vec![],
            },
            filtered_transcript: vec![],
            partial: false,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_analysis_tolerates_missing_fields() {
        let analysis: ChunkAnalysis = serde_json::from_str(r#"{"services": []}"#).unwrap();
        assert!(analysis.profiles.is_empty());
        assert!(analysis.noise_message_ids.is_empty());
    }
}
