use tokio::time::Instant;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::llm::{build_summary_prompt, CompletionClient, SUMMARY_SYSTEM_PROMPT};
use crate::models::MeetingSummary;

/// Characters of transcript fed to the summary call.
pub const SUMMARY_CHAR_BUDGET: usize = 15_000;

/// Generate the meeting summary with a single completion call over the
/// truncated transcript. Runs concurrently with chunk analysis; on failure
/// returns the sentinel summary so the run continues.
pub async fn summarize(
    client: &CompletionClient,
    transcript: &str,
    char_budget: usize,
    deadline: Instant,
) -> (MeetingSummary, Option<PipelineError>) {
    info!("Generating summary...");
    let prompt = build_summary_prompt(transcript, char_budget);
    let call = client.complete::<MeetingSummary>(SUMMARY_SYSTEM_PROMPT, &prompt);

    let outcome = match tokio::time::timeout_at(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(PipelineError::DeadlineExceeded),
    };

    match outcome {
        Ok(summary) => (summary, None),
        Err(e) => {
            warn!("Summary generation failed: {}", e);
            (MeetingSummary::unavailable(), Some(e))
        }
    }
}
