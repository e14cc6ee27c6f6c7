use tokio::time::Instant;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::llm::{build_validation_prompt, CompletionClient, VALIDATION_SYSTEM_PROMPT};
use crate::models::{ServiceRecord, ValidationBatch};

/// Services per validation call.
pub const VALIDATION_BATCH_SIZE: usize = 20;

/// Second completion pass over the merged service list: drop items judged
/// non-business noise.
///
/// Fail-open on every ambiguity: a batch whose verdict array length does not
/// match, a failed call, or deadline expiry keeps the whole batch. Rejected
/// items are dropped with their reason logged; nothing downstream sees them.
pub async fn validate_services(
    client: &CompletionClient,
    services: Vec<ServiceRecord>,
    batch_size: usize,
    deadline: Instant,
) -> (Vec<ServiceRecord>, Vec<PipelineError>) {
    if services.is_empty() {
        return (services, vec![]);
    }

    let batch_size = batch_size.max(1);
    let mut validated = Vec::with_capacity(services.len());
    let mut errors = Vec::new();

    for (batch_index, batch) in services.chunks(batch_size).enumerate() {
        info!("Validating batch {} ({} items)...", batch_index, batch.len());

        let prompt = build_validation_prompt(batch);
        let call = client.complete::<ValidationBatch>(VALIDATION_SYSTEM_PROMPT, &prompt);
        let outcome = match tokio::time::timeout_at(deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(PipelineError::DeadlineExceeded),
        };

        match outcome {
            Ok(response) if response.results.len() == batch.len() => {
                for (service, verdict) in batch.iter().zip(response.results.iter()) {
                    if verdict.is_valid {
                        validated.push(service.clone());
                    } else {
                        info!(
                            "Validator dropped: {:.50}... (reason: {})",
                            service.description, verdict.reason
                        );
                    }
                }
            }
            Ok(response) => {
                let mismatch = PipelineError::ValidatorMismatch {
                    expected: batch.len(),
                    got: response.results.len(),
                };
                warn!("{}. Keeping batch.", mismatch);
                errors.push(mismatch);
                validated.extend_from_slice(batch);
            }
            Err(e) => {
                warn!("Validator batch {} failed: {}. Keeping batch.", batch_index, e);
                errors.push(e);
                validated.extend_from_slice(batch);
            }
        }
    }

    (validated, errors)
}
