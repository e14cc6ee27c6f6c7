use std::time::Duration;

use thiserror::Error;

/// Errors produced by the extraction pipeline.
///
/// Only `DeadlineExceeded` and checkpoint/serialization failures abort a run.
/// Everything else is recovered locally by the stage that observed it and
/// accumulated into `PipelineResult.errors`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No messages were recognized in the transcript. The pipeline still
    /// returns an empty-but-valid result.
    #[error("no messages recognized in transcript")]
    ParseEmpty,

    /// A single chunk analysis failed; the chunk contributes an empty result.
    #[error("chunk {chunk_index} analysis failed: {message}")]
    ChunkAnalysisFailure { chunk_index: usize, message: String },

    /// The validator returned the wrong number of verdicts for a batch.
    /// The whole batch is kept (fail-open).
    #[error("validator returned {got} verdicts for a batch of {expected}")]
    ValidatorMismatch { expected: usize, got: usize },

    /// A completion call exceeded its per-request timeout.
    #[error("completion call timed out after {0:?}")]
    CompletionTimeout(Duration),

    /// The completion provider returned an error response.
    #[error("completion provider error: {0}")]
    CompletionProvider(String),

    /// The completion provider returned output that did not conform to the
    /// requested schema.
    #[error("malformed completion output: {0}")]
    MalformedOutput(String),

    /// The global wall-clock deadline for the run expired. Partial results
    /// computed before expiry are still returned.
    #[error("pipeline deadline exceeded")]
    DeadlineExceeded,

    /// A checkpoint could not be serialized or deserialized.
    #[error("checkpoint error: {0}")]
    Checkpoint(String),
}

impl PipelineError {
    /// Whether the completion client should retry after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::CompletionTimeout(_)
                | PipelineError::CompletionProvider(_)
                | PipelineError::MalformedOutput(_)
        )
    }
}
