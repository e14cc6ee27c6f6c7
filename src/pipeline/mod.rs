pub mod checkpoint;
pub mod progress;

pub use checkpoint::*;
pub use progress::*;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::llm::CompletionClient;
use crate::models::{Chunk, ChunkAnalysis, MeetingSummary, Message, PipelineResult, ServiceRecord};
use crate::stages::{
    analyze_chunks, chunk_messages, finalize, merge_chunk_results, parse_transcript,
    summarize, validate_services, AnalyzeConfig, ChunkConfig, MergeOutput, SUMMARY_CHAR_BUDGET,
    VALIDATION_BATCH_SIZE,
};

mod stage_names {
    pub const PARSE: &str = "parse";
    pub const CHUNK: &str = "chunk";
    pub const ANALYZE: &str = "analyze";
    pub const SUMMARIZE: &str = "summarize";
    pub const MERGE: &str = "merge";
    pub const VALIDATE: &str = "validate";
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub chunking: ChunkConfig,
    pub analysis: AnalyzeConfig,
    /// Services per validation call
    pub validation_batch_size: usize,
    /// Characters of transcript fed to the summary call
    pub summary_char_budget: usize,
    /// Global wall-clock deadline for the whole run
    pub deadline: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkConfig::default(),
            analysis: AnalyzeConfig::default(),
            validation_batch_size: VALIDATION_BATCH_SIZE,
            summary_char_budget: SUMMARY_CHAR_BUDGET,
            deadline: Duration::from_secs(300),
        }
    }
}

/// The extraction pipeline: a fixed-topology stage graph
/// `parse -> chunk -> {analyze, summarize} -> merge -> validate -> finalize`
/// with per-stage checkpointing for resumability.
///
/// No error from an individual chunk or the validator aborts a run; only the
/// global deadline or a checkpoint failure does, and a deadline still yields
/// a partial result carrying everything computed before expiry.
pub struct Pipeline {
    client: Arc<CompletionClient>,
    checkpoints: Arc<dyn CheckpointStore>,
    config: PipelineConfig,
    progress: Option<UnboundedSender<ProgressEvent>>,
}

impl Pipeline {
    pub fn new(client: Arc<CompletionClient>) -> Self {
        Self {
            client,
            checkpoints: Arc::new(InMemoryCheckpointStore::new()),
            config: PipelineConfig::default(),
            progress: None,
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_checkpoint_store(mut self, store: Arc<dyn CheckpointStore>) -> Self {
        self.checkpoints = store;
        self
    }

    /// Receive per-stage and per-chunk progress events for this pipeline's
    /// runs.
    pub fn with_progress(mut self, sender: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(sender) = &self.progress {
            let _ = sender.send(event);
        }
    }

    /// Run the pipeline over a raw transcript. `run_id` keys the checkpoint
    /// store; passing the id of an interrupted run resumes from its last
    /// completed stage (completion calls already made are not refunded).
    /// Stages truncated by chunk failures or the deadline are not
    /// checkpointed, so a resume re-runs them.
    pub async fn run(
        &self,
        transcript: &str,
        run_id: Option<String>,
    ) -> Result<PipelineResult, PipelineError> {
        let run_id = run_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let deadline = Instant::now() + self.config.deadline;
        let mut errors: Vec<String> = Vec::new();

        info!("Starting extraction pipeline (run_id={})", run_id);

        // Stage: parse
        self.emit(ProgressEvent::StageStarted { stage: stage_names::PARSE });
        let messages: Vec<Message> =
            match load_stage(self.checkpoints.as_ref(), &run_id, stage_names::PARSE).await {
                Some(messages) => messages,
                None => {
                    let messages = parse_transcript(transcript);
                    store_stage(self.checkpoints.as_ref(), &run_id, stage_names::PARSE, &messages)
                        .await?;
                    messages
                }
            };
        self.emit(ProgressEvent::StageCompleted { stage: stage_names::PARSE });

        if messages.is_empty() {
            warn!("No messages recognized in transcript (run_id={})", run_id);
            return Ok(PipelineResult::empty(vec![
                PipelineError::ParseEmpty.to_string(),
            ]));
        }
        info!("Parsed {} messages", messages.len());

        // Stage: chunk
        self.emit(ProgressEvent::StageStarted { stage: stage_names::CHUNK });
        let chunks: Vec<Chunk> =
            match load_stage(self.checkpoints.as_ref(), &run_id, stage_names::CHUNK).await {
                Some(chunks) => chunks,
                None => {
                    let chunks = chunk_messages(&messages, &self.config.chunking);
                    store_stage(self.checkpoints.as_ref(), &run_id, stage_names::CHUNK, &chunks)
                        .await?;
                    chunks
                }
            };
        self.emit(ProgressEvent::StageCompleted { stage: stage_names::CHUNK });
        info!("Created {} chunks", chunks.len());

        // Stages: analyze and summarize, concurrently
        self.emit(ProgressEvent::StageStarted { stage: stage_names::ANALYZE });
        self.emit(ProgressEvent::StageStarted { stage: stage_names::SUMMARIZE });

        let analyze_checkpoint: Option<Vec<ChunkAnalysis>> =
            load_stage(self.checkpoints.as_ref(), &run_id, stage_names::ANALYZE).await;
        let summary_checkpoint: Option<MeetingSummary> =
            load_stage(self.checkpoints.as_ref(), &run_id, stage_names::SUMMARIZE).await;

        let analyze_fut = async {
            match analyze_checkpoint {
                Some(results) => (results, vec![]),
                None => {
                    let outcome = analyze_chunks(
                        &self.client,
                        &chunks,
                        &self.config.analysis,
                        deadline,
                        self.progress.as_ref(),
                    )
                    .await;
                    (outcome.results, outcome.errors)
                }
            }
        };
        let summarize_fut = async {
            match summary_checkpoint {
                Some(summary) => (summary, None),
                None => {
                    summarize(
                        &self.client,
                        transcript,
                        self.config.summary_char_budget,
                        deadline,
                    )
                    .await
                }
            }
        };

        let ((chunk_results, analyze_errors), (summary, summary_error)) =
            tokio::join!(analyze_fut, summarize_fut);

        // A stage with failed chunks is not completed: checkpointing it would
        // make a resumed run skip re-analysis and lose the work for good
        let analysis_complete = analyze_errors.is_empty();
        if analysis_complete {
            store_stage(self.checkpoints.as_ref(), &run_id, stage_names::ANALYZE, &chunk_results)
                .await?;
        } else {
            warn!(
                "Not checkpointing analysis: {} of {} chunks failed",
                analyze_errors.len(),
                chunks.len()
            );
        }
        if summary_error.is_none() {
            store_stage(self.checkpoints.as_ref(), &run_id, stage_names::SUMMARIZE, &summary)
                .await?;
        }

        errors.extend(analyze_errors.iter().map(|e| e.to_string()));
        if let Some(e) = summary_error {
            errors.push(e.to_string());
        }
        self.emit(ProgressEvent::StageCompleted { stage: stage_names::ANALYZE });
        self.emit(ProgressEvent::StageCompleted { stage: stage_names::SUMMARIZE });

        // Stage: merge (pure, deterministic)
        self.emit(ProgressEvent::StageStarted { stage: stage_names::MERGE });
        let merged: MergeOutput =
            match load_stage(self.checkpoints.as_ref(), &run_id, stage_names::MERGE).await {
                Some(merged) => merged,
                None => {
                    let merged = merge_chunk_results(&messages, &chunk_results);
                    // A merge over truncated analysis output is itself truncated
                    if analysis_complete {
                        store_stage(self.checkpoints.as_ref(), &run_id, stage_names::MERGE, &merged)
                            .await?;
                    }
                    merged
                }
            };
        self.emit(ProgressEvent::StageCompleted { stage: stage_names::MERGE });

        let hard_contacts = crate::heuristics::extract_hard_contacts(&messages);

        // Stage: validate
        self.emit(ProgressEvent::StageStarted { stage: stage_names::VALIDATE });
        let validated: Vec<ServiceRecord> = if Instant::now() >= deadline {
            warn!("Deadline expired before validation; keeping merged services");
            errors.push(PipelineError::DeadlineExceeded.to_string());
            merged.services.clone()
        } else {
            match load_stage(self.checkpoints.as_ref(), &run_id, stage_names::VALIDATE).await {
                Some(validated) => validated,
                None => {
                    let (validated, validate_errors) = validate_services(
                        &self.client,
                        merged.services.clone(),
                        self.config.validation_batch_size,
                        deadline,
                    )
                    .await;
                    errors.extend(validate_errors.iter().map(|e| e.to_string()));
                    store_stage(
                        self.checkpoints.as_ref(),
                        &run_id,
                        stage_names::VALIDATE,
                        &validated,
                    )
                    .await?;
                    validated
                }
            }
        };
        self.emit(ProgressEvent::StageCompleted { stage: stage_names::VALIDATE });

        // Finalize (pure, not checkpointed)
        let mut result = finalize(
            &messages,
            &hard_contacts,
            &merged.profiles,
            validated,
            &merged.noise_ids,
            summary,
        );
        result.partial = !analysis_complete || Instant::now() >= deadline;
        result.errors = errors;

        info!(
            "Pipeline complete (run_id={}, partial={}, {} recovered errors)",
            run_id,
            result.partial,
            result.errors.len()
        );
        Ok(result)
    }
}
