use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::llm::{build_chunk_prompt, CompletionClient, ANALYSIS_SYSTEM_PROMPT};
use crate::models::{Chunk, ChunkAnalysis};
use crate::pipeline::ProgressEvent;

/// Configuration for the chunk analysis stage.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// Concurrent chunk analyses in flight, independent of chunk count
    pub max_concurrency: usize,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self { max_concurrency: 4 }
    }
}

/// Result of the analysis stage: one entry per chunk, in chunk index order,
/// plus the recovered per-chunk failures.
#[derive(Debug)]
pub struct AnalyzeOutcome {
    pub results: Vec<ChunkAnalysis>,
    pub errors: Vec<PipelineError>,
}

/// Analyze all chunks concurrently, bounded by a semaphore.
///
/// A failed or timed-out chunk contributes an empty result rather than
/// failing the run: analysis is sparse and partial-tolerant. Results are
/// returned in chunk index order regardless of completion order, so the
/// merge stage is deterministic. Every in-flight call is cancelled at
/// `deadline`.
pub async fn analyze_chunks(
    client: &CompletionClient,
    chunks: &[Chunk],
    config: &AnalyzeConfig,
    deadline: Instant,
    progress: Option<&tokio::sync::mpsc::UnboundedSender<ProgressEvent>>,
) -> AnalyzeOutcome {
    if chunks.is_empty() {
        return AnalyzeOutcome {
            results: vec![],
            errors: vec![],
        };
    }

    info!(
        "Analyzing {} chunks (max {} in flight)",
        chunks.len(),
        config.max_concurrency
    );

    let semaphore = Semaphore::new(config.max_concurrency.max(1));
    let total = chunks.len();

    let tasks = chunks.iter().map(|chunk| {
        let semaphore = &semaphore;
        async move {
            // Closed only if the semaphore is dropped, which cannot happen here
            let _permit = semaphore.acquire().await.expect("semaphore closed");
            let outcome = analyze_one(client, chunk, deadline).await;
            if let Some(sender) = progress {
                let _ = sender.send(ProgressEvent::ChunkCompleted {
                    index: chunk.index,
                    total,
                });
            }
            outcome
        }
    });

    let mut results = Vec::with_capacity(total);
    let mut errors = Vec::new();
    for (chunk_index, outcome) in join_all(tasks).await.into_iter().enumerate() {
        match outcome {
            Ok(analysis) => {
                info!(
                    "Chunk {}: {} services, {} profiles, {} noise ids",
                    chunk_index,
                    analysis.services.len(),
                    analysis.profiles.len(),
                    analysis.noise_message_ids.len()
                );
                results.push(analysis);
            }
            Err(e) => {
                warn!("Chunk {} failed: {}", chunk_index, e);
                errors.push(PipelineError::ChunkAnalysisFailure {
                    chunk_index,
                    message: e.to_string(),
                });
                results.push(ChunkAnalysis::default());
            }
        }
    }

    AnalyzeOutcome { results, errors }
}

async fn analyze_one(
    client: &CompletionClient,
    chunk: &Chunk,
    deadline: Instant,
) -> Result<ChunkAnalysis, PipelineError> {
    let prompt = build_chunk_prompt(chunk);
    let call = client.complete::<ChunkAnalysis>(ANALYSIS_SYSTEM_PROMPT, &prompt);

    match tokio::time::timeout_at(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(PipelineError::DeadlineExceeded),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::llm::{CompletionConfig, CompletionProvider};
    use crate::models::{Message, ServiceKind, ServiceRecord};

    /// Provider that answers per chunk index parsed from the prompt, so
    /// out-of-order completion cannot confuse the assertions.
    struct PerChunkProvider;

    #[async_trait]
    impl CompletionProvider for PerChunkProvider {
        async fn complete(&self, _: &str, _: &str, user: &str) -> Result<String, PipelineError> {
            // Chunk index is embedded as index="N"
            let index: usize = user
                .split("index=\"")
                .nth(1)
                .and_then(|s| s.split('"').next())
                .and_then(|s| s.parse().ok())
                .unwrap();

            if index == 1 {
                return Err(PipelineError::CompletionTimeout(Duration::from_secs(1)));
            }

            let analysis = ChunkAnalysis {
                services: vec![ServiceRecord {
                    kind: ServiceKind::Offer,
                    description: format!("service from chunk {}", index),
                    owner_name: "Carly".to_string(),
                    links: BTreeSet::new(),
                }],
                profiles: vec![],
                noise_message_ids: vec![],
            };
            Ok(serde_json::to_string(&analysis).unwrap())
        }
    }

    fn chunk(index: usize) -> Chunk {
        Chunk {
            index,
            messages: vec![Message {
                id: index,
                sender: "Carly".to_string(),
                body: "body".to_string(),
                timestamp: None,
            }],
        }
    }

    fn fast_config() -> CompletionConfig {
        CompletionConfig {
            rate_limit_rps: 1000.0,
            rate_limit_burst: 1000,
            max_retries: 0,
            initial_delay: Duration::from_millis(1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_failed_chunk_contributes_empty_result() {
        let client = CompletionClient::new(Arc::new(PerChunkProvider), fast_config());
        let chunks = vec![chunk(0), chunk(1), chunk(2)];
        let deadline = Instant::now() + Duration::from_secs(30);

        let outcome =
            analyze_chunks(&client, &chunks, &AnalyzeConfig::default(), deadline, None).await;

        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.results[0].services[0].description, "service from chunk 0");
        assert!(outcome.results[1].services.is_empty());
        assert_eq!(outcome.results[2].services[0].description, "service from chunk 2");

        assert_eq!(outcome.errors.len(), 1);
        assert!(matches!(
            outcome.errors[0],
            PipelineError::ChunkAnalysisFailure { chunk_index: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_progress_events_emitted_per_chunk() {
        let client = CompletionClient::new(Arc::new(PerChunkProvider), fast_config());
        let chunks = vec![chunk(0), chunk(2)];
        let deadline = Instant::now() + Duration::from_secs(30);
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        analyze_chunks(&client, &chunks, &AnalyzeConfig::default(), deadline, Some(&tx)).await;
        drop(tx);

        let mut events = 0;
        while rx.recv().await.is_some() {
            events += 1;
        }
        assert_eq!(events, 2);
    }
}
