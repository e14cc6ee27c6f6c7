use std::collections::HashMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::PipelineError;

/// Key-value store for per-stage checkpoints, keyed by run id and stage
/// name. Any backing store (in-memory, file, external cache) can be
/// substituted without touching orchestration logic.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self, run_id: &str, stage: &str) -> Option<String>;
    async fn store(&self, run_id: &str, stage: &str, payload: String);
}

/// Default in-memory checkpoint store. Survives a pipeline restart within
/// the same process, not across processes.
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn load(&self, run_id: &str, stage: &str) -> Option<String> {
        let entries = self.entries.lock().await;
        entries.get(&(run_id.to_string(), stage.to_string())).cloned()
    }

    async fn store(&self, run_id: &str, stage: &str, payload: String) {
        let mut entries = self.entries.lock().await;
        entries.insert((run_id.to_string(), stage.to_string()), payload);
    }
}

/// Load a checkpointed stage output, deserialized as `T`.
pub async fn load_stage<T: DeserializeOwned>(
    store: &dyn CheckpointStore,
    run_id: &str,
    stage: &str,
) -> Option<T> {
    let payload = store.load(run_id, stage).await?;
    serde_json::from_str(&payload).ok()
}

/// Checkpoint a stage output as JSON.
pub async fn store_stage<T: Serialize>(
    store: &dyn CheckpointStore,
    run_id: &str,
    stage: &str,
    value: &T,
) -> Result<(), PipelineError> {
    let payload =
        serde_json::to_string(value).map_err(|e| PipelineError::Checkpoint(e.to_string()))?;
    store.store(run_id, stage, payload).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip() {
        let store = InMemoryCheckpointStore::new();
        store_stage(&store, "run-1", "parse", &vec![1u32, 2, 3])
            .await
            .unwrap();

        let loaded: Option<Vec<u32>> = load_stage(&store, "run-1", "parse").await;
        assert_eq!(loaded, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_miss_on_other_run() {
        let store = InMemoryCheckpointStore::new();
        store_stage(&store, "run-1", "parse", &1u32).await.unwrap();

        let loaded: Option<u32> = load_stage(&store, "run-2", "parse").await;
        assert!(loaded.is_none());
    }
}
