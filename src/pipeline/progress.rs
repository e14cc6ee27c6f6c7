use serde::Serialize;

/// Run-scoped progress notifications, emitted through a channel handed to
/// the pipeline rather than process-wide shared state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum ProgressEvent {
    StageStarted { stage: &'static str },
    StageCompleted { stage: &'static str },
    ChunkCompleted { index: usize, total: usize },
}
