pub mod error;
pub mod heuristics;
pub mod io;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod stages;

pub use error::PipelineError;
pub use io::{read_transcript_file, ExtractionReport, HumanReport, ReportMetadata};
pub use llm::{
    CompletionClient, CompletionConfig, CompletionProvider, OpenRouterProvider, ProviderConfig,
};
pub use models::{
    ContactRecord, MeetingSummary, Message, PipelineResult, ProfileFragment, ServiceKind,
    ServiceRecord,
};
pub use pipeline::{
    CheckpointStore, InMemoryCheckpointStore, Pipeline, PipelineConfig, ProgressEvent,
};
pub use stages::{chunk_messages, parse_transcript, AnalyzeConfig, ChunkConfig};
