use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use meetminer::{
    heuristics, parse_transcript, read_transcript_file, AnalyzeConfig, ChunkConfig,
    CompletionClient, CompletionConfig, ExtractionReport, HumanReport, OpenRouterProvider,
    Pipeline, PipelineConfig, ProgressEvent, ProviderConfig,
};

#[derive(Parser)]
#[command(name = "meetminer")]
#[command(author, version, about = "Meeting transcript extraction pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract contacts, services, and profiles from a meeting chat log
    Extract {
        /// Input transcript file (Zoom chat .txt format)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the extraction report (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for a human-readable report (text)
        #[arg(long)]
        human_readable: Option<PathBuf>,

        /// Primary model (OpenRouter format)
        #[arg(long)]
        model: Option<String>,

        /// Messages per analysis chunk
        #[arg(long, default_value = "50")]
        chunk_size: usize,

        /// Messages shared between consecutive chunks
        #[arg(long, default_value = "5")]
        overlap: usize,

        /// Concurrent chunk analysis calls
        #[arg(long, default_value = "4")]
        max_concurrency: usize,

        /// Wall-clock deadline for the whole run, in seconds
        #[arg(long, default_value = "300")]
        deadline_secs: u64,

        /// Run id; pass the id of an interrupted run to resume it
        #[arg(long)]
        run_id: Option<String>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Parse a transcript and print statistics without calling any model
    Parse {
        /// Input transcript file (Zoom chat .txt format)
        #[arg(short, long)]
        input: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input,
            output,
            human_readable,
            model,
            chunk_size,
            overlap,
            max_concurrency,
            deadline_secs,
            run_id,
            verbose,
        } => {
            setup_logging(verbose);
            extract(
                input,
                output,
                human_readable,
                model,
                chunk_size,
                overlap,
                max_concurrency,
                deadline_secs,
                run_id,
            )
            .await
        }
        Commands::Parse { input, verbose } => {
            setup_logging(verbose);
            parse_only(input)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

#[allow(clippy::too_many_arguments)]
async fn extract(
    input: PathBuf,
    output: PathBuf,
    human_readable: Option<PathBuf>,
    model: Option<String>,
    chunk_size: usize,
    overlap: usize,
    max_concurrency: usize,
    deadline_secs: u64,
    run_id: Option<String>,
) -> Result<()> {
    info!("Loading transcript from {:?}", input);
    let transcript = read_transcript_file(&input)?;

    let provider_config = ProviderConfig::from_env()?;
    let mut completion_config = CompletionConfig::default();
    if let Some(model) = model {
        completion_config.model = model;
    }
    let client = Arc::new(CompletionClient::new(
        Arc::new(OpenRouterProvider::new(provider_config)),
        completion_config,
    ));

    let pipeline_config = PipelineConfig {
        chunking: ChunkConfig {
            chunk_size,
            overlap,
        },
        analysis: AnalyzeConfig { max_concurrency },
        deadline: Duration::from_secs(deadline_secs),
        ..Default::default()
    };

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::unbounded_channel();
    let progress_task = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            match event {
                ProgressEvent::StageStarted { stage } => info!("Stage {} started", stage),
                ProgressEvent::StageCompleted { stage } => info!("Stage {} completed", stage),
                ProgressEvent::ChunkCompleted { index, total } => {
                    info!("Chunk {}/{} analyzed", index + 1, total)
                }
            }
        }
    });

    let run_id = run_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let pipeline = Pipeline::new(client)
        .with_config(pipeline_config)
        .with_progress(progress_tx);

    let result = pipeline
        .run(&transcript, Some(run_id.clone()))
        .await
        .context("Extraction pipeline failed")?;
    // The pipeline holds the last sender; drop it so the logger task drains
    drop(pipeline);
    progress_task.await.ok();

    if result.partial {
        info!("Run hit its deadline; writing partial result");
    }
    for error in &result.errors {
        info!("Recovered error: {}", error);
    }

    let report = ExtractionReport::new(result, &run_id);
    report.write_json(&output)?;
    info!("Report written to {:?}", output);

    if let Some(human_path) = human_readable {
        HumanReport::new(&report).write_file(&human_path)?;
        info!("Human-readable report written to {:?}", human_path);
    }

    info!(
        "Complete: {} contacts, {} services, {} messages kept",
        report.metadata.contact_count, report.metadata.service_count, report.metadata.messages_kept
    );

    Ok(())
}

fn parse_only(input: PathBuf) -> Result<()> {
    info!("Parsing transcript from {:?}", input);
    let transcript = read_transcript_file(&input)?;
    let messages = parse_transcript(&transcript);

    let senders: std::collections::BTreeSet<&str> =
        messages.iter().map(|m| m.sender.as_str()).collect();
    let filler = messages
        .iter()
        .filter(|m| heuristics::is_filler_message(&m.body))
        .count();
    let hard_contacts = heuristics::extract_hard_contacts(&messages);
    let with_email = hard_contacts.values().filter(|h| h.email.is_some()).count();
    let with_phone = hard_contacts.values().filter(|h| h.phone.is_some()).count();
    let with_roles = hard_contacts
        .values()
        .filter(|h| !h.roles.is_empty())
        .count();

    println!("Transcript Statistics");
    println!("=====================");
    println!("Messages: {}", messages.len());
    println!("Senders: {}", senders.len());
    println!("Filler messages: {}", filler);
    println!();
    println!("Hard Contact Data");
    println!("-----------------");
    println!("With email: {}", with_email);
    println!("With phone: {}", with_phone);
    println!("With role tags: {}", with_roles);

    Ok(())
}
