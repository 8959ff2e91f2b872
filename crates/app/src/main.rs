use chrono::Utc;
use clap::{Parser, Subcommand};
use docprompt_core::{
    plan_directory, CancellationFlag, OllamaClient, PipelineDriver, ProgressEvent,
    ProgressReporter, RunOptions, RunReport, DEFAULT_MAX_WORDS, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docprompt", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send every text, PDF, and Word file in a directory to the model and collect the answers in out.txt.
    Run {
        /// Directory containing the documents (not searched recursively).
        directory: PathBuf,
        /// Prompt to send with each document or chunk.
        prompt: String,
        /// Base URL of the Ollama-compatible API.
        #[arg(env = "DOCPROMPT_URL")]
        url: String,
        /// Bearer token for authenticated endpoints.
        #[arg(long, env = "DOCPROMPT_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Maximum words per chunk.
        #[arg(long, default_value_t = DEFAULT_MAX_WORDS)]
        max_words: usize,
        /// Model to use.
        #[arg(long, env = "DOCPROMPT_MODEL", default_value = DEFAULT_MODEL)]
        model: String,
        /// Sampling temperature.
        #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
        temperature: f32,
    },
    /// Show how each document would be split, without calling the model.
    Plan {
        /// Directory containing the documents.
        directory: PathBuf,
        /// Maximum words per chunk.
        #[arg(long, default_value_t = DEFAULT_MAX_WORDS)]
        max_words: usize,
    },
}

/// Echoes pipeline progress to stdout.
struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent<'_>) {
        match event {
            ProgressEvent::FileStarted { path } => {
                println!("\nProcessing file: {}", path.display());
            }
            ProgressEvent::FileSkipped { path, reason } => {
                println!("Skipping {} ({reason}).", path.display());
            }
            ProgressEvent::FileFailed { path, error } => {
                println!("Error processing {}: {error}", path.display());
            }
            ProgressEvent::RecordWritten { record } => {
                println!("\nResponse for {}:\n{}", record.label, record.response);
            }
            ProgressEvent::Finished { outcome } => {
                println!("\n{outcome}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "docprompt boot"
    );

    match cli.command {
        Command::Run {
            directory,
            prompt,
            url,
            api_key,
            max_words,
            model,
            temperature,
        } => {
            let options = RunOptions {
                directory,
                prompt,
                endpoint: url,
                api_key,
                max_words,
                model,
                temperature,
            };
            let report = run(options).await?;
            info!(
                outcome = ?report.outcome,
                records = report.records_written,
                finished_at = %Utc::now().to_rfc3339(),
                "run finished"
            );
        }
        Command::Plan {
            directory,
            max_words,
        } => {
            let plans = plan_directory(&directory, max_words)?;
            if plans.is_empty() {
                println!("no supported documents in {}", directory.display());
            }

            let mut total_units = 0;
            for plan in &plans {
                total_units += plan.units;
                println!(
                    "{} kind={:?} words={} units={}",
                    plan.file_name, plan.kind, plan.word_count, plan.units
                );
            }
            println!("{} document(s), {total_units} inference call(s)", plans.len());
        }
    }

    Ok(())
}

async fn run(options: RunOptions) -> anyhow::Result<RunReport> {
    let config = options.validate()?;
    let cancel = CancellationFlag::new();

    let signal_flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        println!("\nStop requested. Finishing current task...");
        warn!("stop requested, waiting for the in-flight request");
        signal_flag.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("second interrupt, exiting without waiting");
            std::process::exit(130);
        }
    });

    // The blocking HTTP client must be built and dropped off the async runtime.
    let report = tokio::task::spawn_blocking(move || -> anyhow::Result<RunReport> {
        let client = OllamaClient::from_config(&config)?;
        info!(url = client.generate_url(), model = %config.model, "using endpoint");
        let report = PipelineDriver::new(&config, client, ConsoleProgress).run(&cancel)?;
        Ok(report)
    })
    .await??;

    Ok(report)
}
