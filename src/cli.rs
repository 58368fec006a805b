use crate::engine::{EngineControl, OptimizerEngine};
use crate::model::{AnalysisInput, RunConfig, WorkflowEvent, WorkflowEventKind, WorkflowOutcome};
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

/// Service address used when neither --base-url nor RESUME_API_URL is set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "resume-optimizer",
    version,
    about = "Score a resume against a job description via a remote analysis service, with optional TUI"
)]
pub struct Cli {
    /// Base URL of the analysis service (falls back to RESUME_API_URL, then a local default)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Resume file to upload (.pdf, .docx, .txt; extraction happens server-side)
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Job description text
    #[arg(long)]
    pub job_description: Option<String>,

    /// Read the job description from a file (ignored when --job-description is set)
    #[arg(long)]
    pub job_description_file: Option<PathBuf>,

    /// Print the analysis report as JSON and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Print a text report and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Per-request HTTP timeout
    #[arg(long, default_value = "60s")]
    pub timeout: humantime::Duration,
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunConfig {
    let base_url = args
        .base_url
        .clone()
        .or_else(|| std::env::var("RESUME_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    RunConfig {
        base_url,
        request_timeout: Duration::from(args.timeout),
        user_agent: format!("resume-optimizer/{}", env!("CARGO_PKG_VERSION")),
    }
}

/// Resolve the initial job description from CLI arguments.
pub async fn load_job_description(args: &Cli) -> Result<String> {
    if let Some(text) = args.job_description.as_ref() {
        return Ok(text.clone());
    }
    if let Some(path) = args.job_description_file.as_deref() {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read job description from {}", path.display()));
    }
    Ok(String::new())
}

pub async fn run(args: Cli) -> Result<()> {
    if args.json && args.text {
        return Err(anyhow::anyhow!("--json and --text are mutually exclusive"));
    }

    #[cfg(feature = "tui")]
    {
        if !args.json && !args.text {
            return crate::tui::run(args).await;
        }
    }

    // One-shot mode; also the fallback when built without TUI support.
    run_once(args).await
}

/// Run the workflow once, streaming progress to stderr and printing the final
/// report to stdout as text or JSON.
async fn run_once(args: Cli) -> Result<()> {
    let resume_path = args
        .resume
        .clone()
        .context("--resume is required without the TUI")?;
    let job_description = load_job_description(&args).await?;
    let cfg = build_config(&args);
    let json_mode = args.json;

    let (out_tx, out_handle) = spawn_output_writer();
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<WorkflowEvent>();
    let (_ctrl_tx, ctrl_rx) = mpsc::unbounded_channel::<EngineControl>();

    let engine = OptimizerEngine::new(cfg);
    let input = AnalysisInput {
        resume_path,
        job_description,
        generation: 0,
    };
    let handle = tokio::spawn(async move { engine.run(input, evt_tx, ctrl_rx).await });

    while let Some(ev) = evt_rx.recv().await {
        match ev.kind {
            WorkflowEventKind::StageStarted { stage } => {
                let _ = out_tx.send(OutputLine::Stderr(format!("== {} ==", stage.label())));
            }
            WorkflowEventKind::UploadCompleted { resume_text } => {
                let _ = out_tx.send(OutputLine::Stderr(format!(
                    "Extracted {} characters of resume text",
                    resume_text.chars().count()
                )));
            }
            WorkflowEventKind::AnalysisSkipped => {
                let _ = out_tx.send(OutputLine::Stderr(
                    "Job description is empty; skipping analysis".into(),
                ));
            }
            WorkflowEventKind::Info(msg) => {
                let _ = out_tx.send(OutputLine::Stderr(msg));
            }
            // Terminal events are reported through the outcome below.
            WorkflowEventKind::AnalysisCompleted { .. }
            | WorkflowEventKind::WorkflowFailed { .. } => {}
        }
    }

    let outcome = handle.await.context("workflow task failed")??;

    let res = match outcome {
        WorkflowOutcome::Analyzed(report) => {
            if json_mode {
                let out = serde_json::to_string_pretty(&report)?;
                let _ = out_tx.send(OutputLine::Stdout(out));
            } else {
                for line in crate::text_summary::build_text_summary(&report).lines {
                    let _ = out_tx.send(OutputLine::Stdout(line));
                }
            }
            Ok(())
        }
        WorkflowOutcome::UploadedOnly { resume_text } => {
            if json_mode {
                let out = serde_json::to_string_pretty(&serde_json::json!({ "text": resume_text }))?;
                let _ = out_tx.send(OutputLine::Stdout(out));
            } else {
                let _ = out_tx.send(OutputLine::Stdout(
                    "Resume uploaded; no job description given, so no analysis was run.".into(),
                ));
            }
            Ok(())
        }
        WorkflowOutcome::Failed { message, .. } => Err(anyhow::anyhow!(message)),
        WorkflowOutcome::Cancelled => Ok(()),
    };

    drop(out_tx);
    let _ = out_handle.await;
    res
}
