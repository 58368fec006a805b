//! Two-step analysis workflow: upload the resume, then analyze the extracted
//! text against the job description. The analyze stage only runs after a
//! successful upload with a non-empty job description. Each run executes
//! once, with no retry and no cancellation of an individual call in flight.

mod api;
#[cfg(test)]
mod tests;
#[cfg(test)]
pub(crate) mod testutil;

pub use api::ApiClient;

use crate::model::{
    AnalysisInput, RunConfig, Stage, WorkflowEvent, WorkflowEventKind, WorkflowOutcome,
};
use anyhow::Result;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum EngineControl {
    /// Abandon the workflow between stages. The HTTP call currently in
    /// flight still runs to completion; its result is simply not acted on.
    Cancel,
}

pub struct OptimizerEngine {
    cfg: RunConfig,
}

impl OptimizerEngine {
    pub fn new(cfg: RunConfig) -> Self {
        Self { cfg }
    }

    pub async fn run(
        self,
        input: AnalysisInput,
        event_tx: mpsc::UnboundedSender<WorkflowEvent>,
        mut control_rx: mpsc::UnboundedReceiver<EngineControl>,
    ) -> Result<WorkflowOutcome> {
        let client = ApiClient::new(&self.cfg)?;
        let generation = input.generation;
        let emit = |kind: WorkflowEventKind| {
            let _ = event_tx.send(WorkflowEvent { generation, kind });
        };

        let cancel = Arc::new(AtomicBool::new(false));

        // Control listener.
        let cancel2 = cancel.clone();
        let control_handle = tokio::spawn(async move {
            while let Some(msg) = control_rx.recv().await {
                match msg {
                    EngineControl::Cancel => {
                        cancel2.store(true, Ordering::Relaxed);
                        break;
                    }
                }
            }
        });

        emit(WorkflowEventKind::StageStarted {
            stage: Stage::Upload,
        });

        let resume_text = match client.upload_resume(&input.resume_path).await {
            Ok(text) => {
                emit(WorkflowEventKind::UploadCompleted {
                    resume_text: text.clone(),
                });
                text
            }
            Err(e) => {
                let message = failure_message(&e, Stage::Upload);
                emit(WorkflowEventKind::WorkflowFailed {
                    stage: Stage::Upload,
                    message: message.clone(),
                });
                control_handle.abort();
                return Ok(WorkflowOutcome::Failed {
                    stage: Stage::Upload,
                    message,
                });
            }
        };

        // The skip rule is a visible branch: a successful upload with an
        // empty job description ends the workflow without ever touching the
        // analyze endpoint.
        if input.job_description.is_empty() {
            emit(WorkflowEventKind::AnalysisSkipped);
            control_handle.abort();
            return Ok(WorkflowOutcome::UploadedOnly { resume_text });
        }

        if cancel.load(Ordering::Relaxed) {
            control_handle.abort();
            return Ok(WorkflowOutcome::Cancelled);
        }

        emit(WorkflowEventKind::StageStarted {
            stage: Stage::Analyze,
        });

        let outcome = match client.analyze(&resume_text, &input.job_description).await {
            Ok(report) => {
                emit(WorkflowEventKind::AnalysisCompleted {
                    report: report.clone(),
                });
                WorkflowOutcome::Analyzed(report)
            }
            Err(e) => {
                let message = failure_message(&e, Stage::Analyze);
                emit(WorkflowEventKind::WorkflowFailed {
                    stage: Stage::Analyze,
                    message: message.clone(),
                });
                WorkflowOutcome::Failed {
                    stage: Stage::Analyze,
                    message,
                }
            }
        };

        // Dropping a JoinHandle does not cancel the task in Tokio; abort it
        // so the listener is not left waiting on control_rx after the
        // workflow ends.
        control_handle.abort();

        Ok(outcome)
    }
}

/// Render a workflow error as the single user-facing message for its stage.
fn failure_message(err: &anyhow::Error, stage: Stage) -> String {
    let message = format!("{err:#}");
    if message.trim().is_empty() {
        stage.fallback_error().to_string()
    } else {
        message
    }
}
