//! Workflow lifecycle controller.
//!
//! Serializes analysis runs and bridges UI commands to engine control.

use crate::engine::{EngineControl, OptimizerEngine};
use crate::model::{
    AnalysisInput, RunConfig, Stage, WorkflowEvent, WorkflowEventKind, WorkflowOutcome,
};
use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Commands emitted by the UI layer to drive the workflow.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Analyze(AnalysisInput),
    Reset,
    Quit,
}

/// Internal handle for a running workflow task.
struct RunCtx {
    generation: u64,
    ctrl_tx: UnboundedSender<EngineControl>,
    handle: Option<tokio::task::JoinHandle<Result<WorkflowOutcome>>>,
}

/// Spawn a workflow run and return its control handle.
fn start_run(
    cfg: &RunConfig,
    input: AnalysisInput,
    event_tx: UnboundedSender<WorkflowEvent>,
) -> RunCtx {
    let generation = input.generation;
    let (ctrl_tx, ctrl_rx) = tokio::sync::mpsc::unbounded_channel::<EngineControl>();
    let engine = OptimizerEngine::new(cfg.clone());
    let handle = tokio::spawn(async move { engine.run(input, event_tx, ctrl_rx).await });
    RunCtx {
        generation,
        ctrl_tx,
        handle: Some(handle),
    }
}

/// Orchestrate workflow runs based on UI commands.
pub(crate) async fn run_controller(
    cfg: &RunConfig,
    event_tx: UnboundedSender<WorkflowEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut run_ctx: Option<RunCtx> = None;
    let mut pending: Option<AnalysisInput> = None;
    let mut quit_pending = false;

    let res = loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Analyze(input)) => {
                        // One run at a time. A run requested while the previous
                        // one is still draining (analyze right after a reset,
                        // for instance: the session no longer shows loading but
                        // the cancelled call runs to completion) is queued and
                        // started as soon as the old run finishes.
                        if run_ctx.is_none() {
                            run_ctx = Some(start_run(cfg, input, event_tx.clone()));
                        } else {
                            let _ = event_tx.send(WorkflowEvent {
                                generation: input.generation,
                                kind: WorkflowEventKind::Info(
                                    "Waiting for the previous run to finish".into(),
                                ),
                            });
                            pending = Some(input);
                        }
                    }
                    Some(UiCommand::Reset) => {
                        // The session was already reset on the UI side; drop
                        // anything queued and ask the active run to stop
                        // between stages. Whatever it still emits carries a
                        // stale generation and is discarded on arrival.
                        pending = None;
                        if let Some(ctx) = &run_ctx {
                            let _ = ctx.ctrl_tx.send(EngineControl::Cancel);
                        }
                    }
                    Some(UiCommand::Quit) | None => {
                        // Quit waits for the current run to finish so the task
                        // is not left detached.
                        quit_pending = true;
                        pending = None;
                        if let Some(ctx) = &run_ctx {
                            let _ = ctx.ctrl_tx.send(EngineControl::Cancel);
                        } else {
                            break Ok(());
                        }
                    }
                }
            }
            // Do not take the JoinHandle before this branch wins; otherwise it
            // can be dropped if another select branch is chosen, and we'll
            // never observe completion.
            maybe_done = async {
                if let Some(ctx) = &mut run_ctx {
                    if let Some(h) = ctx.handle.as_mut() {
                        return Some(h.await);
                    }
                }
                futures::future::pending().await
            } => {
                if let Some(join_res) = maybe_done {
                    let generation = run_ctx.as_ref().map(|c| c.generation).unwrap_or(0);
                    if let Some(ctx) = &mut run_ctx {
                        ctx.handle.take();
                    }
                    match join_res {
                        Ok(Ok(_outcome)) => {
                            // Terminal events were already emitted by the engine.
                        }
                        Ok(Err(e)) => {
                            let _ = event_tx.send(WorkflowEvent {
                                generation,
                                kind: WorkflowEventKind::WorkflowFailed {
                                    stage: Stage::Upload,
                                    message: format!("{e:#}"),
                                },
                            });
                        }
                        Err(e) => {
                            let _ = event_tx.send(WorkflowEvent {
                                generation,
                                kind: WorkflowEventKind::WorkflowFailed {
                                    stage: Stage::Upload,
                                    message: format!("workflow task failed: {e}"),
                                },
                            });
                        }
                    }
                    run_ctx = None;
                    if quit_pending {
                        break Ok(());
                    }
                    if let Some(input) = pending.take() {
                        run_ctx = Some(start_run(cfg, input, event_tx.clone()));
                    }
                }
            }
        }
    };

    res
}
