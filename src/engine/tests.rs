use super::testutil::{
    resume_fixture, spawn_mock_service, test_config, Endpoint, ANALYZE_OK, UPLOAD_OK,
};
use super::{EngineControl, OptimizerEngine};
use crate::model::{
    AnalysisInput, RunConfig, Stage, WorkflowEvent, WorkflowEventKind, WorkflowOutcome,
};
use crate::session::SessionState;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

fn input(resume_path: PathBuf, job_description: &str) -> AnalysisInput {
    AnalysisInput {
        resume_path,
        job_description: job_description.to_string(),
        generation: 0,
    }
}

async fn run_engine(
    cfg: RunConfig,
    input: AnalysisInput,
) -> (WorkflowOutcome, Vec<WorkflowEvent>) {
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel();
    let (_ctrl_tx, ctrl_rx) = mpsc::unbounded_channel();

    let outcome = OptimizerEngine::new(cfg)
        .run(input, evt_tx, ctrl_rx)
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Ok(ev) = evt_rx.try_recv() {
        events.push(ev);
    }
    (outcome, events)
}

fn apply_all(session: &mut SessionState, events: &[WorkflowEvent]) {
    for ev in events {
        session.apply_event(ev);
    }
}

#[tokio::test]
async fn full_workflow_scores_the_resume() {
    let service = spawn_mock_service(Endpoint::ok(UPLOAD_OK), Endpoint::ok(ANALYZE_OK)).await;
    let (_dir, resume) = resume_fixture("plain resume bytes");

    let (outcome, events) = run_engine(
        test_config(service.addr),
        input(resume, "Seeking Python engineer"),
    )
    .await;

    let WorkflowOutcome::Analyzed(report) = outcome else {
        panic!("expected analyzed outcome");
    };
    assert_eq!(report.score, 50.0);
    assert_eq!(report.matched_keywords, vec!["Python"]);
    assert_eq!(report.missing_keywords(), vec!["engineer"]);
    assert_eq!(service.hit_paths(), vec!["/upload/resume", "/analyze"]);

    let mut session = SessionState::default();
    session.set_job_description("Seeking Python engineer");
    apply_all(&mut session, &events);
    assert_eq!(session.resume_text, "John Doe, 5 years Python");
    assert_eq!(session.score, 50.0);
    assert_eq!(session.missing_keywords(), vec!["engineer"]);
    assert!(!session.is_loading);
    assert_eq!(session.error, None);
}

#[tokio::test]
async fn empty_job_description_skips_the_analyze_endpoint() {
    let service = spawn_mock_service(Endpoint::ok(UPLOAD_OK), Endpoint::ok(ANALYZE_OK)).await;
    let (_dir, resume) = resume_fixture("plain resume bytes");

    let (outcome, events) = run_engine(test_config(service.addr), input(resume, "")).await;

    assert!(matches!(outcome, WorkflowOutcome::UploadedOnly { .. }));
    assert_eq!(service.hit_paths(), vec!["/upload/resume"]);
    assert!(events
        .iter()
        .any(|ev| matches!(ev.kind, WorkflowEventKind::AnalysisSkipped)));

    let mut session = SessionState::default();
    apply_all(&mut session, &events);
    assert_eq!(session.resume_text, "John Doe, 5 years Python");
    assert!(!session.has_results());
    assert!(!session.is_loading);
    assert_eq!(session.error, None);
}

#[tokio::test]
async fn upload_failure_reports_and_preserves_prior_text() {
    let service = spawn_mock_service(
        Endpoint::error(500, r#"{"detail": "extraction blew up"}"#),
        Endpoint::ok(ANALYZE_OK),
    )
    .await;
    let (_dir, resume) = resume_fixture("plain resume bytes");

    let (outcome, events) = run_engine(
        test_config(service.addr),
        input(resume, "Seeking Python engineer"),
    )
    .await;

    let WorkflowOutcome::Failed { stage, message } = outcome else {
        panic!("expected failed outcome");
    };
    assert_eq!(stage, Stage::Upload);
    assert!(message.contains("500"));
    assert_eq!(service.hit_paths(), vec!["/upload/resume"]);

    let mut session = SessionState::default();
    session.complete_call_success(crate::session::CallPatch::ResumeText(
        "text from an earlier upload".into(),
    ));
    apply_all(&mut session, &events);
    assert!(session.error.is_some());
    assert!(!session.is_loading);
    assert_eq!(session.resume_text, "text from an earlier upload");
}

#[tokio::test]
async fn analyze_failure_keeps_the_uploaded_text() {
    let service = spawn_mock_service(
        Endpoint::ok(UPLOAD_OK),
        Endpoint::error(503, r#"{"detail": "model overloaded"}"#),
    )
    .await;
    let (_dir, resume) = resume_fixture("plain resume bytes");

    let (outcome, events) = run_engine(
        test_config(service.addr),
        input(resume, "Seeking Python engineer"),
    )
    .await;

    assert!(matches!(
        outcome,
        WorkflowOutcome::Failed {
            stage: Stage::Analyze,
            ..
        }
    ));

    let mut session = SessionState::default();
    apply_all(&mut session, &events);
    assert_eq!(session.resume_text, "John Doe, 5 years Python");
    assert!(session.error.is_some());
    assert!(!session.has_results());
}

#[tokio::test]
async fn analyze_defaults_missing_optional_fields() {
    let service = spawn_mock_service(
        Endpoint::ok(UPLOAD_OK),
        Endpoint::ok(r#"{"keywords": ["Rust"], "matchedKeywords": ["Rust"], "score": 100}"#),
    )
    .await;
    let (_dir, resume) = resume_fixture("plain resume bytes");

    let (outcome, _) = run_engine(test_config(service.addr), input(resume, "Rust role")).await;

    let WorkflowOutcome::Analyzed(report) = outcome else {
        panic!("expected analyzed outcome");
    };
    assert!(report.suggestions.is_empty());
    assert_eq!(report.key_skills_analysis, "");
    assert_eq!(report.improvement_areas, "");
}

#[tokio::test]
async fn unreachable_service_surfaces_an_upload_error() {
    // Bind and immediately drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let (_dir, resume) = resume_fixture("plain resume bytes");

    let (outcome, events) = run_engine(test_config(addr), input(resume, "any role")).await;

    let WorkflowOutcome::Failed { stage, message } = outcome else {
        panic!("expected failed outcome");
    };
    assert_eq!(stage, Stage::Upload);
    assert!(!message.is_empty());
    assert!(events
        .iter()
        .any(|ev| matches!(ev.kind, WorkflowEventKind::WorkflowFailed { .. })));
}

#[tokio::test]
async fn cancel_between_stages_stops_before_analyze() {
    let slow_upload = Endpoint::slow(UPLOAD_OK, Duration::from_millis(300));
    let service = spawn_mock_service(slow_upload, Endpoint::ok(ANALYZE_OK)).await;
    let (_dir, resume) = resume_fixture("plain resume bytes");

    let (evt_tx, _evt_rx) = mpsc::unbounded_channel();
    let (ctrl_tx, ctrl_rx) = mpsc::unbounded_channel();
    let engine = OptimizerEngine::new(test_config(service.addr));
    let run = tokio::spawn(engine.run(input(resume, "Seeking Python engineer"), evt_tx, ctrl_rx));

    // Let the upload get in flight, then cancel while it is still running.
    tokio::time::sleep(Duration::from_millis(100)).await;
    ctrl_tx.send(EngineControl::Cancel).unwrap();

    let outcome = run.await.unwrap().unwrap();
    assert!(matches!(outcome, WorkflowOutcome::Cancelled));
    assert_eq!(service.hit_paths(), vec!["/upload/resume"]);
}
