//! Session state for the optimizer workflow.
//!
//! One owning presentation thread, one logical writer: the UI applies
//! workflow events to the state through the mutation API below, plus direct
//! job-description edits. Nothing here is shared or persisted.

use crate::model::{AnalysisReport, WorkflowEvent, WorkflowEventKind};

/// Payload of a successful remote call, merged into the session.
#[derive(Debug, Clone)]
pub enum CallPatch {
    ResumeText(String),
    Report(AnalysisReport),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub job_description: String,
    pub resume_text: String,
    pub keywords: Vec<String>,
    pub matched_keywords: Vec<String>,
    pub score: f64,
    pub suggestions: Vec<String>,
    pub key_skills_analysis: String,
    pub improvement_areas: String,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Bumped by `reset`; events from runs started before the reset carry the
    /// old value and are dropped by `apply_event`.
    pub generation: u64,
}

impl SessionState {
    pub fn set_job_description(&mut self, text: impl Into<String>) {
        self.job_description = text.into();
    }

    /// A remote call is starting: mark loading and clear the previous error.
    pub fn begin_call(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    pub fn complete_call_success(&mut self, patch: CallPatch) {
        self.is_loading = false;
        self.error = None;
        match patch {
            CallPatch::ResumeText(text) => self.resume_text = text,
            CallPatch::Report(report) => {
                self.keywords = report.keywords;
                self.matched_keywords = report.matched_keywords;
                self.score = report.score;
                self.suggestions = report.suggestions;
                self.key_skills_analysis = report.key_skills_analysis;
                self.improvement_areas = report.improvement_areas;
            }
        }
    }

    /// Failure leaves the prior result fields as they were; stale results may
    /// stay visible alongside the new error.
    pub fn complete_call_failure(&mut self, message: impl Into<String>) {
        self.is_loading = false;
        self.error = Some(message.into());
    }

    /// Restore the initial empty state, discarding results and pending errors.
    pub fn reset(&mut self) {
        *self = SessionState {
            generation: self.generation + 1,
            ..SessionState::default()
        };
    }

    /// Map a workflow event onto the mutation API. Returns false when the
    /// event belongs to a stale generation and was dropped.
    pub fn apply_event(&mut self, ev: &WorkflowEvent) -> bool {
        if ev.generation != self.generation {
            return false;
        }
        match &ev.kind {
            WorkflowEventKind::StageStarted { .. } => self.begin_call(),
            WorkflowEventKind::UploadCompleted { resume_text } => {
                self.complete_call_success(CallPatch::ResumeText(resume_text.clone()));
            }
            WorkflowEventKind::AnalysisCompleted { report } => {
                self.complete_call_success(CallPatch::Report(report.clone()));
            }
            WorkflowEventKind::WorkflowFailed { message, .. } => {
                self.complete_call_failure(message.clone());
            }
            WorkflowEventKind::AnalysisSkipped | WorkflowEventKind::Info(_) => {}
        }
        true
    }

    /// Result panels render only once at least one keyword set is populated.
    pub fn has_results(&self) -> bool {
        !self.keywords.is_empty() || !self.matched_keywords.is_empty()
    }

    /// Derived at render time, never stored.
    pub fn missing_keywords(&self) -> Vec<String> {
        self.keywords
            .iter()
            .filter(|k| !self.matched_keywords.contains(k))
            .cloned()
            .collect()
    }
}
