use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    pub user_agent: String,
}

/// The two remote calls of the workflow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Upload,
    Analyze,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Upload => "Uploading resume",
            Stage::Analyze => "Analyzing",
        }
    }

    /// Fixed message shown when a failure carries no message of its own.
    pub fn fallback_error(self) -> &'static str {
        match self {
            Stage::Upload => "Failed to upload resume",
            Stage::Analyze => "Failed to analyze resume",
        }
    }
}

/// Everything the engine needs for one analysis run, snapshotted at the moment
/// the user triggers it.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub resume_path: PathBuf,
    pub job_description: String,
    /// Session generation at trigger time; events from a run that outlived a
    /// reset carry a stale generation and are discarded on arrival.
    pub generation: u64,
}

/// Events emitted by the engine and consumed by UI/CLI layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEvent {
    pub generation: u64,
    pub kind: WorkflowEventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkflowEventKind {
    StageStarted { stage: Stage },
    UploadCompleted { resume_text: String },
    /// Upload succeeded but the job description was empty, so the analyze
    /// endpoint is never called.
    AnalysisSkipped,
    AnalysisCompleted { report: AnalysisReport },
    WorkflowFailed { stage: Stage, message: String },
    Info(String),
}

/// Terminal result of one workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkflowOutcome {
    Analyzed(AnalysisReport),
    UploadedOnly { resume_text: String },
    Failed { stage: Stage, message: String },
    Cancelled,
}

/// Analysis response from the remote service. The wire format is camelCase
/// and the trailing fields are optional; missing fields decode to their
/// empty forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisReport {
    pub keywords: Vec<String>,
    pub matched_keywords: Vec<String>,
    pub score: f64,
    pub suggestions: Vec<String>,
    pub key_skills_analysis: String,
    pub improvement_areas: String,
}

impl AnalysisReport {
    /// Drop matched entries that are not members of `keywords`, making the
    /// subset invariant structural rather than trusted.
    pub fn sanitized(mut self) -> Self {
        let keywords = self.keywords.clone();
        self.matched_keywords.retain(|k| keywords.contains(k));
        self
    }

    /// Required keywords absent from the resume. Derived on read, never
    /// stored; preserves `keywords` order.
    pub fn missing_keywords(&self) -> Vec<String> {
        self.keywords
            .iter()
            .filter(|k| !self.matched_keywords.contains(k))
            .cloned()
            .collect()
    }
}
