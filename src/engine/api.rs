//! HTTP client for the remote analysis service.
//!
//! The service owns text extraction and scoring; this client only speaks its
//! two endpoints and decodes the responses.

use crate::model::{AnalysisReport, RunConfig};
use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    resume_text: &'a str,
    job_description: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    text: String,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(cfg: &RunConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(cfg.request_timeout)
            .user_agent(cfg.user_agent.clone())
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Upload a resume file; the service extracts and returns its text.
    pub async fn upload_resume(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/upload/resume", self.base_url))
            .multipart(form)
            .send()
            .await
            .context("upload request failed")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("upload endpoint returned {status}: {body}");
        }

        let body: UploadResponse = response
            .json()
            .await
            .context("failed to parse upload response")?;
        Ok(body.text)
    }

    /// Score the extracted resume text against the job description.
    pub async fn analyze(&self, resume_text: &str, job_description: &str) -> Result<AnalysisReport> {
        let request = AnalyzeRequest {
            resume_text,
            job_description,
        };

        let response = self
            .http
            .post(format!("{}/analyze", self.base_url))
            .json(&request)
            .send()
            .await
            .context("analyze request failed")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("analyze endpoint returned {status}: {body}");
        }

        let report: AnalysisReport = response
            .json()
            .await
            .context("failed to parse analyze response")?;
        Ok(report.sanitized())
    }
}
