// src/core/summary.rs

use crate::core::settings::Settings;
use crate::models::DeployReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("AI request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("AI service answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("AI service returned no text")]
    EmptyResponse,
}

/// Turns a deployment transcript into a short human-readable summary.
pub trait Summarizer {
    fn summarize(&self, prompt: &str) -> Result<String, SummaryError>;
}

// --- GEMINI WIRE MODELS ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Gemini `generateContent` client.
pub struct GeminiSummarizer {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl fmt::Debug for GeminiSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSummarizer")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl GeminiSummarizer {
    pub fn new(api_key: &str, model: &str, endpoint: &str) -> Result<Self, SummaryError> {
        Ok(Self {
            client: reqwest::blocking::Client::builder().build()?,
            api_key: api_key.to_string(),
            model: model.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// `None` when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Option<Result<Self, SummaryError>> {
        settings
            .gemini_api_key
            .as_deref()
            .map(|key| Self::new(key, &settings.gemini_model, &settings.gemini_endpoint))
    }
}

impl Summarizer for GeminiSummarizer {
    fn summarize(&self, prompt: &str) -> Result<String, SummaryError> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        log::debug!("Requesting deployment summary from {}", self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SummaryError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let parsed: GenerateResponse = response.json()?;
        extract_text(parsed).ok_or(SummaryError::EmptyResponse)
    }
}

fn extract_text(response: GenerateResponse) -> Option<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect::<Vec<_>>()
        .join("");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Builds the prompt sent to the summarizer from what the deployment did.
pub fn build_prompt(report: &DeployReport, recent_commits: &str) -> String {
    let mut prompt = String::from(
        "You are reviewing a deployment to a staging server. \
         Summarize in a few sentences what was deployed and whether anything needs attention.\n\n",
    );
    prompt.push_str(&format!("Project: {}\n", report.project));
    if let Some(framework) = &report.framework {
        prompt.push_str(&format!("Framework: {}\n", framework));
    }
    prompt.push_str("\nSteps:\n");
    for step in &report.steps {
        let outcome = if step.succeeded() { "ok" } else { "FAILED" };
        prompt.push_str(&format!(
            "- {} [{} exit {}]: {}\n",
            step.label, outcome, step.exit_status, step.command
        ));
    }
    let commits = recent_commits.trim();
    if !commits.is_empty() {
        prompt.push_str("\nRecent commits:\n");
        prompt.push_str(commits);
        prompt.push('\n');
    }
    prompt
}
