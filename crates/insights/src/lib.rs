//! Short natural-language mission summaries.
//!
//! Summarization is best effort: any failure, including missing credentials, degrades to
//! [`FALLBACK_INSIGHTS`] and never fails the caller.

use std::time::Duration;

use iris_config::InsightsConfig;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const FALLBACK_INSIGHTS: &str =
    "[Fallback] AI unavailable. Keep delta-v optimized. Monitor fuel and trajectory.";

/// Returned when the endpoint answers without any candidate text.
pub const NO_INSIGHTS: &str = "No insights generated.";

/// Figures handed to the summarizer. Units are in the field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionMetrics {
    pub mission_id: String,
    pub target_name: String,
    pub swarm_size: u32,
    pub propulsion_type: String,
    pub delta_v_km_s: f64,
    pub time_of_flight_days: f64,
    pub fuel_required_kg: f64,
    pub max_distance_km: f64,
    pub final_distance_km: f64,
}

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("no API key configured")]
    MissingCredentials,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub trait Summarizer {
    fn summarize(&self, metrics: &MissionMetrics) -> Result<String, SummarizeError>;
}

/// Summarize, substituting the fallback text on any error.
pub fn insights_or_fallback(summarizer: &dyn Summarizer, metrics: &MissionMetrics) -> String {
    match summarizer.summarize(metrics) {
        Ok(text) => text,
        Err(err) => {
            warn!(mission_id = %metrics.mission_id, error = %err, "insights unavailable, using fallback");
            FALLBACK_INSIGHTS.to_string()
        }
    }
}

pub fn build_prompt(metrics: &MissionMetrics) -> Result<String, SummarizeError> {
    let figures = serde_json::to_string(metrics)?;
    Ok(format!(
        "Summarize the nanosatellite mission with metrics: {figures}.\n\
         Provide a short bullet-point list with:\n\
         - Mission efficiency\n\
         - Key risks\n\
         - Recommendations\n\
         Keep it under 5 bullets, concise and clear."
    ))
}

/// Summarizer backed by a `generateContent`-style HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpSummarizer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpSummarizer {
    pub fn from_config(config: &InsightsConfig) -> Result<Self, SummarizeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
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
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Pull the first candidate's first text part out of a response body.
pub fn extract_text(body: &str) -> Result<String, SummarizeError> {
    let response: GenerateResponse = serde_json::from_str(body)?;
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .map(|part| part.text.trim().to_string());
    Ok(text.unwrap_or_else(|| NO_INSIGHTS.to_string()))
}

impl Summarizer for HttpSummarizer {
    fn summarize(&self, metrics: &MissionMetrics) -> Result<String, SummarizeError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(SummarizeError::MissingCredentials)?;
        let prompt = build_prompt(metrics)?;
        let request = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: &prompt }],
            }],
        };

        debug!(endpoint = %self.endpoint, "requesting mission insights");
        let body = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header("x-goog-api-key", key)
            .body(serde_json::to_string(&request)?)
            .send()?
            .error_for_status()?
            .text()?;
        extract_text(&body)
    }
}
