// Classifier Adapter
// One HTTP call per block against an external text-classification endpoint

use crate::models::{ChunkLabel, ClassificationResult};
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

const DEFAULT_INFERENCE_URL: &str =
    "https://api-inference.huggingface.co/models/roberta-base-openai-detector";

/// The label the external model assigns to machine-generated text.
const MACHINE_LABEL: &str = "Fake";

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("response contained no classification")]
    EmptyResponse,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// The endpoint returns either a ranked list per input or a bare ranked
/// list; accept both shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_top_ranked(self) -> Option<LabelScore> {
        match self {
            Self::Nested(rows) => rows.into_iter().next().and_then(|r| r.into_iter().next()),
            Self::Flat(row) => row.into_iter().next(),
        }
    }
}

pub struct ClassifierClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl Default for ClassifierClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierClient {
    pub fn new() -> Self {
        let base_url = env::var("EDUCHECK_CLASSIFIER_URL")
            .unwrap_or_else(|_| DEFAULT_INFERENCE_URL.to_string());
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(80))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
            api_token: resolve_api_token(),
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Classify one block of text: a single call, no batching, no retry,
    /// no cache. Only the top-ranked (label, score) pair of the response
    /// is consumed.
    pub async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifierError> {
        let request = serde_json::json!({ "inputs": text });

        let start = Instant::now();
        let mut builder = self
            .client
            .post(&self.base_url)
            .header("Content-Type", "application/json")
            .json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let response = builder.send().await?;
        let latency_ms = start.elapsed().as_millis() as i64;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: InferenceResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::JsonError(e.to_string()))?;

        let top = data.into_top_ranked().ok_or(ClassifierError::EmptyResponse)?;
        debug!(label = %top.label, score = top.score, latency_ms, "classifier.block_scored");

        Ok(classification_from_label(top.label, top.score))
    }
}

fn classification_from_label(raw_label: String, confidence: f64) -> ClassificationResult {
    let label = if raw_label == MACHINE_LABEL {
        ChunkLabel::MachineGenerated
    } else {
        ChunkLabel::HumanAuthored
    };
    ClassificationResult {
        label,
        raw_label,
        confidence,
    }
}

/// Bearer token for the inference endpoint: environment first, then the
/// config file. Absent is fine; the public endpoint accepts anonymous
/// calls at a lower rate limit.
fn resolve_api_token() -> Option<String> {
    for key in ["EDUCHECK_API_TOKEN", "HF_API_TOKEN"] {
        if let Ok(val) = env::var(key) {
            let v = val.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }

    if let Some(config_dir) = super::ConfigStore::default_config_dir() {
        let store = super::ConfigStore::new(config_dir);
        if let Ok(Some(token)) = store.get_api_token("huggingface") {
            return Some(token);
        }
    }

    None
}

/// Process-wide classifier handle: built once on first use, reused by
/// every scan for the life of the process.
pub fn shared_classifier() -> &'static ClassifierClient {
    static CLASSIFIER: OnceLock<ClassifierClient> = OnceLock::new();
    CLASSIFIER.get_or_init(ClassifierClient::new)
}
