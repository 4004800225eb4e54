//! Gemini provider implementation
//!
//! Talks to the Google Generative Language REST API. Transport failures
//! retry with exponential backoff up to a bounded attempt count; parse
//! failures are deterministic and surface immediately so the pipeline can
//! fall back without burning retry budget.

use crate::parser::parse_analysis;
use crate::prompt::PromptBuilder;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use verity_domain::{
    AnalysisDepth, ClassificationResult, ClassifyError, GenerativeClassifier,
};

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default timeout for generation requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retry attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Gemini-backed generative classifier
pub struct GeminiClassifier {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    max_retries: u32,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

impl GeminiClassifier {
    /// Create a new Gemini classifier
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap();

        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Create a classifier against the default endpoint and model
    pub fn default_endpoint(api_key: impl Into<String>) -> Self {
        Self::new(
            DEFAULT_ENDPOINT,
            DEFAULT_MODEL,
            api_key,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Set the maximum number of retry attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The model identifier stamped into result metadata
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate raw text from the model.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Upstream`] if the API is unreachable, the
    /// request times out, the model is unknown, or the API envelope carries
    /// no text.
    pub async fn generate(&self, prompt: &str) -> Result<String, ClassifyError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        );

        let request_body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                max_output_tokens: 2048,
            },
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self.client.post(&url).json(&request_body).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        let body: GenerateResponse = response.json().await.map_err(|e| {
                            ClassifyError::Upstream(format!("malformed API response: {e}"))
                        })?;
                        return body
                            .candidates
                            .into_iter()
                            .next()
                            .and_then(|c| c.content.parts.into_iter().next())
                            .map(|p| p.text)
                            .ok_or_else(|| {
                                ClassifyError::Upstream("no text in response".to_string())
                            });
                    } else if response.status() == reqwest::StatusCode::NOT_FOUND {
                        // Unknown model never recovers by retrying
                        return Err(ClassifyError::Upstream(format!(
                            "model not available: {}",
                            self.model
                        )));
                    } else {
                        let status = response.status();
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "unknown error".to_string());
                        last_error =
                            Some(ClassifyError::Upstream(format!("HTTP {status}: {error_text}")));
                    }
                }
                Err(e) => {
                    last_error = Some(ClassifyError::Upstream(format!("request failed: {e}")));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, ...
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                debug!(attempt = attempts, ?delay, "retrying generation request");
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| ClassifyError::Upstream("max retries exceeded".to_string())))
    }
}

#[async_trait]
impl GenerativeClassifier for GeminiClassifier {
    async fn classify(
        &self,
        content: &str,
        source_url: Option<&str>,
        depth: AnalysisDepth,
    ) -> Result<ClassificationResult, ClassifyError> {
        let prompt = PromptBuilder::new(content, source_url, depth).build();
        let raw = self.generate(&prompt).await?;

        match parse_analysis(&raw, depth, source_url, &self.model) {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(%depth, "could not parse model response: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_creation() {
        let classifier = GeminiClassifier::new(
            "http://localhost:9999",
            "gemini-2.0-flash",
            "key",
            Duration::from_secs(5),
        );
        assert_eq!(classifier.endpoint, "http://localhost:9999");
        assert_eq!(classifier.model(), "gemini-2.0-flash");
        assert_eq!(classifier.max_retries, DEFAULT_MAX_RETRIES);
    }

    #[test]
    fn test_default_endpoint() {
        let classifier = GeminiClassifier::default_endpoint("key");
        assert_eq!(classifier.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(classifier.model(), DEFAULT_MODEL);
    }

    #[test]
    fn test_with_max_retries() {
        let classifier = GeminiClassifier::default_endpoint("key").with_max_retries(1);
        assert_eq!(classifier.max_retries, 1);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_upstream_error() {
        // Nothing listens here; the request fails at the transport layer
        let classifier = GeminiClassifier::new(
            "http://127.0.0.1:1",
            "gemini-2.0-flash",
            "key",
            Duration::from_secs(1),
        )
        .with_max_retries(1);

        let result = classifier
            .classify("test content for analysis", None, AnalysisDepth::Quick)
            .await;
        assert!(matches!(result, Err(ClassifyError::Upstream(_))));
    }

    #[test]
    fn test_request_body_serialization() {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: "prompt".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                max_output_tokens: 2048,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn test_response_body_deserialization() {
        let raw = r#"{"candidates": [{"content": {"parts": [{"text": "{\"classification\": \"authentic\"}"}]}}]}"#;
        let body: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(body.candidates.len(), 1);
        assert_eq!(
            body.candidates[0].content.parts[0].text,
            "{\"classification\": \"authentic\"}"
        );
    }
}
