//! HTTP client for the generateContent-style provider API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::warn;

use storebot_core::config::GeminiConfig;
use storebot_core::InferenceError;

use crate::llm::LlmClient;

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

pub struct GeminiClient {
    http: Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    request_timeout: Duration,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            http: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError> {
        // a missing key short-circuits before any network I/O
        let api_key = match &self.api_key {
            Some(key) if !key.expose_secret().trim().is_empty() => key,
            _ => {
                return Err(InferenceError::ProviderUnavailable(
                    "no API key configured".to_string(),
                ))
            }
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateContentRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key.expose_secret())])
            .json(&body)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    InferenceError::Timeout
                } else {
                    // without_url keeps the keyed query string out of logs
                    InferenceError::ProviderUnavailable(error.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                event_name = "gateway.provider_error",
                status = status.as_u16(),
                "provider returned non-success status"
            );
            return Err(InferenceError::ProviderError { code: status.as_u16() });
        }

        let parsed: GenerateContentResponse =
            response.json().await.map_err(|_| InferenceError::MalformedResponse)?;

        first_text(parsed)
            .map(|text| text.trim().to_string())
            .ok_or(InferenceError::MalformedResponse)
    }
}

/// First candidate's first text segment, the only part of the nested
/// response shape this service cares about.
fn first_text(response: GenerateContentResponse) -> Option<String> {
    response.candidates.into_iter().next()?.content?.parts.into_iter().next()?.text
}

#[cfg(test)]
mod tests {
    use storebot_core::config::GeminiConfig;
    use storebot_core::InferenceError;

    use crate::llm::LlmClient;

    use super::{first_text, GeminiClient, GenerateContentResponse};

    fn parse(raw: &str) -> GenerateContentResponse {
        serde_json::from_str(raw).expect("valid json")
    }

    #[test]
    fn well_formed_response_yields_the_first_text_segment() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"first"},{"text":"second"}]}},
                {"content":{"parts":[{"text":"other candidate"}]}}]}"#,
        );
        assert_eq!(first_text(response), Some("first".to_string()));
    }

    #[test]
    fn missing_candidates_is_malformed() {
        assert_eq!(first_text(parse(r#"{}"#)), None);
        assert_eq!(first_text(parse(r#"{"candidates":[]}"#)), None);
    }

    #[test]
    fn missing_parts_or_text_is_malformed() {
        assert_eq!(first_text(parse(r#"{"candidates":[{"content":{"parts":[]}}]}"#)), None);
        assert_eq!(first_text(parse(r#"{"candidates":[{"content":{"parts":[{}]}}]}"#)), None);
        assert_eq!(first_text(parse(r#"{"candidates":[{}]}"#)), None);
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_network_call() {
        let client = GeminiClient::new(&GeminiConfig {
            api_key: None,
            // unroutable on purpose: the call must never get this far
            base_url: "http://127.0.0.1:1".to_string(),
            model: "gemini-2.5-flash-lite".to_string(),
            request_timeout_secs: 1,
        });

        let result = client.complete("hello").await;
        assert!(matches!(result, Err(InferenceError::ProviderUnavailable(_))));
    }
}
