//! Generative model client
//!
//! Client for the Gemini `generateContent` endpoint, asked to answer in JSON.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const SERVICE: &str = "Generative model";

/// Client for the generative model API
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: &'a GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
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

impl GeminiClient {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        temperature: f32,
        top_p: f32,
        timeout: Duration,
    ) -> AppResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "Generative model API key not configured".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("Generative model HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            base_url,
            model,
            generation_config: GenerationConfig {
                temperature,
                top_p,
                response_mime_type: "application/json".to_string(),
            },
        })
    }

    /// Send a single-turn prompt and return the model's text
    pub async fn generate(&self, prompt: &str) -> AppResult<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: &self.generation_config,
        };

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::upstream(SERVICE, format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::upstream(
                SERVICE,
                format!("API returned {}: {}", status, body),
            ));
        }

        let result: GenerateContentResponse = response.json().await.map_err(|e| {
            AppError::upstream(SERVICE, format!("failed to parse response: {}", e))
        })?;

        let candidate = result
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::upstream(SERVICE, "response contained no candidates"))?;

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            return Err(AppError::upstream(
                SERVICE,
                format!(
                    "empty response (finish reason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ),
            ));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new(
            "test-key".to_string(),
            server.uri(),
            "gemini-2.0-flash-001".to_string(),
            0.4,
            0.9,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_api_key_is_configuration_error() {
        let result = GeminiClient::new(
            " ".to_string(),
            "http://localhost".to_string(),
            "model".to_string(),
            0.4,
            0.9,
            Duration::from_secs(5),
        );
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash-001:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{ "text": "{\"tilt_angle\": " }, { "text": "23}" }]
                    },
                    "finishReason": "STOP"
                }]
            })))
            .mount(&server)
            .await;

        let text = client(&server).generate("recommend a plan").await.unwrap();
        assert_eq!(text, "{\"tilt_angle\": 23}");
    }

    #[tokio::test]
    async fn test_no_candidates_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let error = client(&server).generate("prompt").await.unwrap_err();
        assert!(matches!(error, AppError::UpstreamService { .. }));
    }

    #[tokio::test]
    async fn test_error_status_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let error = client(&server).generate("prompt").await.unwrap_err();
        assert!(matches!(error, AppError::UpstreamService { .. }));
    }
}
