//! Google Gemini provider using the native `generateContent` API.
//!
//! Sends the composed prompt as a single user turn and concatenates the text
//! parts of the first candidate.

use async_trait::async_trait;
use nova_core::error::ProviderError;
use nova_core::provider::*;
use serde::Deserialize;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A Gemini provider using the public Generative Language API.
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client: crate::http_client(),
        }
    }

    /// Point at a different endpoint (proxy, regional mirror, test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// `models/gemini-2.5-flash` and `gemini-2.5-flash` name the same model.
    fn model_path(model: &str) -> &str {
        model.strip_prefix("models/").unwrap_or(model)
    }

    fn request_body(request: &GenerateRequest) -> serde_json::Value {
        let mut generation_config = serde_json::json!({
            "temperature": request.temperature,
        });
        if let Some(max_tokens) = request.max_tokens {
            generation_config["maxOutputTokens"] = serde_json::json!(max_tokens);
        }

        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
            "generationConfig": generation_config,
        })
    }

    fn into_response(
        api: ApiResponse,
        requested_model: &str,
    ) -> std::result::Result<GenerateResponse, ProviderError> {
        let Some(candidate) = api.candidates.into_iter().next() else {
            let reason = api
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".into());
            return Err(ProviderError::ApiError {
                status_code: 200,
                message: format!("Gemini returned no answer: {reason}"),
            });
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let usage = api.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(GenerateResponse {
            text,
            model: api
                .model_version
                .unwrap_or_else(|| requested_model.to_string()),
            usage,
        })
    }
}

#[async_trait]
impl nova_core::Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<GenerateResponse, ProviderError> {
        let model = Self::model_path(&request.model);
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let body = Self::request_body(&request);

        debug!(provider = "gemini", model = %model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(crate::map_transport_error)?;

        let status = response.status().as_u16();

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini returned error");
            return Err(crate::map_status_error(status, error_body));
        }

        let api: ApiResponse = response.json().await.map_err(|e| ProviderError::ApiError {
            status_code: 200,
            message: format!("Failed to parse response: {e}"),
        })?;

        Self::into_response(api, model)
    }
}

// --- API wire types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    usage_metadata: Option<ApiUsage>,
    #[serde(default)]
    model_version: Option<String>,
    #[serde(default)]
    prompt_feedback: Option<ApiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiContent>,
}

#[derive(Debug, Deserialize)]
struct ApiContent {
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Deserialize)]
struct ApiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: serde_json::Value) -> ApiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn model_prefix_is_optional() {
        assert_eq!(GeminiProvider::model_path("models/gemini-2.5-flash"), "gemini-2.5-flash");
        assert_eq!(GeminiProvider::model_path("gemini-2.5-flash"), "gemini-2.5-flash");
    }

    #[test]
    fn body_carries_prompt_and_config() {
        let body = GeminiProvider::request_body(&GenerateRequest {
            model: "gemini-2.5-flash".into(),
            prompt: "Quiz me".into(),
            temperature: 0.7,
            max_tokens: Some(2048),
        });
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Quiz me");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn body_omits_max_tokens_when_unset() {
        let body = GeminiProvider::request_body(&GenerateRequest {
            model: "m".into(),
            prompt: "p".into(),
            temperature: 0.1,
            max_tokens: None,
        });
        assert!(body["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn concatenates_text_parts() {
        let api = parse(serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Hello " }, { "text": "learner!" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 4, "candidatesTokenCount": 2, "totalTokenCount": 6 },
            "modelVersion": "gemini-2.5-flash-001"
        }));
        let resp = GeminiProvider::into_response(api, "gemini-2.5-flash").unwrap();
        assert_eq!(resp.text, "Hello learner!");
        assert_eq!(resp.model, "gemini-2.5-flash-001");
        assert_eq!(resp.usage.unwrap().total_tokens, 6);
    }

    #[test]
    fn blocked_prompt_reports_reason() {
        let api = parse(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }));
        let err = GeminiProvider::into_response(api, "m").unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
        assert!(!err.is_rate_limit());
    }

    #[test]
    fn missing_model_version_falls_back() {
        let api = parse(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "ok" }] } }]
        }));
        let resp = GeminiProvider::into_response(api, "gemini-2.5-flash").unwrap();
        assert_eq!(resp.model, "gemini-2.5-flash");
        assert!(resp.usage.is_none());
    }
}
