// Groq Provider Implementation
//
// Groq exposes an OpenAI-compatible chat completions API.
// Requires API key.
// Default endpoint: https://api.groq.com/openai/v1

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::{Deserialize, Serialize};

use super::{AIError, AIResult, CompletionProvider};
use crate::models::ai::{ChatMessage, CompletionRequest, CompletionResponse};

/// Groq Provider
pub struct GroqProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GroqProvider {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
        }
    }

    fn api_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{}{}", base, path)
    }

    fn auth_headers(&self) -> AIResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| AIError::InvalidConfig("API key contains invalid characters".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

// OpenAI-compatible wire types
#[derive(Debug, Serialize)]
struct GroqChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GroqChatResponse {
    choices: Vec<GroqChoice>,
    usage: Option<GroqUsage>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: GroqResponseMessage,
}

#[derive(Debug, Deserialize)]
struct GroqResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroqUsage {
    total_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GroqError {
    error: GroqErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GroqErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
}

/// Map a non-2xx provider answer onto the error taxonomy
fn classify_failure(status: u16, body: &str, model: &str) -> AIError {
    let Ok(error) = serde_json::from_str::<GroqError>(body) else {
        return AIError::ApiError(format!("Groq API error ({}): {}", status, body));
    };

    let error_type = error.error.error_type.as_deref().unwrap_or("");
    let code = error.error.code.as_deref().unwrap_or("");

    if status == 401 || code == "invalid_api_key" {
        return AIError::AuthFailed(error.error.message);
    }
    if status == 429 || error_type == "rate_limit_exceeded" || code == "rate_limit_exceeded" {
        return AIError::RateLimited;
    }
    if code == "model_not_found" || error.error.message.contains("does not exist") {
        return AIError::ModelNotFound(model.to_string());
    }

    AIError::ApiError(error.error.message)
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    fn name(&self) -> &str {
        "Groq"
    }

    async fn chat_completion(&self, request: &CompletionRequest) -> AIResult<CompletionResponse> {
        let url = self.api_url("/chat/completions");

        let body = GroqChatRequest {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), &body, &request.model));
        }

        let groq_response: GroqChatResponse = response.json().await?;

        let content = groq_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            tokens_used: groq_response.usage.and_then(|u| u.total_tokens),
            model: groq_response.model,
        })
    }
}
