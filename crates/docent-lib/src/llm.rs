//! Blocking client for hosted chat-completion models.

use std::time::Duration;

use anyhow::{Context, bail};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_CHAT_MODEL, DEFAULT_LLM_BASE_URL, LLM_TIMEOUT_SECS};
use crate::error::{Error, Result};

/// Trait implemented by concrete LLM providers.
pub trait LlmProvider {
    fn answer(&self, request: &ProviderRequest) -> anyhow::Result<String>;
}

/// Request envelope shared by the various providers.
pub struct ProviderRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// Provider for any OpenAI-compatible `/chat/completions` endpoint (Groq by default).
pub struct ChatCompletionsProvider {
    api_key: String,
    model: String,
    endpoint: String,
    client: Client,
}

impl ChatCompletionsProvider {
    /// Build a provider against `base_url` (e.g. `https://api.groq.com/openai/v1`).
    pub fn new(api_key: String, model: String, base_url: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(Error::Config("LLM API key is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(LLM_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("failed to build LLM HTTP client: {e}")))?;
        Ok(Self {
            api_key,
            model,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            client,
        })
    }

    /// Provider for the default Groq model and endpoint.
    pub fn groq(api_key: String) -> Result<Self> {
        Self::new(api_key, DEFAULT_CHAT_MODEL.to_string(), DEFAULT_LLM_BASE_URL)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl LlmProvider for ChatCompletionsProvider {
    fn answer(&self, request: &ProviderRequest) -> anyhow::Result<String> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).context("invalid LLM API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let body = ChatRequest {
            model: &self.model,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .with_context(|| format!("failed to call chat completions at {}", self.endpoint))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("LLM endpoint returned {}: {}", status, text);
        }
        let parsed: ChatResponse = resp.json().context("failed to parse LLM response")?;
        extract_answer(parsed)
    }
}

fn extract_answer(response: ChatResponse) -> anyhow::Result<String> {
    let answer = response
        .choices
        .into_iter()
        .find_map(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();
    if answer.is_empty() {
        bail!("LLM response missing text content");
    }
    Ok(answer)
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: usize,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url() {
        let provider = ChatCompletionsProvider::new(
            "key".to_string(),
            "m".to_string(),
            "https://api.groq.com/openai/v1/",
        )
        .unwrap();
        assert_eq!(
            provider.endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn groq_defaults() {
        let provider = ChatCompletionsProvider::groq("key".to_string()).unwrap();
        assert_eq!(provider.model(), "llama-3.1-8b-instant");
        assert!(provider.endpoint().starts_with("https://api.groq.com/"));
    }

    #[test]
    fn empty_api_key_is_config_error() {
        let result = ChatCompletionsProvider::groq("  ".to_string());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn request_serializes_system_then_user() {
        let body = ChatRequest {
            model: "m",
            temperature: 0.5,
            max_tokens: 10,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "hi",
                },
            ],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 10);
    }

    #[test]
    fn extract_answer_takes_first_content() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  Blue.  "}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_answer(response).unwrap(), "Blue.");
    }

    #[test]
    fn extract_answer_rejects_empty_content() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(extract_answer(response).is_err());

        let response: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(extract_answer(response).is_err());
    }

    #[test]
    fn unreachable_endpoint_fails() {
        let provider = ChatCompletionsProvider::new(
            "key".to_string(),
            "m".to_string(),
            "http://127.0.0.1:9",
        )
        .unwrap();
        let request = ProviderRequest {
            system: "s",
            prompt: "p",
            temperature: 0.0,
            max_tokens: 1,
        };
        assert!(provider.answer(&request).is_err());
    }
}
