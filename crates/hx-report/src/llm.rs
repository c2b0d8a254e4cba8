//! OpenAI-compatible chat completion client implementing [`Summarizer`].

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::NarrativeError;
use crate::narrative::{NarrativePrompt, Summarizer};

pub const DEFAULT_LLM_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_LLM_TEMPERATURE: f64 = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
    pub temperature: f64,
}

/// One request per call, bounded by the configured timeout. No retries.
#[derive(Debug, Clone)]
pub struct OpenAiSummarizer {
    model: String,
    base_url: String,
    api_key: String,
    temperature: f64,
    client: Client,
}

impl OpenAiSummarizer {
    pub fn from_config(config: &LlmConfig) -> Result<Self, NarrativeError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms.max(1)))
            .build()
            .map_err(|err| NarrativeError::Client {
                message: format!("client build failed: {err}"),
            })?;

        Ok(Self {
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl Summarizer for OpenAiSummarizer {
    fn summarize(&self, prompt: &NarrativePrompt) -> Result<String, NarrativeError> {
        let url = format!("{}/chat/completions", self.base_url);
        let payload = ChatCompletionRequest {
            model: self.model.as_str(),
            temperature: self.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: prompt.system.as_str(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user.as_str(),
                },
            ],
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .map_err(|err| NarrativeError::Client {
                message: format!("http request failed: {err}"),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().unwrap_or_else(|_| "<no body>".to_string());
            return Err(NarrativeError::Client {
                message: format!("http status {}: {body}", status.as_u16()),
            });
        }

        let response: ChatCompletionResponse =
            response.json().map_err(|err| NarrativeError::Parse {
                message: format!("decode response failed: {err}"),
            })?;

        debug!(model = ?response.model, "chat completion received");

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| NarrativeError::Parse {
                message: "empty completion choice".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LlmConfig {
        LlmConfig {
            model: "gpt-test".to_string(),
            base_url: "https://example.invalid/v1/".to_string(),
            api_key: "test-key".to_string(),
            timeout_ms: 1000,
            temperature: DEFAULT_LLM_TEMPERATURE,
        }
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OpenAiSummarizer::from_config(&config()).unwrap();
        assert_eq!(client.base_url, "https://example.invalid/v1");
        assert_eq!(client.model, "gpt-test");
    }

    #[test]
    fn request_payload_shape() {
        let payload = ChatCompletionRequest {
            model: "gpt-test",
            temperature: 0.2,
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "usr",
                },
            ],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["model"], "gpt-test");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "usr");
    }

    #[test]
    fn response_decodes_first_choice() {
        let body = r#"{ "model": "gpt-test", "choices": [ { "message": { "role": "assistant", "content": "{}" } } ] }"#;
        let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.choices[0].message.content, "{}");
    }
}
