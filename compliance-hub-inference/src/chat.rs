//! OpenAI-compatible chat completions backend
//!
//! Works against Groq-style `/chat/completions` endpoints. HTTP status
//! codes map onto the cascade's failure taxonomy: 429 is a quota problem
//! for the credential, 404 means the model is not available at all, and
//! everything else is transient.

use async_trait::async_trait;
use serde::Deserialize;

use crate::{BackendError, CompletionRequest, ModelBackend};

#[derive(Debug, Deserialize)]
struct CompletionReply {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

pub struct ChatCompletionsBackend {
    client: reqwest::Client,
    base_url: String,
}

impl ChatCompletionsBackend {
    /// `base_url` up to the API root, e.g. `https://api.groq.com/openai/v1`
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ModelBackend for ChatCompletionsBackend {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, BackendError> {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "temperature": request.temperature,
        });
        if request.structured {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(request.credential.secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Transient(e.to_string()))?;

        let status = response.status();
        match status.as_u16() {
            429 => return Err(BackendError::QuotaExceeded),
            404 => {
                return Err(BackendError::CapabilityUnavailable(format!(
                    "model {} not found",
                    request.model
                )))
            }
            s if !status.is_success() => {
                let detail = response.text().await.unwrap_or_default();
                return Err(BackendError::Transient(format!("HTTP {}: {}", s, detail)));
            }
            _ => {}
        }

        let reply: CompletionReply = response
            .json()
            .await
            .map_err(|e| BackendError::Transient(e.to_string()))?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| BackendError::Transient("reply carried no content".to_string()))
    }
}
