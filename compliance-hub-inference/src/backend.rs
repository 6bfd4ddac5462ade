//! Model backend interface and failure taxonomy

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chat roles in the wire format expected by completion endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// An API credential. The secret never appears in Debug output or logs.
#[derive(Clone)]
pub struct Credential {
    label: String,
    secret: String,
}

impl Credential {
    pub fn new(label: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            secret: secret.into(),
        }
    }

    /// Short identifier for logs ("key-1", "key-2", ...)
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("label", &self.label)
            .field("secret", &"****")
            .finish()
    }
}

/// One attempt against the backend
#[derive(Debug)]
pub struct CompletionRequest<'a> {
    pub messages: &'a [ChatMessage],
    /// Model identifier for the capability tier being tried
    pub model: &'a str,
    pub credential: &'a Credential,
    pub temperature: f32,
    /// Ask the backend for a JSON object reply
    pub structured: bool,
}

/// Classified per-attempt failures. The cascade's skip semantics depend
/// on which variant a backend raises.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Credential exhausted its quota; try the next credential, same tier
    #[error("quota exceeded")]
    QuotaExceeded,

    /// Model/tier not usable with any credential; advance to the next tier
    #[error("capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// Anything else (network, 5xx, timeout); recorded and skipped
    #[error("transient backend failure: {0}")]
    Transient(String),
}

/// External text-generation collaborator
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Single completion attempt; returns the raw reply text
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, BackendError>;
}
