//! Structured inference for Compliance Hub
//!
//! Wraps a non-deterministic model backend in a bounded, auditable
//! cascade over ordered (capability-tier, credential) pairs.

pub mod backend;
pub mod cascade;
pub mod chat;
pub mod error;

pub use backend::{BackendError, ChatMessage, CompletionRequest, Credential, ModelBackend, Role};
pub use cascade::InferenceCascade;
pub use chat::ChatCompletionsBackend;
pub use error::InferenceError;
