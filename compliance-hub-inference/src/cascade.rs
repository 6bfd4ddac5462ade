//! The inference cascade
//!
//! Tries every (capability tier, credential) pair in order until one
//! attempt produces a usable reply. Tier order is never violated: all
//! credentials of tier N are resolved before tier N+1 starts. Total
//! attempts are bounded by |tiers| x |credentials| and no pair is ever
//! retried.

use std::sync::Arc;
use std::time::Duration;

use compliance_hub_core::StructuredAnswer;

use crate::{BackendError, ChatMessage, CompletionRequest, Credential, InferenceError, ModelBackend};

/// Transient errors kept for the exhaustion report
const ERROR_SAMPLE_LIMIT: usize = 3;

enum Expectation {
    Structured,
    Text,
}

enum Payload {
    Structured(StructuredAnswer),
    Text(String),
}

pub struct InferenceCascade {
    backend: Arc<dyn ModelBackend>,
    /// Model ids ordered best-quality first
    tiers: Vec<String>,
    /// Credentials in configured order
    credentials: Vec<Credential>,
    call_timeout: Duration,
}

impl InferenceCascade {
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        tiers: Vec<String>,
        credentials: Vec<Credential>,
        call_timeout: Duration,
    ) -> Result<Self, InferenceError> {
        if tiers.is_empty() {
            return Err(InferenceError::Misconfigured(
                "no model tiers configured".to_string(),
            ));
        }
        if credentials.is_empty() {
            return Err(InferenceError::Misconfigured(
                "no credentials configured".to_string(),
            ));
        }
        Ok(Self {
            backend,
            tiers,
            credentials,
            call_timeout,
        })
    }

    /// Schema-validated call: the reply must coerce into a StructuredAnswer.
    /// A validation failure counts as a transient failure for that attempt.
    pub async fn invoke_structured(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<StructuredAnswer, InferenceError> {
        match self.run(messages, temperature, Expectation::Structured).await? {
            Payload::Structured(answer) => Ok(answer),
            Payload::Text(_) => unreachable!("structured run returned text"),
        }
    }

    /// Unstructured call returning the reply verbatim
    pub async fn invoke_text(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, InferenceError> {
        match self.run(messages, temperature, Expectation::Text).await? {
            Payload::Text(text) => Ok(text),
            Payload::Structured(_) => unreachable!("text run returned structured payload"),
        }
    }

    async fn run(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        expectation: Expectation,
    ) -> Result<Payload, InferenceError> {
        let mut attempts = 0usize;
        let mut sample: Vec<String> = Vec::new();

        for model in &self.tiers {
            for credential in &self.credentials {
                attempts += 1;
                let request = CompletionRequest {
                    messages,
                    model,
                    credential,
                    temperature,
                    structured: matches!(expectation, Expectation::Structured),
                };

                let outcome =
                    tokio::time::timeout(self.call_timeout, self.backend.complete(request)).await;

                let raw = match outcome {
                    Err(_elapsed) => {
                        record(&mut sample, format!("{}: timed out", model));
                        tracing::warn!(model = %model, credential = %credential.label(), "Attempt timed out");
                        continue;
                    }
                    Ok(Err(BackendError::QuotaExceeded)) => {
                        tracing::warn!(model = %model, credential = %credential.label(), "Quota exhausted, next credential");
                        continue;
                    }
                    Ok(Err(BackendError::CapabilityUnavailable(detail))) => {
                        tracing::warn!(model = %model, "Capability unavailable ({}), downgrading tier", detail);
                        break;
                    }
                    Ok(Err(BackendError::Transient(detail))) => {
                        record(&mut sample, format!("{}: {}", model, detail));
                        tracing::warn!(model = %model, credential = %credential.label(), "Transient failure: {}", detail);
                        continue;
                    }
                    Ok(Ok(raw)) => raw,
                };

                match expectation {
                    Expectation::Text => return Ok(Payload::Text(raw)),
                    Expectation::Structured => match StructuredAnswer::parse_model_reply(&raw) {
                        Ok(answer) => {
                            tracing::debug!(model = %model, "Structured reply accepted after {} attempts", attempts);
                            return Ok(Payload::Structured(answer));
                        }
                        Err(e) => {
                            record(&mut sample, format!("{}: {}", model, e));
                            tracing::warn!(model = %model, "Reply failed schema validation: {}", e);
                            continue;
                        }
                    },
                }
            }
        }

        tracing::error!("Cascade exhausted after {} attempts", attempts);
        Err(InferenceError::ServiceExhausted { attempts, sample })
    }
}

fn record(sample: &mut Vec<String>, entry: String) {
    if sample.len() < ERROR_SAMPLE_LIMIT {
        sample.push(entry);
    }
}
