//! The compliance decision pipeline
//!
//! Wires intent filtering, the general-chat short-circuit, context
//! assembly, the inference cascade, normalization, and the governance
//! gate. Holds only read-only shared state; all per-query data lives in
//! locals, so a single instance serves concurrent callers safely.

use std::sync::Arc;

use compliance_hub_context::{ContextAssembler, ContextError};
use compliance_hub_core::{
    AnalyzeRequest, AnalyzeResponse, ComplianceQuery, DecisionStatus, DispositionMeta,
    GovernanceDecision, ProfileRegistry, ResponseBody, StructuredAnswer,
};
use compliance_hub_governance::{GovernanceGate, ResponseNormalizer, is_definition_query};
use compliance_hub_inference::{ChatMessage, InferenceCascade, InferenceError};
use compliance_hub_retrieval::{ExternalSearch, RetrievalBackend};

use crate::ApiError;

/// Vocabulary indicating intent to evade regulatory controls
const BANNED_INTENT_CUES: &[&str] = &["evade", "bypass", "avoid detection", "hide", "loophole"];

pub const SAFETY_REFUSAL: &str =
    "Safety Violation: I cannot assist with evading or bypassing regulatory requirements.";

pub const INSUFFICIENT_CONTEXT: &str =
    "Insufficient context found to provide a compliance answer.";

pub const DEGRADED_SERVICE: &str =
    "Service temporarily degraded: all inference backends are exhausted. Please retry shortly.";

/// Greeting / capability-request cues for the general-chat short-circuit
const GENERAL_CUES: &[&str] = &[
    "hi",
    "hello",
    "who are you",
    "what can you do",
    "help",
    "thanks",
    "good morning",
    "capabilities",
];

/// Queries at or above this many words are never treated as general chat
const GENERAL_CHAT_WORD_LIMIT: usize = 10;

const GENERAL_CHAT_TEMPERATURE: f32 = 0.7;

const GENERAL_PERSONA: &str = "You are the 'Agentic Compliance Analyst', an advanced AI \
specialized in global regulations. You have deep knowledge of GDPR (EU), FDA (US), and are \
expanding to Global Compliance. Introduce yourself formally and list your capabilities \
(searching laws, analyzing risk, drafting reports). Do not answer specific compliance \
questions here; just introduce yourself.";

/// Risk guidance appended to the system prompt for definition queries
const DEFINITION_GUIDANCE: &str = "\n[CONTEXT NOTE: This is a DEFINITION query. Risk Level \
must be 'low'. Calibrate confidence to 1.0 if the term is explicitly defined in law.]";

/// Terminal outcome of one pipeline run
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// Gate released the answer
    Allowed(StructuredAnswer),
    /// Gate held the answer for human sign-off
    ReviewRequired {
        answer: StructuredAnswer,
        decision: GovernanceDecision,
    },
    /// Gate blocked; only the reason leaves the pipeline
    Blocked { reason: String },
    /// Policy refusal (intent filter, insufficient context)
    Refused(String),
    /// General-chat reply, returned verbatim
    Conversational(String),
    /// Inference matrix exhausted; degraded-service message
    Degraded(String),
}

impl AnalysisOutcome {
    /// Map to the service-boundary response shape
    pub fn into_response(self) -> AnalyzeResponse {
        match self {
            AnalysisOutcome::Allowed(answer) => AnalyzeResponse {
                status: DecisionStatus::Allowed,
                body: ResponseBody::Answer(answer),
                disposition: None,
            },
            AnalysisOutcome::ReviewRequired { answer, decision } => AnalyzeResponse {
                status: DecisionStatus::ReviewRequired,
                body: ResponseBody::Answer(answer),
                disposition: Some(DispositionMeta {
                    reason: decision.reason,
                    risk_level: decision.risk_level,
                    confidence: decision.confidence,
                    held_for_approval: true,
                }),
            },
            AnalysisOutcome::Blocked { reason } => AnalyzeResponse {
                status: DecisionStatus::Blocked,
                body: ResponseBody::Text(reason),
                disposition: None,
            },
            AnalysisOutcome::Refused(message) | AnalysisOutcome::Degraded(message) => {
                AnalyzeResponse {
                    status: DecisionStatus::Blocked,
                    body: ResponseBody::Text(message),
                    disposition: None,
                }
            }
            AnalysisOutcome::Conversational(reply) => AnalyzeResponse {
                status: DecisionStatus::Allowed,
                body: ResponseBody::Text(reply),
                disposition: None,
            },
        }
    }
}

pub struct Orchestrator {
    profiles: Arc<ProfileRegistry>,
    retrieval: Arc<dyn RetrievalBackend>,
    external: Arc<dyn ExternalSearch>,
    cascade: InferenceCascade,
    assembler: ContextAssembler,
    normalizer: ResponseNormalizer,
    gate: GovernanceGate,
}

impl Orchestrator {
    pub fn new(
        profiles: Arc<ProfileRegistry>,
        retrieval: Arc<dyn RetrievalBackend>,
        external: Arc<dyn ExternalSearch>,
        cascade: InferenceCascade,
        gate: GovernanceGate,
    ) -> Self {
        Self {
            profiles,
            retrieval,
            external,
            cascade,
            assembler: ContextAssembler::new(),
            normalizer: ResponseNormalizer::new(),
            gate,
        }
    }

    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisOutcome, ApiError> {
        let query = ComplianceQuery::new(request.query.clone(), request.domain);
        let lowered = query.lowered();

        // Guardrail 0: intent filter, bypasses everything else
        if has_cue(&lowered, BANNED_INTENT_CUES) {
            tracing::info!(query_id = %query.id, "Intent filter veto");
            return Ok(AnalysisOutcome::Refused(SAFETY_REFUSAL.to_string()));
        }

        // Router: greetings and capability requests skip the whole pipeline
        if is_general_chat(&query.text, &lowered) {
            return self.general_chat(&query).await;
        }

        let profile = self.profiles.get(query.domain).ok_or_else(|| {
            ApiError::NotFound(format!("No profile configured for domain {}", query.domain))
        })?;

        let context = match self
            .assembler
            .assemble(&query, profile, self.retrieval.as_ref(), self.external.as_ref())
            .await
        {
            Ok(context) => context,
            Err(ContextError::InsufficientContext) => {
                tracing::info!(query_id = %query.id, "Insufficient context, refusing");
                return Ok(AnalysisOutcome::Refused(INSUFFICIENT_CONTEXT.to_string()));
            }
            Err(ContextError::Retrieval(e)) => {
                return Err(ApiError::Internal(format!("Retrieval failed: {}", e)))
            }
        };

        let mut system_prompt = profile.system_prompt.clone();
        if is_definition_query(&lowered) {
            system_prompt.push_str(DEFINITION_GUIDANCE);
        }

        let messages = [
            ChatMessage::system(system_prompt),
            ChatMessage::user(format!(
                "CONTEXT (Source: {} Knowledge):\n{}\n\nQUERY: {}",
                query.domain, context.text, query.text
            )),
        ];

        let answer = match self.cascade.invoke_structured(&messages, 0.0).await {
            Ok(answer) => answer,
            Err(InferenceError::ServiceExhausted { attempts, sample }) => {
                tracing::error!(
                    query_id = %query.id,
                    attempts,
                    ?sample,
                    "Inference cascade exhausted"
                );
                return Ok(AnalysisOutcome::Degraded(DEGRADED_SERVICE.to_string()));
            }
            Err(e @ InferenceError::Misconfigured(_)) => {
                return Err(ApiError::Internal(e.to_string()))
            }
        };

        let answer = self.normalizer.normalize(answer, &query.text, profile);
        let decision = self
            .gate
            .decide(answer.confidence, answer.risk_level, false);

        tracing::info!(
            query_id = %query.id,
            domain = %query.domain,
            status = %decision.status,
            risk = %decision.risk_level,
            confidence = decision.confidence,
            units = context.units.len(),
            "Query analyzed"
        );

        Ok(match decision.status {
            DecisionStatus::Allowed => AnalysisOutcome::Allowed(answer),
            DecisionStatus::ReviewRequired => AnalysisOutcome::ReviewRequired { answer, decision },
            // Answer content never leaves the pipeline on a block
            DecisionStatus::Blocked => AnalysisOutcome::Blocked {
                reason: decision.reason,
            },
        })
    }

    async fn general_chat(&self, query: &ComplianceQuery) -> Result<AnalysisOutcome, ApiError> {
        let messages = [
            ChatMessage::system(GENERAL_PERSONA),
            ChatMessage::user(query.text.clone()),
        ];
        match self
            .cascade
            .invoke_text(&messages, GENERAL_CHAT_TEMPERATURE)
            .await
        {
            Ok(reply) => Ok(AnalysisOutcome::Conversational(reply)),
            Err(InferenceError::ServiceExhausted { .. }) => {
                Ok(AnalysisOutcome::Degraded(DEGRADED_SERVICE.to_string()))
            }
            Err(e @ InferenceError::Misconfigured(_)) => Err(ApiError::Internal(e.to_string())),
        }
    }
}

/// Single-word cues match whole tokens; phrases match by substring
fn has_cue(lowered: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| {
        if cue.contains(' ') {
            lowered.contains(cue)
        } else {
            lowered
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| token == *cue)
        }
    })
}

fn is_general_chat(text: &str, lowered: &str) -> bool {
    text.split_whitespace().count() < GENERAL_CHAT_WORD_LIMIT && has_cue(lowered, GENERAL_CUES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banned_intent_matches_tokens_not_substrings() {
        assert!(has_cue("how to evade the regulator", BANNED_INTENT_CUES));
        assert!(has_cue("can i avoid detection here", BANNED_INTENT_CUES));
        // "hide" inside another word must not fire
        assert!(!has_cue("chides the controller", BANNED_INTENT_CUES));
    }

    #[test]
    fn test_general_chat_heuristic() {
        assert!(is_general_chat("Hello!", "hello!"));
        assert!(is_general_chat("What can you do?", "what can you do?"));
        // "hi" must not fire inside "this"
        assert!(!is_general_chat("Is this a sale?", "is this a sale?"));
        let long = "hello could you analyze the cross border transfer obligations for our processor agreements";
        assert!(!is_general_chat(long, &long.to_lowercase()));
    }

    #[test]
    fn test_blocked_outcome_carries_reason_only() {
        let outcome = AnalysisOutcome::Blocked {
            reason: "critical risk is never released automatically".to_string(),
        };
        let response = outcome.into_response();
        assert_eq!(response.status, DecisionStatus::Blocked);
        assert!(matches!(response.body, ResponseBody::Text(_)));
        assert!(response.disposition.is_none());
    }
}
