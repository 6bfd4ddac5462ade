//! Core domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// Regulatory domain a query is analyzed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    #[serde(rename = "GDPR")]
    Gdpr,
    #[serde(rename = "FDA")]
    Fda,
    #[serde(rename = "CCPA")]
    Ccpa,
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Domain::Gdpr => "GDPR",
            Domain::Fda => "FDA",
            Domain::Ccpa => "CCPA",
        };
        f.write_str(s)
    }
}

/// An incoming compliance question, created once per request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceQuery {
    /// Unique identifier for log correlation
    pub id: Uuid,
    /// Raw query text as submitted
    pub text: String,
    /// Regulatory domain tag
    pub domain: Domain,
    /// When this query was received
    pub received_at: DateTime<Utc>,
}

impl ComplianceQuery {
    pub fn new(text: String, domain: Domain) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            domain,
            received_at: Utc::now(),
        }
    }

    /// Lowercased query text; all rule evaluation runs over this form
    pub fn lowered(&self) -> String {
        self.text.to_lowercase()
    }
}

/// How a context unit entered the assembled set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitOrigin {
    /// Returned by similarity search
    Searched,
    /// Forced in by a domain trigger rule
    RuleInjected,
    /// Produced by the external search collaborator
    External,
}

/// A single unit of legal context (article, clause bundle, search digest)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedUnit {
    /// Unique within its domain
    pub id: String,
    /// Full expanded text
    pub text: String,
    pub origin: UnitOrigin,
}

/// Ordinal severity attached to a generated answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Structured output of the inference cascade
///
/// Created by inference, adjusted only by the normalizer, then immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredAnswer {
    /// Concise summary of the legal situation
    pub summary: String,
    /// Specific articles or clauses that apply (e.g. "Article 83(4)")
    pub legal_basis: String,
    /// Analysis of potential risks, fines, or obligations
    pub risk_analysis: String,
    pub risk_level: RiskLevel,
    /// Certainty in [0,1], stored rounded to 2 decimals
    #[serde(alias = "confidence_score")]
    pub confidence: f64,
    /// Referenced unit ids, order-irrelevant
    #[serde(default)]
    pub references: Vec<String>,
}

impl StructuredAnswer {
    /// Parse and validate a raw model reply into a structured answer.
    ///
    /// Models wrap the JSON object in code fences or surrounding prose
    /// often enough that we extract the outermost `{...}` before parsing.
    /// Confidence must land in [0,1] and is rounded to 2 decimals.
    pub fn parse_model_reply(raw: &str) -> Result<Self, CoreError> {
        let body = extract_json_object(raw).ok_or_else(|| {
            CoreError::SchemaValidation("reply contains no JSON object".to_string())
        })?;
        let mut answer: StructuredAnswer = serde_json::from_str(body)?;
        if !(0.0..=1.0).contains(&answer.confidence) {
            return Err(CoreError::SchemaValidation(format!(
                "confidence {} outside [0,1]",
                answer.confidence
            )));
        }
        answer.confidence = round_confidence(answer.confidence);
        Ok(answer)
    }
}

/// Round a confidence value to 2 decimals, the storage invariant
pub fn round_confidence(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Slice from the first `{` to the matching last `}` of a reply
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Terminal disposition of the governance gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionStatus {
    Allowed,
    ReviewRequired,
    Blocked,
}

impl std::fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DecisionStatus::Allowed => "ALLOWED",
            DecisionStatus::ReviewRequired => "REVIEW_REQUIRED",
            DecisionStatus::Blocked => "BLOCKED",
        };
        f.write_str(s)
    }
}

/// Outcome of the governance gate for one query, never mutated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceDecision {
    pub status: DecisionStatus,
    pub reason: String,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    /// When the gate ruled
    pub decided_at: DateTime<Utc>,
}

impl GovernanceDecision {
    pub fn new(
        status: DecisionStatus,
        reason: String,
        risk_level: RiskLevel,
        confidence: f64,
    ) -> Self {
        Self {
            status,
            reason,
            risk_level,
            confidence,
            decided_at: Utc::now(),
        }
    }
}

// ==================== Service boundary DTOs ====================

/// Request accepted at the service boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub query: String,
    pub domain: Domain,
}

/// Body of an analysis response: either the structured answer or plain text
/// (refusals, blocked reasons, conversational replies)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Answer(StructuredAnswer),
    Text(String),
}

/// Disposition metadata attached when an answer is held for review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispositionMeta {
    pub reason: String,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    /// Marker that the response is held pending human approval
    pub held_for_approval: bool,
}

/// Response returned at the service boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub status: DecisionStatus,
    pub body: ResponseBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<DispositionMeta>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json_reply() {
        let raw = r#"{
            "summary": "Fines may reach 20M EUR.",
            "legal_basis": "Article 83(5)",
            "risk_analysis": "Administrative fines apply.",
            "risk_level": "high",
            "confidence": 0.873,
            "references": ["83"]
        }"#;

        let answer = StructuredAnswer::parse_model_reply(raw).unwrap();
        assert_eq!(answer.risk_level, RiskLevel::High);
        assert_eq!(answer.confidence, 0.87);
        assert_eq!(answer.references, vec!["83".to_string()]);
    }

    #[test]
    fn test_parse_fenced_reply_with_alias() {
        let raw = "Here is the analysis:\n```json\n{\"summary\": \"s\", \"legal_basis\": \"b\", \"risk_analysis\": \"r\", \"risk_level\": \"low\", \"confidence_score\": 1.0}\n```";
        let answer = StructuredAnswer::parse_model_reply(raw).unwrap();
        assert_eq!(answer.risk_level, RiskLevel::Low);
        assert_eq!(answer.confidence, 1.0);
        assert!(answer.references.is_empty());
    }

    #[test]
    fn test_parse_rejects_out_of_range_confidence() {
        let raw = r#"{"summary": "s", "legal_basis": "b", "risk_analysis": "r", "risk_level": "low", "confidence": 1.4}"#;
        let err = StructuredAnswer::parse_model_reply(raw).unwrap_err();
        assert!(matches!(err, CoreError::SchemaValidation(_)));
    }

    #[test]
    fn test_parse_rejects_non_json_reply() {
        let err = StructuredAnswer::parse_model_reply("I cannot answer that.").unwrap_err();
        assert!(matches!(err, CoreError::SchemaValidation(_)));
    }

    #[test]
    fn test_risk_level_wire_format() {
        assert_eq!(serde_json::to_string(&RiskLevel::Critical).unwrap(), "\"critical\"");
        assert_eq!(
            serde_json::to_string(&DecisionStatus::ReviewRequired).unwrap(),
            "\"REVIEW_REQUIRED\""
        );
        assert_eq!(serde_json::to_string(&Domain::Gdpr).unwrap(), "\"GDPR\"");
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }
}
