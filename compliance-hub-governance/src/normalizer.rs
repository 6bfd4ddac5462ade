//! Post-inference normalization
//!
//! A single deterministic pass over the structured answer: definition
//! queries are recalibrated, then the domain's override table is scanned
//! in declared order and the first matching rule overwrites citation,
//! risk, and confidence. Hallucinated section references in the summary
//! are rewritten to the override's canonical citation in one regex
//! substitution.

use regex::{NoExpand, Regex};

use compliance_hub_core::{
    DomainProfile, OverrideRule, RiskLevel, StructuredAnswer, round_confidence,
};

/// Phrases indicating recall of a definition rather than actionable advice
const DEFINITION_CUES: &[&str] = &[
    "what is",
    "define",
    "meaning of",
    "considered personal info",
    "are ip addresses",
    "stand for",
];

/// Section-reference grammar: a dotted section number followed by one or
/// more parenthesized subdivision markers, e.g. `1798.140(v)(1)`
const SECTION_REF_PATTERN: &str = r"\d{3,4}\.\d+(?:\([A-Za-z0-9]+\))+";

/// Bare section number without subdivisions, e.g. `1798.105`
const SECTION_NUM_PATTERN: &str = r"\d{3,4}\.\d+";

/// Qualifier appended to citations of explicitly enumerated definitions
const STATUTORY_QUALIFIER: &str = " (Explicit Statutory Definition)";

/// Pure membership test over the lowercased query
pub fn is_definition_query(query_lower: &str) -> bool {
    DEFINITION_CUES.iter().any(|cue| query_lower.contains(cue))
}

pub struct ResponseNormalizer {
    section_ref: Regex,
    section_num: Regex,
}

impl ResponseNormalizer {
    pub fn new() -> Self {
        Self {
            // Const patterns, cannot fail at runtime
            section_ref: Regex::new(SECTION_REF_PATTERN).expect("section reference pattern"),
            section_num: Regex::new(SECTION_NUM_PATTERN).expect("section number pattern"),
        }
    }

    /// Single-pass transform; last writer wins, no field merging
    pub fn normalize(
        &self,
        mut answer: StructuredAnswer,
        query: &str,
        profile: &DomainProfile,
    ) -> StructuredAnswer {
        let query_lower = query.to_lowercase();

        if is_definition_query(&query_lower) {
            answer.confidence = 1.0;
            // HIGH survives recalibration; everything else relaxes to LOW
            if answer.risk_level != RiskLevel::High {
                answer.risk_level = RiskLevel::Low;
            }
            tracing::debug!("Definition query recalibrated");
        }

        if let Some(rule) = first_matching_override(&query_lower, profile) {
            answer.legal_basis = rule.citation.clone();
            if rule.risk_level == RiskLevel::Low {
                answer.legal_basis.push_str(STATUTORY_QUALIFIER);
            }
            answer.risk_level = rule.risk_level;
            answer.confidence = round_confidence(rule.confidence);
            answer.summary = self.repair_citations(answer.summary, rule);
            tracing::debug!(keyword = %rule.keyword, "Semantic override applied");
        }

        answer
    }

    /// Rewrite every section reference in the summary to the canonical one
    /// carried by the matched override. One substitution pass, not
    /// iterative repair.
    fn repair_citations(&self, summary: String, rule: &OverrideRule) -> String {
        // Subdivided citation if the override carries one, bare section
        // number otherwise ("1798.105" for the deletion entries)
        let canonical = match self
            .section_ref
            .find(&rule.citation)
            .or_else(|| self.section_num.find(&rule.citation))
        {
            Some(m) => m.as_str().to_string(),
            None => return summary,
        };
        if !self.section_ref.is_match(&summary) {
            return summary;
        }
        self.section_ref
            .replace_all(&summary, NoExpand(&canonical))
            .into_owned()
    }
}

/// First rule whose keyword occurs in the lowercased query; table order
/// is the precedence order
fn first_matching_override<'a>(
    query_lower: &str,
    profile: &'a DomainProfile,
) -> Option<&'a OverrideRule> {
    profile
        .overrides
        .iter()
        .find(|rule| query_lower.contains(rule.keyword.as_str()))
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compliance_hub_core::{ContextSource, Domain};

    fn answer(risk_level: RiskLevel, confidence: f64) -> StructuredAnswer {
        StructuredAnswer {
            summary: "Model summary.".to_string(),
            legal_basis: "Model basis".to_string(),
            risk_analysis: "Model risk analysis".to_string(),
            risk_level,
            confidence,
            references: vec![],
        }
    }

    fn profile(overrides: Vec<OverrideRule>) -> DomainProfile {
        DomainProfile {
            domain: Domain::Ccpa,
            system_prompt: "p".to_string(),
            context_source: ContextSource::KnowledgeOnly,
            trigger_rules: vec![],
            overrides,
            provenance: Some("Source: Statutes.".to_string()),
        }
    }

    fn rule(keyword: &str, citation: &str, risk_level: RiskLevel, confidence: f64) -> OverrideRule {
        OverrideRule {
            keyword: keyword.to_string(),
            citation: citation.to_string(),
            risk_level,
            confidence,
        }
    }

    #[test]
    fn test_definition_query_relaxes_medium_to_low() {
        let normalizer = ResponseNormalizer::new();
        let out = normalizer.normalize(
            answer(RiskLevel::Medium, 0.55),
            "What is personal data?",
            &profile(vec![]),
        );
        assert_eq!(out.risk_level, RiskLevel::Low);
        assert_eq!(out.confidence, 1.0);
    }

    #[test]
    fn test_definition_query_preserves_high_risk() {
        let normalizer = ResponseNormalizer::new();
        let out = normalizer.normalize(
            answer(RiskLevel::High, 0.55),
            "What is personal data?",
            &profile(vec![]),
        );
        assert_eq!(out.risk_level, RiskLevel::High);
        assert_eq!(out.confidence, 1.0);
    }

    #[test]
    fn test_non_definition_query_untouched_without_override() {
        let normalizer = ResponseNormalizer::new();
        let out = normalizer.normalize(
            answer(RiskLevel::Medium, 0.55),
            "Can we sell telemetry next quarter?",
            &profile(vec![]),
        );
        assert_eq!(out.risk_level, RiskLevel::Medium);
        assert_eq!(out.confidence, 0.55);
    }

    #[test]
    fn test_first_matching_override_wins() {
        let normalizer = ResponseNormalizer::new();
        let overrides = vec![
            rule("sharing", "California Civil Code \u{a7}1798.140(ah)", RiskLevel::Medium, 0.95),
            rule("share", "California Civil Code \u{a7}1798.140(ad)", RiskLevel::High, 0.50),
        ];
        // Both keywords match; only the first rule applies
        let out = normalizer.normalize(
            answer(RiskLevel::Low, 0.9),
            "Does cross-context sharing count?",
            &profile(overrides),
        );
        assert_eq!(out.legal_basis, "California Civil Code \u{a7}1798.140(ah)");
        assert_eq!(out.risk_level, RiskLevel::Medium);
        assert_eq!(out.confidence, 0.95);
    }

    #[test]
    fn test_low_risk_override_appends_statutory_qualifier() {
        let normalizer = ResponseNormalizer::new();
        let overrides = vec![rule(
            "personal information",
            "California Civil Code \u{a7}1798.140(v)(1)",
            RiskLevel::Low,
            1.0,
        )];
        let out = normalizer.normalize(
            answer(RiskLevel::Medium, 0.8),
            "Is an email address personal information?",
            &profile(overrides),
        );
        assert_eq!(
            out.legal_basis,
            "California Civil Code \u{a7}1798.140(v)(1) (Explicit Statutory Definition)"
        );
        assert_eq!(out.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_citation_repair_rewrites_hallucinated_sections() {
        let normalizer = ResponseNormalizer::new();
        let overrides = vec![rule(
            "sensitive",
            "California Civil Code \u{a7}1798.140(ae)",
            RiskLevel::Medium,
            0.95,
        )];
        let mut input = answer(RiskLevel::Low, 0.9);
        input.summary =
            "Per 1798.140(v)(9), geodata is covered; see also 1798.105(d)(2).".to_string();

        let out = normalizer.normalize(
            input,
            "Is precise geolocation sensitive data?",
            &profile(overrides),
        );
        assert_eq!(
            out.summary,
            "Per 1798.140(ae), geodata is covered; see also 1798.140(ae)."
        );
    }

    #[test]
    fn test_citation_repair_with_paren_less_override() {
        let normalizer = ResponseNormalizer::new();
        let overrides = vec![rule(
            "delete",
            "California Civil Code \u{a7}1798.105",
            RiskLevel::Medium,
            0.90,
        )];
        let mut input = answer(RiskLevel::Low, 0.9);
        input.summary = "Deletion duties arise under 1798.105(d)(2).".to_string();

        let out = normalizer.normalize(
            input,
            "Must we delete data on request?",
            &profile(overrides),
        );
        // The override has no subdivision; its bare section number still
        // replaces the hallucinated reference
        assert_eq!(out.summary, "Deletion duties arise under 1798.105.");
        assert_eq!(out.legal_basis, "California Civil Code \u{a7}1798.105");
    }

    #[test]
    fn test_ip_address_query_is_definitional() {
        assert!(is_definition_query("are ip addresses personal information?"));
        let normalizer = ResponseNormalizer::new();
        let out = normalizer.normalize(
            answer(RiskLevel::Medium, 0.6),
            "Are IP addresses personal information under GDPR?",
            &profile(vec![]),
        );
        assert_eq!(out.risk_level, RiskLevel::Low);
        assert_eq!(out.confidence, 1.0);
    }

    #[test]
    fn test_repair_skipped_when_summary_has_no_section_refs() {
        let normalizer = ResponseNormalizer::new();
        let overrides = vec![rule(
            "sensitive",
            "California Civil Code \u{a7}1798.140(ae)",
            RiskLevel::Medium,
            0.95,
        )];
        let out = normalizer.normalize(
            answer(RiskLevel::Low, 0.9),
            "Is biometric data sensitive?",
            &profile(overrides),
        );
        assert_eq!(out.summary, "Model summary.");
    }

    #[test]
    fn test_override_overwrites_definition_recalibration() {
        let normalizer = ResponseNormalizer::new();
        let overrides = vec![rule(
            "sale",
            "California Civil Code \u{a7}1798.140(ad)",
            RiskLevel::Medium,
            0.95,
        )];
        // Definition cue fires first, then the override takes precedence
        let out = normalizer.normalize(
            answer(RiskLevel::Low, 0.4),
            "What is a sale under CCPA?",
            &profile(overrides),
        );
        assert_eq!(out.risk_level, RiskLevel::Medium);
        assert_eq!(out.confidence, 0.95);
    }
}
