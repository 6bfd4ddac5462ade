//! Built-in domain profile tables
//!
//! Prompts, trigger rules, and override tables for the shipped domains.
//! Deployments can replace these with configuration; evaluation semantics
//! live in the assembler and normalizer, not here.

use compliance_hub_core::{
    ContextSource, Domain, DomainProfile, OverrideRule, RiskLevel, TriggerRule,
};

const GDPR_PROMPT: &str = "You are a Senior GDPR Compliance Analyst. \
Your goal is to provide precise, factual advice based ONLY on the provided legal text.\n\n\
Rules of Engagement:\n\
1. Cite specific clauses (e.g., Art 83(4)(a)).\n\
2. If the context doesn't have the answer, state that clearly in the summary.\n\
3. Your output must strictly follow the JSON schema provided.\n\
4. CONFLICT RESOLUTION: Specific fines (e.g. Art 83(4)) override general fines (Art 83(5)).\n";

const FDA_PROMPT: &str = "You are a Senior FDA Regulatory Consultant. \
Your goal is to provide guidance on US Food & Drug Administration regulations and recent legal precedents.\n\n\
Rules of Engagement:\n\
1. Focus on 21 CFR, FD&C Act, and recent court cases.\n\
2. Use the provided External Search Context to cite real lawsuits.\n\
3. Your output must strictly follow the JSON schema provided.\n";

const CCPA_PROMPT: &str = "You are a Senior Privacy Counsel specializing in CCPA/CPRA. \
Your goal is to provide definitive, legally precise classifications based on California Civil Code.\n\n\
Rules of Engagement:\n\
1. BE DECLARATIVE. Do not use 'may be' unless there is genuine legal ambiguity. If the law lists it, say 'Yes'.\n\
2. CITE SECTIONS PRECISELY:\n\
   - Personal Information: \u{a7}1798.140(v)(1)\n\
   - Sensitive Personal Information: \u{a7}1798.140(ae)\n\
   - Sale: \u{a7}1798.140(ad)\n\
   - Sharing: \u{a7}1798.140(ah)\n\
3. STATUTORY KNOWLEDGE EXCEPTION: If a question concerns an explicit statutory definition (e.g. 'is X considered personal information') and the statute enumerates the item, ANSWER DIRECTLY even if retrieval does not surface the clause.\n\
4. RISK CALIBRATION: Informational/Recall questions are LOW RISK. Only actionable selling/sharing is MH/HR.\n\
5. Your output must strictly follow the JSON schema provided.\n";

const CCPA_PROVENANCE: &str =
    "Source: CCPA/CPRA Legal Statutes (Modeled Knowledge - Statutory Exception Active).";

fn trigger(name: &str, keywords: &[&str], inject: &[&str]) -> TriggerRule {
    TriggerRule {
        name: name.to_string(),
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        inject: inject.iter().map(|s| s.to_string()).collect(),
    }
}

fn override_rule(keyword: &str, citation: &str, risk_level: RiskLevel, confidence: f64) -> OverrideRule {
    OverrideRule {
        keyword: keyword.to_string(),
        citation: citation.to_string(),
        risk_level,
        confidence,
    }
}

fn gdpr() -> DomainProfile {
    DomainProfile {
        domain: Domain::Gdpr,
        system_prompt: GDPR_PROMPT.to_string(),
        context_source: ContextSource::Retrieval,
        trigger_rules: vec![
            trigger(
                "penalty_logic",
                &["fine", "penalty", "administrative", "sanction", "euro"],
                &["83"],
            ),
            trigger(
                "scope_logic",
                &["apply", "applies", "scope", "territorial", "material", "when does"],
                &["2", "3"],
            ),
            trigger(
                "definition_logic",
                &["define", "definition", "meaning", "what is a", "who is a"],
                &["4"],
            ),
            trigger(
                "dpo_logic",
                &["dpo", "officer", "representative", "public authority"],
                &["37", "38", "39"],
            ),
            trigger(
                "transfer_logic",
                &["transfer", "third country", "abroad", "adequacy"],
                &["45", "46", "49"],
            ),
        ],
        overrides: vec![],
        provenance: None,
    }
}

fn fda() -> DomainProfile {
    DomainProfile {
        domain: Domain::Fda,
        system_prompt: FDA_PROMPT.to_string(),
        context_source: ContextSource::ExternalSearch,
        trigger_rules: vec![],
        overrides: vec![],
        provenance: None,
    }
}

/// CCPA override table. Order matters: the first keyword match wins, so
/// specific entries precede general ones.
fn ccpa() -> DomainProfile {
    DomainProfile {
        domain: Domain::Ccpa,
        system_prompt: CCPA_PROMPT.to_string(),
        context_source: ContextSource::KnowledgeOnly,
        trigger_rules: vec![],
        overrides: vec![
            override_rule(
                "personal information",
                "California Civil Code \u{a7}1798.140(v)(1)",
                RiskLevel::Low,
                1.0,
            ),
            override_rule(
                "sensitive",
                "California Civil Code \u{a7}1798.140(ae)",
                RiskLevel::Medium,
                0.95,
            ),
            override_rule(
                "sale",
                "California Civil Code \u{a7}1798.140(ad)",
                RiskLevel::Medium,
                0.95,
            ),
            override_rule(
                "share",
                "California Civil Code \u{a7}1798.140(ah)",
                RiskLevel::Medium,
                0.95,
            ),
            override_rule(
                "sharing",
                "California Civil Code \u{a7}1798.140(ah)",
                RiskLevel::Medium,
                0.95,
            ),
            override_rule(
                "cross-context",
                "California Civil Code \u{a7}1798.140(ah)",
                RiskLevel::Medium,
                0.95,
            ),
            override_rule(
                "fraud",
                "California Civil Code \u{a7}1798.105(d)(1)",
                RiskLevel::Medium,
                0.90,
            ),
            override_rule(
                "deny",
                "California Civil Code \u{a7}1798.105(d)",
                RiskLevel::Medium,
                0.90,
            ),
            override_rule(
                "delete",
                "California Civil Code \u{a7}1798.105",
                RiskLevel::Medium,
                0.90,
            ),
            override_rule(
                "deletion",
                "California Civil Code \u{a7}1798.105",
                RiskLevel::Medium,
                0.90,
            ),
            override_rule(
                "geolocation",
                "California Civil Code \u{a7}1798.140(ae)",
                RiskLevel::Medium,
                0.95,
            ),
        ],
        provenance: Some(CCPA_PROVENANCE.to_string()),
    }
}

/// The profiles shipped with the service
pub fn builtin_profiles() -> Vec<DomainProfile> {
    vec![gdpr(), fda(), ccpa()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use compliance_hub_core::ProfileRegistry;

    #[test]
    fn test_builtin_profiles_are_valid() {
        let registry = ProfileRegistry::new(builtin_profiles()).unwrap();
        assert!(registry.get(Domain::Gdpr).is_some());
        assert!(registry.get(Domain::Fda).is_some());
        assert!(registry.get(Domain::Ccpa).is_some());
    }

    #[test]
    fn test_gdpr_penalty_trigger_injects_83() {
        let profile = gdpr();
        let rule = profile
            .trigger_rules
            .iter()
            .find(|r| r.matches("what fine applies"))
            .unwrap();
        assert_eq!(rule.inject, vec!["83".to_string()]);
    }

    #[test]
    fn test_ccpa_override_order_puts_specific_first() {
        let profile = ccpa();
        // "personal information" must precede broader medium-risk entries
        assert_eq!(profile.overrides[0].keyword, "personal information");
        assert_eq!(profile.overrides[0].risk_level, RiskLevel::Low);
    }
}
