//! The governance gate
//!
//! A total, stateless decision function: every (confidence, risk, refusal)
//! triple maps to exactly one terminal status. Thresholds come from
//! configuration, and raising declared risk never lowers the bar for
//! automatic release.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use compliance_hub_core::{DecisionStatus, GovernanceDecision, RiskLevel};

#[derive(Error, Debug)]
pub enum GovernanceError {
    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),
}

/// Minimum confidence for automatic release per risk tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub low: f64,
    pub medium: f64,
}

impl RiskThresholds {
    pub fn new(low: f64, medium: f64) -> Result<Self, GovernanceError> {
        for (name, value) in [("low", low), ("medium", medium)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GovernanceError::InvalidThresholds(format!(
                    "{} threshold {} outside [0,1]",
                    name, value
                )));
            }
        }
        // Monotonicity: higher declared risk must never face a lower bar
        if medium < low {
            return Err(GovernanceError::InvalidThresholds(format!(
                "medium threshold {} below low threshold {}",
                medium, low
            )));
        }
        Ok(Self { low, medium })
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low: 0.60,
            medium: 0.80,
        }
    }
}

pub struct GovernanceGate {
    thresholds: RiskThresholds,
}

impl GovernanceGate {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    pub fn decide(
        &self,
        confidence: f64,
        risk_level: RiskLevel,
        requires_refusal: bool,
    ) -> GovernanceDecision {
        let decision = |status: DecisionStatus, reason: String| {
            GovernanceDecision::new(status, reason, risk_level, confidence)
        };

        if requires_refusal {
            return decision(
                DecisionStatus::Blocked,
                "explicit refusal requested".to_string(),
            );
        }

        match risk_level {
            RiskLevel::Critical => decision(
                DecisionStatus::Blocked,
                "critical risk is never released automatically".to_string(),
            ),
            RiskLevel::High => decision(
                DecisionStatus::ReviewRequired,
                format!(
                    "high risk requires human sign-off (confidence {:.2})",
                    confidence
                ),
            ),
            RiskLevel::Medium => {
                if confidence < self.thresholds.medium {
                    decision(
                        DecisionStatus::ReviewRequired,
                        format!(
                            "confidence {:.2} below medium-risk threshold {:.2}",
                            confidence, self.thresholds.medium
                        ),
                    )
                } else {
                    decision(DecisionStatus::Allowed, "within governance policy".to_string())
                }
            }
            RiskLevel::Low => {
                if confidence < self.thresholds.low {
                    decision(
                        DecisionStatus::ReviewRequired,
                        format!(
                            "confidence {:.2} below low-risk threshold {:.2}",
                            confidence, self.thresholds.low
                        ),
                    )
                } else {
                    decision(DecisionStatus::Allowed, "within governance policy".to_string())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RISKS: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    #[test]
    fn test_gate_is_total() {
        let gate = GovernanceGate::new(RiskThresholds::default());
        for risk in RISKS {
            for refusal in [false, true] {
                for step in 0..=100 {
                    let confidence = step as f64 / 100.0;
                    let decision = gate.decide(confidence, risk, refusal);
                    // Exactly one of the three statuses, always
                    assert!(matches!(
                        decision.status,
                        DecisionStatus::Allowed
                            | DecisionStatus::ReviewRequired
                            | DecisionStatus::Blocked
                    ));
                    if refusal || risk == RiskLevel::Critical {
                        assert_eq!(decision.status, DecisionStatus::Blocked);
                    }
                }
            }
        }
    }

    #[test]
    fn test_high_risk_always_reviewed() {
        let gate = GovernanceGate::new(RiskThresholds::default());
        for confidence in [0.0, 0.5, 0.99, 1.0] {
            let decision = gate.decide(confidence, RiskLevel::High, false);
            assert_eq!(decision.status, DecisionStatus::ReviewRequired);
        }
    }

    #[test]
    fn test_threshold_gating() {
        let gate = GovernanceGate::new(RiskThresholds::new(0.60, 0.80).unwrap());

        assert_eq!(gate.decide(0.59, RiskLevel::Low, false).status, DecisionStatus::ReviewRequired);
        assert_eq!(gate.decide(0.60, RiskLevel::Low, false).status, DecisionStatus::Allowed);
        assert_eq!(gate.decide(0.79, RiskLevel::Medium, false).status, DecisionStatus::ReviewRequired);
        assert_eq!(gate.decide(0.80, RiskLevel::Medium, false).status, DecisionStatus::Allowed);
    }

    #[test]
    fn test_monotone_in_risk() {
        let gate = GovernanceGate::new(RiskThresholds::default());
        // If MEDIUM is allowed at some confidence, LOW must be too
        for step in 0..=100 {
            let confidence = step as f64 / 100.0;
            if gate.decide(confidence, RiskLevel::Medium, false).status == DecisionStatus::Allowed {
                assert_eq!(gate.decide(confidence, RiskLevel::Low, false).status, DecisionStatus::Allowed);
            }
        }
    }

    #[test]
    fn test_refusal_dominates_even_low_risk() {
        let gate = GovernanceGate::new(RiskThresholds::default());
        let decision = gate.decide(1.0, RiskLevel::Low, true);
        assert_eq!(decision.status, DecisionStatus::Blocked);
        assert_eq!(decision.reason, "explicit refusal requested");
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        assert!(RiskThresholds::new(0.9, 0.5).is_err());
        assert!(RiskThresholds::new(-0.1, 0.5).is_err());
        assert!(RiskThresholds::new(0.5, 1.2).is_err());
    }

    #[test]
    fn test_decision_echoes_inputs() {
        let gate = GovernanceGate::new(RiskThresholds::default());
        let decision = gate.decide(0.95, RiskLevel::Medium, false);
        assert_eq!(decision.confidence, 0.95);
        assert_eq!(decision.risk_level, RiskLevel::Medium);
    }
}
