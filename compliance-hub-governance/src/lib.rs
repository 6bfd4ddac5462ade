//! Governance layer for Compliance Hub
//!
//! Recalibrates and repairs the model's structured answer, then maps
//! (confidence, risk, refusal) to a terminal disposition.

pub mod gate;
pub mod normalizer;

pub use gate::{GovernanceError, GovernanceGate, RiskThresholds};
pub use normalizer::{ResponseNormalizer, is_definition_query};
