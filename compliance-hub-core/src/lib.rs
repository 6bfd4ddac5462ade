//! Core domain models for Compliance Hub
//!
//! This crate contains the shared data structures used across
//! the compliance pipeline: ComplianceQuery, StructuredAnswer,
//! GovernanceDecision, and the per-domain profile tables.

pub mod error;
pub mod models;
pub mod profile;

pub use error::CoreError;
pub use models::*;
pub use profile::*;
