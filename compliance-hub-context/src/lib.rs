//! Context assembly for Compliance Hub
//!
//! Turns a query plus its domain profile into the textual context handed
//! to inference, combining similarity search, deterministic rule injection,
//! and external search. Also home to the built-in domain profile tables.

pub mod assembler;
pub mod error;
pub mod profiles;

pub use assembler::{AssembledContext, ContextAssembler, needs_wide_retrieval};
pub use error::ContextError;
pub use profiles::builtin_profiles;
