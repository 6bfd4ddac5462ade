//! Context assembly error types

use compliance_hub_retrieval::RetrievalError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    /// Search found nothing and no trigger rule fired. Surfaced to the
    /// caller as a refusal, not as a fault.
    #[error("Insufficient context found to provide a compliance answer")]
    InsufficientContext,

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),
}
