//! Inference error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    /// The whole (tier x credential) matrix was exhausted. This is the
    /// only fatal outcome of the cascade; it carries a bounded sample of
    /// the transient errors seen along the way.
    #[error("all model tiers exhausted after {attempts} attempts: {sample:?}")]
    ServiceExhausted {
        attempts: usize,
        sample: Vec<String>,
    },

    #[error("cascade misconfigured: {0}")]
    Misconfigured(String),
}
