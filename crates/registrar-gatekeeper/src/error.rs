//! Gatekeeper error types

use crate::RejectionReason;
use thiserror::Error;

/// Errors that can occur during gatekeeper operations
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Record failed one or more checks
    #[error("Record rejected: {}", join_reasons(.0))]
    Rejected(Vec<RejectionReason>),
}

fn join_reasons(reasons: &[RejectionReason]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<RejectionReason>> for GatekeeperError {
    fn from(reasons: Vec<RejectionReason>) -> Self {
        GatekeeperError::Rejected(reasons)
    }
}
