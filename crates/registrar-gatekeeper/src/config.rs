//! Gatekeeper configuration

use crate::GatekeeperError;
use serde::{Deserialize, Serialize};

/// Longest name the networked schema accepts (`VARCHAR(255)`)
pub const MAX_COMPANY_NAME_LENGTH: usize = 255;

/// Configuration for validation rules
///
/// The default only checks completeness. The extra checks are opt-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum company name length in characters; unlimited when unset
    pub max_company_name_length: Option<usize>,

    /// Reject founding dates later than today
    pub reject_future_dates: bool,

    /// Drop repeated founder names (case-insensitive)
    pub dedupe_founders: bool,
}

impl ValidationConfig {
    /// Create a strict configuration (all checks enabled)
    pub fn strict() -> Self {
        Self {
            max_company_name_length: Some(MAX_COMPANY_NAME_LENGTH),
            reject_future_dates: true,
            dedupe_founders: true,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), GatekeeperError> {
        match self.max_company_name_length {
            Some(0) => Err(GatekeeperError::Config(
                "max_company_name_length must be greater than 0".to_string(),
            )),
            Some(max) if max > MAX_COMPANY_NAME_LENGTH => Err(GatekeeperError::Config(format!(
                "max_company_name_length cannot exceed {}",
                MAX_COMPANY_NAME_LENGTH
            ))),
            _ => Ok(()),
        }
    }
}
