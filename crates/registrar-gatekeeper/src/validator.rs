//! Record validation logic

use crate::ValidationConfig;
use chrono::{NaiveDate, Utc};
use registrar_domain::{CompanyRecord, NewCompany};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Result of record validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the record passed validation
    pub status: ValidationStatus,

    /// Rejection reasons (if any)
    pub reasons: Vec<RejectionReason>,

    /// The insert request, present only when accepted
    pub company: Option<NewCompany>,
}

impl ValidationResult {
    /// Whether the record was accepted
    pub fn is_accepted(&self) -> bool {
        self.status == ValidationStatus::Accepted
    }
}

/// Validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Record accepted
    Accepted,

    /// Record rejected
    Rejected,
}

/// Reasons for rejection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// No company name, or only whitespace
    MissingCompanyName,

    /// No founders left after dropping blank names
    MissingFounders,

    /// No founding date
    MissingFoundingDate,

    /// Name longer than the configured limit
    CompanyNameTooLong {
        /// Actual length in characters
        length: usize,
        /// Configured maximum
        max: usize,
    },

    /// Founding date later than today
    FoundingDateInFuture(NaiveDate),
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::MissingCompanyName => write!(f, "missing company name"),
            RejectionReason::MissingFounders => write!(f, "missing founders"),
            RejectionReason::MissingFoundingDate => write!(f, "missing founding date"),
            RejectionReason::CompanyNameTooLong { length, max } => {
                write!(f, "company name is {} characters (max {})", length, max)
            }
            RejectionReason::FoundingDateInFuture(date) => {
                write!(f, "founding date {} is in the future", date)
            }
        }
    }
}

/// The Gatekeeper validates records before insertion
#[derive(Debug, Clone)]
pub struct Gatekeeper {
    config: ValidationConfig,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Configuration in use
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a record against the configured rules, using today's date
    pub fn validate(&self, record: &CompanyRecord) -> ValidationResult {
        self.validate_as_of(record, Utc::now().date_naive())
    }

    /// Validate a record with an explicit notion of "today"
    pub fn validate_as_of(&self, record: &CompanyRecord, today: NaiveDate) -> ValidationResult {
        let mut reasons = Vec::new();

        // 1. Company name
        let name = record
            .company_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty());
        match name {
            None => reasons.push(RejectionReason::MissingCompanyName),
            Some(name) => {
                let length = name.chars().count();
                let limit = self.config.max_company_name_length;
                if let Some(max) = limit.filter(|&max| length > max) {
                    reasons.push(RejectionReason::CompanyNameTooLong { length, max });
                }
            }
        }

        // 2. Founders
        let founders = self.normalize_founders(record.founders.as_deref().unwrap_or_default());
        if founders.is_empty() {
            reasons.push(RejectionReason::MissingFounders);
        }

        // 3. Founding date
        match record.founding_date {
            None => reasons.push(RejectionReason::MissingFoundingDate),
            Some(date) if self.config.reject_future_dates && date > today => {
                reasons.push(RejectionReason::FoundingDateInFuture(date));
            }
            Some(_) => {}
        }

        let company = match (name, record.founding_date) {
            (Some(name), Some(founding_date)) if reasons.is_empty() => Some(NewCompany {
                company_name: name.to_string(),
                founding_date,
                founders,
            }),
            _ => None,
        };

        let status = if company.is_some() {
            ValidationStatus::Accepted
        } else {
            debug!("Record rejected: {:?}", reasons);
            ValidationStatus::Rejected
        };

        ValidationResult {
            status,
            reasons,
            company,
        }
    }

    /// Turn an accepted record into an insert request
    pub fn admit(&self, record: &CompanyRecord) -> Result<NewCompany, Vec<RejectionReason>> {
        let result = self.validate(record);
        result.company.ok_or(result.reasons)
    }

    fn normalize_founders(&self, founders: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        founders
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .filter(|name| !self.config.dedupe_founders || seen.insert(name.to_lowercase()))
            .map(str::to_string)
            .collect()
    }
}
