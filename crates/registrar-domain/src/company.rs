//! Company module - founding facts at each stage of the pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Separator used when founders are flattened into a single text column
pub const FOUNDERS_SEPARATOR: &str = ", ";

/// A candidate fact extracted from a chunk of text
///
/// Every field is optional: a chunk that mentions no company yields an
/// all-null record rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Name of the company
    pub company_name: Option<String>,

    /// Founder names, in presentation order
    pub founders: Option<Vec<String>>,

    /// Founding date, already normalized to a full calendar date
    pub founding_date: Option<NaiveDate>,
}

impl CompanyRecord {
    /// Create a record with all three fields present
    pub fn new(
        company_name: impl Into<String>,
        founders: Vec<String>,
        founding_date: NaiveDate,
    ) -> Self {
        Self {
            company_name: Some(company_name.into()),
            founders: Some(founders),
            founding_date: Some(founding_date),
        }
    }

    /// A record with every field null ("no company mentioned")
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no field carries any information
    pub fn is_empty(&self) -> bool {
        self.company_name
            .as_deref()
            .map_or(true, |name| name.trim().is_empty())
            && self.founders.as_ref().map_or(true, |f| f.is_empty())
            && self.founding_date.is_none()
    }

    /// True iff all three fields are present and non-empty
    pub fn is_complete(&self) -> bool {
        let has_name = self
            .company_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        let has_founders = self
            .founders
            .as_ref()
            .is_some_and(|f| f.iter().any(|name| !name.trim().is_empty()));

        has_name && has_founders && self.founding_date.is_some()
    }
}

/// A complete, validated record ready for insertion
///
/// Only the gatekeeper produces these from extracted records, so holding one
/// means the completeness invariant already holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompany {
    /// Name of the company (non-empty)
    pub company_name: String,

    /// Founding date
    pub founding_date: NaiveDate,

    /// Founder names (non-empty list)
    pub founders: Vec<String>,
}

impl NewCompany {
    /// Founders flattened into the `", "`-joined text form
    pub fn founders_joined(&self) -> String {
        self.founders.join(FOUNDERS_SEPARATOR)
    }
}

/// A persisted row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCompany {
    /// Store-assigned identity, monotonically increasing
    pub id: i64,

    /// Name of the company
    pub company_name: String,

    /// Founding date
    pub founded_in: NaiveDate,

    /// Founder names
    pub founded_by: Vec<String>,
}

impl StoredCompany {
    /// Founders rendered the way the report shows them
    pub fn founders_display(&self) -> String {
        self.founded_by.join(FOUNDERS_SEPARATOR)
    }

    /// Founding date as ISO-8601 text
    pub fn founded_in_display(&self) -> String {
        self.founded_in.format("%Y-%m-%d").to_string()
    }
}
