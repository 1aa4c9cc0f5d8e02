//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{NewCompany, StoredCompany};
use async_trait::async_trait;
use std::fmt;

/// Result of a single insert attempt
///
/// Inserts never raise: a failure is reported as a value so the caller can
/// keep processing the remaining input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Row was committed
    Added {
        /// Store-assigned id of the new row
        id: i64,
        /// Name of the inserted company
        company_name: String,
    },

    /// Row was rejected and the transaction rolled back
    Failed {
        /// Name of the company that failed to insert
        company_name: String,
        /// Backend error message
        cause: String,
    },
}

impl InsertOutcome {
    /// Whether the row was committed
    pub fn is_added(&self) -> bool {
        matches!(self, InsertOutcome::Added { .. })
    }

    /// Name of the company this outcome refers to
    pub fn company_name(&self) -> &str {
        match self {
            InsertOutcome::Added { company_name, .. } => company_name,
            InsertOutcome::Failed { company_name, .. } => company_name,
        }
    }
}

impl fmt::Display for InsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertOutcome::Added { company_name, .. } => {
                write!(f, "Successfully added {} to the database.", company_name)
            }
            InsertOutcome::Failed { company_name, cause } => {
                write!(f, "Error inserting data for {}: {}", company_name, cause)
            }
        }
    }
}

/// Trait for persisting company records
///
/// Implemented by the infrastructure layer (registrar-store). Every method
/// acquires its own connection and releases it before returning.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    /// Error type for store operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create the table if it does not exist yet
    async fn initialize(&self) -> Result<(), Self::Error>;

    /// Delete every row and restart id assignment
    async fn reset(&self) -> Result<(), Self::Error>;

    /// Append one validated record
    async fn insert(&self, company: &NewCompany) -> InsertOutcome;

    /// All rows in ascending id order
    async fn list_all(&self) -> Result<Vec<StoredCompany>, Self::Error>;
}
