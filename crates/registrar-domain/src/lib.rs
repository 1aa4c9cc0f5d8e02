//! Registrar Domain Layer
//!
//! This crate contains the core value types and trait interfaces for Registrar.
//! It defines what a company-founding fact looks like at each stage of the
//! pipeline and the store boundary that every backend implements.
//!
//! ## Key Concepts
//!
//! - **CompanyRecord**: A candidate fact extracted from text, every field optional
//! - **NewCompany**: A complete record that passed the insertion gate
//! - **StoredCompany**: A persisted row with a store-assigned identity
//! - **Founding date normalization**: year-only and year-month dates default to
//!   the first day of the period
//!
//! ## Architecture
//!
//! - Pure data and normalization rules only
//! - Infrastructure implementations (SQLite, Postgres) live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod company;
pub mod founding_date;
pub mod traits;

// Re-exports for convenience
pub use company::{CompanyRecord, NewCompany, StoredCompany, FOUNDERS_SEPARATOR};
pub use founding_date::parse_founding_date;
pub use traits::{CompanyStore, InsertOutcome};
