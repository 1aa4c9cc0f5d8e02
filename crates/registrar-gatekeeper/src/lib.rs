//! Registrar Gatekeeper
//!
//! Decides whether an extracted record may be inserted.
//!
//! The Gatekeeper provides:
//! - Completeness checks (name, founders and date all present)
//! - Opt-in sanity checks (name length, founding date not in the future)
//! - Founder normalization (trimmed and blanks removed; duplicates too when
//!   `dedupe_founders` is set)
//! - Conversion of an accepted record into a `NewCompany`
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use registrar_domain::CompanyRecord;
//! use registrar_gatekeeper::{Gatekeeper, RejectionReason};
//!
//! let gatekeeper = Gatekeeper::default_config();
//!
//! let record = CompanyRecord::new(
//!     "Acme Corp",
//!     vec!["Alice".to_string(), "Bob".to_string()],
//!     NaiveDate::from_ymd_opt(2005, 1, 1).unwrap(),
//! );
//! let company = gatekeeper.admit(&record).unwrap();
//! assert_eq!(company.founders_joined(), "Alice, Bob");
//!
//! let reasons = gatekeeper.admit(&CompanyRecord::empty()).unwrap_err();
//! assert!(reasons.contains(&RejectionReason::MissingCompanyName));
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod validator;

pub use config::ValidationConfig;
pub use error::GatekeeperError;
pub use validator::{Gatekeeper, RejectionReason, ValidationResult, ValidationStatus};
