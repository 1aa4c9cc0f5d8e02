//! Registrar Agent
//!
//! The alternate insert path: a validated record is described to the model in
//! plain language, and the model decides whether to call the
//! `add_company_to_db` tool.
//!
//! # Architecture
//!
//! ```text
//! NewCompany → instruction_for → Agent loop ⇄ LLM
//!                                    ↓
//!                             AddCompanyTool → Gatekeeper → CompanyStore
//! ```
//!
//! Tools never fail: bad arguments, rejected records and store errors all
//! come back to the model as a descriptive string, so the loop always gets a
//! well-formed observation.

#![warn(missing_docs)]

pub mod agent;
pub mod error;
pub mod tools;

pub use agent::{instruction_for, Agent, AgentResponse, DEFAULT_MAX_ITERATIONS};
pub use error::AgentError;
pub use tools::{is_stored_observation, AddCompanyParams, AddCompanyTool, Tool, ADD_COMPANY_TOOL};
