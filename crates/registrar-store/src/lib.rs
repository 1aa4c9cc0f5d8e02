//! Registrar Storage Layer
//!
//! Implements the CompanyStore trait for the `Company_details` table.
//!
//! # Architecture
//!
//! - `SqliteStore`: embedded backend, founders stored as `", "`-joined text
//! - `PostgresStore`: networked backend, founders stored as a native `TEXT[]`
//!
//! Both backends open a fresh connection per operation and release it on
//! every exit path. Neither constructor touches the database: schema creation
//! and row clearing are explicit `initialize()` / `reset()` calls.
//!
//! # Examples
//!
//! ```no_run
//! use registrar_domain::CompanyStore;
//! use registrar_store::SqliteStore;
//!
//! # async fn example() -> Result<(), registrar_store::StoreError> {
//! let store = SqliteStore::new("companies.db");
//! store.initialize().await?;
//! store.reset().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod postgres;
mod sqlite;

pub use postgres::{PostgresConfig, PostgresStore};
pub use sqlite::SqliteStore;

use thiserror::Error;

/// Name of the table every backend manages
pub const TABLE_NAME: &str = "Company_details";

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend unreachable or connection could not be opened
    #[error("Connection error: {0}")]
    Connection(String),

    /// Table creation or reset failed
    #[error("Schema error: {0}")]
    Schema(String),

    /// Insert rejected by the backend
    #[error("Insert error: {0}")]
    Insert(String),

    /// Read query failed
    #[error("Query error: {0}")]
    Query(String),

    /// Row contents could not be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),
}
