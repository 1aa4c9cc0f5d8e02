//! SQLite backend

use crate::StoreError;
use async_trait::async_trait;
use chrono::NaiveDate;
use registrar_domain::{
    CompanyStore, InsertOutcome, NewCompany, StoredCompany, FOUNDERS_SEPARATOR,
};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const SCHEMA: &str = include_str!("schema.sql");

/// SQLite-based company store
///
/// Holds only the database path. Each operation opens its own connection on
/// a blocking thread and drops it before returning.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Create a store for the database file at `path`
    ///
    /// Nothing is opened until the first operation runs.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(path: &Path) -> Result<Connection, StoreError> {
        Connection::open(path).map_err(|e| {
            StoreError::Connection(format!(
                "Could not open SQLite database at {}: {}",
                path.display(),
                e
            ))
        })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Path) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || op(&path))
            .await
            .map_err(|e| StoreError::Connection(format!("Blocking task failed: {}", e)))?
    }
}

fn insert_row(conn: &mut Connection, company: &NewCompany) -> Result<i64, StoreError> {
    let tx = conn
        .transaction()
        .map_err(|e| StoreError::Insert(e.to_string()))?;

    let inserted = tx.execute(
        "INSERT INTO Company_details (company_name, founded_in, founded_by) VALUES (?1, ?2, ?3)",
        params![
            company.company_name,
            company.founding_date,
            company.founders_joined()
        ],
    );

    match inserted {
        Ok(_) => {
            let id = tx.last_insert_rowid();
            tx.commit().map_err(|e| StoreError::Insert(e.to_string()))?;
            Ok(id)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback() {
                warn!("Rollback failed after insert error: {}", rollback);
            }
            Err(StoreError::Insert(e.to_string()))
        }
    }
}

fn split_founders(joined: &str) -> Vec<String> {
    joined
        .split(FOUNDERS_SEPARATOR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_rows(conn: &Connection) -> Result<Vec<StoredCompany>, StoreError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, company_name, founded_in, founded_by FROM Company_details ORDER BY id",
        )
        .map_err(|e| StoreError::Query(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(|e| StoreError::Query(e.to_string()))?;

    let mut companies = Vec::new();
    for row in rows {
        let (id, company_name, founded_in, founded_by) =
            row.map_err(|e| StoreError::Query(e.to_string()))?;
        let founded_in = NaiveDate::parse_from_str(&founded_in, "%Y-%m-%d").map_err(|e| {
            StoreError::InvalidData(format!(
                "Row {} has bad founded_in '{}': {}",
                id, founded_in, e
            ))
        })?;
        companies.push(StoredCompany {
            id,
            company_name,
            founded_in,
            founded_by: split_founders(&founded_by),
        });
    }

    Ok(companies)
}

#[async_trait]
impl CompanyStore for SqliteStore {
    type Error = StoreError;

    async fn initialize(&self) -> Result<(), StoreError> {
        self.blocking(|path| {
            let conn = Self::connect(path)?;
            conn.execute_batch(SCHEMA)
                .map_err(|e| StoreError::Schema(e.to_string()))?;
            debug!("Ensured Company_details exists in {}", path.display());
            Ok(())
        })
        .await
    }

    async fn reset(&self) -> Result<(), StoreError> {
        self.blocking(|path| {
            let conn = Self::connect(path)?;
            conn.execute_batch(
                "DELETE FROM Company_details;
                 DELETE FROM sqlite_sequence WHERE name = 'Company_details';",
            )
            .map_err(|e| StoreError::Schema(e.to_string()))?;
            info!("Cleared Company_details in {}", path.display());
            Ok(())
        })
        .await
    }

    async fn insert(&self, company: &NewCompany) -> InsertOutcome {
        let row = company.clone();
        let result = self
            .blocking(move |path| {
                let mut conn = Self::connect(path)?;
                insert_row(&mut conn, &row)
            })
            .await;

        match result {
            Ok(id) => {
                info!("Inserted {} with id {}", company.company_name, id);
                InsertOutcome::Added {
                    id,
                    company_name: company.company_name.clone(),
                }
            }
            Err(e) => {
                warn!("Insert failed for {}: {}", company.company_name, e);
                InsertOutcome::Failed {
                    company_name: company.company_name.clone(),
                    cause: e.to_string(),
                }
            }
        }
    }

    async fn list_all(&self) -> Result<Vec<StoredCompany>, StoreError> {
        self.blocking(|path| {
            let conn = Self::connect(path)?;
            read_rows(&conn)
        })
        .await
    }
}
