//! PostgreSQL backend

use crate::StoreError;
use async_trait::async_trait;
use chrono::NaiveDate;
use registrar_domain::{CompanyStore, InsertOutcome, NewCompany, StoredCompany};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Row};
use tracing::{debug, info, warn};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS Company_details (
    id SERIAL PRIMARY KEY,
    company_name VARCHAR(255) NOT NULL,
    founded_in DATE NOT NULL,
    founded_by TEXT[] NOT NULL
)";

/// Connection settings for the Postgres backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    /// Server host name
    pub host: String,
    /// Server port
    pub port: u16,
    /// Login role
    pub user: String,
    /// Password, if the server requires one
    pub password: Option<String>,
    /// Database name
    pub dbname: String,
}

impl PostgresConfig {
    fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.dbname);

        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

/// PostgreSQL-based company store
///
/// Connects anew for every operation and closes the connection before
/// returning.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    config: PostgresConfig,
    options: PgConnectOptions,
}

impl PostgresStore {
    /// Create a store from connection settings
    pub fn new(config: PostgresConfig) -> Self {
        let options = config.connect_options();
        Self { config, options }
    }

    /// Connection settings this store was built with
    pub fn config(&self) -> &PostgresConfig {
        &self.config
    }

    async fn connect(&self) -> Result<PgConnection, StoreError> {
        PgConnection::connect_with(&self.options).await.map_err(|e| {
            StoreError::Connection(format!(
                "Could not connect to {}@{}:{}/{}: {}",
                self.config.user, self.config.host, self.config.port, self.config.dbname, e
            ))
        })
    }

    async fn close(conn: PgConnection) {
        if let Err(e) = conn.close().await {
            debug!("Error closing Postgres connection: {}", e);
        }
    }

    async fn insert_row(conn: &mut PgConnection, company: &NewCompany) -> Result<i64, StoreError> {
        let mut tx = conn
            .begin()
            .await
            .map_err(|e| StoreError::Insert(e.to_string()))?;

        let inserted = sqlx::query(
            "INSERT INTO Company_details (company_name, founded_in, founded_by)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(company.company_name.clone())
        .bind(company.founding_date)
        .bind(company.founders.clone())
        .fetch_one(&mut *tx)
        .await;

        match inserted {
            Ok(row) => {
                let id: i32 = row
                    .try_get("id")
                    .map_err(|e| StoreError::Insert(e.to_string()))?;
                tx.commit()
                    .await
                    .map_err(|e| StoreError::Insert(e.to_string()))?;
                Ok(i64::from(id))
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    warn!("Rollback failed after insert error: {}", rollback);
                }
                Err(StoreError::Insert(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl CompanyStore for PostgresStore {
    type Error = StoreError;

    async fn initialize(&self) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query(CREATE_TABLE)
            .execute(&mut conn)
            .await
            .map_err(|e| StoreError::Schema(e.to_string()));
        Self::close(conn).await;
        result?;
        debug!("Ensured Company_details exists in {}", self.config.dbname);
        Ok(())
    }

    async fn reset(&self) -> Result<(), StoreError> {
        let mut conn = self.connect().await?;
        let result = sqlx::query("TRUNCATE TABLE Company_details RESTART IDENTITY")
            .execute(&mut conn)
            .await
            .map_err(|e| StoreError::Schema(e.to_string()));
        Self::close(conn).await;
        result?;
        info!("Cleared Company_details in {}", self.config.dbname);
        Ok(())
    }

    async fn insert(&self, company: &NewCompany) -> InsertOutcome {
        let result = match self.connect().await {
            Ok(mut conn) => {
                let result = Self::insert_row(&mut conn, company).await;
                Self::close(conn).await;
                result
            }
            Err(e) => Err(e),
        };

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
        let mut conn = self.connect().await?;
        let rows = sqlx::query(
            "SELECT id, company_name, founded_in, founded_by FROM Company_details ORDER BY id",
        )
        .fetch_all(&mut conn)
        .await
        .map_err(|e| StoreError::Query(e.to_string()));
        Self::close(conn).await;

        rows?
            .iter()
            .map(|row| {
                let id: i32 = row.try_get("id").map_err(decode_error)?;
                let founded_in: NaiveDate = row.try_get("founded_in").map_err(decode_error)?;
                Ok(StoredCompany {
                    id: i64::from(id),
                    company_name: row.try_get("company_name").map_err(decode_error)?,
                    founded_in,
                    founded_by: row.try_get("founded_by").map_err(decode_error)?,
                })
            })
            .collect()
    }
}

fn decode_error(e: sqlx::Error) -> StoreError {
    StoreError::InvalidData(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_does_not_connect() {
        let store = PostgresStore::new(PostgresConfig {
            host: "db.invalid".to_string(),
            port: 5432,
            user: "registrar".to_string(),
            password: None,
            dbname: "registrar".to_string(),
        });
        assert_eq!(store.config().host, "db.invalid");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        let store = PostgresStore::new(PostgresConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            user: "registrar".to_string(),
            password: None,
            dbname: "registrar".to_string(),
        });

        let err = store.initialize().await.unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));

        let company = NewCompany {
            company_name: "Acme Corp".to_string(),
            founding_date: NaiveDate::from_ymd_opt(2005, 1, 1).unwrap(),
            founders: vec!["Alice".to_string()],
        };
        let outcome = store.insert(&company).await;
        assert!(!outcome.is_added());
        assert!(outcome.to_string().starts_with("Error inserting data for Acme Corp:"));
    }
}
