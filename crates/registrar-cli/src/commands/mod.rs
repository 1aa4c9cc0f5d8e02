//! Command implementations.

pub mod list;
pub mod reset;
pub mod run;

pub use self::list::execute_list;
pub use self::reset::execute_reset;
pub use self::run::{execute_run, run_pipeline};

use crate::cli::Command;
use crate::config::{Backend, Config};
use crate::error::Result;
use crate::output::Formatter;
use registrar_domain::CompanyStore;
use registrar_store::{PostgresStore, SqliteStore, StoreError};

/// Execute `command` against the configured backend.
pub async fn execute(command: Command, config: &Config, formatter: &Formatter) -> Result<()> {
    match config.store.backend {
        Backend::Sqlite => {
            let store = SqliteStore::new(&config.store.sqlite_path);
            dispatch(command, config, formatter, store).await
        }
        Backend::Postgres => {
            let store = PostgresStore::new(config.postgres_config()?);
            dispatch(command, config, formatter, store).await
        }
    }
}

async fn dispatch<S>(
    command: Command,
    config: &Config,
    formatter: &Formatter,
    store: S,
) -> Result<()>
where
    S: CompanyStore<Error = StoreError> + 'static,
{
    match command {
        Command::Run => execute_run(config, store, formatter).await,
        Command::List => execute_list(&store, formatter).await,
        Command::Reset => execute_reset(&store, formatter).await,
    }
}
