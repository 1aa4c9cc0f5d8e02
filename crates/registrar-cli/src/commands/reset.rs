//! Reset command implementation.

use crate::error::Result;
use crate::output::Formatter;
use registrar_domain::CompanyStore;
use registrar_store::{StoreError, TABLE_NAME};

/// Execute the reset command.
pub async fn execute_reset<S>(store: &S, formatter: &Formatter) -> Result<()>
where
    S: CompanyStore<Error = StoreError>,
{
    store.initialize().await?;
    store.reset().await?;

    println!("{}", formatter.success(&format!("Cleared {}", TABLE_NAME)));

    Ok(())
}
