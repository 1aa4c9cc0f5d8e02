//! List command implementation.

use crate::error::Result;
use crate::output::Formatter;
use registrar_domain::CompanyStore;
use registrar_store::StoreError;

/// Execute the list command.
pub async fn execute_list<S>(store: &S, formatter: &Formatter) -> Result<()>
where
    S: CompanyStore<Error = StoreError>,
{
    // A fresh database has no table yet; listing it should show an empty table
    store.initialize().await?;
    let companies = store.list_all().await?;

    println!("{}", formatter.format_companies(&companies)?);

    Ok(())
}
