//! Tools the agent can call.

mod add_company;

pub use add_company::{is_stored_observation, AddCompanyParams, AddCompanyTool, ADD_COMPANY_TOOL};

use async_trait::async_trait;
use registrar_llm::ToolSpec;

/// A callable tool exposed to the model.
///
/// `invoke` takes the raw JSON arguments and always returns an observation
/// string; failures are described in the string rather than raised.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name
    fn name(&self) -> &str;

    /// Definition sent to the provider
    fn spec(&self) -> ToolSpec;

    /// Run the tool on JSON-encoded arguments
    async fn invoke(&self, arguments: &str) -> String;
}
