//! add_company_to_db tool - insert one company through the gate

use super::Tool;
use async_trait::async_trait;
use chrono::NaiveDate;
use registrar_domain::{parse_founding_date, CompanyRecord, CompanyStore};
use registrar_gatekeeper::{Gatekeeper, GatekeeperError};
use registrar_llm::{strict_schema, ToolSpec};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Tool name as the model sees it
pub const ADD_COMPANY_TOOL: &str = "add_company_to_db";

const DESCRIPTION: &str = "Adds a new company record to the database. \
Use this tool when company information has been extracted and is ready for storage.";

/// Start of the observation for a row that landed
const STORED_PREFIX: &str = "Successfully added ";

/// Whether a tool observation reports a stored row
pub fn is_stored_observation(observation: &str) -> bool {
    observation.starts_with(STORED_PREFIX)
}

/// Parameters for adding a company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AddCompanyParams {
    /// The name of the company
    pub company_name: String,

    /// The founding date of the company, as YYYY-MM-DD
    #[serde(deserialize_with = "deserialize_founding_date")]
    pub founding_date: NaiveDate,

    /// The company's founders
    pub founders: Vec<String>,
}

/// Accept partial dates ("1999", "2010-03") as well as full ones
fn deserialize_founding_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_founding_date(&raw).map_err(serde::de::Error::custom)
}

/// Exposes `CompanyStore::insert` as a tool
pub struct AddCompanyTool<S: CompanyStore> {
    store: Arc<S>,
    gatekeeper: Gatekeeper,
}

impl<S: CompanyStore> AddCompanyTool<S> {
    /// Create the tool over a shared store
    pub fn new(store: Arc<S>, gatekeeper: Gatekeeper) -> Self {
        Self { store, gatekeeper }
    }

    /// Gate and insert one company, describing the outcome
    pub async fn add(&self, params: AddCompanyParams) -> String {
        let label = match params.company_name.trim() {
            "" => "unnamed company".to_string(),
            name => name.to_string(),
        };

        let record = CompanyRecord::new(
            params.company_name,
            params.founders,
            params.founding_date,
        );

        match self.gatekeeper.admit(&record) {
            Ok(company) => {
                let outcome = self.store.insert(&company).await;
                info!(tool = ADD_COMPANY_TOOL, "{}", outcome);
                outcome.to_string()
            }
            Err(reasons) => {
                let err = GatekeeperError::from(reasons);
                warn!(tool = ADD_COMPANY_TOOL, "{}: {}", label, err);
                format!("Error inserting data for {}: {}", label, err)
            }
        }
    }
}

#[async_trait]
impl<S: CompanyStore> Tool for AddCompanyTool<S> {
    fn name(&self) -> &str {
        ADD_COMPANY_TOOL
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: ADD_COMPANY_TOOL.to_string(),
            description: DESCRIPTION.to_string(),
            parameters: strict_schema::<AddCompanyParams>(),
        }
    }

    async fn invoke(&self, arguments: &str) -> String {
        match serde_json::from_str::<AddCompanyParams>(arguments) {
            Ok(params) => self.add(params).await,
            Err(e) => {
                warn!(tool = ADD_COMPANY_TOOL, error = %e, "Rejected tool arguments");
                format!("Error: invalid arguments for {}: {}", ADD_COMPANY_TOOL, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrar_domain::InsertOutcome;

    #[test]
    fn test_stored_observation_matches_insert_outcome() {
        let added = InsertOutcome::Added {
            id: 1,
            company_name: "Acme Corp".to_string(),
        };
        assert!(is_stored_observation(&added.to_string()));

        let failed = InsertOutcome::Failed {
            company_name: "Acme Corp".to_string(),
            cause: "disk full".to_string(),
        };
        assert!(!is_stored_observation(&failed.to_string()));
        assert!(!is_stored_observation("Error: invalid arguments for add_company_to_db"));
    }

    #[test]
    fn test_params_deserialize() {
        let json = r#"{
            "company_name": "Acme Corp",
            "founding_date": "2005-01-01",
            "founders": ["Alice", "Bob"]
        }"#;

        let params: AddCompanyParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.company_name, "Acme Corp");
        assert_eq!(params.founding_date, NaiveDate::from_ymd_opt(2005, 1, 1).unwrap());
        assert_eq!(params.founders, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_params_accept_partial_date() {
        let json = r#"{"company_name": "Y", "founding_date": "2010-03", "founders": ["A"]}"#;
        let params: AddCompanyParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.founding_date, NaiveDate::from_ymd_opt(2010, 3, 1).unwrap());
    }

    #[test]
    fn test_params_reject_missing_fields() {
        let json = r#"{"company_name": "Acme Corp"}"#;
        assert!(serde_json::from_str::<AddCompanyParams>(json).is_err());

        let json = r#"{"company_name": "Acme", "founding_date": "soon", "founders": []}"#;
        assert!(serde_json::from_str::<AddCompanyParams>(json).is_err());
    }

    #[test]
    fn test_params_schema_is_strict() {
        let schema = strict_schema::<AddCompanyParams>();
        assert_eq!(schema["additionalProperties"], false);
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"company_name"));
        assert!(required.contains(&"founding_date"));
        assert!(required.contains(&"founders"));
    }
}
