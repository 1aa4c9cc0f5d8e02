//! Parse LLM output into company records

use crate::error::ExtractorError;
use registrar_domain::{parse_founding_date, CompanyRecord};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

/// Structured information about a company, as the model returns it.
///
/// The date stays text here so partial dates can be normalized after the
/// fact.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CompanyInfo {
    /// The name of the company.
    pub company_name: Option<String>,

    /// A list of the company's founders.
    pub founders: Option<Vec<String>>,

    /// The founding date of the company, as YYYY-MM-DD.
    pub founding_date: Option<String>,
}

impl CompanyInfo {
    /// Normalize into a domain record
    ///
    /// Blank strings and empty founder lists become null. A non-empty date
    /// that cannot be normalized is an error rather than a silent null.
    pub fn into_record(self) -> Result<CompanyRecord, ExtractorError> {
        let company_name = self
            .company_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let founders = self
            .founders
            .map(|names| {
                names
                    .into_iter()
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|names| !names.is_empty());

        let founding_date = match self.founding_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_founding_date(raw).map_err(|e| {
                ExtractorError::InvalidFormat(format!("Unusable founding date '{}': {}", raw, e))
            })?),
        };

        Ok(CompanyRecord {
            company_name,
            founders,
            founding_date,
        })
    }
}

/// Parse the model's reply into a record
pub fn parse_company_response(response: &str) -> Result<CompanyRecord, ExtractorError> {
    let json_str = extract_json(response)?;

    let value: Value = serde_json::from_str(&json_str)
        .map_err(|e| ExtractorError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    if value.is_null() {
        return Ok(CompanyRecord::empty());
    }
    if !value.is_object() {
        return Err(ExtractorError::InvalidFormat(
            "Expected a JSON object".to_string(),
        ));
    }

    let info: CompanyInfo = serde_json::from_value(value)
        .map_err(|e| ExtractorError::InvalidFormat(format!("Unexpected field types: {}", e)))?;

    info.into_record()
}

/// Extract JSON from response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, ExtractorError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractorError::InvalidFormat("Empty code block".to_string()));
        }

        // Skip the opening fence line and a closing fence if present
        let end = if lines.last().is_some_and(|l| l.trim() == "```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        Ok(lines[1..end].join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}
