//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::pipeline::{ChunkOutcome, ChunkReport, RunReport, Summary};
use colored::*;
use registrar_domain::StoredCompany;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Progress line for a finished chunk.
    ///
    /// `None` in JSON mode, where the whole run is reported at the end.
    pub fn format_chunk(&self, chunk: &ChunkReport) -> Option<String> {
        if self.format == OutputFormat::Json {
            return None;
        }

        let prefix = format!("[{}/{}]", chunk.index, chunk.total);
        let line = match &chunk.outcome {
            ChunkOutcome::Inserted { company_name, .. } => {
                self.success(&format!("Successfully added {} to the database.", company_name))
            }
            ChunkOutcome::InsertFailed {
                company_name,
                cause,
            } => self.error(&format!("Error inserting data for {}: {}", company_name, cause)),
            ChunkOutcome::Incomplete {
                company_name,
                reasons,
            } => {
                let reasons: Vec<String> = reasons.iter().map(ToString::to_string).collect();
                self.warning(&format!(
                    "Incomplete information for {}: {}",
                    company_name.as_deref().unwrap_or("unnamed company"),
                    reasons.join("; ")
                ))
            }
            ChunkOutcome::NotFound => self.info("No company information found."),
            ChunkOutcome::ExtractionFailed { error } => {
                self.error(&format!("Extraction failed: {}", error))
            }
            ChunkOutcome::Delegated {
                company_name,
                reply,
                stored: true,
                ..
            } => self.success(&format!("Agent ({}): {}", company_name, reply)),
            ChunkOutcome::Delegated {
                company_name,
                observations,
                reply,
                stored: false,
            } => self.error(&format!(
                "Agent did not store {}: {}",
                company_name,
                observations.last().unwrap_or(reply)
            )),
        };

        Some(format!("{} {}", prefix, line))
    }

    /// Full run report: summary plus the final table.
    pub fn format_report(&self, report: &RunReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_report_json(report),
            OutputFormat::Table => self.format_report_table(report),
        }
    }

    /// Stored companies on their own.
    pub fn format_companies(&self, companies: &[StoredCompany]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&companies_json(companies))?),
            OutputFormat::Table => Ok(self.format_companies_table(companies)),
        }
    }

    fn format_report_table(&self, report: &RunReport) -> Result<String> {
        let summary = self.summary_line(&report.summary());
        let table = match &report.rows {
            Ok(rows) => self.format_companies_table(rows),
            Err(e) => self.error(&format!("Error retrieving data: {}", e)),
        };
        Ok(format!("{}\n\n{}", summary, table))
    }

    fn format_report_json(&self, report: &RunReport) -> Result<String> {
        let summary = report.summary();
        let chunks: Vec<Value> = report.chunks.iter().map(chunk_json).collect();

        let mut value = json!({
            "summary": {
                "chunks": summary.chunks,
                "inserted": summary.inserted,
                "insert_failed": summary.insert_failed,
                "incomplete": summary.incomplete,
                "not_found": summary.not_found,
                "extraction_failed": summary.extraction_failed,
                "delegated": summary.delegated,
            },
            "chunks": chunks,
        });
        match &report.rows {
            Ok(rows) => value["companies"] = companies_json(rows),
            Err(e) => value["error"] = json!(e),
        }

        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn format_companies_table(&self, companies: &[StoredCompany]) -> String {
        if companies.is_empty() {
            return self.colorize("No companies found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Company Name", "Founded In", "Founded By"]);

        for company in companies {
            builder.push_record([
                company.id.to_string(),
                company.company_name.clone(),
                company.founded_in_display(),
                company.founders_display(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    fn summary_line(&self, summary: &Summary) -> String {
        let mut parts = vec![
            format!("{} inserted", summary.inserted),
            format!("{} insert failed", summary.insert_failed),
            format!("{} incomplete", summary.incomplete),
            format!("{} not found", summary.not_found),
            format!("{} extraction error(s)", summary.extraction_failed),
        ];
        if summary.delegated > 0 {
            parts.push(format!("{} stored by agent", summary.delegated));
        }

        let line = format!("Processed {} chunk(s): {}", summary.chunks, parts.join(", "));
        if summary.insert_failed + summary.extraction_failed > 0 {
            self.warning(&line)
        } else {
            self.info(&line)
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn companies_json(companies: &[StoredCompany]) -> Value {
    companies
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "company_name": c.company_name,
                "founded_in": c.founded_in_display(),
                "founded_by": c.founded_by,
            })
        })
        .collect()
}

fn chunk_json(chunk: &ChunkReport) -> Value {
    let mut value = match &chunk.outcome {
        ChunkOutcome::Inserted { id, company_name } => json!({
            "outcome": "inserted",
            "id": id,
            "company_name": company_name,
        }),
        ChunkOutcome::InsertFailed {
            company_name,
            cause,
        } => json!({
            "outcome": "insert_failed",
            "company_name": company_name,
            "error": cause,
        }),
        ChunkOutcome::Incomplete {
            company_name,
            reasons,
        } => json!({
            "outcome": "incomplete",
            "company_name": company_name,
            "reasons": reasons.iter().map(ToString::to_string).collect::<Vec<_>>(),
        }),
        ChunkOutcome::NotFound => json!({ "outcome": "not_found" }),
        ChunkOutcome::ExtractionFailed { error } => json!({
            "outcome": "extraction_failed",
            "error": error,
        }),
        ChunkOutcome::Delegated {
            company_name,
            reply,
            observations,
            stored,
        } => json!({
            "outcome": "delegated",
            "company_name": company_name,
            "stored": stored,
            "reply": reply,
            "observations": observations,
        }),
    };
    value["chunk"] = json!(chunk.index);
    value
}
