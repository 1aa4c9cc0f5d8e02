//! CLI command definitions and argument parsing.

use crate::config::{Backend, OutputFormat, Overrides, ProviderKind};
use clap::{Parser, Subcommand};
use registrar_extractor::ChunkStrategy;
use std::path::PathBuf;

/// Registrar - Extract company founding facts from text into a database.
#[derive(Debug, Parser)]
#[command(name = "registrar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Input text file
    #[arg(short, long, global = true)]
    pub input: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend
    #[arg(long, value_enum, global = true)]
    pub backend: Option<CliBackend>,

    /// SQLite database file
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Keep rows from earlier runs instead of clearing the table
    #[arg(long, global = true)]
    pub keep_existing: bool,

    /// Insert directly, or hand records to the tool-calling agent
    #[arg(short, long, value_enum, global = true)]
    pub mode: Option<CliMode>,

    /// Text chunking strategy
    #[arg(long, value_enum, global = true)]
    pub chunking: Option<CliChunking>,

    /// Model provider
    #[arg(short, long, value_enum, global = true)]
    pub provider: Option<CliProvider>,

    /// Model identifier
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Also reject long names and future dates, and merge repeated founders
    #[arg(long, global = true)]
    pub strict: bool,

    /// Subcommand; `run` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Extract companies from the input file and store them (default)
    Run,

    /// Print the stored companies without extracting anything
    List,

    /// Clear the companies table
    Reset,
}

/// Storage backend options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliBackend {
    /// Embedded SQLite file
    Sqlite,
    /// PostgreSQL server
    Postgres,
}

/// Insertion mode options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliMode {
    /// Insert validated records directly
    Extract,
    /// Ask the agent to insert them through its tool
    Agent,
}

/// Chunking options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliChunking {
    /// Recursive splitting with overlap
    Recursive,
    /// One chunk per paragraph
    Paragraph,
}

/// Provider options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliProvider {
    /// OpenAI chat completions
    Openai,
    /// Local Ollama server
    Ollama,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

impl Cli {
    /// The subcommand to execute; `run` when none was given.
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }

    /// Flags that take precedence over the file and environment.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            input: self.input.clone(),
            backend: self.backend.map(Into::into),
            db_path: self.db_path.clone(),
            keep_existing: self.keep_existing,
            agent: self.mode.map(|mode| mode == CliMode::Agent),
            chunking: self.chunking.map(Into::into),
            provider: self.provider.map(Into::into),
            model: self.model.clone(),
            format: self.format.map(Into::into),
            no_color: self.no_color,
            strict: self.strict,
        }
    }
}

impl From<CliBackend> for Backend {
    fn from(backend: CliBackend) -> Self {
        match backend {
            CliBackend::Sqlite => Backend::Sqlite,
            CliBackend::Postgres => Backend::Postgres,
        }
    }
}

impl From<CliChunking> for ChunkStrategy {
    fn from(chunking: CliChunking) -> Self {
        match chunking {
            CliChunking::Recursive => ChunkStrategy::Recursive,
            CliChunking::Paragraph => ChunkStrategy::Paragraph,
        }
    }
}

impl From<CliProvider> for ProviderKind {
    fn from(provider: CliProvider) -> Self {
        match provider {
            CliProvider::Openai => ProviderKind::OpenAi,
            CliProvider::Ollama => ProviderKind::Ollama,
        }
    }
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_run() {
        let cli = Cli::parse_from(["registrar"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.command(), Command::Run);
        assert_eq!(cli.overrides(), Overrides::default());
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::parse_from([
            "registrar",
            "--input",
            "notes.txt",
            "--backend",
            "postgres",
            "--mode",
            "agent",
            "--chunking",
            "paragraph",
            "--provider",
            "ollama",
            "--model",
            "llama3.1",
            "--keep-existing",
            "--strict",
        ]);

        let overrides = cli.overrides();
        assert_eq!(overrides.input, Some(PathBuf::from("notes.txt")));
        assert_eq!(overrides.backend, Some(Backend::Postgres));
        assert_eq!(overrides.agent, Some(true));
        assert_eq!(overrides.chunking, Some(ChunkStrategy::Paragraph));
        assert_eq!(overrides.provider, Some(ProviderKind::Ollama));
        assert_eq!(overrides.model.as_deref(), Some("llama3.1"));
        assert!(overrides.keep_existing);
        assert!(overrides.strict);
    }

    #[test]
    fn test_subcommands_accept_global_flags() {
        let cli = Cli::parse_from(["registrar", "list", "--format", "json", "--no-color"]);
        assert_eq!(cli.command(), Command::List);

        let overrides = cli.overrides();
        assert_eq!(overrides.format, Some(OutputFormat::Json));
        assert!(overrides.no_color);

        let cli = Cli::parse_from(["registrar", "reset", "--db-path", "other.db"]);
        assert_eq!(cli.command(), Command::Reset);
        assert_eq!(cli.overrides().db_path, Some(PathBuf::from("other.db")));
    }

    #[test]
    fn test_extract_mode_disables_agent() {
        let cli = Cli::parse_from(["registrar", "--mode", "extract"]);
        assert_eq!(cli.overrides().agent, Some(false));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(Cli::try_parse_from(["registrar", "--backend", "oracle"]).is_err());
    }
}
