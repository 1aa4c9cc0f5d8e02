//! Configuration management for the CLI.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables, then command-line flags.

use crate::cli::Command;
use crate::error::{CliError, Result};
use registrar_extractor::{ChunkStrategy, ExtractorConfig};
use registrar_gatekeeper::ValidationConfig;
use registrar_store::PostgresConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "registrar.toml";

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input file settings
    pub input: InputSettings,

    /// Database settings
    pub store: StoreSettings,

    /// Model provider settings
    pub llm: LlmSettings,

    /// Chunking and extraction settings
    pub extractor: ExtractorConfig,

    /// Insertion gate rules
    pub gate: ValidationConfig,

    /// Agent path settings
    pub agent: AgentSettings,

    /// Report settings
    pub output: OutputSettings,
}

/// `[input]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Text file to process
    pub path: PathBuf,
}

/// `[store]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Which backend to use
    pub backend: Backend,

    /// Database file for the sqlite backend
    pub sqlite_path: PathBuf,

    /// Clear rows and restart ids before each run
    pub fresh_start: bool,

    /// Connection settings for the postgres backend
    pub postgres: PostgresSettings,
}

/// `[store.postgres]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresSettings {
    /// Server host
    pub host: Option<String>,

    /// Server port
    pub port: u16,

    /// Login role
    pub user: Option<String>,

    /// Password, if the server requires one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Database name
    pub dbname: Option<String>,
}

/// `[llm]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Which provider to call
    pub provider: ProviderKind,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// API base URL (OpenAI) or endpoint (Ollama); provider default when unset
    pub base_url: Option<String>,

    /// API key, required for OpenAI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Retries for transient failures
    pub max_retries: u32,

    /// Per-request HTTP timeout (seconds)
    pub request_timeout_secs: u64,
}

/// `[agent]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Hand validated records to the tool-calling agent instead of
    /// inserting directly
    pub enabled: bool,

    /// Model round trips allowed per record
    pub max_iterations: usize,

    /// Chunking used on the agent path, in place of `[extractor]`'s
    pub chunk_strategy: ChunkStrategy,
}

/// `[output]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Report format
    pub format: OutputFormat,

    /// Enable colored output
    pub color: bool,

    /// Log filter used when `RUST_LOG` is unset
    pub log_level: String,
}

/// Storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Embedded single-file database
    #[default]
    Sqlite,
    /// Networked database
    Postgres,
}

/// Model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions
    #[default]
    OpenAi,
    /// Local Ollama server
    Ollama,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    #[default]
    Table,
    /// JSON format
    Json,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("input.txt"),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: Backend::Sqlite,
            sqlite_path: PathBuf::from("companies.db"),
            fresh_start: true,
            postgres: PostgresSettings::default(),
        }
    }
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: 5432,
            user: None,
            password: None,
            dbname: None,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            model: registrar_llm::openai::DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            base_url: None,
            api_key: None,
            max_retries: 3,
            request_timeout_secs: 60,
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_iterations: registrar_agent::DEFAULT_MAX_ITERATIONS,
            chunk_strategy: ChunkStrategy::Paragraph,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            color: true,
            log_level: "registrar=info".to_string(),
        }
    }
}

/// Values supplied on the command line; `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    /// `--input`
    pub input: Option<PathBuf>,
    /// `--backend`
    pub backend: Option<Backend>,
    /// `--db-path`
    pub db_path: Option<PathBuf>,
    /// `--keep-existing`
    pub keep_existing: bool,
    /// `--mode agent` maps to `Some(true)`
    pub agent: Option<bool>,
    /// `--chunking`, for both the direct and the agent path
    pub chunking: Option<ChunkStrategy>,
    /// `--provider`
    pub provider: Option<ProviderKind>,
    /// `--model`
    pub model: Option<String>,
    /// `--format`
    pub format: Option<OutputFormat>,
    /// `--no-color`
    pub no_color: bool,
    /// `--strict` switches the gate to `ValidationConfig::strict()`
    pub strict: bool,
}

impl Config {
    /// Load from `path`, or from `registrar.toml` if present, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(|e| {
                    CliError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::from_toml(&contents)
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_toml(&fs::read_to_string(path)?)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse a TOML document; missing sections take their defaults.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply environment variables, then command-line overrides.
    ///
    /// `env` looks a variable up by name, so tests can pass a map instead of
    /// the process environment.
    pub fn layered<F>(mut self, env: F, overrides: &Overrides) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Selections first, so provider-specific variables target the chosen one
        if let Some(provider) = overrides.provider {
            self.llm.provider = provider;
        }
        if let Some(backend) = overrides.backend {
            self.store.backend = backend;
        }

        self.apply_env(env)?;
        self.apply_overrides(overrides);
        Ok(self)
    }

    fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = env("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        let base_url = match self.llm.provider {
            ProviderKind::OpenAi => env("OPENAI_BASE_URL"),
            ProviderKind::Ollama => env("OLLAMA_HOST"),
        };
        if let Some(url) = base_url {
            self.llm.base_url = Some(url);
        }
        if let Some(model) = env("REGISTRAR_MODEL") {
            self.llm.model = model;
        }
        if let Some(path) = env("REGISTRAR_DB_PATH") {
            self.store.sqlite_path = PathBuf::from(path);
        }

        let pg = &mut self.store.postgres;
        if let Some(host) = env("DB_HOST") {
            pg.host = Some(host);
        }
        if let Some(port) = env("DB_PORT") {
            pg.port = port
                .trim()
                .parse()
                .map_err(|_| CliError::Config(format!("DB_PORT is not a valid port: {}", port)))?;
        }
        if let Some(user) = env("DB_USER") {
            pg.user = Some(user);
        }
        if let Some(password) = env("DB_PASSWORD") {
            pg.password = Some(password);
        }
        if let Some(dbname) = env("DB_NAME") {
            pg.dbname = Some(dbname);
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(input) = &overrides.input {
            self.input.path = input.clone();
        }
        if let Some(path) = &overrides.db_path {
            self.store.sqlite_path = path.clone();
        }
        if overrides.keep_existing {
            self.store.fresh_start = false;
        }
        if let Some(agent) = overrides.agent {
            self.agent.enabled = agent;
        }
        if let Some(strategy) = overrides.chunking {
            self.extractor.chunk_strategy = strategy;
            self.agent.chunk_strategy = strategy;
        }
        if let Some(model) = &overrides.model {
            self.llm.model = model.clone();
        }
        if let Some(format) = overrides.format {
            self.output.format = format;
        }
        if overrides.no_color {
            self.output.color = false;
        }
        if overrides.strict {
            self.gate = ValidationConfig::strict();
        }
    }

    /// Extractor settings for a run, with the agent path's chunking applied
    pub fn extractor_config(&self) -> ExtractorConfig {
        let mut config = self.extractor.clone();
        if self.agent.enabled {
            config.chunk_strategy = self.agent.chunk_strategy;
        }
        config
    }

    /// Check the settings `command` needs before any work begins.
    ///
    /// Missing credentials for the selected provider or backend are reported
    /// by the variable that supplies them. Only `run` needs the model
    /// settings.
    pub fn validate_for(&self, command: Command) -> Result<()> {
        if command == Command::Run {
            self.validate_run()?;
        }
        self.validate_store()
    }

    fn validate_run(&self) -> Result<()> {
        self.extractor
            .validate()
            .map_err(|e| CliError::Config(format!("[extractor] {}", e)))?;
        self.gate
            .validate()
            .map_err(|e| CliError::Config(format!("[gate] {}", e)))?;

        if self.agent.max_iterations == 0 {
            return Err(CliError::Config(
                "[agent] max_iterations must be greater than 0".to_string(),
            ));
        }

        if self.llm.model.trim().is_empty() {
            return Err(CliError::Config("[llm] model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(CliError::Config(format!(
                "[llm] temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.request_timeout_secs == 0 {
            return Err(CliError::Config(
                "[llm] request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.llm.provider == ProviderKind::OpenAi && self.llm.api_key.is_none() {
            return Err(CliError::Config(
                "OPENAI_API_KEY is not set; it is required for the openai provider".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_store(&self) -> Result<()> {
        match self.store.backend {
            Backend::Sqlite => {
                if self.store.sqlite_path.as_os_str().is_empty() {
                    return Err(CliError::Config(
                        "[store] sqlite_path must not be empty".to_string(),
                    ));
                }
            }
            Backend::Postgres => {
                self.postgres_config()?;
            }
        }

        Ok(())
    }

    /// Connection settings for the postgres backend.
    pub fn postgres_config(&self) -> Result<PostgresConfig> {
        let pg = &self.store.postgres;
        let missing: Vec<&str> = [
            ("DB_NAME", pg.dbname.is_none()),
            ("DB_USER", pg.user.is_none()),
            ("DB_HOST", pg.host.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match (&pg.host, &pg.user, &pg.dbname) {
            (Some(host), Some(user), Some(dbname)) => Ok(PostgresConfig {
                host: host.clone(),
                port: pg.port,
                user: user.clone(),
                password: pg.password.clone(),
                dbname: dbname.clone(),
            }),
            _ => Err(CliError::Config(format!(
                "{} not set; required for the postgres backend",
                missing.join(", ")
            ))),
        }
    }
}

/// Read the input file, refusing a missing or blank one.
pub fn read_input(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::Input(format!("cannot read {}: {}", path.display(), e)))?;
    if text.trim().is_empty() {
        return Err(CliError::Input(format!("{} is empty", path.display())));
    }
    Ok(text)
}
