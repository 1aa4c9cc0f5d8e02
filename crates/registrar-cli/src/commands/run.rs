//! Run command implementation.

use crate::config::{read_input, Config, LlmSettings, ProviderKind};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::pipeline::{Pipeline, RunReport};
use registrar_domain::CompanyStore;
use registrar_extractor::Extractor;
use registrar_gatekeeper::Gatekeeper;
use registrar_llm::{LlmProvider, OllamaProvider, OpenAiProvider};
use registrar_store::StoreError;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Execute the run command.
///
/// The input file is read before any model or database work, so a missing
/// file fails without side effects.
pub async fn execute_run<S>(config: &Config, store: S, formatter: &Formatter) -> Result<()>
where
    S: CompanyStore<Error = StoreError> + 'static,
{
    let text = read_input(&config.input.path)?;
    let store = Arc::new(store);

    match config.llm.provider {
        ProviderKind::OpenAi => {
            let llm = Arc::new(openai_provider(&config.llm)?);
            run_pipeline(config, llm, store, &text, formatter).await?;
        }
        ProviderKind::Ollama => {
            let llm = Arc::new(ollama_provider(&config.llm)?);
            run_pipeline(config, llm, store, &text, formatter).await?;
        }
    }

    Ok(())
}

/// Build the pipeline from `config`, run it over `text` and print the report.
pub async fn run_pipeline<L, S>(
    config: &Config,
    llm: Arc<L>,
    store: Arc<S>,
    text: &str,
    formatter: &Formatter,
) -> Result<RunReport>
where
    L: LlmProvider,
    S: CompanyStore<Error = StoreError> + 'static,
{
    info!(
        model = llm.model_name(),
        agent = config.agent.enabled,
        "Starting run"
    );

    let extractor = Extractor::new(llm, config.extractor_config())?;
    let mut pipeline = Pipeline::new(extractor, Gatekeeper::new(config.gate.clone()), store);
    if config.agent.enabled {
        pipeline = pipeline.with_agent(config.agent.max_iterations);
    }

    pipeline.prepare(config.store.fresh_start).await?;

    let report = pipeline
        .run_with(text, |chunk| {
            if let Some(line) = formatter.format_chunk(chunk) {
                println!("{}", line);
            }
        })
        .await;

    println!("{}", formatter.format_report(&report)?);

    Ok(report)
}

fn openai_provider(settings: &LlmSettings) -> Result<OpenAiProvider> {
    let api_key = settings
        .api_key
        .clone()
        .ok_or_else(|| CliError::Config("OPENAI_API_KEY is not set".to_string()))?;

    let mut provider = OpenAiProvider::new(api_key, &settings.model)?
        .with_temperature(settings.temperature)
        .with_max_retries(settings.max_retries)
        .with_timeout(Duration::from_secs(settings.request_timeout_secs))?;
    if let Some(url) = &settings.base_url {
        provider = provider.with_base_url(url);
    }

    Ok(provider)
}

fn ollama_provider(settings: &LlmSettings) -> Result<OllamaProvider> {
    let provider = match &settings.base_url {
        Some(endpoint) => OllamaProvider::new(endpoint, &settings.model)?,
        None => OllamaProvider::default_endpoint(&settings.model)?,
    };

    Ok(provider
        .with_temperature(settings.temperature)
        .with_max_retries(settings.max_retries)
        .with_timeout(Duration::from_secs(settings.request_timeout_secs))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_provider_from_settings() {
        let settings = LlmSettings {
            api_key: Some("sk-test".to_string()),
            base_url: Some("https://proxy.example/v1/".to_string()),
            ..LlmSettings::default()
        };
        let provider = openai_provider(&settings).unwrap();
        assert_eq!(provider.model_name(), "gpt-4o-mini");
        assert_eq!(provider.base_url(), "https://proxy.example/v1");
    }

    #[test]
    fn test_openai_provider_needs_key() {
        let result = openai_provider(&LlmSettings::default());
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_ollama_provider_from_settings() {
        let settings = LlmSettings {
            model: "llama3.1".to_string(),
            ..LlmSettings::default()
        };
        let provider = ollama_provider(&settings).unwrap();
        assert_eq!(provider.model_name(), "llama3.1");
    }
}
