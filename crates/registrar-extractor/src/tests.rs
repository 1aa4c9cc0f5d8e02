//! Extractor tests against the mock provider

use crate::{ChunkStrategy, Extractor, ExtractorConfig, ExtractorError};
use chrono::NaiveDate;
use registrar_llm::MockProvider;
use std::sync::Arc;
use std::time::Duration;

const NULL_RECORD: &str = r#"{"company_name": null, "founders": null, "founding_date": null}"#;

fn extractor(llm: MockProvider) -> Extractor<MockProvider> {
    Extractor::new(Arc::new(llm), ExtractorConfig::default()).unwrap()
}

#[tokio::test]
async fn test_full_extraction_flow() {
    let mut llm = MockProvider::new(NULL_RECORD);
    llm.add_response(
        "Acme Corp",
        r#"{"company_name": "Acme Corp", "founders": ["Alice", "Bob"], "founding_date": "2005"}"#,
    );
    let extractor = extractor(llm.clone());

    let record = extractor
        .extract("Acme Corp was founded in 2005 by Alice and Bob.")
        .await
        .unwrap();

    assert!(record.is_complete());
    assert_eq!(record.company_name.as_deref(), Some("Acme Corp"));
    assert_eq!(
        record.founding_date,
        NaiveDate::from_ymd_opt(2005, 1, 1)
    );
    assert_eq!(llm.call_count(), 1);
}

#[tokio::test]
async fn test_no_company_yields_empty_record() {
    let extractor = extractor(MockProvider::new(NULL_RECORD));
    let record = extractor
        .extract("Just a sentence with no company.")
        .await
        .unwrap();
    assert!(record.is_empty());
}

#[tokio::test]
async fn test_extraction_with_invalid_json() {
    let extractor = extractor(MockProvider::new("This is not JSON"));
    let result = extractor.extract("Some text").await;
    assert!(matches!(result, Err(ExtractorError::InvalidFormat(_))));
}

#[tokio::test]
async fn test_provider_error_is_llm_error() {
    let mut llm = MockProvider::new(NULL_RECORD);
    llm.add_error("explode");
    let extractor = extractor(llm);

    let result = extractor.extract("please explode").await;
    assert!(matches!(result, Err(ExtractorError::Llm(_))));
}

#[tokio::test]
async fn test_hung_call_times_out() {
    let mut llm = MockProvider::new(NULL_RECORD);
    llm.add_delayed_response("slow", Duration::from_secs(30), NULL_RECORD);

    let config = ExtractorConfig {
        extraction_timeout_secs: 1,
        ..Default::default()
    };
    let extractor = Extractor::new(Arc::new(llm), config).unwrap();

    let result = extractor.extract("a slow segment").await;
    assert!(matches!(result, Err(ExtractorError::Timeout(1))));
}

#[tokio::test]
async fn test_text_too_long_rejected_before_call() {
    let llm = MockProvider::new(NULL_RECORD);
    let config = ExtractorConfig {
        chunk_size: 10,
        chunk_overlap: 0,
        max_text_length: 20,
        ..Default::default()
    };
    let extractor = Extractor::new(Arc::new(llm.clone()), config).unwrap();

    let result = extractor.extract(&"x".repeat(21)).await;
    assert!(matches!(result, Err(ExtractorError::TextTooLong(21, 20))));
    assert_eq!(llm.call_count(), 0);
}

#[test]
fn test_invalid_config_rejected() {
    let config = ExtractorConfig {
        chunk_size: 10,
        chunk_overlap: 10,
        ..Default::default()
    };
    let result = Extractor::new(Arc::new(MockProvider::default()), config);
    assert!(matches!(result, Err(ExtractorError::Config(_))));
}

#[test]
fn test_chunk_uses_configured_strategy() {
    let config = ExtractorConfig {
        chunk_strategy: ChunkStrategy::Paragraph,
        ..Default::default()
    };
    let extractor = Extractor::new(Arc::new(MockProvider::default()), config).unwrap();

    let segments = extractor.chunk("One.\n\nTwo.\n\nThree.");
    assert_eq!(segments, vec!["One.", "Two.", "Three."]);
}
