//! End-to-end pipeline tests with a scripted model and a temporary SQLite file

use chrono::NaiveDate;
use registrar_cli::commands::run_pipeline;
use registrar_cli::config::OutputFormat;
use registrar_cli::{ChunkOutcome, Config, Formatter, Pipeline};
use registrar_domain::CompanyStore;
use registrar_extractor::{ChunkStrategy, Extractor, ExtractorConfig};
use registrar_gatekeeper::{Gatekeeper, RejectionReason};
use registrar_llm::{AssistantTurn, MockProvider, ToolCallRequest};
use registrar_store::SqliteStore;
use std::sync::Arc;
use tempfile::TempDir;

const NOTHING: &str = r#"{"company_name": null, "founders": null, "founding_date": null}"#;
const ACME: &str =
    r#"{"company_name": "Acme Corp", "founders": ["Alice", "Bob"], "founding_date": "2005"}"#;
const GLOBEX: &str =
    r#"{"company_name": "Globex", "founders": ["Hank"], "founding_date": "1989-06-01"}"#;

const ACME_TEXT: &str =
    "Acme Corp was founded in 2005 by Alice and Bob.\n\nJust a sentence with no company.";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sqlite() -> (TempDir, Arc<SqliteStore>) {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::new(dir.path().join("companies.db"));
    (dir, Arc::new(store))
}

fn paragraph_config() -> ExtractorConfig {
    ExtractorConfig {
        chunk_strategy: ChunkStrategy::Paragraph,
        ..ExtractorConfig::default()
    }
}

fn pipeline(llm: MockProvider, store: Arc<SqliteStore>) -> Pipeline<MockProvider, SqliteStore> {
    let extractor = Extractor::new(Arc::new(llm), paragraph_config()).unwrap();
    Pipeline::new(extractor, Gatekeeper::default_config(), store)
}

fn quiet() -> Formatter {
    Formatter::new(OutputFormat::Table, false)
}

#[tokio::test]
async fn test_end_to_end_single_company() {
    let (_dir, store) = sqlite();
    let mut llm = MockProvider::new(NOTHING);
    llm.add_response("Acme Corp", ACME);

    let mut config = Config::default();
    config.extractor = paragraph_config();

    let report = run_pipeline(&config, Arc::new(llm), store.clone(), ACME_TEXT, &quiet())
        .await
        .unwrap();

    assert_eq!(report.chunks.len(), 2);
    assert_eq!(
        report.chunks[0].outcome,
        ChunkOutcome::Inserted {
            id: 1,
            company_name: "Acme Corp".to_string()
        }
    );
    assert_eq!(report.chunks[1].outcome, ChunkOutcome::NotFound);

    let rows = report.rows.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 1);
    assert_eq!(rows[0].company_name, "Acme Corp");
    assert_eq!(rows[0].founded_in_display(), "2005-01-01");
    assert_eq!(rows[0].founders_display(), "Alice, Bob");
}

#[tokio::test]
async fn test_end_to_end_with_default_chunking() {
    let (_dir, store) = sqlite();
    let mut llm = MockProvider::new(NOTHING);
    llm.add_response("Acme Corp", ACME);

    let config = Config::default();
    let report = run_pipeline(&config, Arc::new(llm.clone()), store, ACME_TEXT, &quiet())
        .await
        .unwrap();

    // Both paragraphs fit in one 1000-character chunk
    assert_eq!(report.chunks.len(), 1);
    assert_eq!(llm.call_count(), 1);
    assert_eq!(
        report.chunks[0].outcome,
        ChunkOutcome::Inserted {
            id: 1,
            company_name: "Acme Corp".to_string()
        }
    );

    let rows = report.rows.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].founded_in_display(), "2005-01-01");
    assert_eq!(rows[0].founders_display(), "Alice, Bob");
}

#[tokio::test]
async fn test_failed_chunk_does_not_stop_run() {
    let (_dir, store) = sqlite();
    let mut llm = MockProvider::new(NOTHING);
    llm.add_response("Acme Corp", ACME);
    llm.add_error("Initech");
    llm.add_response("Globex", GLOBEX);

    let pipeline = pipeline(llm.clone(), store.clone());
    pipeline.prepare(true).await.unwrap();

    let text = "Acme Corp was founded in 2005 by Alice and Bob.\n\n\
                Initech was founded by Bill.\n\n\
                Globex was founded on June 1, 1989 by Hank.";
    let report = pipeline.run(text).await;

    assert_eq!(llm.call_count(), 3);
    assert!(matches!(report.chunks[0].outcome, ChunkOutcome::Inserted { id: 1, .. }));
    assert!(matches!(
        report.chunks[1].outcome,
        ChunkOutcome::ExtractionFailed { .. }
    ));
    assert!(matches!(report.chunks[2].outcome, ChunkOutcome::Inserted { id: 2, .. }));

    let summary = report.summary();
    assert_eq!(summary.chunks, 3);
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.extraction_failed, 1);

    let names: Vec<String> = report
        .rows
        .unwrap()
        .into_iter()
        .map(|row| row.company_name)
        .collect();
    assert_eq!(names, vec!["Acme Corp", "Globex"]);
}

#[tokio::test]
async fn test_fresh_start_is_idempotent() {
    let (_dir, store) = sqlite();
    let mut llm = MockProvider::new(NOTHING);
    llm.add_response("Acme Corp", ACME);
    let pipeline = pipeline(llm, store.clone());

    for _ in 0..2 {
        pipeline.prepare(true).await.unwrap();
        pipeline.run(ACME_TEXT).await;
    }

    let rows = store.list_all().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 1);
}

#[tokio::test]
async fn test_keep_existing_accumulates() {
    let (_dir, store) = sqlite();
    let mut llm = MockProvider::new(NOTHING);
    llm.add_response("Acme Corp", ACME);
    let pipeline = pipeline(llm, store.clone());

    pipeline.prepare(true).await.unwrap();
    pipeline.run(ACME_TEXT).await;
    pipeline.prepare(false).await.unwrap();
    let report = pipeline.run(ACME_TEXT).await;

    let ids: Vec<i64> = report.rows.unwrap().iter().map(|row| row.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_incomplete_record_never_inserted() {
    let (_dir, store) = sqlite();
    let mut llm = MockProvider::new(NOTHING);
    llm.add_response(
        "Acme Corp",
        r#"{"company_name": "Acme Corp", "founders": null, "founding_date": "2005"}"#,
    );

    let pipeline = pipeline(llm, store.clone());
    pipeline.prepare(true).await.unwrap();
    let report = pipeline.run(ACME_TEXT).await;

    assert_eq!(
        report.chunks[0].outcome,
        ChunkOutcome::Incomplete {
            company_name: Some("Acme Corp".to_string()),
            reasons: vec![RejectionReason::MissingFounders],
        }
    );
    assert_eq!(report.summary().incomplete, 1);
    assert!(report.rows.unwrap().is_empty());
}

#[tokio::test]
async fn test_partial_dates_normalized() {
    let (_dir, store) = sqlite();
    let mut llm = MockProvider::new(NOTHING);
    llm.add_response(
        "Gamma",
        r#"{"company_name": "Gamma", "founders": ["Carol"], "founding_date": "1999"}"#,
    );
    llm.add_response(
        "Delta",
        r#"{"company_name": "Delta", "founders": ["Dan"], "founding_date": "2010-03"}"#,
    );
    llm.add_response(
        "Epsilon",
        r#"{"company_name": "Epsilon", "founders": ["Eve"], "founding_date": "2012-07-15"}"#,
    );

    let pipeline = pipeline(llm, store.clone());
    pipeline.prepare(true).await.unwrap();
    let report = pipeline
        .run(
            "Gamma was founded in 1999 by Carol.\n\n\
             Delta was founded in March 2010 by Dan.\n\n\
             Epsilon was founded on July 15, 2012 by Eve.",
        )
        .await;

    let dates: Vec<NaiveDate> = report.rows.unwrap().iter().map(|row| row.founded_in).collect();
    assert_eq!(
        dates,
        vec![date(1999, 1, 1), date(2010, 3, 1), date(2012, 7, 15)]
    );
}

#[tokio::test]
async fn test_complete_record_stored_as_extracted() {
    let (_dir, store) = sqlite();
    let mut llm = MockProvider::new(NOTHING);
    llm.add_response(
        "Zeta Labs",
        r#"{"company_name": "Zeta Labs", "founders": ["Ann", "ann"], "founding_date": "2030-01-01"}"#,
    );

    let config = Config::default();
    let report = run_pipeline(
        &config,
        Arc::new(llm),
        store,
        "Zeta Labs will be founded in 2030 by Ann and ann.",
        &quiet(),
    )
    .await
    .unwrap();

    assert!(matches!(report.chunks[0].outcome, ChunkOutcome::Inserted { id: 1, .. }));
    let rows = report.rows.unwrap();
    assert_eq!(rows[0].founded_in, date(2030, 1, 1));
    assert_eq!(rows[0].founded_by, vec!["Ann", "ann"]);
}

#[tokio::test]
async fn test_store_failure_reported_per_chunk() {
    let (dir, store) = sqlite();
    let mut llm = MockProvider::new(NOTHING);
    llm.add_response("Acme Corp", ACME);
    llm.add_response("Globex", GLOBEX);

    let pipeline = pipeline(llm, store.clone());
    pipeline.prepare(true).await.unwrap();

    let conn = rusqlite::Connection::open(dir.path().join("companies.db")).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_acme BEFORE INSERT ON Company_details
         WHEN NEW.company_name = 'Acme Corp'
         BEGIN SELECT RAISE(ABORT, 'rejected by trigger'); END;",
    )
    .unwrap();
    drop(conn);

    let report = pipeline
        .run("Acme Corp was founded in 2005.\n\nGlobex was founded in 1989.")
        .await;

    match &report.chunks[0].outcome {
        ChunkOutcome::InsertFailed {
            company_name,
            cause,
        } => {
            assert_eq!(company_name, "Acme Corp");
            assert!(cause.contains("rejected by trigger"));
        }
        other => panic!("Expected InsertFailed, got {:?}", other),
    }
    assert!(matches!(report.chunks[1].outcome, ChunkOutcome::Inserted { .. }));

    let rows = report.rows.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].company_name, "Globex");
}

#[tokio::test]
async fn test_agent_mode_inserts_through_tool() {
    let (_dir, store) = sqlite();
    let mut llm = MockProvider::new(NOTHING);
    llm.add_response("Acme Corp", ACME);
    llm.push_turn(AssistantTurn::calls(vec![ToolCallRequest::new(
        "call_1",
        "add_company_to_db",
        r#"{"company_name": "Acme Corp", "founding_date": "2005-01-01", "founders": ["Alice", "Bob"]}"#,
    )]));

    let mut config = Config::default();
    config.agent.enabled = true;

    let report = run_pipeline(&config, Arc::new(llm), store.clone(), ACME_TEXT, &quiet())
        .await
        .unwrap();

    // The agent path splits on blank lines
    assert_eq!(report.chunks.len(), 2);
    match &report.chunks[0].outcome {
        ChunkOutcome::Delegated {
            company_name,
            observations,
            stored,
            ..
        } => {
            assert!(stored);
            assert_eq!(company_name, "Acme Corp");
            assert_eq!(
                observations,
                &vec!["Successfully added Acme Corp to the database.".to_string()]
            );
        }
        other => panic!("Expected Delegated, got {:?}", other),
    }
    assert_eq!(report.summary().delegated, 1);

    let rows = report.rows.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].founders_display(), "Alice, Bob");
}

#[tokio::test]
async fn test_agent_that_never_stores_counts_as_failure() {
    let (_dir, store) = sqlite();
    let mut llm = MockProvider::new(NOTHING);
    llm.add_response("Acme Corp", ACME);
    llm.push_turn(AssistantTurn::calls(vec![ToolCallRequest::new(
        "call_1",
        "add_company_to_db",
        r#"{"company_name": "Acme Corp"}"#,
    )]));

    let mut config = Config::default();
    config.agent.enabled = true;

    let report = run_pipeline(&config, Arc::new(llm), store, ACME_TEXT, &quiet())
        .await
        .unwrap();

    match &report.chunks[0].outcome {
        ChunkOutcome::Delegated {
            stored,
            observations,
            ..
        } => {
            assert!(!stored);
            assert!(observations[0].starts_with("Error: invalid arguments"));
        }
        other => panic!("Expected Delegated, got {:?}", other),
    }

    let summary = report.summary();
    assert_eq!(summary.delegated, 0);
    assert_eq!(summary.insert_failed, 1);
    assert!(report.rows.unwrap().is_empty());
}
