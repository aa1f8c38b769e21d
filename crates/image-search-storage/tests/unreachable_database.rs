//! Failure degradation against a real `PgVectorStore` whose database is unreachable.
//!
//! Port 1 on localhost refuses connections, so these tests need no database.
//! On hosts that drop the packets instead, `acquire_timeout_secs = 1` bounds
//! each pooled call, and the calls in one test run concurrently under an
//! outer deadline so a slow host fails the test instead of stalling it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use image_search_core::config::StorageConfig;
use image_search_core::error::CoreError;
use image_search_core::retrieval::QueryOrchestrator;
use image_search_core::stubs::StubTextEncoder;
use image_search_core::traits::VectorStore;
use image_search_core::types::{Embedding, EmptyReason, ItemId, Query};
use image_search_storage::PgVectorStore;

const DEADLINE: Duration = Duration::from_secs(10);

async fn within_deadline<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(DEADLINE, future)
        .await
        .expect("unreachable store did not fail within the deadline")
}

fn unreachable_store() -> PgVectorStore {
    let config = StorageConfig {
        backend: "postgres".into(),
        database_url: Some("postgres://nobody@127.0.0.1:1/none".into()),
        table: "image_embeddings".into(),
        max_connections: 4,
        acquire_timeout_secs: 1,
        seed_path: None,
    };
    PgVectorStore::connect(&config).expect("lazy pool construction never dials")
}

#[tokio::test]
async fn test_adapter_reports_store_unavailable() {
    let store = unreachable_store();

    let id = ItemId::from("img7.jpg");
    let query = Embedding::new(vec![0.6, 0.8]).unwrap();

    let (lookup, nearest, health) = within_deadline(async {
        tokio::join!(
            store.get_embedding(&id),
            store.nearest(&query, 30, None),
            store.health_check()
        )
    })
    .await;

    assert!(matches!(lookup, Err(CoreError::StoreUnavailable(_))));
    assert!(matches!(nearest, Err(CoreError::StoreUnavailable(_))));
    assert!(health.is_err());
}

#[tokio::test]
async fn test_search_degrades_to_empty_when_database_is_down() {
    println!("\n=== TEST: Unreachable Database Degrades To Empty ===");
    let orchestrator = QueryOrchestrator::new(
        Arc::new(StubTextEncoder::new()),
        Arc::new(unreachable_store()),
    );

    let text_query = Query::text("red car");
    let exemplar_query = Query::exemplar("img7.jpg");
    let (response, exemplar_response) = within_deadline(async {
        tokio::join!(
            orchestrator.search(&text_query),
            orchestrator.search(&exemplar_query)
        )
    })
    .await;

    assert!(response.results.is_empty());
    assert_eq!(response.echoed_text.as_deref(), Some("red car"));
    assert_eq!(response.empty_reason, Some(EmptyReason::StoreUnavailable));

    let response = exemplar_response;
    assert!(response.results.is_empty());
    assert_eq!(response.echoed_text, None);
    assert_eq!(response.empty_reason, Some(EmptyReason::StoreUnavailable));
    println!("RESULT: PASS");
}
