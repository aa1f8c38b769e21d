//! Builds the query orchestrator from configuration.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use image_search_core::config::Config;
use image_search_core::retrieval::QueryOrchestrator;
use image_search_core::stubs::{InMemoryVectorStore, StubTextEncoder};
use image_search_core::traits::{TextEncoder, VectorStore};
use image_search_storage::PgVectorStore;
use tracing::{info, warn};

use crate::adapters::ClipEncoderAdapter;

/// Create the encoder selected by `embedding.backend`.
pub fn build_encoder(config: &Config) -> Result<Arc<dyn TextEncoder>> {
    let embedding = &config.embedding;
    let encoder: Arc<dyn TextEncoder> = match embedding.backend.as_str() {
        "stub" => Arc::new(StubTextEncoder::with_dimension(embedding.dimension)),
        "clip" => {
            let dir = embedding
                .model_dir
                .as_deref()
                .context("embedding.model_dir is required for the clip backend")?;
            Arc::new(
                ClipEncoderAdapter::load(Path::new(dir), embedding.use_gpu, embedding.max_tokens)
                    .with_context(|| format!("loading CLIP model from {}", dir))?,
            )
        }
        other => bail!("unknown embedding backend '{}'", other),
    };

    if encoder.dimension() != embedding.dimension {
        bail!(
            "encoder '{}' produces {}-D vectors but embedding.dimension is {}",
            encoder.model_id(),
            encoder.dimension(),
            embedding.dimension
        );
    }
    Ok(encoder)
}

/// Create the vector store selected by `storage.backend`.
///
/// An unreachable database is logged but does not fail startup; queries
/// degrade to empty results until it comes back.
pub async fn build_store(config: &Config) -> Result<Arc<dyn VectorStore>> {
    let storage = &config.storage;
    let store: Arc<dyn VectorStore> = match storage.backend.as_str() {
        "memory" => match storage.seed_path.as_deref() {
            Some(path) => Arc::new(
                InMemoryVectorStore::from_seed_file(Path::new(path))
                    .with_context(|| format!("loading seed file {}", path))?,
            ),
            None => {
                warn!(
                    target: "image_search_cli::bootstrap",
                    "Memory store has no seed_path; every query will return no results"
                );
                Arc::new(InMemoryVectorStore::new())
            }
        },
        "postgres" => {
            let store = PgVectorStore::connect(storage).context("configuring Postgres pool")?;
            if let Err(e) = store.health_check().await {
                warn!(
                    target: "image_search_cli::bootstrap",
                    error = %e,
                    "Database not reachable at startup; queries will return empty results"
                );
            }
            Arc::new(store)
        }
        other => bail!("unknown storage backend '{}'", other),
    };
    Ok(store)
}

pub async fn build_orchestrator(config: &Config) -> Result<QueryOrchestrator> {
    if config.uses_stubs() {
        info!(
            target: "image_search_cli::bootstrap",
            stub_encoder = config.embedding.backend == "stub",
            memory_store = config.storage.backend == "memory",
            "Stub backends in use"
        );
    }

    let encoder = build_encoder(config)?;
    let store = build_store(config).await?;
    Ok(QueryOrchestrator::new(encoder, store))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use image_search_core::types::Query;

    use super::*;

    #[tokio::test]
    async fn test_stub_and_seeded_memory_store() {
        let mut seed = tempfile::NamedTempFile::new().unwrap();
        write!(
            seed,
            r#"[{{"file_name": "a.jpg", "embedding": [1.0, 0.0, 0.0, 0.0]}},
               {{"file_name": "b.jpg", "embedding": [0.0, 1.0, 0.0, 0.0]}},
               {{"file_name": "c.jpg", "embedding": [0.7, 0.7, 0.0, 0.0]}}]"#
        )
        .unwrap();

        let mut config = Config::default();
        config.embedding.dimension = 4;
        config.storage.seed_path = Some(seed.path().display().to_string());

        let orchestrator = build_orchestrator(&config).await.unwrap();
        let response = orchestrator.search(&Query::exemplar("a.jpg")).await;
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].as_str(), "c.jpg");
    }

    #[tokio::test]
    async fn test_unreachable_postgres_does_not_fail_startup() {
        let mut config = Config::default();
        config.storage.backend = "postgres".into();
        config.storage.database_url = Some("postgres://nobody@127.0.0.1:1/none".into());
        config.storage.acquire_timeout_secs = 1;

        let orchestrator = build_orchestrator(&config).await.unwrap();
        let response = orchestrator.search(&Query::text("red car")).await;
        assert!(response.results.is_empty());
    }

    #[tokio::test]
    async fn test_missing_seed_file_fails_startup() {
        let mut config = Config::default();
        config.storage.seed_path = Some("/nonexistent/seed.json".into());
        assert!(build_store(&config).await.is_err());
    }

    #[test]
    fn test_clip_without_model_dir_fails() {
        let mut config = Config::default();
        config.embedding.backend = "clip".into();
        assert!(build_encoder(&config).is_err());
    }
}
