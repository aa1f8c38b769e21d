//! Configuration management for the image search system.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Environment variable naming the database URL, honoured when
/// `storage.database_url` is not set by any other source.
pub const LEGACY_DB_URL_VAR: &str = "DB_URL";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in order:
    /// 1. config/default.toml (base settings)
    /// 2. config/{IMAGE_SEARCH_ENV}.toml (environment-specific)
    /// 3. Environment variables with IMAGE_SEARCH__ prefix
    ///    (e.g. `IMAGE_SEARCH__STORAGE__DATABASE_URL`)
    /// 4. `DB_URL` if no database URL was set above
    pub fn load() -> CoreResult<Self> {
        let env = std::env::var("IMAGE_SEARCH_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("IMAGE_SEARCH").separator("__"));

        let mut config: Config = builder.build()?.try_deserialize()?;
        config.apply_legacy_db_url();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut config: Config = toml::from_str(&content)
            .map_err(|e| CoreError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.apply_legacy_db_url();
        config.validate()?;
        Ok(config)
    }

    fn apply_legacy_db_url(&mut self) {
        if self.storage.database_url.is_none() {
            if let Ok(url) = std::env::var(LEGACY_DB_URL_VAR) {
                if !url.trim().is_empty() {
                    self.storage.database_url = Some(url);
                }
            }
        }
    }

    /// True if either collaborator runs on a stub backend.
    pub fn uses_stubs(&self) -> bool {
        self.embedding.backend == "stub" || self.storage.backend == "memory"
    }

    /// Validate configuration values.
    pub fn validate(&self) -> CoreResult<()> {
        self.logging.validate()?;
        self.embedding.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// "pretty", "compact" or "full".
    pub format: String,
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            include_location: false,
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> CoreResult<()> {
        match self.format.as_str() {
            "pretty" | "compact" | "full" => Ok(()),
            other => Err(CoreError::ConfigError(format!(
                "logging.format must be one of pretty, compact, full (got '{}')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// "stub" or "clip".
    pub backend: String,
    /// Directory holding config.json, tokenizer.json and model.safetensors.
    pub model_dir: Option<String>,
    /// Expected output dimension; must match the stored corpus.
    pub dimension: usize,
    /// CLIP truncation limit in tokens, clamped to the model context window.
    pub max_tokens: usize,
    /// Prefer CUDA device 0 when available.
    pub use_gpu: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: "stub".to_string(),
            model_dir: None,
            dimension: 512,
            max_tokens: 77,
            use_gpu: false,
        }
    }
}

impl EmbeddingConfig {
    fn validate(&self) -> CoreResult<()> {
        if self.dimension == 0 {
            return Err(CoreError::ConfigError(
                "embedding.dimension must be greater than 0".into(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(CoreError::ConfigError(
                "embedding.max_tokens must be greater than 0".into(),
            ));
        }

        match self.backend.as_str() {
            "stub" => Ok(()),
            "clip" => {
                let dir = self.model_dir.as_deref().ok_or_else(|| {
                    CoreError::ConfigError("embedding.model_dir is required for the clip backend".into())
                })?;
                let path = PathBuf::from(dir);
                if !path.is_dir() {
                    return Err(CoreError::ConfigError(format!(
                        "embedding.model_dir does not exist: {}",
                        path.display()
                    )));
                }
                Ok(())
            }
            other => Err(CoreError::ConfigError(format!(
                "embedding.backend must be 'stub' or 'clip' (got '{}')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// "memory" or "postgres".
    pub backend: String,
    /// Postgres connection URL (pgvector extension required).
    pub database_url: Option<String>,
    /// Table holding `(file_name, embedding)` rows.
    pub table: String,
    pub max_connections: u32,
    /// Upper bound on waiting for a pooled connection.
    pub acquire_timeout_secs: u64,
    /// JSON seed file for the memory backend.
    pub seed_path: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            database_url: None,
            table: "image_embeddings".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 10,
            seed_path: None,
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> CoreResult<()> {
        if !is_sql_identifier(&self.table) {
            return Err(CoreError::ConfigError(format!(
                "storage.table must be a plain SQL identifier (got '{}')",
                self.table
            )));
        }
        if self.max_connections == 0 {
            return Err(CoreError::ConfigError(
                "storage.max_connections must be greater than 0".into(),
            ));
        }

        match self.backend.as_str() {
            "memory" => Ok(()),
            "postgres" => match self.database_url.as_deref() {
                Some(url) if !url.trim().is_empty() => Ok(()),
                _ => Err(CoreError::ConfigError(format!(
                    "storage.database_url (or {}) is required for the postgres backend",
                    LEGACY_DB_URL_VAR
                ))),
            },
            other => Err(CoreError::ConfigError(format!(
                "storage.backend must be 'memory' or 'postgres' (got '{}')",
                other
            ))),
        }
    }
}

/// True for `[A-Za-z_][A-Za-z0-9_]*`, at most 63 bytes (Postgres NAMEDATALEN - 1).
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
