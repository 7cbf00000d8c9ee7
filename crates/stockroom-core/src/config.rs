//! Configuration for stockroom-core
//!
//! Selects the storage backend and where it keeps its data, and whether an
//! empty catalog is seeded with demo records on first run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::store::{ItemStore, JsonFileStore, MemoryItemStore, DEFAULT_RECORD_KEY};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Seed demo items when the catalog is empty at startup
    pub seed_demo_data: bool,
    /// Where and how the collection is persisted
    pub storage: StorageConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            seed_demo_data: true,
            storage: StorageConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON document on disk
    #[default]
    Json,
    /// One record in a SQLite database (requires the `sqlite` feature)
    Sqlite,
    /// Nothing persisted beyond the process
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// File to store into; defaults to a file under [`default_data_dir`]
    pub path: Option<PathBuf>,
    /// Record name used by the SQLite backend
    pub record_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Json,
            path: None,
            record_key: DEFAULT_RECORD_KEY.to_string(),
        }
    }
}

impl StorageConfig {
    /// The configured path, or the backend's default file in the data dir.
    pub fn resolved_path(&self) -> PathBuf {
        match self.path {
            Some(ref p) => p.clone(),
            None => {
                let file = match self.backend {
                    StorageBackend::Sqlite => "catalog.db",
                    _ => "catalog.json",
                };
                default_data_dir().join(file)
            }
        }
    }
}

/// Platform data directory for stockroom, e.g. `~/.local/share/stockroom`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stockroom")
}

impl CatalogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`CatalogConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.record_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.record_key must not be empty".to_string(),
            ));
        }

        if let Some(ref path) = self.storage.path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(
                    "storage.path must not be empty when set".to_string(),
                ));
            }
        }

        if self.storage.backend == StorageBackend::Sqlite && !cfg!(feature = "sqlite") {
            return Err(ConfigError::Invalid(
                "sqlite backend requires the `sqlite` feature".to_string(),
            ));
        }

        Ok(())
    }

    /// Construct the configured store.
    pub fn open_store(&self) -> Result<Box<dyn ItemStore>, ConfigError> {
        self.validate()?;
        let store: Box<dyn ItemStore> = match self.storage.backend {
            StorageBackend::Json => Box::new(JsonFileStore::new(self.storage.resolved_path())),
            StorageBackend::Memory => Box::new(MemoryItemStore::new()),
            StorageBackend::Sqlite => self.open_sqlite()?,
        };
        Ok(store)
    }

    #[cfg(feature = "sqlite")]
    fn open_sqlite(&self) -> Result<Box<dyn ItemStore>, ConfigError> {
        let path = self.storage.resolved_path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let store = crate::store::SqliteItemStore::open(&path)?
            .with_record_key(self.storage.record_key.clone());
        Ok(Box::new(store))
    }

    #[cfg(not(feature = "sqlite"))]
    fn open_sqlite(&self) -> Result<Box<dyn ItemStore>, ConfigError> {
        Err(ConfigError::Invalid(
            "sqlite backend requires the `sqlite` feature".to_string(),
        ))
    }
}
