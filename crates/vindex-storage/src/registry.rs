//! Backend registry
//!
//! Maps a backend name from configuration to a factory that builds the
//! provider. Populated at process start; looked up by name. This replaces
//! any runtime string-to-type resolution: an unknown name is a
//! configuration error, not a reflection failure.

use std::collections::HashMap;
use std::sync::Arc;

use vindex_core::{ProviderConfig, Result, StorageError, StorageSettings};

use crate::{MemoryProvider, QdrantProvider, StorageProvider};

type ProviderFactory =
    Box<dyn Fn(&ProviderConfig) -> Result<Arc<dyn StorageProvider>> + Send + Sync>;

/// Registry of storage backend factories
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// An empty registry with no backends
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry with the built-in backends: `qdrant` and `memory`
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("qdrant", |config| {
            Ok(Arc::new(QdrantProvider::new(config)?) as Arc<dyn StorageProvider>)
        });
        registry.register("memory", |_config| {
            Ok(Arc::new(MemoryProvider::new()) as Arc<dyn StorageProvider>)
        });
        registry
    }

    /// Register a factory under a backend name, replacing any previous one
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&ProviderConfig) -> Result<Arc<dyn StorageProvider>> + Send + Sync + 'static,
    ) {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Registered backend names
    pub fn backends(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Build a provider for a backend name
    pub fn build(&self, backend: &str, config: &ProviderConfig) -> Result<Arc<dyn StorageProvider>> {
        config.validate()?;

        let factory = self.factories.get(backend).ok_or_else(|| {
            StorageError::Configuration(format!("Unknown storage backend: {backend}"))
        })?;

        factory(config)
    }

    /// Build every provider named in the settings, keyed by provider name
    pub fn build_all(
        &self,
        settings: &StorageSettings,
    ) -> Result<HashMap<String, Arc<dyn StorageProvider>>> {
        settings
            .providers
            .iter()
            .map(|(name, entry)| {
                let provider = self.build(&entry.backend, &entry.config)?;
                Ok((name.clone(), provider))
            })
            .collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
