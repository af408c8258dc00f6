//! Provider Configuration
//!
//! Handles configuration from environment variables and TOML files with
//! sensible defaults for development. The host application hands each
//! provider an untyped mapping `{HOST, API_KEY?, ...}`; parsing it into a
//! typed `ProviderConfig` happens once, at provider construction.

use crate::{Distance, Result, StorageError, DEFAULT_DIMENSION};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration for one storage provider instance.
///
/// Constructed once at provider initialization; immutable thereafter.
/// Uppercase aliases match the key names used by host-side settings maps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Connection endpoint (required)
    #[serde(alias = "HOST")]
    pub host: String,

    /// Optional credential; absence means no auth
    #[serde(default, alias = "API_KEY")]
    pub api_key: Option<String>,

    /// Vector dimensionality for collections created by this provider
    #[serde(default = "default_dimension", alias = "DIMENSION")]
    pub dimension: usize,

    /// Distance metric for collections created by this provider
    #[serde(default, alias = "DISTANCE")]
    pub distance: Distance,
}

fn default_dimension() -> usize {
    DEFAULT_DIMENSION
}

impl ProviderConfig {
    /// Create a config for an unauthenticated endpoint
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: None,
            dimension: DEFAULT_DIMENSION,
            distance: Distance::Cosine,
        }
    }

    /// Set the credential
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the vector dimensionality
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the distance metric
    pub fn with_distance(mut self, distance: Distance) -> Self {
        self.distance = distance;
        self
    }

    /// Parse from an untyped configuration mapping.
    ///
    /// Fails with `StorageError::Configuration` if required fields are
    /// missing or malformed.
    pub fn from_map(map: &HashMap<String, serde_json::Value>) -> Result<Self> {
        let value = serde_json::to_value(map)
            .map_err(|e| StorageError::Configuration(format!("Invalid provider config: {e}")))?;

        let config: Self = serde_json::from_value(value)
            .map_err(|e| StorageError::Configuration(format!("Invalid provider config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(StorageError::Configuration(
                "HOST must not be empty".to_string(),
            ));
        }
        if self.dimension == 0 {
            return Err(StorageError::Configuration(
                "DIMENSION must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// One named provider entry: which backend, and its config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Backend name looked up in the provider registry (e.g. "qdrant")
    #[serde(alias = "BACKEND", alias = "CLASS")]
    pub backend: String,

    /// Backend-specific connection configuration
    #[serde(alias = "CONFIG")]
    pub config: ProviderConfig,
}

/// Full storage configuration: a mapping from provider name to its settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub providers: HashMap<String, ProviderSettings>,
}

impl StorageSettings {
    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            StorageError::Configuration(format!("Failed to read {}: {e}", path.display()))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)
            .map_err(|e| StorageError::Configuration(format!("Failed to parse config: {e}")))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Build a single-provider configuration from environment variables.
    ///
    /// Reads `VINDEX_HOST` (required), `VINDEX_BACKEND` (default "qdrant"),
    /// `VINDEX_API_KEY`, `VINDEX_DIMENSION`, and `VINDEX_DISTANCE`, and
    /// registers the result under the provider name "default".
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("VINDEX_HOST").map_err(|_| {
            StorageError::Configuration("Missing required configuration: VINDEX_HOST".to_string())
        })?;

        let mut config = ProviderConfig::new(host);

        if let Ok(key) = std::env::var("VINDEX_API_KEY") {
            config.api_key = Some(key);
        }
        if let Ok(dimension) = std::env::var("VINDEX_DIMENSION") {
            config.dimension = dimension.parse().map_err(|_| {
                StorageError::Configuration(format!(
                    "Invalid value for VINDEX_DIMENSION: {dimension}"
                ))
            })?;
        }
        if let Ok(distance) = std::env::var("VINDEX_DISTANCE") {
            config.distance = distance.parse()?;
        }
        config.validate()?;

        let backend = std::env::var("VINDEX_BACKEND").unwrap_or_else(|_| "qdrant".to_string());

        let mut providers = HashMap::new();
        providers.insert("default".to_string(), ProviderSettings { backend, config });

        Ok(Self { providers })
    }

    /// Look up one provider's settings by name
    pub fn get(&self, name: &str) -> Option<&ProviderSettings> {
        self.providers.get(name)
    }

    /// Validate every provider entry
    pub fn validate(&self) -> Result<()> {
        for (name, settings) in &self.providers {
            if settings.backend.trim().is_empty() {
                return Err(StorageError::Configuration(format!(
                    "Provider '{name}' has an empty backend name"
                )));
            }
            settings.config.validate()?;
        }
        Ok(())
    }
}
