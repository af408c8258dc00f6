//! Vindex Core - Domain types and shared abstractions
//!
//! This crate defines the types shared by every storage backend:
//! - The `Document` value type (embedding key, vector, metadata payload)
//! - The store-side `Point` / `ScoredPoint` wire representations
//! - The `Distance` metric used to rank similarity
//! - Common error types
//! - Provider configuration

pub mod config;

pub use config::{ProviderConfig, ProviderSettings, StorageSettings};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors reported by storage providers and index operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Malformed or missing provider configuration. Raised at construction
    /// and fatal to that provider instance.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An operation targeted a collection absent from the store.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Transport or connectivity failure from the underlying client.
    /// Propagated unmodified; retry policy belongs to the transport layer.
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A vector's length does not match the collection's configured size.
    /// Vectors are never truncated or padded to fit.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Any other store-reported failure, passed through as-is.
    #[error("Backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// Constants
// ============================================================================

/// Default vector dimensionality for collections
pub const DEFAULT_DIMENSION: usize = 512;

/// Default result cap for similarity search
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

// ============================================================================
// Distance Metric
// ============================================================================

/// Distance metric used to rank similarity between vectors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    #[default]
    Cosine,
    Euclidean,
    Dot,
}

impl std::fmt::Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cosine => write!(f, "cosine"),
            Self::Euclidean => write!(f, "euclidean"),
            Self::Dot => write!(f, "dot"),
        }
    }
}

impl std::str::FromStr for Distance {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "euclidean" => Ok(Self::Euclidean),
            "dot" => Ok(Self::Dot),
            _ => Err(StorageError::Configuration(format!(
                "Unknown distance metric: {s}"
            ))),
        }
    }
}

// ============================================================================
// Document Model
// ============================================================================

/// One embedded unit: a stable key, its vector, and a metadata payload.
///
/// `embedding_pk` plus the collection name uniquely identifies a stored
/// point; re-upserting the same key overwrites, never duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier, unique within its collection
    pub embedding_pk: String,

    /// Embedding vector; length must equal the collection's dimensionality
    pub vector: Vec<f32>,

    /// Arbitrary payload stored alongside the vector
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Document {
    /// Create a document with an empty payload
    pub fn new(embedding_pk: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            embedding_pk: embedding_pk.into(),
            vector,
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata entry
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Vector length
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

// ============================================================================
// Wire Representation
// ============================================================================

/// Store-side record: id, vector, and payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub payload: HashMap<String, serde_json::Value>,
}

impl From<Document> for Point {
    fn from(document: Document) -> Self {
        Self {
            id: document.embedding_pk,
            vector: document.vector,
            payload: document.metadata,
        }
    }
}

impl From<Point> for Document {
    fn from(point: Point) -> Self {
        Self {
            embedding_pk: point.id,
            vector: point.vector,
            metadata: point.payload,
        }
    }
}

/// A point plus the backend's similarity score (higher is closer)
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    pub point: Point,
    pub score: f32,
}

impl ScoredPoint {
    /// Reconstruct the document form of this search hit
    pub fn into_document(self) -> Document {
        self.point.into()
    }
}

// ============================================================================
// Tests
// ============================================================================
