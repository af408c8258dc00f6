//! Vindex Storage - Vector database abstraction
//!
//! Provides abstraction over vector databases (Qdrant, in-memory)
//! for storing and searching document embeddings.
//!
//! Two layers compose: a [`StorageProvider`] owns the connection to one
//! vector-store deployment and exposes the wire-level [`VectorClient`]
//! operations; a [`VectorIndex`] represents one named collection inside
//! that store and translates generic index operations (rebuild, upsert,
//! delete, similarity search) into collection-scoped client calls.

use async_trait::async_trait;
use vindex_core::{Distance, Document, Point, Result, ScoredPoint};

pub mod index;
pub mod memory;
pub mod qdrant;
pub mod registry;

pub use index::VectorIndex;
pub use memory::MemoryProvider;
pub use qdrant::QdrantProvider;
pub use registry::ProviderRegistry;

// ============================================================================
// Traits
// ============================================================================

/// Wire-level operations every vector-store client must support.
///
/// Concurrent use of one client from multiple tasks is safe only if the
/// underlying transport is; implementations hold no mutable per-call state.
#[async_trait]
pub trait VectorClient: Send + Sync {
    /// Create a collection configured with the given vector size and metric
    async fn create_collection(
        &self,
        name: &str,
        vector_size: usize,
        distance: Distance,
    ) -> Result<()>;

    /// Drop a collection. Must succeed (or no-op) even if it does not exist.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Write a batch of points, keyed by id. Existing ids are overwritten.
    async fn upsert(&self, name: &str, points: Vec<Point>) -> Result<()>;

    /// Remove points by id. Absent ids are ignored.
    async fn delete(&self, name: &str, ids: &[String]) -> Result<()>;

    /// Return up to `limit` points ranked closest first under the
    /// collection's distance metric.
    async fn search(
        &self,
        name: &str,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>>;
}

/// A connection to one vector-store deployment.
///
/// The provider exclusively owns the underlying client; indexes borrow it
/// through this trait for their collection-scoped operations.
#[async_trait]
pub trait StorageProvider: VectorClient + std::fmt::Debug {
    /// Rebuild every index this provider manages.
    ///
    /// Policy is pluggable: a backend may rebuild centrally, or defer
    /// entirely to each index's own `rebuild_index` and leave this as the
    /// default no-op. Either way the call must be idempotent.
    async fn rebuild_indexes(&self) -> Result<()> {
        Ok(())
    }
}

/// The external collaborator an index is built over: the entity type that
/// knows its own collection name and can produce the full current set of
/// documents that should exist in a rebuilt index.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Collection name for this source. Must be deterministic and stable
    /// across process restarts so rebuilt collections keep their identity.
    fn index_name(&self) -> &str;

    /// The full, current document set for this index
    async fn get_documents(&self) -> Result<Vec<Document>>;
}
