//! Per-collection index operations
//!
//! A `VectorIndex` binds a storage provider, a document source, and a
//! resolved collection name into one component. All pieces are injected at
//! construction and immutable afterwards, so an index is safe to share
//! behind `Arc` across tasks.

use std::sync::Arc;

use vindex_core::{
    Distance, Document, Point, Result, StorageError, DEFAULT_DIMENSION, DEFAULT_SEARCH_LIMIT,
};

use crate::{DocumentSource, StorageProvider};

/// One named collection of documents inside a vector store.
///
/// Lifecycle per collection: absent until the first [`rebuild_index`],
/// after which [`upsert`]/[`delete`]/[`get_similar_documents`] keep it
/// current. Only `rebuild_index` may be called against an absent
/// collection; every other operation surfaces the backend's
/// `CollectionNotFound` unmodified.
///
/// [`rebuild_index`]: VectorIndex::rebuild_index
/// [`upsert`]: VectorIndex::upsert
/// [`delete`]: VectorIndex::delete
/// [`get_similar_documents`]: VectorIndex::get_similar_documents
pub struct VectorIndex {
    name: String,
    provider: Arc<dyn StorageProvider>,
    source: Arc<dyn DocumentSource>,
    dimension: usize,
    distance: Distance,
}

impl VectorIndex {
    /// Create an index over a provider and a document source.
    ///
    /// The collection name is resolved once from `source.index_name()`;
    /// dimensionality defaults to 512 and the metric to cosine.
    pub fn new(provider: Arc<dyn StorageProvider>, source: Arc<dyn DocumentSource>) -> Self {
        let name = source.index_name().to_string();
        Self {
            name,
            provider,
            source,
            dimension: DEFAULT_DIMENSION,
            distance: Distance::Cosine,
        }
    }

    /// Override the vector dimensionality
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Override the distance metric
    pub fn with_distance(mut self, distance: Distance) -> Self {
        self.distance = distance;
        self
    }

    /// Collection name this index operates on
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured vector dimensionality
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Destructive full rebuild.
    ///
    /// Drops the collection (absence is not an error), recreates it with
    /// the configured dimension and metric, then upserts everything the
    /// document source currently returns. After success the collection
    /// contains exactly that set. No rollback is attempted on partial
    /// failure; retry with another full rebuild rather than repairing
    /// incrementally.
    pub async fn rebuild_index(&self) -> Result<()> {
        match self.provider.delete_collection(&self.name).await {
            Ok(()) => {}
            Err(StorageError::CollectionNotFound(_)) => {}
            Err(e) => return Err(e),
        }

        self.provider
            .create_collection(&self.name, self.dimension, self.distance)
            .await?;

        let documents = self.source.get_documents().await?;
        tracing::info!(
            "Rebuilding index '{}' with {} documents",
            self.name,
            documents.len()
        );

        self.upsert(documents).await
    }

    /// Write documents as store points, keyed by `embedding_pk`, in one
    /// batched call. Repeating with the same documents yields the same
    /// final state. Empty input is a no-op that issues no remote call.
    pub async fn upsert(&self, documents: impl IntoIterator<Item = Document> + Send) -> Result<()> {
        let points = documents
            .into_iter()
            .map(|document| {
                self.check_dimension(document.dimension())?;
                Ok(Point::from(document))
            })
            .collect::<Result<Vec<_>>>()?;

        if points.is_empty() {
            return Ok(());
        }

        tracing::debug!("Upserting {} points into '{}'", points.len(), self.name);
        self.provider.upsert(&self.name, points).await
    }

    /// Remove points by id. Deleting an absent id is not an error.
    pub async fn delete(&self, document_ids: &[String]) -> Result<()> {
        if document_ids.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            "Deleting {} points from '{}'",
            document_ids.len(),
            self.name
        );
        self.provider.delete(&self.name, document_ids).await
    }

    /// Return up to `limit` documents ranked closest first. Fewer than
    /// `limit` results is not an error. See [`get_similar_documents`] for
    /// an explicit cap; this uses the default of 5.
    ///
    /// [`get_similar_documents`]: VectorIndex::get_similar_documents
    pub async fn get_similar(&self, query_vector: &[f32]) -> Result<Vec<Document>> {
        self.get_similar_documents(query_vector, DEFAULT_SEARCH_LIMIT)
            .await
    }

    /// Similarity search with an explicit result cap.
    ///
    /// The query vector must match the configured dimensionality. Each
    /// result is reconstructed from the store's id/vector/payload triple.
    pub async fn get_similar_documents(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<Document>> {
        self.check_dimension(query_vector.len())?;

        let hits = self
            .provider
            .search(&self.name, query_vector, limit)
            .await?;
        tracing::debug!("Search in '{}' returned {} hits", self.name, hits.len());

        Ok(hits.into_iter().map(|hit| hit.into_document()).collect())
    }

    fn check_dimension(&self, actual: usize) -> Result<()> {
        if actual != self.dimension {
            return Err(StorageError::DimensionMismatch {
                expected: self.dimension,
                actual,
            });
        }
        Ok(())
    }
}
