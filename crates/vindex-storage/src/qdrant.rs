//! Qdrant implementation for vector storage
//!
//! Provides connection management and collection-level operations over
//! the Qdrant gRPC client. The provider owns the client exclusively;
//! indexes reach it through the `VectorClient` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::vectors_output::VectorsOptions;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, DeletePointsBuilder, Distance as QdrantDistance, PointStruct,
    PointsIdsList, ScoredPoint as QdrantScoredPoint, SearchPointsBuilder, UpsertPointsBuilder,
    Value, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use vindex_core::{Distance, Point, ProviderConfig, Result, ScoredPoint, StorageError};

use crate::{StorageProvider, VectorClient};

/// Qdrant-backed storage provider
pub struct QdrantProvider {
    client: Qdrant,
}

impl std::fmt::Debug for QdrantProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantProvider").finish_non_exhaustive()
    }
}

impl QdrantProvider {
    /// Connect to the endpoint described by `config`.
    ///
    /// Fails with `StorageError::Configuration` when the URL is malformed;
    /// connectivity itself is only exercised by the first operation.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Qdrant::from_url(&config.host)
            .api_key(config.api_key.clone())
            .build()
            .map_err(|e| {
                StorageError::Configuration(format!("Qdrant connection failed: {e}"))
            })?;

        Ok(Self { client })
    }
}

fn to_qdrant_distance(distance: Distance) -> QdrantDistance {
    match distance {
        Distance::Cosine => QdrantDistance::Cosine,
        Distance::Euclidean => QdrantDistance::Euclid,
        Distance::Dot => QdrantDistance::Dot,
    }
}

/// Sort a store-reported failure into the error taxonomy.
///
/// Qdrant reports a missing collection inside the status message, so
/// classification is by message content; anything unrecognized passes
/// through unmodified as a backend error.
fn classify(collection: &str, message: String) -> StorageError {
    let lower = message.to_lowercase();
    // Only collection-level absence maps to CollectionNotFound; a
    // point-level "not found" stays a plain backend error.
    if lower.contains("collection")
        && (lower.contains("doesn't exist") || lower.contains("not found"))
    {
        StorageError::CollectionNotFound(collection.to_string())
    } else if lower.contains("unavailable")
        || lower.contains("connection")
        || lower.contains("timeout")
        || lower.contains("transport")
    {
        StorageError::BackendUnavailable(message)
    } else {
        StorageError::Backend(message)
    }
}

fn to_point_struct(point: Point) -> PointStruct {
    let payload: HashMap<String, Value> = point
        .payload
        .into_iter()
        .map(|(k, v)| (k, v.into()))
        .collect();

    PointStruct::new(point.id, point.vector, payload)
}

/// Rebuild the client-side view of one search hit.
///
/// Documents round-trip through the store as id/vector/payload triples;
/// a hit missing its id or carrying anything but a plain vector cannot be
/// reconstructed and is surfaced as a backend error rather than returned
/// with a truncated vector.
fn to_scored_point(collection: &str, hit: QdrantScoredPoint) -> Result<ScoredPoint> {
    let id = match hit.id.and_then(|p| p.point_id_options) {
        Some(PointIdOptions::Uuid(uuid)) => uuid,
        Some(PointIdOptions::Num(num)) => num.to_string(),
        None => {
            return Err(StorageError::Backend(format!(
                "Search hit from '{collection}' is missing its point id"
            )))
        }
    };

    let vector = match hit.vectors.and_then(|v| v.vectors_options) {
        Some(VectorsOptions::Vector(vector)) => vector.data,
        _ => {
            return Err(StorageError::Backend(format!(
                "Search hit '{id}' from '{collection}' carries no plain vector"
            )))
        }
    };

    let payload = hit
        .payload
        .into_iter()
        .map(|(k, v)| (k, value_to_json(v)))
        .collect();

    Ok(ScoredPoint {
        point: Point {
            id,
            vector,
            payload,
        },
        score: hit.score,
    })
}

fn value_to_json(value: Value) -> serde_json::Value {
    match value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(i),
        Some(Kind::DoubleValue(d)) => serde_json::Value::from(d),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.into_iter().map(value_to_json).collect())
        }
        Some(Kind::StructValue(fields)) => serde_json::Value::Object(
            fields
                .fields
                .into_iter()
                .map(|(k, v)| (k, value_to_json(v)))
                .collect(),
        ),
    }
}

#[async_trait]
impl VectorClient for QdrantProvider {
    async fn create_collection(
        &self,
        name: &str,
        vector_size: usize,
        distance: Distance,
    ) -> Result<()> {
        self.client
            .create_collection(
                CreateCollectionBuilder::new(name).vectors_config(VectorParamsBuilder::new(
                    vector_size as u64,
                    to_qdrant_distance(distance),
                )),
            )
            .await
            .map_err(|e| classify(name, format!("Failed to create collection: {e}")))?;

        tracing::info!("Created Qdrant collection '{name}' (dim={vector_size})");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        match self.client.delete_collection(name).await {
            Ok(_) => {
                tracing::info!("Dropped Qdrant collection '{name}'");
                Ok(())
            }
            // The contract is drop-if-exists; absence is not a failure.
            Err(e) => match classify(name, e.to_string()) {
                StorageError::CollectionNotFound(_) => Ok(()),
                other => Err(other),
            },
        }
    }

    async fn upsert(&self, name: &str, points: Vec<Point>) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = points.into_iter().map(to_point_struct).collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(name, points))
            .await
            .map_err(|e| classify(name, format!("Failed to upsert points: {e}")))?;

        Ok(())
    }

    async fn delete(&self, name: &str, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let ids = PointsIdsList {
            ids: ids.iter().map(|id| id.clone().into()).collect(),
        };

        self.client
            .delete_points(DeletePointsBuilder::new(name).points(ids))
            .await
            .map_err(|e| classify(name, format!("Failed to delete points: {e}")))?;

        Ok(())
    }

    async fn search(
        &self,
        name: &str,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(name, query_vector.to_vec(), limit as u64)
                    .with_payload(true)
                    .with_vectors(true),
            )
            .await
            .map_err(|e| classify(name, format!("Vector search failed: {e}")))?;

        response
            .result
            .into_iter()
            .map(|hit| to_scored_point(name, hit))
            .collect()
    }
}

#[async_trait]
impl StorageProvider for QdrantProvider {
    /// Intentional no-op: rebuild is delegated entirely to each index's
    /// own `rebuild_index`.
    async fn rebuild_indexes(&self) -> Result<()> {
        Ok(())
    }
}
