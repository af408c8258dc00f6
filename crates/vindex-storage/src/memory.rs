//! In-memory provider
//!
//! A zero-dependency backend holding collections in a `RwLock`ed map.
//! Implements exact scoring for all three metrics, so the whole test
//! suite (and any embedded deployment small enough to fit in RAM) can
//! run without a vector database.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use vindex_core::{Distance, Point, Result, ScoredPoint, StorageError};

use crate::{StorageProvider, VectorClient};

/// In-memory vector store.
///
/// Data lives for the lifetime of the provider; there is no persistence.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    collections: RwLock<HashMap<String, Collection>>,
}

#[derive(Debug)]
struct Collection {
    dimension: usize,
    distance: Distance,
    points: HashMap<String, Point>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points currently stored in a collection
    pub fn len(&self, name: &str) -> Result<usize> {
        let collections = self.read_collections()?;
        let collection = collections
            .get(name)
            .ok_or_else(|| StorageError::CollectionNotFound(name.to_string()))?;
        Ok(collection.points.len())
    }

    /// Whether a collection holds no points
    pub fn is_empty(&self, name: &str) -> Result<bool> {
        Ok(self.len(name)? == 0)
    }

    /// Ids of all points in a collection, unordered
    pub fn point_ids(&self, name: &str) -> Result<Vec<String>> {
        let collections = self.read_collections()?;
        let collection = collections
            .get(name)
            .ok_or_else(|| StorageError::CollectionNotFound(name.to_string()))?;
        Ok(collection.points.keys().cloned().collect())
    }

    fn read_collections(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Collection>>> {
        self.collections
            .read()
            .map_err(|_| StorageError::Backend("collection lock poisoned".to_string()))
    }

    fn write_collections(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, Collection>>> {
        self.collections
            .write()
            .map_err(|_| StorageError::Backend("collection lock poisoned".to_string()))
    }
}

/// Score a candidate against the query; higher is closer for all metrics.
fn score(distance: Distance, query: &[f32], candidate: &[f32]) -> f32 {
    match distance {
        Distance::Cosine => cosine_similarity(query, candidate),
        Distance::Dot => dot(query, candidate),
        // Map distance into (0, 1] so ranking stays highest-first
        Distance::Euclidean => 1.0 / (1.0 + euclidean(query, candidate)),
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = dot(a, a).sqrt();
    let norm_b = dot(b, b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}

fn euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[async_trait]
impl VectorClient for MemoryProvider {
    async fn create_collection(
        &self,
        name: &str,
        vector_size: usize,
        distance: Distance,
    ) -> Result<()> {
        let mut collections = self.write_collections()?;
        if collections.contains_key(name) {
            return Err(StorageError::Backend(format!(
                "Collection '{name}' already exists"
            )));
        }

        collections.insert(
            name.to_string(),
            Collection {
                dimension: vector_size,
                distance,
                points: HashMap::new(),
            },
        );
        tracing::info!("Created in-memory collection '{name}' (dim={vector_size})");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.write_collections()?;
        if collections.remove(name).is_some() {
            tracing::info!("Dropped in-memory collection '{name}'");
        }
        Ok(())
    }

    async fn upsert(&self, name: &str, points: Vec<Point>) -> Result<()> {
        let mut collections = self.write_collections()?;
        let collection = collections
            .get_mut(name)
            .ok_or_else(|| StorageError::CollectionNotFound(name.to_string()))?;

        for point in &points {
            if point.vector.len() != collection.dimension {
                return Err(StorageError::DimensionMismatch {
                    expected: collection.dimension,
                    actual: point.vector.len(),
                });
            }
        }

        for point in points {
            collection.points.insert(point.id.clone(), point);
        }
        Ok(())
    }

    async fn delete(&self, name: &str, ids: &[String]) -> Result<()> {
        let mut collections = self.write_collections()?;
        let collection = collections
            .get_mut(name)
            .ok_or_else(|| StorageError::CollectionNotFound(name.to_string()))?;

        for id in ids {
            collection.points.remove(id);
        }
        Ok(())
    }

    async fn search(
        &self,
        name: &str,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let collections = self.read_collections()?;
        let collection = collections
            .get(name)
            .ok_or_else(|| StorageError::CollectionNotFound(name.to_string()))?;

        if query_vector.len() != collection.dimension {
            return Err(StorageError::DimensionMismatch {
                expected: collection.dimension,
                actual: query_vector.len(),
            });
        }

        let mut hits: Vec<ScoredPoint> = collection
            .points
            .values()
            .map(|point| ScoredPoint {
                point: point.clone(),
                score: score(collection.distance, query_vector, &point.vector),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }
}

impl StorageProvider for MemoryProvider {}
