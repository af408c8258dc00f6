//! Index lifecycle tests against the in-memory backend
//!
//! Exercises the full rebuild/upsert/search/delete contract end to end
//! without an external vector database.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use vindex_core::{Document, Result, StorageError, DEFAULT_DIMENSION};
use vindex_storage::{DocumentSource, MemoryProvider, StorageProvider, VectorIndex};

/// A document source returning a fixed set, the way an application model
/// layer would hand over its current indexable objects.
struct ArticleSource {
    documents: Vec<Document>,
}

#[async_trait]
impl DocumentSource for ArticleSource {
    fn index_name(&self) -> &str {
        "Article"
    }

    async fn get_documents(&self) -> Result<Vec<Document>> {
        Ok(self.documents.clone())
    }
}

/// Unit vector along one axis, at the default 512 dimensionality
fn basis(axis: usize) -> Vec<f32> {
    let mut vector = vec![0.0; DEFAULT_DIMENSION];
    vector[axis] = 1.0;
    vector
}

fn two_articles() -> Vec<Document> {
    vec![
        Document::new("a1", basis(0)).with_metadata("title", "x"),
        Document::new("a2", basis(1)).with_metadata("title", "y"),
    ]
}

fn article_index(documents: Vec<Document>) -> (Arc<MemoryProvider>, VectorIndex) {
    let provider = Arc::new(MemoryProvider::new());
    let source = Arc::new(ArticleSource { documents });
    let index = VectorIndex::new(provider.clone(), source);
    (provider, index)
}

fn ids(documents: &[Document]) -> Vec<&str> {
    documents.iter().map(|d| d.embedding_pk.as_str()).collect()
}

#[tokio::test]
async fn test_rebuild_populates_exactly_the_source_documents() {
    let (provider, index) = article_index(two_articles());

    index.rebuild_index().await.unwrap();

    let mut stored = provider.point_ids("Article").unwrap();
    stored.sort_unstable();
    assert_eq!(stored, vec!["a1", "a2"]);

    let results = index.get_similar_documents(&basis(0), 1).await.unwrap();
    assert_eq!(ids(&results), vec!["a1"]);
}

#[tokio::test]
async fn test_rebuild_preserves_metadata_payload() {
    let (_provider, index) = article_index(two_articles());
    index.rebuild_index().await.unwrap();

    let results = index.get_similar_documents(&basis(0), 1).await.unwrap();
    assert_eq!(
        results[0].metadata.get("title"),
        Some(&serde_json::json!("x"))
    );
}

#[tokio::test]
async fn test_exact_match_recall() {
    let (_provider, index) = article_index(two_articles());
    index.rebuild_index().await.unwrap();

    // Searching with a stored document's exact vector must surface its key
    for document in two_articles() {
        let results = index
            .get_similar_documents(&document.vector, 5)
            .await
            .unwrap();
        assert!(ids(&results).contains(&document.embedding_pk.as_str()));
    }
}

#[tokio::test]
async fn test_rebuild_is_reproducible() {
    let (provider, index) = article_index(two_articles());

    index.rebuild_index().await.unwrap();
    let first: HashSet<String> = provider.point_ids("Article").unwrap().into_iter().collect();

    index.rebuild_index().await.unwrap();
    let second: HashSet<String> = provider.point_ids("Article").unwrap().into_iter().collect();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_rebuild_discards_stale_points() {
    let (provider, index) = article_index(two_articles());
    index.rebuild_index().await.unwrap();

    // A point that is no longer produced by the source must not survive
    index
        .upsert(vec![Document::new("stale", basis(7))])
        .await
        .unwrap();
    assert_eq!(provider.len("Article").unwrap(), 3);

    index.rebuild_index().await.unwrap();

    let mut stored = provider.point_ids("Article").unwrap();
    stored.sort_unstable();
    assert_eq!(stored, vec!["a1", "a2"]);
}

#[tokio::test]
async fn test_upsert_is_idempotent() {
    let (provider, index) = article_index(vec![]);
    index.rebuild_index().await.unwrap();

    let document = Document::new("a1", basis(0)).with_metadata("title", "x");
    index.upsert(vec![document.clone()]).await.unwrap();
    index.upsert(vec![document]).await.unwrap();

    assert_eq!(provider.len("Article").unwrap(), 1);
}

#[tokio::test]
async fn test_upsert_overwrites_by_key() {
    let (provider, index) = article_index(vec![]);
    index.rebuild_index().await.unwrap();

    index
        .upsert(vec![Document::new("a1", basis(0)).with_metadata("title", "old")])
        .await
        .unwrap();
    index
        .upsert(vec![Document::new("a1", basis(0)).with_metadata("title", "new")])
        .await
        .unwrap();

    assert_eq!(provider.len("Article").unwrap(), 1);
    let results = index.get_similar_documents(&basis(0), 1).await.unwrap();
    assert_eq!(
        results[0].metadata.get("title"),
        Some(&serde_json::json!("new"))
    );
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (provider, index) = article_index(two_articles());
    index.rebuild_index().await.unwrap();

    let targets = vec!["a1".to_string()];
    index.delete(&targets).await.unwrap();
    // Second delete of the same id must not error
    index.delete(&targets).await.unwrap();

    assert_eq!(provider.point_ids("Article").unwrap(), vec!["a2"]);
}

#[tokio::test]
async fn test_delete_then_search_excludes_removed_document() {
    let (_provider, index) = article_index(two_articles());
    index.rebuild_index().await.unwrap();

    index.delete(&["a1".to_string()]).await.unwrap();

    let results = index.get_similar_documents(&basis(0), 2).await.unwrap();
    assert_eq!(ids(&results), vec!["a2"]);
}

#[tokio::test]
async fn test_search_limit_caps_results() {
    let documents: Vec<Document> = (0..8)
        .map(|i| Document::new(format!("a{i}"), basis(i)))
        .collect();
    let (_provider, index) = article_index(documents.clone());
    index.rebuild_index().await.unwrap();

    let source_ids: HashSet<&str> = ids(&documents).into_iter().collect();
    for limit in [1, 3, 5] {
        let results = index.get_similar_documents(&basis(0), limit).await.unwrap();
        assert!(results.len() <= limit);
        // Every hit must come from the rebuilt membership
        for result in &results {
            assert!(source_ids.contains(result.embedding_pk.as_str()));
        }
    }
}

#[tokio::test]
async fn test_search_smaller_collection_than_limit() {
    let (_provider, index) = article_index(two_articles());
    index.rebuild_index().await.unwrap();

    let results = index.get_similar_documents(&basis(0), 50).await.unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_default_limit_is_five() {
    let documents: Vec<Document> = (0..8)
        .map(|i| Document::new(format!("a{i}"), basis(i)))
        .collect();
    let (_provider, index) = article_index(documents);
    index.rebuild_index().await.unwrap();

    let results = index.get_similar(&basis(0)).await.unwrap();
    assert_eq!(results.len(), 5);
}

#[tokio::test]
async fn test_operations_against_absent_collection_surface_not_found() {
    let (_provider, index) = article_index(two_articles());

    let upsert = index.upsert(two_articles()).await;
    assert!(matches!(upsert, Err(StorageError::CollectionNotFound(_))));

    let delete = index.delete(&["a1".to_string()]).await;
    assert!(matches!(delete, Err(StorageError::CollectionNotFound(_))));

    let search = index.get_similar(&basis(0)).await;
    assert!(matches!(search, Err(StorageError::CollectionNotFound(_))));
}

#[tokio::test]
async fn test_rebuild_from_absent_state() {
    // rebuild_index is the one operation valid from ABSENT; the missing
    // collection during its delete step must be swallowed.
    let (provider, index) = article_index(two_articles());
    index.rebuild_index().await.unwrap();
    assert_eq!(provider.len("Article").unwrap(), 2);
}

#[tokio::test]
async fn test_provider_rebuild_indexes_is_idempotent() {
    let provider = Arc::new(MemoryProvider::new());
    provider.rebuild_indexes().await.unwrap();
    provider.rebuild_indexes().await.unwrap();
}

#[tokio::test]
async fn test_failing_source_aborts_rebuild() {
    struct FailingSource;

    #[async_trait]
    impl DocumentSource for FailingSource {
        fn index_name(&self) -> &str {
            "Article"
        }

        async fn get_documents(&self) -> Result<Vec<Document>> {
            Err(StorageError::Backend("source offline".to_string()))
        }
    }

    let provider = Arc::new(MemoryProvider::new());
    let index = VectorIndex::new(provider.clone(), Arc::new(FailingSource));

    assert!(index.rebuild_index().await.is_err());
    // The collection was already recreated; the failure leaves it empty
    // rather than rolling back, per the rebuild contract.
    assert!(provider.is_empty("Article").unwrap());
}
