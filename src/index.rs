//! Brute-force nearest-neighbor retrieval index.
//!
//! Exact squared-L2 scan over document embeddings. Catalog sizes are in
//! the thousands, so exactness beats approximate indexing here; L2 on
//! normalized sentence embeddings approximates cosine similarity.
//!
//! The index is built once at startup and read-only afterwards. Queries
//! against an unbuilt index, or while a rebuild is in flight, are rejected
//! with [`CoreError::IndexNotReady`] instead of racing. The lock is never
//! held across an await point.

use anyhow::anyhow;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::{CatalogDocument, CatalogEntry, VendorRecord};
use crate::error::{CoreError, CoreResult};
use crate::services::Embedder;

/// One retrieval result: document, its vendor metadata, and the raw
/// squared-L2 distance to the query.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub document: CatalogDocument,
    pub vendor: VendorRecord,
    pub distance: f32,
}

enum State {
    Unbuilt,
    /// A rebuild is in flight; the old contents are gone and queries are
    /// rejected until the new contents land.
    Building,
    Ready(Inner),
}

struct Inner {
    entries: Vec<CatalogEntry>,
    vectors: Vec<Vec<f32>>,
    dimension: usize,
}

/// Handle to the catalog retrieval index. Safe for unlimited concurrent
/// readers once built.
pub struct RetrievalIndex {
    state: RwLock<State>,
}

impl RetrievalIndex {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::Unbuilt),
        }
    }

    /// Embed and index a catalog. Blocking and non-reentrant: a build
    /// already in flight rejects a second one.
    pub async fn build<E: Embedder + ?Sized>(
        &self,
        embedder: &E,
        entries: Vec<CatalogEntry>,
    ) -> CoreResult<usize> {
        if entries.is_empty() {
            return Err(CoreError::EmptyCatalog);
        }

        {
            let mut state = self.state.write();
            if matches!(*state, State::Building) {
                return Err(CoreError::Internal(anyhow!(
                    "Index rebuild already in progress"
                )));
            }
            *state = State::Building;
        }

        let texts: Vec<String> = entries.iter().map(|e| e.document.text.clone()).collect();
        let vectors = match embedder.embed_batch(&texts).await {
            Ok(v) => v,
            Err(e) => {
                *self.state.write() = State::Unbuilt;
                return Err(e);
            }
        };

        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        if dimension == 0 || vectors.iter().any(|v| v.len() != dimension) {
            *self.state.write() = State::Unbuilt;
            return Err(CoreError::Internal(anyhow!(
                "Embedding service returned inconsistent dimensionality"
            )));
        }

        let count = entries.len();
        *self.state.write() = State::Ready(Inner {
            entries,
            vectors,
            dimension,
        });

        info!(documents = count, dimension = dimension, "Retrieval index built");
        Ok(count)
    }

    /// Return the `k` nearest documents to the query text by ascending
    /// squared-L2 distance. `k` is clamped to the catalog size; ties keep
    /// original insertion order.
    pub async fn search<E: Embedder + ?Sized>(
        &self,
        embedder: &E,
        query: &str,
        k: usize,
    ) -> CoreResult<Vec<SearchHit>> {
        // Fail fast before paying for an embedding call.
        if !self.is_ready() {
            return Err(CoreError::IndexNotReady);
        }

        let query_vector = embedder.embed(query).await?;

        let state = self.state.read();
        let State::Ready(inner) = &*state else {
            return Err(CoreError::IndexNotReady);
        };

        if query_vector.len() != inner.dimension {
            return Err(CoreError::Internal(anyhow!(
                "Query embedding dimension {} does not match index dimension {}",
                query_vector.len(),
                inner.dimension
            )));
        }

        let k = k.min(inner.entries.len());
        let mut order: Vec<(usize, f32)> = inner
            .vectors
            .iter()
            .map(|v| squared_l2(&query_vector, v))
            .enumerate()
            .collect();
        // Stable sort keeps equal distances in insertion order.
        order.sort_by(|a, b| a.1.total_cmp(&b.1));

        let hits = order
            .into_iter()
            .take(k)
            .map(|(idx, distance)| SearchHit {
                document: inner.entries[idx].document.clone(),
                vendor: inner.entries[idx].vendor.clone(),
                distance,
            })
            .collect::<Vec<_>>();

        debug!(query = query, k = k, hits = hits.len(), "Index search");
        Ok(hits)
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), State::Ready(_))
    }

    /// Number of indexed documents; 0 while unbuilt.
    pub fn len(&self) -> usize {
        match &*self.state.read() {
            State::Ready(inner) => inner.entries.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct source categories in first-seen order; the advisor prompt
    /// is restricted to these.
    pub fn known_categories(&self) -> Vec<String> {
        let state = self.state.read();
        let State::Ready(inner) = &*state else {
            return Vec::new();
        };
        let mut seen = Vec::new();
        for entry in &inner.entries {
            if let Some(category) = &entry.document.source_category {
                if !seen.iter().any(|c| c == category) {
                    seen.push(category.clone());
                }
            }
        }
        seen
    }
}

impl Default for RetrievalIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use uuid::Uuid;

    /// Frozen embedder: maps known texts to fixed vectors.
    struct StubEmbedder {
        map: HashMap<String, Vec<f32>>,
    }

    impl StubEmbedder {
        fn new(pairs: &[(&str, Vec<f32>)]) -> Self {
            Self {
                map: pairs
                    .iter()
                    .map(|(t, v)| (t.to_string(), v.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> CoreResult<Vec<f32>> {
            Ok(self.map.get(text).cloned().unwrap_or_else(|| vec![0.0, 0.0]))
        }

        async fn embed_batch(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }
    }

    fn entry(text: &str, company: &str) -> CatalogEntry {
        CatalogEntry {
            document: CatalogDocument {
                id: Uuid::new_v4(),
                text: text.to_string(),
                source_category: Some("Cement".to_string()),
            },
            vendor: VendorRecord {
                company_name: company.to_string(),
                location: "Navi Mumbai".to_string(),
                gst_status: "N/A".to_string(),
                rating: "N/A".to_string(),
                availability: "N/A".to_string(),
                source_url: String::new(),
                category: "Cement".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn search_before_build_is_rejected() {
        let index = RetrievalIndex::new();
        let embedder = StubEmbedder::new(&[]);
        let err = index.search(&embedder, "cement", 5).await.unwrap_err();
        assert!(matches!(err, CoreError::IndexNotReady));
    }

    #[tokio::test]
    async fn build_with_no_documents_fails() {
        let index = RetrievalIndex::new();
        let embedder = StubEmbedder::new(&[]);
        let err = index.build(&embedder, Vec::new()).await.unwrap_err();
        assert!(matches!(err, CoreError::EmptyCatalog));
    }

    #[tokio::test]
    async fn search_returns_ascending_distances_clamped_to_catalog() {
        let embedder = StubEmbedder::new(&[
            ("far", vec![10.0, 0.0]),
            ("near", vec![1.0, 0.0]),
            ("nearest", vec![0.5, 0.0]),
            ("query", vec![0.0, 0.0]),
        ]);
        let index = RetrievalIndex::new();
        index
            .build(
                &embedder,
                vec![entry("far", "A"), entry("near", "B"), entry("nearest", "C")],
            )
            .await
            .unwrap();

        let hits = index.search(&embedder, "query", 10).await.unwrap();
        assert_eq!(hits.len(), 3); // clamped to catalog size
        assert_eq!(hits[0].vendor.company_name, "C");
        assert_eq!(hits[1].vendor.company_name, "B");
        assert_eq!(hits[2].vendor.company_name, "A");
        assert!(hits[0].distance <= hits[1].distance);
        assert!(hits[1].distance <= hits[2].distance);
    }

    #[tokio::test]
    async fn equal_distances_keep_insertion_order() {
        let embedder = StubEmbedder::new(&[
            ("twin one", vec![1.0, 0.0]),
            ("twin two", vec![1.0, 0.0]),
            ("query", vec![0.0, 0.0]),
        ]);
        let index = RetrievalIndex::new();
        index
            .build(&embedder, vec![entry("twin one", "First"), entry("twin two", "Second")])
            .await
            .unwrap();

        let hits = index.search(&embedder, "query", 2).await.unwrap();
        assert_eq!(hits[0].vendor.company_name, "First");
        assert_eq!(hits[1].vendor.company_name, "Second");
    }

    #[tokio::test]
    async fn known_categories_dedupe_in_first_seen_order() {
        let embedder = StubEmbedder::new(&[("a", vec![1.0, 0.0]), ("b", vec![2.0, 0.0])]);
        let index = RetrievalIndex::new();
        let mut second = entry("b", "B");
        second.document.source_category = Some("Steel".to_string());
        index
            .build(&embedder, vec![entry("a", "A"), second, entry("a", "A2")])
            .await
            .unwrap();

        assert_eq!(index.known_categories(), vec!["Cement", "Steel"]);
    }
}
