//! In-memory vector store using cosine similarity.
//!
//! This module provides [`InMemoryVectorStore`], a vector store backed by a
//! `Vec` in insertion order, protected by a `tokio::sync::RwLock`. Search is
//! exact and brute force: O(n·d) over `n` chunks of dimension `d`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "InMemory";

#[derive(Debug, Default)]
struct StoreInner {
    /// Chunks in insertion order. Every chunk here has an embedding.
    chunks: Vec<Chunk>,
    /// Chunk ID → position in `chunks`.
    positions: HashMap<String, usize>,
    dimension: Option<usize>,
}

impl StoreInner {
    fn reindex(&mut self) {
        self.positions =
            self.chunks.iter().enumerate().map(|(i, chunk)| (chunk.id.clone(), i)).collect();
    }
}

/// An in-memory vector store using cosine similarity for search.
///
/// Inserting a chunk whose ID is already stored replaces it in place, so it
/// keeps its original position for tie-breaking. Concurrent searches share a
/// read lock; inserts, deletes, and clears take the write lock for their whole
/// duration.
///
/// # Example
///
/// ```rust,ignore
/// use ragline::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::with_dimensions(384);
/// store.insert(&chunks).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    inner: RwLock<StoreInner>,
    fixed_dimension: Option<usize>,
}

impl InMemoryVectorStore {
    /// Create a new empty store whose dimension is set by the first insert.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty store that only accepts embeddings of `dimensions`.
    ///
    /// Unlike [`new`](Self::new), the dimension survives [`clear`](VectorStore::clear).
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            inner: RwLock::new(StoreInner { dimension: Some(dimensions), ..Default::default() }),
            fixed_dimension: Some(dimensions),
        }
    }

    /// The dimension currently enforced on inserts, if established.
    pub async fn dimensions(&self) -> Option<usize> {
        self.inner.read().await.dimension
    }
}

/// Compute cosine similarity between two vectors.
///
/// Sums are accumulated in `f64`, so any finite `f32` input yields a finite
/// score in `[-1, 1]`. Returns 0.0 if either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    // Adding 0.0 folds -0.0 into 0.0 so both rank as a tie.
    ((dot / (norm_a * norm_b)).clamp(-1.0, 1.0) + 0.0) as f32
}

fn non_finite_error(what: &str) -> RagError {
    RagError::VectorStoreError {
        backend: BACKEND.to_string(),
        message: format!("{what} contains a non-finite value"),
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn insert(&self, chunks: &[Chunk]) -> Result<()> {
        let mut inner = self.inner.write().await;

        // Validate the whole batch before touching the store.
        let mut expected = inner.dimension;
        for chunk in chunks {
            let actual = chunk.dimensions().ok_or_else(|| RagError::VectorStoreError {
                backend: BACKEND.to_string(),
                message: format!("chunk '{}' has no embedding", chunk.id),
            })?;
            if chunk.embedding.iter().flatten().any(|x| !x.is_finite()) {
                return Err(non_finite_error(&format!("embedding of chunk '{}'", chunk.id)));
            }
            match expected {
                Some(expected) if expected != actual => {
                    return Err(RagError::DimensionMismatch { expected, actual });
                }
                None => expected = Some(actual),
                _ => {}
            }
        }

        inner.dimension = expected;
        for chunk in chunks {
            if let Some(&index) = inner.positions.get(&chunk.id) {
                inner.chunks[index] = chunk.clone();
            } else {
                let index = inner.chunks.len();
                inner.positions.insert(chunk.id.clone(), index);
                inner.chunks.push(chunk.clone());
            }
        }

        debug!(
            backend = BACKEND,
            inserted = chunks.len(),
            total = inner.chunks.len(),
            "inserted chunks"
        );
        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        if embedding.iter().any(|x| !x.is_finite()) {
            return Err(non_finite_error("query embedding"));
        }

        let inner = self.inner.read().await;
        if inner.chunks.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        if let Some(expected) = inner.dimension {
            if expected != embedding.len() {
                return Err(RagError::VectorStoreError {
                    backend: BACKEND.to_string(),
                    message: format!(
                        "query embedding has {} dimensions, store holds {expected}",
                        embedding.len()
                    ),
                });
            }
        }

        let mut scored: Vec<(usize, f32)> = inner
            .chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                let stored = chunk.embedding.as_deref().unwrap_or_default();
                (i, cosine_similarity(stored, embedding))
            })
            .collect();

        // `sort_by` is stable: equal scores stay in insertion order.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| SearchResult { chunk: inner.chunks[i].clone(), score })
            .collect())
    }

    async fn delete(&self, ids: &[&str]) -> Result<()> {
        let mut inner = self.inner.write().await;
        let ids: HashSet<&str> = ids.iter().copied().collect();
        let before = inner.chunks.len();
        inner.chunks.retain(|chunk| !ids.contains(chunk.id.as_str()));
        if inner.chunks.len() != before {
            inner.reindex();
        }
        debug!(backend = BACKEND, removed = before - inner.chunks.len(), "deleted chunks");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.chunks.clear();
        inner.positions.clear();
        inner.dimension = self.fixed_dimension;
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.inner.read().await.chunks.len())
    }
}
