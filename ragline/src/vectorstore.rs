//! Vector store trait for storing and searching vector embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A storage backend for embedded chunks with exact similarity search.
///
/// All chunks held by one store share a single embedding dimension, fixed by
/// the first insert or by backend configuration. The
/// [`RagPipeline`](crate::RagPipeline) only talks to this trait, so a remote or
/// disk-backed store can replace [`InMemoryVectorStore`](crate::InMemoryVectorStore)
/// without changes elsewhere.
///
/// # Example
///
/// ```rust,ignore
/// use ragline::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.insert(&chunks).await?;
/// let results = store.search(&query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert embedded chunks.
    ///
    /// The whole batch is rejected, leaving the store unchanged, if any chunk
    /// lacks an embedding, has the wrong dimension, or holds a NaN or infinity.
    async fn insert(&self, chunks: &[Chunk]) -> Result<()>;

    /// Return the `top_k` chunks most similar to `embedding`.
    ///
    /// Results are ordered by descending similarity; equal scores keep
    /// insertion order. An empty store yields an empty `Vec`.
    async fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// Delete chunks by ID. Unknown IDs are ignored.
    async fn delete(&self, ids: &[&str]) -> Result<()>;

    /// Remove every chunk.
    async fn clear(&self) -> Result<()>;

    /// Number of stored chunks.
    async fn len(&self) -> Result<usize>;

    /// Whether the store holds no chunks.
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}
