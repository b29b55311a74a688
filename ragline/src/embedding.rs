//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. Every call on one provider instance is expected to return vectors
/// of the same dimension; the vector store rejects anything else at insert time.
///
/// The default [`embed_documents`](EmbeddingProvider::embed_documents)
/// implementation calls [`embed_query`](EmbeddingProvider::embed_query)
/// sequentially; backends that support native batching should override it.
///
/// # Example
///
/// ```rust,ignore
/// use ragline::EmbeddingProvider;
///
/// let provider = MyEmbeddingProvider::new();
/// let embedding = provider.embed_query("hello world").await?;
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short provider name used in errors and logs.
    fn name(&self) -> &str {
        "custom"
    }

    /// Generate an embedding vector for a single text input.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs, in input order.
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed_query(text).await?);
        }
        Ok(results)
    }
}

const FNV_OFFSET: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;

fn fnv1a(bytes: &[u8], seed: u64) -> u64 {
    let mut hash = FNV_OFFSET ^ seed;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// A deterministic, offline [`EmbeddingProvider`].
///
/// Each component is an FNV-1a hash of the text seeded with the component
/// index, mapped into `[-1, 1)`. Identical text always yields the identical
/// vector, which makes it suitable for demos and tests. It carries no
/// semantic signal.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl HashEmbeddingProvider {
    /// Create a provider producing vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// The dimension of every vector this provider returns.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn hash_to_vec(&self, text: &str) -> Vec<f32> {
        let bytes = text.as_bytes();
        (0..self.dimensions)
            .map(|idx| {
                let value = fnv1a(bytes, idx as u64) % 20_000;
                value as f32 / 10_000.0 - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    fn name(&self) -> &str {
        "hash"
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.hash_to_vec(text))
    }

    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.hash_to_vec(text)).collect())
    }
}
