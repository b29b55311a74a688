//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] coordinates the full ingest-and-retrieve workflow by
//! composing an [`EmbeddingProvider`], a [`VectorStore`], a [`Chunker`],
//! and an optional [`Reranker`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ragline::{RagPipeline, RagConfig, InMemoryVectorStore};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! pipeline.add_document(&document, 1000, 200).await?;
//! let chunks = pipeline.retrieve("search query", 3).await?;
//! ```

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::RagConfig;
use crate::document::{Chunk, Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::reranker::Reranker;
use crate::vectorstore::VectorStore;

/// The RAG pipeline orchestrator.
///
/// Ingestion is chunk → embed → store and is all-or-nothing per document:
/// nothing reaches the vector store unless every chunk was embedded. Batch
/// ingestion is sequential and stops at the first failing document without
/// rolling back the ones already stored.
///
/// Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Return a reference to the vector store.
    pub fn vector_store(&self) -> &Arc<dyn VectorStore> {
        &self.vector_store
    }

    /// Chunk a document with the given parameters, embed every chunk, and store them.
    ///
    /// Returns the stored chunks with embeddings attached.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] for invalid chunking parameters, and
    /// [`RagError::IngestError`] naming the document if embedding or storage
    /// fails. In the latter case nothing from this document was stored.
    pub async fn add_document(
        &self,
        document: &Document,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<Vec<Chunk>> {
        let chunker = FixedSizeChunker::new(chunk_size, chunk_overlap)?;
        self.embed_and_store(document, chunker.chunk(document)).await
    }

    /// Apply [`add_document`](Self::add_document) to each document in order.
    ///
    /// Returns all chunks that were stored across all documents.
    ///
    /// # Errors
    ///
    /// Stops at the first failing document and returns its
    /// [`RagError::IngestError`]. Documents before it stay stored.
    pub async fn add_documents(
        &self,
        documents: &[Document],
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<Vec<Chunk>> {
        let chunker = FixedSizeChunker::new(chunk_size, chunk_overlap)?;
        let mut all_chunks = Vec::new();
        for document in documents {
            let chunks = self.embed_and_store(document, chunker.chunk(document)).await?;
            all_chunks.extend(chunks);
        }
        Ok(all_chunks)
    }

    /// Ingest a single document with the pipeline's configured [`Chunker`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IngestError`] if embedding or storage fails.
    pub async fn ingest(&self, document: &Document) -> Result<Vec<Chunk>> {
        self.embed_and_store(document, self.chunker.chunk(document)).await
    }

    /// Ingest multiple documents with the configured [`Chunker`].
    ///
    /// # Errors
    ///
    /// Same partial-failure behavior as [`add_documents`](Self::add_documents).
    pub async fn ingest_batch(&self, documents: &[Document]) -> Result<Vec<Chunk>> {
        let mut all_chunks = Vec::new();
        for document in documents {
            let chunks = self.ingest(document).await?;
            all_chunks.extend(chunks);
        }
        Ok(all_chunks)
    }

    async fn embed_and_store(
        &self,
        document: &Document,
        mut chunks: Vec<Chunk>,
    ) -> Result<Vec<Chunk>> {
        if chunks.is_empty() {
            info!(document.id = %document.id, chunk_count = 0, "ingested document (empty)");
            return Ok(chunks);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let embeddings = self.embedding_provider.embed_documents(&texts).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
            RagError::ingest(&document.id, e)
        })?;

        if embeddings.len() != chunks.len() {
            error!(
                document.id = %document.id,
                expected = chunks.len(),
                received = embeddings.len(),
                "embedding count mismatch"
            );
            return Err(RagError::ingest(
                &document.id,
                RagError::EmbeddingError {
                    provider: self.embedding_provider.name().to_string(),
                    message: format!(
                        "expected {} embeddings, received {}",
                        chunks.len(),
                        embeddings.len()
                    ),
                },
            ));
        }

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = Some(embedding);
        }

        self.vector_store.insert(&chunks).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "insert failed during ingestion");
            RagError::ingest(&document.id, e)
        })?;

        info!(document.id = %document.id, chunk_count = chunks.len(), "ingested document");
        Ok(chunks)
    }

    /// Embed `query` and return the `top_k` most similar chunks with their scores.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `top_k` is zero, the provider's
    /// [`RagError::EmbeddingError`] with the query text appended to its message
    /// if the query cannot be embedded, and the store's error if the search fails.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        if top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }

        let query_embedding = self.embedding_provider.embed_query(query).await.map_err(|e| {
            error!(query = %query, error = %e, "embedding failed during query");
            match e {
                RagError::EmbeddingError { provider, message } => RagError::EmbeddingError {
                    provider,
                    message: format!("{message} (query: {query:?})"),
                },
                other => other,
            }
        })?;

        let results = self.vector_store.search(&query_embedding, top_k).await.inspect_err(|e| {
            error!(error = %e, "vector store search failed");
        })?;

        debug!(top_k, result_count = results.len(), "search completed");
        Ok(results)
    }

    /// Return the `top_k` chunks most relevant to `query`, best first.
    ///
    /// # Errors
    ///
    /// Same as [`search`](Self::search).
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<Chunk>> {
        let results = self.search(query, top_k).await?;
        Ok(results.into_iter().map(|r| r.chunk).collect())
    }

    /// Query with the configured `top_k`, then rerank and filter by threshold.
    ///
    /// # Errors
    ///
    /// Same as [`search`](Self::search), plus any reranker error.
    pub async fn query(&self, query: &str) -> Result<Vec<SearchResult>> {
        let results = self.search(query, self.config.top_k).await?;

        let results = if let Some(reranker) = &self.reranker {
            reranker.rerank(query, results).await.inspect_err(|e| {
                error!(error = %e, "reranking failed");
            })?
        } else {
            results
        };

        let filtered: Vec<SearchResult> = match self.config.similarity_threshold {
            Some(threshold) => results.into_iter().filter(|r| r.score >= threshold).collect(),
            None => results,
        };

        info!(result_count = filtered.len(), "query completed");
        Ok(filtered)
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `embedding_provider` and `vector_store` are required. Without an explicit
/// chunker, a [`FixedSizeChunker`] is built from the config's chunk size and
/// overlap; without an explicit config, [`RagConfig::default()`] is used.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = RagPipeline::builder()
///     .config(RagConfig::default())
///     .embedding_provider(Arc::new(embedder))
///     .vector_store(Arc::new(store))
///     .reranker(Arc::new(reranker))  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the document chunker used by [`RagPipeline::ingest`].
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set an optional reranker for post-search result reordering.
    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Build the [`RagPipeline`], validating the config and required fields.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing or
    /// the config is invalid.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;
        let chunker: Arc<dyn Chunker> = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?),
        };

        Ok(RagPipeline {
            config,
            embedding_provider,
            vector_store,
            chunker,
            reranker: self.reranker,
        })
    }
}
