//! # ragline
//!
//! Retrieval-Augmented Generation core.
//!
//! Documents are split by a [`Chunker`], embedded by an [`EmbeddingProvider`],
//! and stored in a [`VectorStore`]. At query time the [`RagPipeline`] embeds
//! the query and runs an exact cosine-similarity search; the [`QueryEngine`]
//! renders the ranked chunks into a prompt template and hands it to a
//! [`GenerationBackend`].
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragline::{
//!     Document, HashEmbeddingProvider, InMemoryVectorStore, QueryEngine, QueryOptions,
//!     RagPipeline,
//! };
//!
//! let pipeline = Arc::new(
//!     RagPipeline::builder()
//!         .embedding_provider(Arc::new(HashEmbeddingProvider::new(64)))
//!         .vector_store(Arc::new(InMemoryVectorStore::new()))
//!         .build()?,
//! );
//! pipeline.add_document(&Document::new("doc1", "The capital of France is Paris."), 1000, 200).await?;
//!
//! let engine = QueryEngine::new(pipeline, Arc::new(my_backend));
//! let response = engine.answer("What is the capital of France?", &QueryOptions::default()).await?;
//! ```
//!
//! The crate emits `tracing` events but never installs a subscriber.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod inmemory;
pub mod pipeline;
pub mod query;
pub mod reranker;
pub mod vectorstore;

pub use chunking::{Chunker, FixedSizeChunker, split};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, Metadata, MetadataValue, SearchResult};
pub use embedding::{EmbeddingProvider, HashEmbeddingProvider};
pub use error::{RagError, Result};
pub use generation::{GenerationBackend, GenerationRequest, GenerationResponse, TokenUsage};
pub use inmemory::{InMemoryVectorStore, cosine_similarity};
pub use pipeline::{RagPipeline, RagPipelineBuilder};
pub use query::{
    DEFAULT_PROMPT_TEMPLATE, QueryEngine, QueryOptions, QueryOptionsBuilder, build_context,
    render_template,
};
pub use reranker::{NoOpReranker, Reranker};
pub use vectorstore::VectorStore;
