//! Error types for the `ragline` crate.

use thiserror::Error;

/// Errors that can occur in RAG operations.
///
/// No variant is retried inside the crate; retry and backoff belong to the caller.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid chunking parameters, query options, or a missing builder component.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An embedding's width disagrees with the dimension held by the vector store.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension the store was established with.
        expected: usize,
        /// The dimension of the rejected embedding.
        actual: usize,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error returned by the text-generation backend.
    #[error("Generation error ({backend}): {message}")]
    GenerationError {
        /// The generation backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during result reranking.
    #[error("Reranker error ({reranker}): {message}")]
    RerankerError {
        /// The reranker that produced the error.
        reranker: String,
        /// A description of the failure.
        message: String,
    },

    /// Ingestion of a specific document failed.
    ///
    /// The underlying kind (embedding, dimension, store) is kept as `source`.
    #[error("failed to ingest document '{document_id}': {source}")]
    IngestError {
        /// The ID of the document that failed.
        document_id: String,
        /// The error that stopped ingestion.
        #[source]
        source: Box<RagError>,
    },
}

impl RagError {
    /// Wrap an error with the ID of the document being ingested.
    pub(crate) fn ingest(document_id: impl Into<String>, source: RagError) -> Self {
        RagError::IngestError { document_id: document_id.into(), source: Box::new(source) }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
