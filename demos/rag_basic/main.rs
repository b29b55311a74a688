//! # RAG Basic Example
//!
//! Ingests a few documents, retrieves context for a handful of questions, and
//! renders the prompt that would be sent to a model.
//!
//! Uses `HashEmbeddingProvider`, `InMemoryVectorStore`, and an echoing
//! generation backend so it runs with **zero API keys**.
//!
//! Run: `RUST_LOG=ragline=debug cargo run -p ragline-demos --example rag_basic`

use std::sync::Arc;

use ragline::{
    Document, GenerationBackend, GenerationRequest, GenerationResponse, HashEmbeddingProvider,
    InMemoryVectorStore, QueryEngine, QueryOptions, RagConfig, RagPipeline, TokenUsage,
};
use tracing::info;

/// Returns the prompt it was given, with word counts standing in for tokens.
struct EchoBackend;

#[async_trait::async_trait]
impl GenerationBackend for EchoBackend {
    async fn generate(&self, request: GenerationRequest) -> ragline::Result<GenerationResponse> {
        let prompt_words = request.prompt.split_whitespace().count() as u32;
        Ok(GenerationResponse {
            text: format!("Mock response for: {}", request.prompt),
            usage: Some(TokenUsage {
                prompt: prompt_words,
                completion: prompt_words + 3,
                total: prompt_words * 2 + 3,
            }),
            finish_reason: Some("stop".to_string()),
            model: Some("echo".to_string()),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // -- 1. Configure the pipeline ----------------------------------------
    // Small chunks so the longer document spans several windows.
    let config = RagConfig::builder().chunk_size(120).chunk_overlap(30).top_k(3).build()?;

    let pipeline = Arc::new(
        RagPipeline::builder()
            .config(config)
            .embedding_provider(Arc::new(HashEmbeddingProvider::new(64)))
            .vector_store(Arc::new(InMemoryVectorStore::new()))
            .build()?,
    );

    // -- 2. Ingest sample documents ---------------------------------------
    let documents = vec![
        Document::new(
            "rust",
            "Rust is a systems programming language focused on safety, speed, and \
             concurrency. It achieves memory safety without a garbage collector through \
             its ownership system.",
        )
        .with_metadata("topic", "rust")
        .with_metadata("source", "https://www.rust-lang.org"),
        Document::new(
            "python",
            "Python is a high-level, interpreted programming language known for its \
             readability. It is widely used in data science and automation.",
        )
        .with_metadata("topic", "python"),
        Document::new(
            "rag",
            "Retrieval-Augmented Generation combines a retrieval system with a language \
             model. Documents are chunked, embedded, and stored in a vector index. At \
             query time the most relevant chunks are retrieved and fed to the model.",
        )
        .with_metadata("topic", "rag"),
    ];

    let chunks = pipeline.ingest_batch(&documents).await?;
    info!(documents = documents.len(), chunks = chunks.len(), "ingestion finished");

    // -- 3. Inspect raw search results ------------------------------------
    for query in ["memory safety in programming", "data science language"] {
        println!("\nQuery: \"{query}\"");
        for (i, result) in pipeline.query(query).await?.iter().enumerate() {
            let preview: String = result.chunk.content.chars().take(60).collect();
            println!(
                "  {}. [score={:.4}] {} | {preview}",
                i + 1,
                result.score,
                result.chunk.id
            );
        }
    }

    // -- 4. Answer through the query engine -------------------------------
    let options = QueryOptions::builder().num_documents(2).include_metadata(true).build()?;
    let engine = QueryEngine::new(pipeline, Arc::new(EchoBackend)).with_options(options)?;

    let response = engine.ask("How are documents stored in a vector index?").await?;
    println!("\n{}", response.text);
    if let Some(usage) = response.usage {
        println!("\n(tokens: prompt={}, completion={})", usage.prompt, usage.completion);
    }

    Ok(())
}
