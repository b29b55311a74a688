//! End-to-end tests for the query engine with a recording generation backend.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ragline::{
    Document, EmbeddingProvider, GenerationBackend, GenerationRequest, GenerationResponse,
    InMemoryVectorStore, QueryEngine, QueryOptions, RagError, RagPipeline, Result,
};

/// Embeds text by which capital city it mentions, plus a shared constant axis.
struct CountryEmbedder;

#[async_trait]
impl EmbeddingProvider for CountryEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let flag = |word: &str| if text.contains(word) { 1.0 } else { 0.0 };
        Ok(vec![flag("France"), flag("Germany"), 1.0])
    }
}

/// Echoes the prompt back and records every request it receives.
#[derive(Default)]
struct EchoBackend {
    requests: Mutex<Vec<GenerationRequest>>,
}

impl EchoBackend {
    fn last_prompt(&self) -> String {
        self.requests.lock().unwrap().last().map(|r| r.prompt.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl GenerationBackend for EchoBackend {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let text = format!("Mock response for: {}", request.prompt);
        self.requests.lock().unwrap().push(request);
        Ok(GenerationResponse {
            text,
            finish_reason: Some("stop".to_string()),
            ..Default::default()
        })
    }
}

/// Always fails.
struct UnavailableBackend;

#[async_trait]
impl GenerationBackend for UnavailableBackend {
    async fn generate(&self, _request: GenerationRequest) -> Result<GenerationResponse> {
        Err(RagError::GenerationError {
            backend: "unavailable".to_string(),
            message: "model not loaded".to_string(),
        })
    }
}

async fn capitals_pipeline() -> Arc<RagPipeline> {
    let pipeline = RagPipeline::builder()
        .embedding_provider(Arc::new(CountryEmbedder))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .build()
        .unwrap();
    let documents = [
        Document::new("doc1", "The capital of France is Paris.").with_metadata("source", "test"),
        Document::new("doc2", "The capital of Germany is Berlin.").with_metadata("source", "test"),
    ];
    pipeline.add_documents(&documents, 1000, 200).await.unwrap();
    Arc::new(pipeline)
}

#[tokio::test]
async fn answers_with_most_relevant_context() {
    let backend = Arc::new(EchoBackend::default());
    let engine = QueryEngine::new(capitals_pipeline().await, backend.clone());

    let options = QueryOptions::builder().num_documents(1).build().unwrap();
    let response = engine.answer("What is the capital of France?", &options).await.unwrap();

    let prompt = backend.last_prompt();
    assert!(prompt.contains("Context 1:\nThe capital of France is Paris.\n\n"));
    assert!(!prompt.contains("Context 2:"));
    assert!(!prompt.contains("Berlin"));
    assert!(prompt.ends_with("Question: What is the capital of France?"));
    assert_eq!(response.text, format!("Mock response for: {prompt}"));
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn custom_template_is_rendered_exactly() {
    let pipeline = RagPipeline::builder()
        .embedding_provider(Arc::new(CountryEmbedder))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .build()
        .unwrap();
    pipeline.add_document(&Document::new("d", "Y"), 100, 0).await.unwrap();

    let backend = Arc::new(EchoBackend::default());
    let engine = QueryEngine::new(Arc::new(pipeline), backend.clone());
    let options = QueryOptions::builder()
        .num_documents(1)
        .prompt_template("Q: {{query}} C: {{context}}")
        .build()
        .unwrap();

    let request = engine.prepare("X", &options).await.unwrap();
    assert_eq!(request.prompt, "Q: X C: Context 1:\nY\n\n");

    engine.answer("X", &options).await.unwrap();
    assert_eq!(backend.last_prompt(), "Q: X C: Context 1:\nY\n\n");
}

#[tokio::test]
async fn empty_index_still_reaches_the_backend() {
    let pipeline = RagPipeline::builder()
        .embedding_provider(Arc::new(CountryEmbedder))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .build()
        .unwrap();
    let backend = Arc::new(EchoBackend::default());
    let engine = QueryEngine::new(Arc::new(pipeline), backend.clone());
    let options =
        QueryOptions::builder().prompt_template("[{{context}}] {{query}}").build().unwrap();

    let response = engine.answer("anything", &options).await.unwrap();
    assert_eq!(backend.last_prompt(), "[] anything");
    assert_eq!(response.text, "Mock response for: [] anything");
}

#[tokio::test]
async fn generation_error_is_returned_unchanged() {
    let engine = QueryEngine::new(capitals_pipeline().await, Arc::new(UnavailableBackend));
    let err = engine.ask("What is the capital of France?").await.unwrap_err();
    match err {
        RagError::GenerationError { backend, message } => {
            assert_eq!(backend, "unavailable");
            assert_eq!(message, "model not loaded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn metadata_is_rendered_when_requested() {
    let backend = Arc::new(EchoBackend::default());
    let engine = QueryEngine::new(capitals_pipeline().await, backend.clone());
    let options = QueryOptions::builder()
        .num_documents(1)
        .include_metadata(true)
        .prompt_template("{{context}}")
        .build()
        .unwrap();

    engine.answer("Germany", &options).await.unwrap();
    assert_eq!(
        backend.last_prompt(),
        "Context 1:\nThe capital of Germany is Berlin.\n\nMetadata:\nsource: test\n\n"
    );
}

#[tokio::test]
async fn ask_uses_stored_options() {
    let backend = Arc::new(EchoBackend::default());
    let options = QueryOptions::builder()
        .num_documents(2)
        .prompt_template("{{query}}\n{{context}}")
        .build()
        .unwrap();
    let engine = QueryEngine::new(capitals_pipeline().await, backend.clone())
        .with_options(options.clone())
        .unwrap();
    assert_eq!(engine.options(), &options);

    engine.ask("France").await.unwrap();
    let prompt = backend.last_prompt();
    assert!(prompt.starts_with("France\nContext 1:\nThe capital of France is Paris."));
    assert!(prompt.contains("Context 2:\nThe capital of Germany is Berlin."));
}

#[tokio::test]
async fn invalid_options_are_rejected() {
    let backend = Arc::new(EchoBackend::default());
    let pipeline = capitals_pipeline().await;

    let invalid = QueryOptions { num_documents: 0, ..QueryOptions::default() };
    let engine = QueryEngine::new(pipeline.clone(), backend.clone());
    assert!(matches!(engine.answer("France", &invalid).await, Err(RagError::ConfigError(_))));
    assert!(backend.requests.lock().unwrap().is_empty());

    let result = QueryEngine::new(pipeline, backend).with_options(invalid);
    assert!(matches!(result, Err(RagError::ConfigError(_))));
}
