//! Context assembly and the query engine.
//!
//! The [`QueryEngine`] retrieves chunks through a [`RagPipeline`], renders
//! them into a prompt template, and hands the prompt to a
//! [`GenerationBackend`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ragline::{QueryEngine, QueryOptions};
//!
//! let engine = QueryEngine::new(pipeline, Arc::new(my_backend));
//! let options = QueryOptions::builder().num_documents(2).include_metadata(true).build()?;
//! let response = engine.answer("What is the capital of France?", &options).await?;
//! ```

use std::fmt::Write as _;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::document::Chunk;
use crate::error::{RagError, Result};
use crate::generation::{GenerationBackend, GenerationRequest, GenerationResponse};
use crate::pipeline::RagPipeline;

/// Placeholder replaced by the assembled context block.
pub const CONTEXT_PLACEHOLDER: &str = "{{context}}";

/// Placeholder replaced by the query text.
pub const QUERY_PLACEHOLDER: &str = "{{query}}";

/// The template used when none is configured.
pub const DEFAULT_PROMPT_TEMPLATE: &str =
    "Answer the question based on the following context:\n\n{{context}}\n\nQuestion: {{query}}";

/// Options for one retrieve-and-assemble operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueryOptions {
    /// Number of chunks to retrieve. Must be at least 1.
    pub num_documents: usize,
    /// Render each chunk's metadata into the context block.
    pub include_metadata: bool,
    /// Prompt template containing `{{context}}` and `{{query}}`.
    pub prompt_template: String,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            num_documents: 3,
            include_metadata: false,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}

impl QueryOptions {
    /// Create a new builder for constructing [`QueryOptions`].
    pub fn builder() -> QueryOptionsBuilder {
        QueryOptionsBuilder::default()
    }

    /// Check that the options can be used for a query.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `num_documents` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.num_documents == 0 {
            return Err(RagError::ConfigError(
                "num_documents must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for constructing validated [`QueryOptions`].
#[derive(Debug, Clone, Default)]
pub struct QueryOptionsBuilder {
    options: QueryOptions,
}

impl QueryOptionsBuilder {
    /// Set the number of chunks to retrieve.
    pub fn num_documents(mut self, n: usize) -> Self {
        self.options.num_documents = n;
        self
    }

    /// Include chunk metadata in the context block.
    pub fn include_metadata(mut self, include: bool) -> Self {
        self.options.include_metadata = include;
        self
    }

    /// Set the prompt template.
    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.options.prompt_template = template.into();
        self
    }

    /// Build the [`QueryOptions`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `num_documents` is zero.
    pub fn build(self) -> Result<QueryOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}

/// Render ranked chunks into a context block.
///
/// Each chunk becomes `Context {i}:\n{content}\n\n`, numbered from 1. With
/// `include_metadata`, a non-empty metadata map follows as a `Metadata:` block
/// with one `key: value` line per entry in stored order, then a blank line.
pub fn build_context(chunks: &[Chunk], include_metadata: bool) -> String {
    let mut context = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let _ = write!(context, "Context {}:\n{}\n\n", i + 1, chunk.content);

        if include_metadata && !chunk.metadata.is_empty() {
            context.push_str("Metadata:\n");
            for (key, value) in &chunk.metadata {
                let _ = writeln!(context, "{key}: {value}");
            }
            context.push('\n');
        }
    }
    context
}

/// Substitute every `{{context}}` and `{{query}}` occurrence in `template`.
///
/// Substituted text is never re-scanned, so placeholders that appear inside
/// the context or the query are left as written.
pub fn render_template(template: &str, context: &str, query: &str) -> String {
    let mut rendered = String::with_capacity(template.len() + context.len() + query.len());
    for (i, segment) in template.split(CONTEXT_PLACEHOLDER).enumerate() {
        if i > 0 {
            rendered.push_str(context);
        }
        rendered.push_str(&segment.replace(QUERY_PLACEHOLDER, query));
    }
    rendered
}

/// Answers queries by retrieval, prompt assembly, and generation.
pub struct QueryEngine {
    pipeline: Arc<RagPipeline>,
    backend: Arc<dyn GenerationBackend>,
    options: QueryOptions,
}

impl QueryEngine {
    /// Create an engine with default [`QueryOptions`].
    pub fn new(pipeline: Arc<RagPipeline>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self { pipeline, backend, options: QueryOptions::default() }
    }

    /// Replace the default options used by [`ask`](Self::ask).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the options are invalid.
    pub fn with_options(mut self, options: QueryOptions) -> Result<Self> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    /// The default options used by [`ask`](Self::ask).
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// The pipeline used for retrieval.
    pub fn pipeline(&self) -> &Arc<RagPipeline> {
        &self.pipeline
    }

    /// Retrieve chunks for `query` and assemble the generation request,
    /// without calling the backend.
    ///
    /// Retrieving no chunks is not an error; the context is then empty.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] for invalid options, or any retrieval error.
    pub async fn prepare(&self, query: &str, options: &QueryOptions) -> Result<GenerationRequest> {
        options.validate()?;
        let chunks = self.pipeline.retrieve(query, options.num_documents).await?;
        let context = build_context(&chunks, options.include_metadata);
        let prompt = render_template(&options.prompt_template, &context, query);
        debug!(chunk_count = chunks.len(), prompt_len = prompt.len(), "assembled prompt");
        Ok(GenerationRequest::new(prompt))
    }

    /// Answer `query`: retrieve, assemble, and generate.
    ///
    /// The backend's response, or its error, is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] for invalid options, any retrieval
    /// error, or the backend's error.
    pub async fn answer(&self, query: &str, options: &QueryOptions) -> Result<GenerationResponse> {
        let request = self.prepare(query, options).await?;
        let response = self.backend.generate(request).await.inspect_err(|e| {
            error!(error = %e, "generation failed");
        })?;
        info!(response_len = response.text.len(), "answered query");
        Ok(response)
    }

    /// Answer `query` with the engine's default options.
    ///
    /// # Errors
    ///
    /// Same as [`answer`](Self::answer).
    pub async fn ask(&self, query: &str) -> Result<GenerationResponse> {
        self.answer(query, &self.options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Metadata, MetadataValue};

    fn chunk(content: &str, metadata: Metadata) -> Chunk {
        Chunk {
            id: format!("doc-{content}"),
            document_id: "doc".to_string(),
            content: content.to_string(),
            metadata,
            embedding: None,
        }
    }

    #[test]
    fn renders_context_and_query_into_template() {
        let context = build_context(&[chunk("Y", Metadata::new())], false);
        assert_eq!(
            render_template("Q: {{query}} C: {{context}}", &context, "X"),
            "Q: X C: Context 1:\nY\n\n"
        );
    }

    #[test]
    fn replaces_every_occurrence() {
        let rendered = render_template("{{query}}|{{query}}|{{context}}{{context}}", "c", "q");
        assert_eq!(rendered, "q|q|cc");
    }

    #[test]
    fn template_without_placeholders_is_unchanged() {
        assert_eq!(render_template("static prompt", "ctx", "q"), "static prompt");
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        assert_eq!(render_template("{{query}}", "ctx", "{{context}}"), "{{context}}");
        assert_eq!(render_template("{{context}}", "{{query}}", "q"), "{{query}}");
    }

    #[test]
    fn metadata_block_follows_each_chunk() {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), MetadataValue::from("test"));
        metadata.insert("page".to_string(), MetadataValue::from(2i64));
        let context = build_context(&[chunk("A", metadata), chunk("B", Metadata::new())], true);
        assert_eq!(
            context,
            "Context 1:\nA\n\nMetadata:\nsource: test\npage: 2\n\nContext 2:\nB\n\n"
        );
    }

    #[test]
    fn metadata_is_omitted_unless_requested() {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), MetadataValue::from("test"));
        assert_eq!(build_context(&[chunk("A", metadata)], false), "Context 1:\nA\n\n");
    }

    #[test]
    fn zero_num_documents_is_rejected() {
        assert!(QueryOptions::builder().num_documents(0).build().is_err());
        assert_eq!(QueryOptions::builder().build().unwrap(), QueryOptions::default());
    }
}
