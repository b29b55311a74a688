//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`FixedSizeChunker`], which
//! slides a fixed-width character window over the document text with a
//! configurable overlap.

use crate::config::validate_chunking;
use crate::document::{Chunk, Document};
use crate::error::Result;

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no embeddings.
/// Embeddings are attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks, in document order.
    ///
    /// Returns an empty `Vec` if the document has empty content.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into fixed-size chunks by character count with configurable overlap.
///
/// Sizes and offsets count Unicode scalar values, so multi-byte text is never
/// cut inside a character. Chunk IDs are `{document_id}-{start_offset}`, which
/// makes re-chunking with the same parameters reproduce the same IDs. Each
/// chunk inherits the parent document's metadata unchanged.
///
/// # Example
///
/// ```rust,ignore
/// use ragline::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(256, 50)?;
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size`: maximum number of characters per chunk
    /// * `chunk_overlap`: number of overlapping characters between consecutive chunks
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`](crate::RagError::ConfigError) if
    /// `chunk_size` is zero or `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_chunking(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }

    /// Maximum number of characters per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of characters shared by consecutive chunks.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let text = &document.content;
        if text.is_empty() {
            return Vec::new();
        }

        // Byte position of every character, plus the end of the string, so
        // character offsets map to valid slice boundaries.
        let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        bounds.push(text.len());
        let char_len = bounds.len() - 1;

        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::with_capacity(char_len.div_ceil(step));
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(char_len);
            chunks.push(Chunk {
                id: format!("{}-{start}", document.id),
                document_id: document.id.clone(),
                content: text[bounds[start]..bounds[end]].to_string(),
                metadata: document.metadata.clone(),
                embedding: None,
            });
            if end == char_len {
                break;
            }
            start += step;
        }

        chunks
    }
}

/// Split a document with a one-off [`FixedSizeChunker`].
///
/// # Errors
///
/// Returns [`RagError::ConfigError`](crate::RagError::ConfigError) if the
/// parameters are invalid.
pub fn split(document: &Document, chunk_size: usize, chunk_overlap: usize) -> Result<Vec<Chunk>> {
    Ok(FixedSizeChunker::new(chunk_size, chunk_overlap)?.chunk(document))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_document_is_a_single_chunk() {
        let doc = Document::new("doc", "hello");
        let chunks = split(&doc, 10, 3).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "doc-0");
        assert_eq!(chunks[0].content, "hello");
    }

    #[test]
    fn windows_advance_by_size_minus_overlap() {
        let doc = Document::new("doc", "abcdefghij");
        let chunks = split(&doc, 4, 1).unwrap();
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(contents, ["abcd", "defg", "ghij"]);
        assert_eq!(ids, ["doc-0", "doc-3", "doc-6"]);
    }

    #[test]
    fn final_window_is_clipped() {
        let doc = Document::new("doc", "abcdefghijk");
        let chunks = split(&doc, 4, 0).unwrap();
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["abcd", "efgh", "ijk"]);
    }

    #[test]
    fn multibyte_text_is_split_on_characters() {
        let doc = Document::new("doc", "héllo wörld");
        let chunks = split(&doc, 4, 1).unwrap();
        assert_eq!(chunks[0].content, "héll");
        assert_eq!(chunks[1].content, "lo w");
        assert_eq!(chunks[1].id, "doc-3");
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let doc = Document::new("doc", "");
        assert!(split(&doc, 4, 1).unwrap().is_empty());
    }

    #[test]
    fn overlap_not_below_size_is_rejected() {
        assert!(FixedSizeChunker::new(4, 4).is_err());
        assert!(FixedSizeChunker::new(4, 5).is_err());
        assert!(FixedSizeChunker::new(0, 0).is_err());
        assert!(FixedSizeChunker::new(4, 0).is_ok());
    }
}
