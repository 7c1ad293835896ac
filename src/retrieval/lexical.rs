//! BM25 retrieval over an in-memory tantivy index.

use std::fmt;

use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, INDEXED, STORED, Schema, TEXT, Value};
use tantivy::{Index, IndexReader, TantivyDocument, doc};
use tracing::debug;

use crate::core::splitter::Chunk;
use crate::error::Result;

/// Writer heap size. Chunk corpora are small; this is tantivy's minimum
/// per-thread budget.
const WRITER_HEAP_BYTES: usize = 15_000_000;

/// Lexical retriever: BM25 over chunk text with tantivy's default tokenizer.
pub struct LexicalRetriever {
    chunks: Vec<Chunk>,
    reader: IndexReader,
    parser: QueryParser,
    position: Field,
}

impl LexicalRetriever {
    /// Indexes `chunks`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::IndexBuild`](crate::ChatscrollError::IndexBuild)
    /// if tantivy fails to create or commit the index.
    pub fn new(chunks: Vec<Chunk>) -> Result<Self> {
        let mut builder = Schema::builder();
        let text = builder.add_text_field("text", TEXT);
        let position = builder.add_u64_field("position", INDEXED | STORED);
        let index = Index::create_in_ram(builder.build());

        let mut writer = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
        for (i, chunk) in chunks.iter().enumerate() {
            writer.add_document(doc!(
                text => chunk.text.as_str(),
                position => i as u64
            ))?;
        }
        writer.commit()?;

        let reader = index.reader()?;
        let parser = QueryParser::for_index(&index, vec![text]);
        debug!(chunks = chunks.len(), "built BM25 index");

        Ok(Self {
            chunks,
            reader,
            parser,
            position,
        })
    }

    /// All chunks in corpus order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Positions of the chunks matching `query`, best first, at most `k`.
    ///
    /// The query is free text: syntax errors are ignored rather than
    /// reported, so `"what's up?"` still searches for its words.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<usize>> {
        if self.chunks.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let (query, errors) = self.parser.parse_query_lenient(query);
        if !errors.is_empty() {
            debug!(errors = errors.len(), "ignored query syntax errors");
        }

        let searcher = self.reader.searcher();
        let limit = k.min(self.chunks.len());
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;

        let mut positions = Vec::with_capacity(top_docs.len());
        for (_score, address) in top_docs {
            let doc = searcher.doc::<TantivyDocument>(address)?;
            if let Some(position) = doc.get_first(self.position).and_then(|v| v.as_u64()) {
                positions.push(position as usize);
            }
        }
        Ok(positions)
    }
}

impl fmt::Debug for LexicalRetriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LexicalRetriever")
            .field("chunks", &self.chunks.len())
            .finish_non_exhaustive()
    }
}
