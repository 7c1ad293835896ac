//! Embedding retrieval with an on-disk index cache.
//!
//! Chunks are embedded once per distinct chat. The index is keyed by the
//! SHA-256 of the chunk texts and stored as
//!
//! ```text
//! <index_dir>/index_<sha256>/
//!     vectors.usearch
//!     manifest.json      {"model": ..., "dimensions": ..., "chunk_count": ...}
//! ```
//!
//! A cached index is reused only when its manifest matches the current
//! embedder and chunk count. Otherwise it is rebuilt into a temporary
//! directory and renamed into place.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use crate::core::splitter::Chunk;
use crate::error::{ChatscrollError, Result};
use crate::progress::{Progress, ProgressCallback};

const VECTORS_FILE: &str = "vectors.usearch";
const MANIFEST_FILE: &str = "manifest.json";

/// Turns text into fixed-size vectors.
pub trait Embedder {
    /// Identifier recorded in the cache manifest.
    fn model_name(&self) -> &str;

    /// Length of every vector this embedder returns.
    fn dimensions(&self) -> usize;

    /// Embeds each text. The output has one vector per input, in order.
    fn embed(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;
}

/// [`Embedder`] backed by a local fastembed ONNX model.
pub struct FastEmbedder {
    model: TextEmbedding,
    name: String,
    dims: usize,
}

impl FastEmbedder {
    /// Loads the model called `name`, downloading it on first use.
    ///
    /// `name` may be a fastembed model code (`Qdrant/all-MiniLM-L6-v2-onnx`)
    /// or the upstream name (`sentence-transformers/all-MiniLM-L6-v2`);
    /// the organisation prefix and an `-onnx` suffix are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ChatscrollError::IndexBuild`] if the name is unknown or the
    /// model cannot be loaded.
    pub fn new(name: &str) -> Result<Self> {
        let (model, dims) = resolve_model(name)?;
        let options = InitOptions::new(model).with_show_download_progress(false);
        let model = TextEmbedding::try_new(options)
            .map_err(|e| ChatscrollError::index_build(format!("cannot load model {name}: {e}")))?;
        info!(model = name, dims, "loaded embedding model");
        Ok(Self {
            model,
            name: name.to_string(),
            dims,
        })
    }
}

impl Embedder for FastEmbedder {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn embed(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.model
            .embed(texts.to_vec(), None)
            .map_err(|e| ChatscrollError::index_build(format!("embedding failed: {e}")))
    }
}

impl fmt::Debug for FastEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastEmbedder")
            .field("name", &self.name)
            .field("dims", &self.dims)
            .finish_non_exhaustive()
    }
}

fn resolve_model(name: &str) -> Result<(EmbeddingModel, usize)> {
    let wanted = short_model_name(name);
    TextEmbedding::list_supported_models()
        .into_iter()
        .find(|info| short_model_name(&info.model_code) == wanted)
        .map(|info| (info.model, info.dim))
        .ok_or_else(|| ChatscrollError::index_build(format!("unknown embedding model: {name}")))
}

fn short_model_name(name: &str) -> String {
    let base = name.rsplit('/').next().unwrap_or(name);
    let base = base.strip_suffix("-onnx").unwrap_or(base);
    base.to_ascii_lowercase()
}

/// Where and how to build the index.
#[derive(Clone)]
pub struct EmbeddingOptions {
    /// Base directory holding `index_<hash>` subdirectories.
    pub index_dir: PathBuf,

    /// Chunks embedded per call (default: 32)
    pub batch_size: usize,

    /// Called after every batch.
    pub progress: Option<ProgressCallback>,
}

impl EmbeddingOptions {
    /// Creates options with the default batch size and no progress callback.
    pub fn new(index_dir: impl Into<PathBuf>) -> Self {
        Self {
            index_dir: index_dir.into(),
            batch_size: 32,
            progress: None,
        }
    }

    /// Sets the batch size. Zero is treated as one.
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Sets the progress callback.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }
}

impl fmt::Debug for EmbeddingOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingOptions")
            .field("index_dir", &self.index_dir)
            .field("batch_size", &self.batch_size)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Manifest {
    model: String,
    dimensions: usize,
    chunk_count: usize,
}

/// Nearest-neighbour retriever over chunk embeddings (cosine distance).
pub struct EmbeddingRetriever {
    chunks: Vec<Chunk>,
    embedder: Box<dyn Embedder>,
    index: Index,
    cache_dir: PathBuf,
}

impl EmbeddingRetriever {
    /// Loads the cached index for `chunks`, or embeds them and caches it.
    ///
    /// # Errors
    ///
    /// Every failure (model, embedding, index or file system) is reported as
    /// [`ChatscrollError::IndexBuild`].
    pub fn build(
        chunks: Vec<Chunk>,
        mut embedder: Box<dyn Embedder>,
        options: &EmbeddingOptions,
    ) -> Result<Self> {
        let expected = Manifest {
            model: embedder.model_name().to_string(),
            dimensions: embedder.dimensions(),
            chunk_count: chunks.len(),
        };
        let cache_dir = options
            .index_dir
            .join(format!("index_{}", corpus_hash(&chunks)));

        let index = match load_cached(&cache_dir, &expected) {
            Some(index) => {
                info!(path = %cache_dir.display(), "loaded cached embedding index");
                index
            }
            None => {
                info!(
                    chunks = chunks.len(),
                    model = %expected.model,
                    "building embedding index"
                );
                let index = embed_chunks(&chunks, embedder.as_mut(), options)?;
                persist(&index, &expected, &cache_dir)?;
                index
            }
        };

        Ok(Self {
            chunks,
            embedder,
            index,
            cache_dir,
        })
    }

    /// All chunks in corpus order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Directory holding this corpus' cached index.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Positions of the `k` chunks nearest to `query`, nearest first.
    pub fn search(&mut self, query: &str, k: usize) -> Result<Vec<usize>> {
        if self.chunks.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let vector = self
            .embedder
            .embed(&[query])?
            .into_iter()
            .next()
            .ok_or_else(|| ChatscrollError::index_build("embedder returned no vector"))?;
        check_dimensions(&vector, self.embedder.dimensions())?;

        let matches = self
            .index
            .search(vector.as_slice(), k.min(self.chunks.len()))
            .map_err(index_error)?;
        Ok(matches.keys.into_iter().map(|key| key as usize).collect())
    }
}

impl fmt::Debug for EmbeddingRetriever {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingRetriever")
            .field("chunks", &self.chunks.len())
            .field("model", &self.embedder.model_name())
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

/// SHA-256 hex digest of every chunk text followed by a newline.
pub fn corpus_hash(chunks: &[Chunk]) -> String {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk.text.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

fn new_index(dimensions: usize) -> Result<Index> {
    let options = IndexOptions {
        dimensions,
        metric: MetricKind::Cos,
        quantization: ScalarKind::F32,
        ..IndexOptions::default()
    };
    Index::new(&options).map_err(index_error)
}

fn load_cached(dir: &Path, expected: &Manifest) -> Option<Index> {
    let manifest = fs::read_to_string(dir.join(MANIFEST_FILE)).ok()?;
    let manifest: Manifest = match serde_json::from_str(&manifest) {
        Ok(manifest) => manifest,
        Err(err) => {
            debug!(error = %err, "unreadable index manifest, rebuilding");
            return None;
        }
    };
    if &manifest != expected {
        info!(
            cached_model = %manifest.model,
            cached_dimensions = manifest.dimensions,
            "cached index does not match the current model, rebuilding"
        );
        return None;
    }

    let index = new_index(expected.dimensions).ok()?;
    let path = dir.join(VECTORS_FILE);
    if let Err(err) = index.load(path.to_str()?) {
        debug!(error = %err, "cannot load cached vectors, rebuilding");
        return None;
    }
    if index.dimensions() != expected.dimensions || index.size() != expected.chunk_count {
        debug!("cached vectors disagree with manifest, rebuilding");
        return None;
    }
    Some(index)
}

fn embed_chunks(
    chunks: &[Chunk],
    embedder: &mut dyn Embedder,
    options: &EmbeddingOptions,
) -> Result<Index> {
    let dimensions = embedder.dimensions();
    let index = new_index(dimensions)?;
    index.reserve(chunks.len().max(1)).map_err(index_error)?;

    let mut done = 0;
    for batch in chunks.chunks(options.batch_size.max(1)) {
        let texts: Vec<&str> = batch.iter().map(Chunk::text).collect();
        let vectors = embedder.embed(&texts)?;
        if vectors.len() != texts.len() {
            return Err(ChatscrollError::index_build(format!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        for vector in &vectors {
            check_dimensions(vector, dimensions)?;
            index.add(done as u64, vector.as_slice()).map_err(index_error)?;
            done += 1;
        }
        if let Some(progress) = &options.progress {
            progress(Progress::new(done, chunks.len()));
        }
    }

    Ok(index)
}

fn persist(index: &Index, manifest: &Manifest, dir: &Path) -> Result<()> {
    let parent = dir
        .parent()
        .ok_or_else(|| ChatscrollError::index_build("index directory has no parent"))?;
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ChatscrollError::index_build("invalid index directory name"))?;
    let tmp = parent.join(format!(".{name}.tmp-{}", std::process::id()));

    if tmp.exists() {
        fs::remove_dir_all(&tmp).map_err(cache_error)?;
    }
    fs::create_dir_all(&tmp).map_err(cache_error)?;

    let vectors = tmp.join(VECTORS_FILE);
    let vectors = vectors
        .to_str()
        .ok_or_else(|| ChatscrollError::index_build("index path is not valid UTF-8"))?;
    index.save(vectors).map_err(index_error)?;
    let json = serde_json::to_string_pretty(manifest)
        .map_err(|e| ChatscrollError::index_build(e.to_string()))?;
    fs::write(tmp.join(MANIFEST_FILE), json).map_err(cache_error)?;

    if dir.exists() {
        fs::remove_dir_all(dir).map_err(cache_error)?;
    }
    fs::rename(&tmp, dir).map_err(cache_error)?;
    debug!(path = %dir.display(), "saved embedding index");
    Ok(())
}

fn check_dimensions(vector: &[f32], expected: usize) -> Result<()> {
    if vector.len() != expected {
        return Err(ChatscrollError::index_build(format!(
            "embedding dimensions mismatch: expected {expected}, got {}",
            vector.len()
        )));
    }
    Ok(())
}

fn index_error(err: impl fmt::Display) -> ChatscrollError {
    ChatscrollError::index_build(format!("vector index: {err}"))
}

fn cache_error(err: std::io::Error) -> ChatscrollError {
    ChatscrollError::index_build(format!("index cache: {err}"))
}
