//! # Curator Module
//!
//! Orchestrates the whole pipeline and exposes the two review views.
//!
//! Construction is synchronous and all-or-nothing: every image is loaded,
//! embedded, and all pairs are scored before `new` returns. A single bad
//! file aborts the build — there is no partial result. After construction
//! the instance is read-only; both views can be called repeatedly against
//! the cached ranking, and paths deleted in the meantime are silently
//! filtered out at presentation time.

use crate::core::embedder::{self, EmbeddingMatrix, EmbeddingModel};
use crate::core::loader::ImageLoader;
use crate::core::presenter::ReviewPresenter;
use crate::core::ranker::{self, ScoredPair};
use crate::error::{CuratorError, Result};
use std::path::PathBuf;
use tracing::debug;

/// Pairs shown by `duplicate_detection` when no limit is given
pub const DEFAULT_NUM_PAIRS: usize = 100;

/// Images per review page in the garbage view
const GARBAGE_DISPLAY_BATCH: usize = 4;

/// Construction parameters
#[derive(Debug, Clone)]
pub struct CuratorConfig {
    /// Square edge images are resized to before embedding. Matches the
    /// backbone's expected input; lower it only for memory pressure.
    pub image_size: usize,
    /// Images embedded per inference batch. Bounds peak memory; the last
    /// batch may be smaller.
    pub batch_size: usize,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            image_size: 224,
            batch_size: 16,
        }
    }
}

/// Finds near-duplicate pairs and outlier images in a single-class set.
pub struct Curator {
    paths: Vec<PathBuf>,
    embeddings: EmbeddingMatrix,
    results: Vec<ScoredPair>,
}

impl Curator {
    /// Build a curator by embedding and ranking every image in `paths`.
    pub fn new(
        paths: Vec<PathBuf>,
        config: &CuratorConfig,
        model: &dyn EmbeddingModel,
    ) -> Result<Self> {
        Self::with_progress(paths, config, model, |_, _, _| {})
    }

    /// Like [`Curator::new`] with a `(phase, current, total)` callback.
    pub fn with_progress<F>(
        paths: Vec<PathBuf>,
        config: &CuratorConfig,
        model: &dyn EmbeddingModel,
        mut on_progress: F,
    ) -> Result<Self>
    where
        F: FnMut(&str, usize, usize),
    {
        if paths.is_empty() {
            return Err(CuratorError::Config("no images to curate".to_string()));
        }
        if config.batch_size == 0 {
            return Err(CuratorError::Config(
                "batch_size must be at least 1".to_string(),
            ));
        }

        on_progress("Embedding", 0, paths.len());
        let loader = ImageLoader::new(config.image_size, model.device().clone());
        let embeddings = embedder::extract(
            &loader,
            &paths,
            config.batch_size,
            model,
            |done, total| on_progress("Embedding", done, total),
        )?;

        on_progress("Ranking", 0, 0);
        let results = ranker::rank_pairs(&embeddings);
        on_progress("Ranking", results.len(), results.len());

        debug!(
            images = paths.len(),
            width = embeddings.width(),
            pairs = results.len(),
            "curator ready"
        );

        Ok(Self {
            paths,
            embeddings,
            results,
        })
    }

    /// Build a curator from precomputed embeddings.
    ///
    /// The injection seam for tests and for callers that already hold
    /// vectors; row i must correspond to `paths[i]`.
    pub fn from_embeddings(paths: Vec<PathBuf>, embeddings: EmbeddingMatrix) -> Result<Self> {
        if paths.len() != embeddings.len() {
            return Err(CuratorError::Config(format!(
                "{} paths but {} embedding rows",
                paths.len(),
                embeddings.len()
            )));
        }

        let results = ranker::rank_pairs(&embeddings);
        Ok(Self {
            paths,
            embeddings,
            results,
        })
    }

    /// Number of images in the set
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True when the curator holds no images
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// The curated paths, in embedding-row order
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// All scored pairs, ascending by score
    pub fn results(&self) -> &[ScoredPair] {
        &self.results
    }

    /// Embedding width of the underlying matrix
    pub fn embedding_width(&self) -> usize {
        self.embeddings.width()
    }

    /// Per-image aggregate dissimilarity scores, index-aligned with paths
    pub fn aggregate_scores(&self) -> Vec<f64> {
        ranker::aggregate_scores(&self.results, self.paths.len())
    }

    /// The most-similar pairs as a flat path list [a0, b0, a1, b1, ...].
    ///
    /// Takes the `num_pairs` lowest-scoring pairs and drops any pair whose
    /// two files are not both still on disk. Idempotent while the
    /// underlying files are untouched.
    pub fn duplicate_pairs(&self, num_pairs: usize) -> Vec<PathBuf> {
        let mut flat = Vec::new();

        for entry in self.results.iter().take(num_pairs) {
            let first = &self.paths[entry.pair.a];
            let second = &self.paths[entry.pair.b];

            if first.exists() && second.exists() {
                flat.push(first.clone());
                flat.push(second.clone());
            }
        }

        flat
    }

    /// Every surviving image, most dissimilar first.
    pub fn garbage_ranking(&self) -> Vec<PathBuf> {
        let scores = self.aggregate_scores();

        ranker::garbage_order(&scores)
            .into_iter()
            .map(|index| &self.paths[index])
            .filter(|path| path.exists())
            .cloned()
            .collect()
    }

    /// Present the most similar pairs two at a time for manual removal.
    pub fn duplicate_detection(
        &self,
        num_pairs: usize,
        presenter: &mut dyn ReviewPresenter,
    ) -> Result<()> {
        let paths = self.duplicate_pairs(num_pairs);
        presenter.review(&paths, 2)?;
        Ok(())
    }

    /// Present all images in order of dissimilarity for manual removal.
    pub fn garbage_detection(&self, presenter: &mut dyn ReviewPresenter) -> Result<()> {
        let paths = self.garbage_ranking();
        presenter.review(&paths, GARBAGE_DISPLAY_BATCH)?;
        Ok(())
    }
}
