//! # Embedder Module
//!
//! Extracts a fixed-length embedding vector per image by running batches
//! of loaded tensors through an [`EmbeddingModel`].
//!
//! The model is an injected dependency rather than hidden global state:
//! production code uses the truncated VGG backbone in [`vgg`], tests use a
//! deterministic double with no real inference. Batching exists purely to
//! bound peak memory; batches run strictly one after another, never in
//! parallel.

pub mod vgg;

pub use vgg::{VggConfig, VggFeatures};

use crate::core::loader::ImageLoader;
use crate::error::{EmbedError, Result};
use candle_core::{Device, Tensor};
use std::path::PathBuf;
use tracing::debug;

/// A stateless image-embedding function.
///
/// Maps a (B, 3, S, S) f32 batch to a (B, W) f32 matrix. Implementations
/// must be deterministic across calls: inference mode only, no dropout, no
/// running-statistic updates.
pub trait EmbeddingModel {
    /// Output dimensionality W of each embedding vector
    fn width(&self) -> usize;

    /// Device input batches must live on
    fn device(&self) -> &Device;

    /// Embed one batch of loaded images.
    fn embed(&self, batch: &Tensor) -> std::result::Result<Tensor, EmbedError>;
}

/// Row-major N×W embedding storage, row i aligned with input path i.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    rows: usize,
    width: usize,
}

impl EmbeddingMatrix {
    /// Create an empty matrix with the given row width.
    pub fn with_width(width: usize) -> Self {
        Self {
            data: Vec::new(),
            rows: 0,
            width,
        }
    }

    /// Build a matrix from explicit rows. All rows must share one width.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> std::result::Result<Self, EmbedError> {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut matrix = Self::with_width(width);
        for row in rows {
            matrix.push_row(&row)?;
        }
        Ok(matrix)
    }

    /// Append one embedding row.
    pub fn push_row(&mut self, row: &[f32]) -> std::result::Result<(), EmbedError> {
        if row.len() != self.width {
            return Err(EmbedError::WidthMismatch {
                expected: self.width,
                actual: row.len(),
            });
        }
        self.data.extend_from_slice(row);
        self.rows += 1;
        Ok(())
    }

    /// Embedding vector for image index `i`
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.width..(i + 1) * self.width]
    }

    /// Number of rows (images)
    pub fn len(&self) -> usize {
        self.rows
    }

    /// True when the matrix holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Row width (embedding dimensionality)
    pub fn width(&self) -> usize {
        self.width
    }
}

/// Load and embed every path, in input order, in sequential batches.
///
/// The callback receives (images embedded so far, total images) after each
/// batch completes. Tensors for only one batch are resident at a time.
pub fn extract<F>(
    loader: &ImageLoader,
    paths: &[PathBuf],
    batch_size: usize,
    model: &dyn EmbeddingModel,
    mut on_progress: F,
) -> Result<EmbeddingMatrix>
where
    F: FnMut(usize, usize),
{
    let mut matrix = EmbeddingMatrix::with_width(model.width());
    let mut embedded = 0;

    for chunk in paths.chunks(batch_size) {
        let mut tensors = Vec::with_capacity(chunk.len());
        for path in chunk {
            tensors.push(loader.load(path)?);
        }

        let batch = Tensor::stack(&tensors, 0).map_err(EmbedError::Backend)?;
        let embeddings = model.embed(&batch)?;

        let (batch_rows, width) = embeddings.dims2().map_err(EmbedError::Backend)?;
        if width != model.width() {
            return Err(EmbedError::WidthMismatch {
                expected: model.width(),
                actual: width,
            }
            .into());
        }
        // Row i must stay aligned with path i; a model that drops or pads
        // rows would silently corrupt every downstream ranking.
        if batch_rows != chunk.len() {
            return Err(EmbedError::RowCountMismatch {
                expected: chunk.len(),
                actual: batch_rows,
            }
            .into());
        }

        for row in embeddings.to_vec2::<f32>().map_err(EmbedError::Backend)? {
            matrix.push_row(&row)?;
        }

        embedded += chunk.len();
        debug!(embedded, total = paths.len(), "embedded batch");
        on_progress(embedded, paths.len());
    }

    Ok(matrix)
}
