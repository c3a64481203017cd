//! # Core Module
//!
//! The UI-agnostic curation engine.
//!
//! ## Modules
//! - `scanner` - Discovers image files in directories
//! - `loader` - Decodes and normalizes images into tensors
//! - `embedder` - Extracts fixed-length embeddings via a truncated backbone
//! - `ranker` - Scores and sorts all pairs, aggregates dissimilarity
//! - `curator` - Orchestrates the pipeline and exposes the two views
//! - `presenter` - The review-and-delete collaborator

pub mod curator;
pub mod embedder;
pub mod loader;
pub mod presenter;
pub mod ranker;
pub mod scanner;

// Re-export commonly used types
pub use curator::{Curator, CuratorConfig, DEFAULT_NUM_PAIRS};
pub use embedder::{EmbeddingMatrix, EmbeddingModel, VggConfig, VggFeatures};
pub use loader::ImageLoader;
pub use presenter::{ConsolePresenter, ReviewPresenter};
pub use ranker::{Pair, ScoredPair};
pub use scanner::{ImageScanner, ScanConfig};
