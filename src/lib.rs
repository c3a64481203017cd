//! # Image Curator
//!
//! Curates a folder of images belonging to one class by surfacing near
//! duplicates and outliers, so unwanted files can be reviewed and removed
//! by hand.
//!
//! ## How it works
//! Every image is embedded with the convolutional prefix of a pretrained
//! VGG19 (truncated early, globally average-pooled), all N·(N-1)/2 pairs
//! are scored by mean squared error, and the ranking drives two views:
//! most-similar pairs first (duplicates) and highest total dissimilarity
//! first (garbage).
//!
//! ## Architecture
//! - `core` - The curation engine (scanner, loader, embedder, ranker,
//!   curator, presenter)
//! - `error` - Per-stage error types
//! - `cli` - Command-line interface
//!
//! All-pairs scoring is quadratic in the number of images; the crate is
//! meant for sets of hundreds to low thousands.

pub mod core;
pub mod error;

// Re-export commonly used types at the crate root
pub use error::{CuratorError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
