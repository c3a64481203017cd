//! # Error Module
//!
//! Error types for the image curator, one enum per pipeline stage.
//!
//! ## Design Principles
//! - **Include context** - paths, file names, what went wrong
//! - **Fail construction loudly** - a bad image aborts the whole build,
//!   there is no partial embedding matrix
//! - **Filter quietly at presentation** - files deleted after construction
//!   are skipped, never surfaced as errors

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum CuratorError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Image loading error: {0}")]
    Load(#[from] LoadError),

    #[error("Embedding error: {0}")]
    Embed(#[from] EmbedError),

    #[error("Presentation error: {0}")]
    Present(#[from] PresentError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while discovering image files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read directory entry {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while loading an image into a tensor
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Image is empty or corrupted: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Failed to build tensor for {path}: {reason}")]
    Tensor { path: PathBuf, reason: String },
}

/// Errors that occur while extracting embeddings
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("Weights file not found: {path}")]
    WeightsNotFound { path: PathBuf },

    #[error("Failed to load weights from {path}: {reason}")]
    WeightsLoad { path: PathBuf, reason: String },

    #[error("Unsupported truncation depth: {value} (must be 1-16 conv layers)")]
    InvalidDepth { value: usize },

    #[error("Model returned {actual}-dim embeddings, expected {expected}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("Model returned {actual} embedding rows for a batch of {expected} images")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("Inference failed: {0}")]
    Backend(#[from] candle_core::Error),
}

/// Errors that occur while presenting results for review
#[derive(Error, Debug)]
pub enum PresentError {
    #[error("Interactive prompt failed: {0}")]
    Prompt(String),

    #[error("Failed to delete {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, CuratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/class-a"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/class-a"));
    }

    #[test]
    fn load_error_includes_path_and_reason() {
        let error = LoadError::Decode {
            path: PathBuf::from("/photos/broken.jpg"),
            reason: "invalid JPEG".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/broken.jpg"));
        assert!(message.contains("invalid JPEG"));
    }

    #[test]
    fn embed_error_reports_depth_bounds() {
        let error = EmbedError::InvalidDepth { value: 99 };
        let message = error.to_string();
        assert!(message.contains("99"));
        assert!(message.contains("1-16"));
    }

    #[test]
    fn errors_convert_to_top_level() {
        let error: CuratorError = ScanError::DirectoryNotFound {
            path: PathBuf::from("/nope"),
        }
        .into();
        assert!(matches!(error, CuratorError::Scan(_)));
    }
}
