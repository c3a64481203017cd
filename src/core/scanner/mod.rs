//! # Scanner Module
//!
//! Discovers image files under one or more directories.
//!
//! The curator expects an ordered path list; the scanner produces one by
//! walking each root recursively, keeping files with a known image
//! extension, skipping hidden entries, and sorting the result
//! lexicographically so the embedding matrix row order is reproducible
//! across runs.

use crate::error::ScanError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions treated as images (lowercase, without the dot)
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff",
];

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: false,
            max_depth: None,
        }
    }
}

/// Scanner implementation using the walkdir crate
pub struct ImageScanner {
    config: ScanConfig,
}

impl ImageScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Collect image paths under all roots, sorted lexicographically.
    pub fn scan(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
        let mut paths = Vec::new();

        for root in roots {
            self.scan_directory(root, &mut paths)?;
        }

        paths.sort();
        Ok(paths)
    }

    fn scan_directory(
        &self,
        root: &Path,
        paths: &mut Vec<PathBuf>,
    ) -> Result<(), ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut walker = WalkDir::new(root).follow_links(self.config.follow_symlinks);

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        for entry_result in walker {
            let entry = entry_result.map_err(|e| {
                let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("walk error"));
                ScanError::ReadEntry { path, source }
            })?;

            let path = entry.path();

            if path.is_dir() {
                continue;
            }

            if !self.config.include_hidden && is_hidden(path) {
                continue;
            }

            if is_image(path) {
                paths.push(path.to_path_buf());
            }
        }

        Ok(())
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap();
        path
    }

    #[test]
    fn scan_empty_directory_returns_empty_vec() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = ImageScanner::new(ScanConfig::default());

        let paths = scanner.scan(&[temp_dir.path().to_path_buf()]).unwrap();
        assert!(paths.is_empty());
    }

    #[test]
    fn scan_finds_images_and_skips_other_files() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "photo.jpg");
        touch(&temp_dir, "photo.png");
        touch(&temp_dir, "notes.txt");
        touch(&temp_dir, "document.pdf");

        let scanner = ImageScanner::new(ScanConfig::default());
        let paths = scanner.scan(&[temp_dir.path().to_path_buf()]).unwrap();

        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn scan_output_is_sorted() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "b.jpg");
        touch(&temp_dir, "a.jpg");
        touch(&temp_dir, "c.jpg");

        let scanner = ImageScanner::new(ScanConfig::default());
        let paths = scanner.scan(&[temp_dir.path().to_path_buf()]).unwrap();

        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }

    #[test]
    fn scan_traverses_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        touch(&temp_dir, "root.jpg");
        File::create(subdir.join("nested.jpg")).unwrap();

        let scanner = ImageScanner::new(ScanConfig::default());
        let paths = scanner.scan(&[temp_dir.path().to_path_buf()]).unwrap();

        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn scan_excludes_hidden_files_by_default() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "visible.jpg");
        touch(&temp_dir, ".hidden.jpg");

        let scanner = ImageScanner::new(ScanConfig::default());
        let paths = scanner.scan(&[temp_dir.path().to_path_buf()]).unwrap();

        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("visible.jpg"));
    }

    #[test]
    fn scan_can_include_hidden_files() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir, "visible.jpg");
        touch(&temp_dir, ".hidden.jpg");

        let config = ScanConfig {
            include_hidden: true,
            ..Default::default()
        };
        let scanner = ImageScanner::new(config);
        let paths = scanner.scan(&[temp_dir.path().to_path_buf()]).unwrap();

        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn scan_nonexistent_directory_returns_error() {
        let scanner = ImageScanner::new(ScanConfig::default());
        let result = scanner.scan(&[PathBuf::from("/nonexistent/path/12345")]);

        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }
}
