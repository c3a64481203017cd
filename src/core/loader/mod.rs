//! # Loader Module
//!
//! Turns an image file into a normalized tensor the embedding backbone can
//! consume.
//!
//! ## Pipeline
//! 1. Decode with the `image` crate, forcing 3-channel RGB
//! 2. Resize to a square (default 224, bilinear)
//! 3. Scale to [0, 1] and normalize per channel with the ImageNet
//!    statistics the pretrained backbone was trained against
//!
//! Any failure here is fatal to curator construction: a corrupt file means
//! no embedding matrix, not a partial one.

use crate::error::LoadError;
use candle_core::{DType, Device, Tensor};
use image::imageops::FilterType;
use image::ImageReader;
use std::path::Path;

/// Per-channel mean of the backbone's training distribution
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// Per-channel standard deviation of the backbone's training distribution
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Loads image files as normalized (3, S, S) tensors
#[derive(Debug, Clone)]
pub struct ImageLoader {
    size: usize,
    device: Device,
}

impl ImageLoader {
    /// Create a loader producing `size`×`size` tensors on `device`.
    pub fn new(size: usize, device: Device) -> Self {
        Self { size, device }
    }

    /// The square edge length of produced tensors
    pub fn size(&self) -> usize {
        self.size
    }

    /// Load one image as a normalized CHW tensor of shape (3, S, S).
    pub fn load(&self, path: &Path) -> Result<Tensor, LoadError> {
        let reader = ImageReader::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let img = reader.decode().map_err(|e| LoadError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if img.width() == 0 || img.height() == 0 {
            return Err(LoadError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        let img = img
            .resize_exact(self.size as u32, self.size as u32, FilterType::Triangle)
            .to_rgb8();

        self.to_tensor(img.into_raw())
            .map_err(|e| LoadError::Tensor {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
    }

    fn to_tensor(&self, raw: Vec<u8>) -> candle_core::Result<Tensor> {
        let tensor = Tensor::from_vec(raw, (self.size, self.size, 3), &self.device)?
            .permute((2, 0, 1))?
            .to_dtype(DType::F32)?
            .affine(1.0 / 255.0, 0.0)?;

        let mean = Tensor::new(&IMAGENET_MEAN, &self.device)?.reshape((3, 1, 1))?;
        let std = Tensor::new(&IMAGENET_STD, &self.device)?.reshape((3, 1, 1))?;

        tensor.broadcast_sub(&mean)?.broadcast_div(&std)
    }
}
