//! Truncated VGG19 feature extractor.
//!
//! Reuses the convolutional prefix of a pretrained VGG19 as a fixed
//! feature extractor: ReLU runs between kept convs, a 2×2 max-pool sits
//! between blocks, and the raw output of the last kept conv — no final
//! activation — is globally average-pooled to one value per channel. The truncation depth is
//! explicit configuration — early layers capture low-level texture
//! similarity, later layers increasingly semantic similarity. The default
//! of 4 conv layers yields a 128-dim embedding.
//!
//! Weights are expected in the torchvision layout (`features.N.weight` /
//! `features.N.bias`) as a safetensors file, loaded once per extractor.

use super::EmbeddingModel;
use crate::error::EmbedError;
use candle_core::{DType, Device, Tensor};
use candle_nn::{Conv2d, Conv2dConfig, Module, VarBuilder};
use std::path::PathBuf;
use tracing::info;

/// VGG19 block layout: (convs per block, output channels)
const BLOCKS: [(usize, usize); 5] = [(2, 64), (2, 128), (4, 256), (4, 512), (4, 512)];

/// Total conv layers in the VGG19 feature stack
const MAX_DEPTH: usize = 16;

/// Configuration for the truncated backbone
#[derive(Debug, Clone)]
pub struct VggConfig {
    /// Path to VGG19 weights in torchvision safetensors layout
    pub weights: PathBuf,
    /// Number of conv layers to keep (1-16)
    pub depth: usize,
}

impl VggConfig {
    /// Configuration with the reference truncation depth of 4 conv layers.
    pub fn new(weights: PathBuf) -> Self {
        Self { weights, depth: 4 }
    }

    /// Set the truncation depth (number of conv layers kept).
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }
}

/// One kept conv layer and where the torchvision weights for it live
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConvSpec {
    /// Index N in torchvision `features.N`
    pub feature_index: usize,
    pub in_channels: usize,
    pub out_channels: usize,
    /// A 2×2 max-pool runs before this conv (block boundary)
    pub pool_before: bool,
}

/// Layer plan for the first `depth` conv layers of VGG19.
///
/// Pure function of the depth so the weight indices and channel widths are
/// testable without a weights file.
pub(crate) fn feature_plan(depth: usize) -> Result<Vec<ConvSpec>, EmbedError> {
    if depth == 0 || depth > MAX_DEPTH {
        return Err(EmbedError::InvalidDepth { value: depth });
    }

    let mut specs = Vec::with_capacity(depth);
    let mut feature_index = 0;
    let mut in_channels = 3;

    for (block, &(convs, out_channels)) in BLOCKS.iter().enumerate() {
        for conv_in_block in 0..convs {
            specs.push(ConvSpec {
                feature_index,
                in_channels,
                out_channels,
                pool_before: block > 0 && conv_in_block == 0,
            });

            if specs.len() == depth {
                return Ok(specs);
            }

            in_channels = out_channels;
            feature_index += 2; // conv + relu
        }
        feature_index += 1; // max pool
    }

    unreachable!("depth bounded by MAX_DEPTH")
}

struct ConvLayer {
    conv: Conv2d,
    pool_before: bool,
}

/// Truncated VGG19 backbone implementing [`EmbeddingModel`]
pub struct VggFeatures {
    layers: Vec<ConvLayer>,
    width: usize,
    device: Device,
}

impl VggFeatures {
    /// Load the backbone from `config.weights`, preferring CUDA when built
    /// with GPU support. Backend choice has no effect on the embeddings.
    pub fn load(config: &VggConfig) -> Result<Self, EmbedError> {
        if !config.weights.is_file() {
            return Err(EmbedError::WeightsNotFound {
                path: config.weights.clone(),
            });
        }

        let device = Device::cuda_if_available(0)?;
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[config.weights.clone()], DType::F32, &device)
        }
        .map_err(|e| EmbedError::WeightsLoad {
            path: config.weights.clone(),
            reason: e.to_string(),
        })?;

        let model = Self::from_var_builder(vb, config.depth, device)?;
        info!(
            depth = config.depth,
            width = model.width,
            weights = %config.weights.display(),
            "loaded VGG backbone"
        );
        Ok(model)
    }

    /// Build the truncated stack from an arbitrary [`VarBuilder`].
    pub(crate) fn from_var_builder(
        vb: VarBuilder,
        depth: usize,
        device: Device,
    ) -> Result<Self, EmbedError> {
        let plan = feature_plan(depth)?;
        let width = plan.last().map(|s| s.out_channels).unwrap_or(0);

        let conv_cfg = Conv2dConfig {
            padding: 1,
            ..Default::default()
        };

        let mut layers = Vec::with_capacity(plan.len());
        for spec in &plan {
            let conv = candle_nn::conv2d(
                spec.in_channels,
                spec.out_channels,
                3,
                conv_cfg,
                vb.pp(format!("features.{}", spec.feature_index)),
            )?;
            layers.push(ConvLayer {
                conv,
                pool_before: spec.pool_before,
            });
        }

        Ok(Self {
            layers,
            width,
            device,
        })
    }
}

impl EmbeddingModel for VggFeatures {
    fn width(&self) -> usize {
        self.width
    }

    fn device(&self) -> &Device {
        &self.device
    }

    fn embed(&self, batch: &Tensor) -> Result<Tensor, EmbedError> {
        let mut x = batch.clone();
        let last = self.layers.len() - 1;

        for (index, layer) in self.layers.iter().enumerate() {
            if layer.pool_before {
                x = x.max_pool2d(2)?;
            }
            x = layer.conv.forward(&x)?;
            // The stack is truncated right after the last kept conv: its
            // raw pre-activation output feeds the pooling, so ReLU only
            // runs between kept convs.
            if index < last {
                x = x.relu()?;
            }
        }

        // Global average pool to 1×1 spatial, flattened to (B, W)
        Ok(x.mean(3)?.mean(2)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_default_depth_matches_torchvision_layout() {
        let plan = feature_plan(4).unwrap();

        let indices: Vec<_> = plan.iter().map(|s| s.feature_index).collect();
        assert_eq!(indices, vec![0, 2, 5, 7]);

        let pools: Vec<_> = plan.iter().map(|s| s.pool_before).collect();
        assert_eq!(pools, vec![false, false, true, false]);

        assert_eq!(plan.last().unwrap().out_channels, 128);
    }

    #[test]
    fn plan_full_depth_reaches_last_conv() {
        let plan = feature_plan(16).unwrap();

        assert_eq!(plan.len(), 16);
        assert_eq!(plan.last().unwrap().feature_index, 34);
        assert_eq!(plan.last().unwrap().out_channels, 512);
    }

    #[test]
    fn plan_rejects_out_of_range_depth() {
        assert!(matches!(
            feature_plan(0),
            Err(EmbedError::InvalidDepth { value: 0 })
        ));
        assert!(matches!(
            feature_plan(17),
            Err(EmbedError::InvalidDepth { value: 17 })
        ));
    }

    #[test]
    fn plan_channel_widths_chain() {
        let plan = feature_plan(16).unwrap();
        assert_eq!(plan[0].in_channels, 3);
        for window in plan.windows(2) {
            assert_eq!(window[0].out_channels, window[1].in_channels);
        }
    }

    #[test]
    fn config_defaults_to_four_conv_layers() {
        let config = VggConfig::new(PathBuf::from("vgg19.safetensors"));
        assert_eq!(config.depth, 4);

        let config = config.depth(8);
        assert_eq!(config.depth, 8);
    }

    #[test]
    fn forward_shape_matches_plan_width() {
        // Zero-filled weights are enough to verify tensor plumbing.
        let device = Device::Cpu;
        let vb = VarBuilder::zeros(DType::F32, &device);
        let model = VggFeatures::from_var_builder(vb, 4, device.clone()).unwrap();

        let batch = Tensor::zeros((2, 3, 64, 64), DType::F32, &device).unwrap();
        let out = model.embed(&batch).unwrap();

        assert_eq!(out.dims2().unwrap(), (2, 128));
        assert_eq!(model.width(), 128);
    }

    #[test]
    fn final_conv_output_is_not_clamped() {
        // Zero weights with a negative bias: the last kept conv outputs
        // -1 everywhere, and that sign must survive into the embedding.
        let device = Device::Cpu;
        let mut weights = std::collections::HashMap::new();
        weights.insert(
            "features.0.weight".to_string(),
            Tensor::zeros((64, 3, 3, 3), DType::F32, &device).unwrap(),
        );
        weights.insert(
            "features.0.bias".to_string(),
            Tensor::full(-1.0f32, 64, &device).unwrap(),
        );

        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = VggFeatures::from_var_builder(vb, 1, device.clone()).unwrap();

        let batch = Tensor::ones((1, 3, 8, 8), DType::F32, &device).unwrap();
        let out = model.embed(&batch).unwrap().to_vec2::<f32>().unwrap();

        assert_eq!(out[0].len(), 64);
        for value in &out[0] {
            assert_eq!(*value, -1.0);
        }
    }

    #[test]
    fn relu_runs_between_kept_convs() {
        // First conv pre-activation is -2 everywhere; the intermediate
        // ReLU zeroes it, so the second conv sees zero input and every
        // output equals its own bias.
        let device = Device::Cpu;
        let mut weights = std::collections::HashMap::new();
        weights.insert(
            "features.0.weight".to_string(),
            Tensor::zeros((64, 3, 3, 3), DType::F32, &device).unwrap(),
        );
        weights.insert(
            "features.0.bias".to_string(),
            Tensor::full(-2.0f32, 64, &device).unwrap(),
        );
        weights.insert(
            "features.2.weight".to_string(),
            Tensor::ones((64, 64, 3, 3), DType::F32, &device).unwrap(),
        );
        weights.insert(
            "features.2.bias".to_string(),
            Tensor::full(0.25f32, 64, &device).unwrap(),
        );

        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = VggFeatures::from_var_builder(vb, 2, device.clone()).unwrap();

        let batch = Tensor::ones((1, 3, 8, 8), DType::F32, &device).unwrap();
        let out = model.embed(&batch).unwrap().to_vec2::<f32>().unwrap();

        for value in &out[0] {
            assert_eq!(*value, 0.25);
        }
    }

    #[test]
    fn load_missing_weights_file_fails_fast() {
        let config = VggConfig::new(PathBuf::from("/nonexistent/vgg19.safetensors"));
        let result = VggFeatures::load(&config);
        assert!(matches!(result, Err(EmbedError::WeightsNotFound { .. })));
    }
}
