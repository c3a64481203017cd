//! # curate CLI
//!
//! Command-line interface for the image curator.
//!
//! ## Usage
//! ```bash
//! curate duplicates ~/dataset/cats --weights vgg19.safetensors --review
//! curate garbage ~/dataset/cats --weights vgg19.safetensors --output json
//! ```

mod cli;

use image_curator::Result;

fn main() -> Result<()> {
    cli::run()
}
