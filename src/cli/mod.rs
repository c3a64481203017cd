//! # CLI Module
//!
//! Command-line interface for the image curator.
//!
//! ## Usage
//! ```bash
//! # Rank near-duplicate pairs in a dataset folder
//! curate duplicates ~/dataset/cats --weights vgg19.safetensors
//!
//! # Review and delete interactively
//! curate duplicates ~/dataset/cats --weights vgg19.safetensors --review
//!
//! # Rank outliers, JSON output
//! curate garbage ~/dataset/cats --weights vgg19.safetensors --output json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use image_curator::core::ranker;
use image_curator::core::{
    ConsolePresenter, Curator, CuratorConfig, ImageScanner, ScanConfig, VggConfig,
    VggFeatures, DEFAULT_NUM_PAIRS,
};
use image_curator::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;

/// Image Curator - surface near-duplicates and outliers in an image set
#[derive(Parser, Debug)]
#[command(name = "curate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank image pairs by similarity, most similar first
    Duplicates {
        #[command(flatten)]
        args: PipelineArgs,

        /// Number of top pairs to present
        #[arg(short, long, default_value_t = DEFAULT_NUM_PAIRS)]
        pairs: usize,
    },

    /// Rank images by aggregate dissimilarity, most atypical first
    Garbage {
        #[command(flatten)]
        args: PipelineArgs,
    },
}

/// Arguments shared by both pipeline subcommands
#[derive(Args, Debug)]
struct PipelineArgs {
    /// Directories containing the image set (one semantic class)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// VGG19 weights in torchvision safetensors layout
    #[arg(short, long, default_value = "vgg19.safetensors")]
    weights: PathBuf,

    /// Conv layers to keep from the backbone (1-16; earlier = texture,
    /// later = semantics)
    #[arg(long, default_value_t = 4)]
    conv_layers: usize,

    /// Square size images are resized to before embedding
    #[arg(long, default_value_t = 224)]
    image_size: usize,

    /// Images per inference batch (lower this if memory is tight)
    #[arg(short, long, default_value_t = 16)]
    batch_size: usize,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Review interactively and delete marked files
    #[arg(long)]
    review: bool,

    /// Include hidden files
    #[arg(long)]
    include_hidden: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (paths only)
    Minimal,
}

#[derive(Serialize)]
struct PairReport {
    first: PathBuf,
    second: PathBuf,
    score: f64,
}

#[derive(Serialize)]
struct GarbageReport {
    path: PathBuf,
    score: f64,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Duplicates { args, pairs } => run_duplicates(args, pairs),
        Commands::Garbage { args } => run_garbage(args),
    }
}

fn init(args: &PipelineArgs) {
    if args.verbose && std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "image_curator=debug");
    }
    image_curator::init_tracing();
}

fn print_header(output: OutputFormat) {
    if matches!(output, OutputFormat::Pretty) {
        let term = Term::stderr();
        term.write_line(&format!(
            "{} {}",
            style("Image Curator").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }
}

fn build_curator(args: &PipelineArgs) -> Result<Curator> {
    let scanner = ImageScanner::new(ScanConfig {
        include_hidden: args.include_hidden,
        ..Default::default()
    });
    let paths = scanner.scan(&args.paths)?;

    let vgg_config = VggConfig::new(args.weights.clone()).depth(args.conv_layers);
    let model = VggFeatures::load(&vgg_config)?;

    let config = CuratorConfig {
        image_size: args.image_size,
        batch_size: args.batch_size,
    };

    let progress = if matches!(args.output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(paths.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("static progress template"),
        );
        Some(pb)
    } else {
        None
    };

    let curator = Curator::with_progress(paths, &config, &model, |phase, current, total| {
        if let Some(pb) = &progress {
            pb.set_message(phase.to_string());
            pb.set_length(total.max(1) as u64);
            pb.set_position(current as u64);
        }
    })?;

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    Ok(curator)
}

fn run_duplicates(args: PipelineArgs, pairs: usize) -> Result<()> {
    init(&args);
    print_header(args.output);

    let curator = build_curator(&args)?;

    if args.review {
        let mut presenter = ConsolePresenter::new();
        return curator.duplicate_detection(pairs, &mut presenter);
    }

    let reports: Vec<PairReport> = curator
        .results()
        .iter()
        .take(pairs)
        .filter(|entry| {
            curator.paths()[entry.pair.a].exists() && curator.paths()[entry.pair.b].exists()
        })
        .map(|entry| PairReport {
            first: curator.paths()[entry.pair.a].clone(),
            second: curator.paths()[entry.pair.b].clone(),
            score: entry.score,
        })
        .collect();

    match args.output {
        OutputFormat::Pretty => {
            println!(
                "{} most similar pairs (of {} total):",
                reports.len(),
                curator.results().len()
            );
            for report in &reports {
                println!(
                    "  {:>12.6}  {} {} {}",
                    report.score,
                    report.first.display(),
                    style("<->").dim(),
                    report.second.display()
                );
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&reports).expect("reports serialize")
            );
        }
        OutputFormat::Minimal => {
            for path in curator.duplicate_pairs(pairs) {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

fn run_garbage(args: PipelineArgs) -> Result<()> {
    init(&args);
    print_header(args.output);

    let curator = build_curator(&args)?;

    if args.review {
        let mut presenter = ConsolePresenter::new();
        return curator.garbage_detection(&mut presenter);
    }

    let scores = curator.aggregate_scores();
    let reports: Vec<GarbageReport> = ranker::garbage_order(&scores)
        .into_iter()
        .filter(|&index| curator.paths()[index].exists())
        .map(|index| GarbageReport {
            path: curator.paths()[index].clone(),
            score: scores[index],
        })
        .collect();

    match args.output {
        OutputFormat::Pretty => {
            println!("{} images, most dissimilar first:", reports.len());
            for report in &reports {
                println!("  {:>14.6}  {}", report.score, report.path.display());
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&reports).expect("reports serialize")
            );
        }
        OutputFormat::Minimal => {
            for report in &reports {
                println!("{}", report.path.display());
            }
        }
    }

    Ok(())
}
