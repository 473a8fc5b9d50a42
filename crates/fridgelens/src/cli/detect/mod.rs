//! The `fridgelens detect` command.

mod batch;
mod setup;
pub mod types;

pub use types::{BackendKind, Mode, OutputFormat};

use clap::Args;
use fridgelens_core::output::write_json;
use fridgelens_core::Config;
use std::path::PathBuf;
use std::process::ExitCode;

use batch::run_batch;
use setup::setup_detection;

/// Arguments for the `detect` command.
#[derive(Args, Debug, Default)]
pub struct DetectArgs {
    /// Image directory (defaults to `discovery.image_dir`)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Detection backend (defaults to `detector.backend`)
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendKind>,

    /// API key for the selected backend (overrides environment and config)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model id (Roboflow, e.g. "fridgevision/3") or model name (Gemini)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Print the raw backend response for each image
    #[arg(long)]
    pub show_raw: bool,

    /// Print bounding boxes and confidences
    #[arg(long)]
    pub show_boxes: bool,

    /// Write `<name>_annotated.jpg` with the boxes drawn next to each image
    #[arg(long)]
    pub annotate: bool,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Write per-image results to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Format of the per-image results file (defaults to `output.format`)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Fold synonyms (egg, 卵, 玉子 ...) onto one name before aggregating
    #[arg(long)]
    pub canonicalize: bool,

    /// Images processed concurrently (defaults to `detector.parallel`)
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Skip the DNS pre-check of the backend host
    #[arg(long)]
    pub no_dns_check: bool,
}

/// Execute the detect command.
///
/// Exit code 0 only when at least one image was found and every image
/// succeeded.
pub async fn execute(args: DetectArgs, config: Config) -> anyhow::Result<ExitCode> {
    if detect(args, config).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

async fn detect(args: DetectArgs, config: Config) -> anyhow::Result<bool> {
    let ctx = setup_detection(&args, config)?;

    if !ctx.image_dir.is_dir() {
        tracing::error!("Image directory not found: {}", ctx.image_dir.display());
        return Ok(false);
    }

    let files = ctx.discover();
    if files.is_empty() {
        tracing::warn!("No supported image files found in {}", ctx.image_dir.display());
        return Ok(false);
    }
    tracing::info!(
        "Found {} image(s) in {}, using {}",
        files.len(),
        ctx.image_dir.display(),
        ctx.detector.backend_name()
    );

    let aggregated = run_batch(&ctx, &args, files).await?;
    write_json(&mut std::io::stdout().lock(), &aggregated, ctx.config.output.pretty)?;

    Ok(aggregated.all_succeeded())
}
