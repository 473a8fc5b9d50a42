//! The `fridgelens samples` command.

use clap::Args;
use fridgelens_core::config::expand_path;
use fridgelens_core::pipeline::SampleGenerator;
use fridgelens_core::Config;
use std::path::PathBuf;

/// Arguments for the `samples` command.
#[derive(Args, Debug, Default)]
pub struct SamplesArgs {
    /// Output directory (defaults to `discovery.image_dir`)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}

/// Write the default set of synthetic fridge photos.
pub async fn execute(args: SamplesArgs, config: &Config) -> anyhow::Result<()> {
    let dir = match &args.dir {
        Some(dir) => expand_path(dir),
        None => config.image_dir(),
    };

    let written = generate(dir.clone()).await?;

    println!("Wrote {} sample image(s) to {}", written.len(), dir.display());
    for path in &written {
        println!("  {}", path.display());
    }
    println!("Foods drawn: {}", SampleGenerator::food_names().join(", "));
    Ok(())
}

async fn generate(dir: PathBuf) -> anyhow::Result<Vec<PathBuf>> {
    let written = tokio::task::spawn_blocking(move || SampleGenerator::generate_default_set(&dir)).await??;
    Ok(written)
}
