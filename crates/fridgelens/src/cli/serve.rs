//! The `fridgelens serve` command.

use clap::Args;
use fridgelens_core::config::ServerMode;
use fridgelens_core::{Config, Detector};
use std::path::PathBuf;
use std::sync::Arc;

use super::detect::{BackendKind, Mode};

/// Arguments for the `serve` command.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to listen on (defaults to `server.bind`)
    #[arg(long)]
    pub bind: Option<String>,

    /// Response mode (defaults to `server.mode`)
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Detection backend in detect mode
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendKind>,

    /// API key for the selected backend
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model id or name for the selected backend
    #[arg(short, long)]
    pub model: Option<String>,

    /// File that must exist for stub mode to answer
    #[arg(long)]
    pub sample_image: Option<PathBuf>,
}

/// Fold the CLI overrides into the config.
fn apply_overrides(args: &ServeArgs, config: &mut Config) {
    if let Some(bind) = &args.bind {
        config.server.bind = bind.clone();
    }
    if let Some(mode) = args.mode {
        config.server.mode = mode.into();
    }
    if let Some(backend) = args.backend {
        config.detector.backend = backend.as_str().to_string();
    }
    if let Some(sample) = &args.sample_image {
        config.server.sample_image = sample.clone();
    }
}

/// Build the detector for detect mode; `None` in stub mode.
///
/// Fails when no credential resolves or the backend host does not resolve.
async fn build_detector(args: &ServeArgs, config: &Config) -> anyhow::Result<Option<Arc<Detector>>> {
    if config.server.mode != ServerMode::Detect {
        return Ok(None);
    }

    let detector = Detector::from_config(
        config,
        &config.detector.backend,
        args.api_key.as_deref(),
        args.model.as_deref(),
    )?;

    if config.detector.dns_precheck {
        detector.check_network().await?;
    }

    Ok(Some(Arc::new(detector)))
}

/// Execute the serve command. Runs until Ctrl-C.
pub async fn execute(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&args, &mut config);
    config.server.sample_image = config.sample_image();

    let detector = build_detector(&args, &config).await?;
    fridgelens_core::server::serve(&config.server, detector).await?;
    Ok(())
}
