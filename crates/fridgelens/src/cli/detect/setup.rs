//! Detection setup: config overrides, detector creation, discovery.

use fridgelens_core::config::expand_path;
use fridgelens_core::pipeline::FileDiscovery;
use fridgelens_core::{Config, Detector, OutputFormat as CoreOutputFormat, RunOptions};
use std::path::PathBuf;
use std::sync::Arc;

use super::DetectArgs;

/// Everything a batch run needs, assembled by [`setup_detection`].
pub(crate) struct DetectContext {
    pub config: Config,
    pub detector: Arc<Detector>,
    pub image_dir: PathBuf,
    pub discovery: FileDiscovery,
    pub run_options: RunOptions,
    pub output_format: CoreOutputFormat,
}

impl DetectContext {
    /// Supported images in the target directory, sorted.
    pub fn discover(&self) -> Vec<PathBuf> {
        self.discovery
            .discover(&self.image_dir)
            .into_iter()
            .map(|f| f.path)
            .collect()
    }
}

/// Apply CLI overrides to the config and build the detector.
///
/// Fails when no credential resolves for the chosen backend.
pub(crate) fn setup_detection(args: &DetectArgs, mut config: Config) -> anyhow::Result<DetectContext> {
    if let Some(backend) = args.backend {
        config.detector.backend = backend.as_str().to_string();
    }
    if let Some(parallel) = args.parallel {
        config.detector.parallel = parallel.max(1);
    }
    if args.recursive {
        config.discovery.recursive = true;
    }
    if args.canonicalize {
        config.output.canonicalize = true;
    }
    if args.no_dns_check {
        config.detector.dns_precheck = false;
    }

    let image_dir = match &args.dir {
        Some(dir) => expand_path(dir),
        None => config.image_dir(),
    };

    let detector = Detector::from_config(
        &config,
        &config.detector.backend,
        args.api_key.as_deref(),
        args.model.as_deref(),
    )?;

    let output_format = match args.format {
        Some(format) => format.into(),
        None => CoreOutputFormat::parse(&config.output.format).unwrap_or(CoreOutputFormat::Json),
    };

    let run_options = RunOptions {
        parallel: config.detector.parallel,
        dns_precheck: config.detector.dns_precheck,
        api_key: None,
        canonicalize: config.output.canonicalize,
    };

    Ok(DetectContext {
        detector: Arc::new(detector),
        discovery: FileDiscovery::new(config.discovery.clone()),
        image_dir,
        run_options,
        output_format,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::detect::{BackendKind, OutputFormat};

    fn args_with_key() -> DetectArgs {
        DetectArgs {
            api_key: Some("test-key".into()),
            ..DetectArgs::default()
        }
    }

    #[test]
    fn overrides_are_applied() {
        let args = DetectArgs {
            backend: Some(BackendKind::Roboflow),
            parallel: Some(0),
            recursive: true,
            canonicalize: true,
            no_dns_check: true,
            format: Some(OutputFormat::Jsonl),
            dir: Some(PathBuf::from("/tmp/fridge")),
            ..args_with_key()
        };
        let ctx = setup_detection(&args, Config::default()).unwrap();

        assert_eq!(ctx.detector.backend_name(), "roboflow");
        assert_eq!(ctx.run_options.parallel, 1);
        assert!(!ctx.run_options.dns_precheck);
        assert!(ctx.run_options.canonicalize);
        assert!(ctx.config.discovery.recursive);
        assert_eq!(ctx.output_format, CoreOutputFormat::JsonLines);
        assert_eq!(ctx.image_dir, PathBuf::from("/tmp/fridge"));
    }

    #[test]
    fn defaults_come_from_config() {
        let ctx = setup_detection(&args_with_key(), Config::default()).unwrap();
        assert_eq!(ctx.detector.backend_name(), "gemini");
        assert_eq!(ctx.output_format, CoreOutputFormat::Json);
        assert_eq!(ctx.image_dir, PathBuf::from("public/images/analyze_image_test"));
        assert!(ctx.run_options.dns_precheck);
    }

    #[test]
    fn discover_lists_sorted_images() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.jpg", "a.png", "notes.txt", "a_annotated.jpg"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let args = DetectArgs {
            dir: Some(dir.path().to_path_buf()),
            ..args_with_key()
        };
        let ctx = setup_detection(&args, Config::default()).unwrap();
        let names: Vec<_> = ctx
            .discover()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.jpg"]);
    }
}
