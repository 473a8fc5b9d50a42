//! Batch detection: progress, per-image reporting, result file, annotation.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fridgelens_core::pipeline::Annotator;
use fridgelens_core::{AggregatedIngredients, DetectionResult, DetectionRunner, Prediction, ResultWriter};

use super::setup::DetectContext;
use super::DetectArgs;

/// Run every file through the detector and return the aggregate.
pub(crate) async fn run_batch(
    ctx: &DetectContext,
    args: &DetectArgs,
    files: Vec<PathBuf>,
) -> anyhow::Result<AggregatedIngredients> {
    let progress = create_progress_bar(files.len() as u64);

    let mut writer = match &args.output {
        Some(path) => Some(ResultWriter::new(
            BufWriter::new(File::create(path)?),
            ctx.output_format,
            ctx.config.output.pretty,
        )),
        None => None,
    };
    let mut write_error: Option<std::io::Error> = None;
    let mut to_annotate: Vec<(PathBuf, Vec<Prediction>)> = Vec::new();
    let start_time = Instant::now();

    let runner = DetectionRunner::new(ctx.detector.clone(), ctx.run_options.clone());
    let aggregated = runner
        .run(&files, |path, result| {
            progress.suspend(|| report(path, result, args.show_raw, args.show_boxes));

            if write_error.is_none() {
                if let Some(w) = writer.as_mut() {
                    write_error = w.write_result(result).err();
                }
            }

            if args.annotate && !result.is_error() {
                to_annotate.push((path.to_path_buf(), result.predictions.clone()));
            }

            progress.inc(1);
            let elapsed = start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                progress.set_message(format!("{:.2} img/sec", progress.position() as f64 / elapsed));
            }
        })
        .await?;
    progress.finish_and_clear();

    if let Some(e) = write_error {
        return Err(e.into());
    }
    if let Some(writer) = writer {
        writer.finish(&aggregated)?;
        if let Some(path) = &args.output {
            tracing::info!("Results written to {:?}", path);
        }
    }

    if args.annotate {
        annotate_all(to_annotate, ctx.detector.backend_name()).await;
    }

    print_summary(&aggregated, start_time.elapsed());
    Ok(aggregated)
}

/// Human-readable per-image report on stderr.
fn report(path: &Path, result: &DetectionResult, show_raw: bool, show_boxes: bool) {
    eprintln!("\n📸 {}", path.display());

    match (&result.error, &result.error_message) {
        (Some(kind), message) => {
            eprintln!("   ❌ {kind}: {}", message.as_deref().unwrap_or(""));
        }
        (None, _) if result.predictions.is_empty() => {
            eprintln!("   No ingredients detected ({}ms)", result.latency_ms);
        }
        (None, _) => {
            eprintln!(
                "   ✅ {} ingredient(s) ({}ms): {}",
                result.predictions.len(),
                result.latency_ms,
                result.ingredients().join(", ")
            );
        }
    }

    if show_boxes {
        for (i, prediction) in result.predictions.iter().enumerate() {
            eprintln!("   {}. {}", i + 1, describe(prediction));
        }
    }

    if show_raw {
        if let Some(raw) = &result.raw {
            eprintln!("   --- raw response ---");
            for line in raw.lines() {
                eprintln!("   {line}");
            }
        }
    }
}

fn describe(prediction: &Prediction) -> String {
    let mut out = prediction.label.clone();
    if let Some(confidence) = prediction.confidence {
        out.push_str(&format!(" (confidence: {confidence:.2})"));
    }
    if let Some(b) = prediction.bbox {
        out.push_str(&format!(
            " at x={:.0} y={:.0} w={:.0} h={:.0}",
            b.x, b.y, b.width, b.height
        ));
    }
    out
}

/// Draw boxes onto copies of the images. Failures are logged, never fatal.
async fn annotate_all(items: Vec<(PathBuf, Vec<Prediction>)>, backend: &str) {
    let (with_boxes, without): (Vec<_>, Vec<_>) = items
        .into_iter()
        .partition(|(_, predictions)| predictions.iter().any(|p| p.bbox.is_some()));

    if with_boxes.is_empty() && !without.is_empty() {
        tracing::warn!("--annotate: {backend} reported no bounding boxes, nothing to draw");
        return;
    }

    for (path, predictions) in with_boxes {
        let source = path.clone();
        match tokio::task::spawn_blocking(move || Annotator::default().annotate_file(&source, &predictions)).await {
            Ok(Ok(target)) => tracing::info!("Annotated image saved: {}", target.display()),
            Ok(Err(e)) => tracing::warn!("Failed to annotate {}: {e}", path.display()),
            Err(e) => tracing::warn!("Annotation task for {} failed: {e}", path.display()),
        }
    }
}

/// Create a progress bar for batch detection.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary after batch detection.
fn print_summary(aggregated: &AggregatedIngredients, elapsed: Duration) {
    let total = aggregated.succeeded + aggregated.failed;
    let rate = if elapsed.as_secs_f64() > 0.0 {
        total as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", aggregated.succeeded);
    if aggregated.failed > 0 {
        eprintln!("    Failed:       {:>8}", aggregated.failed);
    }
    eprintln!("    Ingredients:  {:>8}", aggregated.ingredients.len());
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.2} img/sec", rate);
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use fridgelens_core::BoundingBox;

    #[test]
    fn describe_label_only() {
        assert_eq!(describe(&Prediction::label("卵")), "卵");
    }

    #[test]
    fn describe_with_box_and_confidence() {
        let prediction = Prediction {
            label: "milk".into(),
            confidence: Some(0.873),
            bbox: Some(BoundingBox {
                x: 10.0,
                y: 20.4,
                width: 30.0,
                height: 40.6,
            }),
        };
        assert_eq!(
            describe(&prediction),
            "milk (confidence: 0.87) at x=10 y=20 w=30 h=41"
        );
    }

    #[tokio::test]
    async fn annotate_all_writes_copies_for_boxed_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("fridge.png");
        image::RgbImage::from_pixel(64, 48, image::Rgb([230, 230, 230]))
            .save(&source)
            .unwrap();
        let predictions = vec![Prediction {
            label: "egg".into(),
            confidence: Some(0.9),
            bbox: Some(BoundingBox {
                x: 4.0,
                y: 4.0,
                width: 20.0,
                height: 10.0,
            }),
        }];

        annotate_all(vec![(source.clone(), predictions)], "roboflow").await;
        assert!(dir.path().join("fridge_annotated.jpg").exists());
    }

    #[tokio::test]
    async fn annotate_all_skips_label_only_results() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("fridge.png");
        annotate_all(vec![(source, vec![Prediction::label("卵")])], "gemini").await;
        assert!(!dir.path().join("fridge_annotated.jpg").exists());
    }
}
