//! Bounding-box annotation of detection results.

use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

use super::discovery::ANNOTATED_SUFFIX;
use crate::error::FridgeError;
use crate::types::Prediction;

const PALETTE: [[u8; 3]; 6] = [
    [230, 25, 75],
    [60, 180, 75],
    [0, 130, 200],
    [245, 130, 48],
    [145, 30, 180],
    [70, 240, 240],
];

/// Draws prediction boxes onto copies of source images.
pub struct Annotator {
    thickness: u32,
}

impl Default for Annotator {
    fn default() -> Self {
        Self { thickness: 3 }
    }
}

impl Annotator {
    pub fn new(thickness: u32) -> Self {
        Self {
            thickness: thickness.max(1),
        }
    }

    /// Path of the annotated copy written next to `source`.
    pub fn annotated_path(source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        source.with_file_name(format!("{stem}{ANNOTATED_SUFFIX}.jpg"))
    }

    /// Draw every prediction that carries a bounding box.
    pub fn draw(&self, image: &mut RgbImage, predictions: &[Prediction]) {
        for prediction in predictions {
            let Some(bbox) = prediction.bbox else {
                continue;
            };
            let color = Rgb(color_for(&prediction.label));
            let x0 = bbox.x.max(0.0) as u32;
            let y0 = bbox.y.max(0.0) as u32;
            let x1 = (bbox.x + bbox.width).max(0.0) as u32;
            let y1 = (bbox.y + bbox.height).max(0.0) as u32;
            self.draw_hollow_rect(image, x0, y0, x1, y1, color);
        }
    }

    /// Open `source`, draw the boxes, and save the copy as JPEG.
    ///
    /// Blocking; call from `spawn_blocking` inside async code.
    pub fn annotate_file(
        &self,
        source: &Path,
        predictions: &[Prediction],
    ) -> Result<PathBuf, FridgeError> {
        let mut image = image::open(source)?.to_rgb8();
        self.draw(&mut image, predictions);
        let target = Self::annotated_path(source);
        image.save(&target)?;
        tracing::debug!("Annotated image saved: {:?}", target);
        Ok(target)
    }

    fn draw_hollow_rect(&self, image: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 || x0 >= width || y0 >= height {
            return;
        }
        let x1 = x1.min(width - 1);
        let y1 = y1.min(height - 1);

        for t in 0..self.thickness {
            for x in x0..=x1 {
                if let Some(y) = y0.checked_add(t).filter(|y| *y <= y1) {
                    image.put_pixel(x, y, color);
                }
                if let Some(y) = y1.checked_sub(t).filter(|y| *y >= y0) {
                    image.put_pixel(x, y, color);
                }
            }
            for y in y0..=y1 {
                if let Some(x) = x0.checked_add(t).filter(|x| *x <= x1) {
                    image.put_pixel(x, y, color);
                }
                if let Some(x) = x1.checked_sub(t).filter(|x| *x >= x0) {
                    image.put_pixel(x, y, color);
                }
            }
        }
    }
}

/// Stable color per label so the same ingredient keeps its color across images.
fn color_for(label: &str) -> [u8; 3] {
    let hash = label
        .bytes()
        .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    PALETTE[hash % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn boxed(label: &str, x: f32, y: f32, w: f32, h: f32) -> Prediction {
        Prediction {
            label: label.to_string(),
            confidence: Some(0.9),
            bbox: Some(BoundingBox {
                x,
                y,
                width: w,
                height: h,
            }),
        }
    }

    #[test]
    fn test_annotated_path() {
        let path = Annotator::annotated_path(Path::new("/tmp/fridge/shelf.png"));
        assert_eq!(path, PathBuf::from("/tmp/fridge/shelf_annotated.jpg"));
    }

    #[test]
    fn test_draw_marks_border_not_interior() {
        let mut image = RgbImage::new(50, 50);
        Annotator::new(1).draw(&mut image, &[boxed("milk", 10.0, 10.0, 20.0, 20.0)]);

        let color = Rgb(color_for("milk"));
        assert_eq!(*image.get_pixel(10, 10), color);
        assert_eq!(*image.get_pixel(30, 20), color);
        assert_eq!(*image.get_pixel(20, 20), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_clips_out_of_bounds_boxes() {
        let mut image = RgbImage::new(20, 20);
        Annotator::default().draw(
            &mut image,
            &[
                boxed("egg", -5.0, -5.0, 100.0, 100.0),
                boxed("tomato", 50.0, 50.0, 10.0, 10.0),
            ],
        );
        assert_eq!(*image.get_pixel(0, 0), Rgb(color_for("egg")));
    }

    #[test]
    fn test_predictions_without_boxes_are_skipped() {
        let mut image = RgbImage::new(10, 10);
        Annotator::default().draw(&mut image, &[Prediction::label("卵")]);
        assert!(image.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }

    #[test]
    fn test_annotate_file_writes_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("fridge.png");
        RgbImage::new(40, 30).save(&source).unwrap();

        let target = Annotator::default()
            .annotate_file(&source, &[boxed("cheese", 5.0, 5.0, 10.0, 10.0)])
            .unwrap();
        assert!(target.exists());
        assert!(target.ends_with("fridge_annotated.jpg"));
    }
}
