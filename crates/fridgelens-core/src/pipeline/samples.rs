//! Synthetic fridge photos for exercising the detectors without real images.
//!
//! The layout is defined on a 640x480 canvas and scaled to the requested size.

use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

use crate::error::FridgeError;

const BASE_WIDTH: f32 = 640.0;
const BASE_HEIGHT: f32 = 480.0;

const BACKGROUND: [u8; 3] = [0xf0, 0xf0, 0xf0];
const SHELF: [u8; 3] = [0xcc, 0xcc, 0xcc];
const SHADOW: [u8; 3] = [0xcc, 0xcc, 0xcc];
const OUTLINE: [u8; 3] = [0x66, 0x66, 0x66];

/// A food-shaped ellipse: name, top-left, size, fill.
struct FoodShape {
    name: &'static str,
    pos: (f32, f32),
    size: (f32, f32),
    color: [u8; 3],
}

const FOODS: &[FoodShape] = &[
    FoodShape { name: "egg", pos: (100.0, 100.0), size: (60.0, 80.0), color: [0xff, 0xf8, 0xdc] },
    FoodShape { name: "milk", pos: (250.0, 80.0), size: (40.0, 120.0), color: [0xff, 0xff, 0xff] },
    FoodShape { name: "tomato", pos: (400.0, 110.0), size: (70.0, 70.0), color: [0xff, 0x63, 0x47] },
    FoodShape { name: "carrot", pos: (150.0, 250.0), size: (80.0, 25.0), color: [0xff, 0x8c, 0x00] },
    FoodShape { name: "apple", pos: (350.0, 280.0), size: (65.0, 65.0), color: [0xff, 0x00, 0x00] },
    FoodShape { name: "cheese", pos: (480.0, 320.0), size: (50.0, 40.0), color: [0xff, 0xd7, 0x00] },
];

/// One entry of the default sample set.
#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub file_name: &'static str,
    pub width: u32,
    pub height: u32,
    pub description: &'static str,
}

/// The default set: a basic shot, a larger one, and a smaller one.
pub const DEFAULT_SAMPLES: &[SampleSpec] = &[
    SampleSpec { file_name: "fridge_sample_1.jpg", width: 640, height: 480, description: "basic fridge" },
    SampleSpec { file_name: "fridge_sample_2.jpg", width: 800, height: 600, description: "large fridge" },
    SampleSpec { file_name: "fridge_sample_3.jpg", width: 480, height: 360, description: "small fridge" },
];

/// Renders synthetic fridge images.
pub struct SampleGenerator;

impl SampleGenerator {
    /// Names of the foods drawn on every sample.
    pub fn food_names() -> Vec<&'static str> {
        FOODS.iter().map(|f| f.name).collect()
    }

    /// Render a fridge-like image in memory.
    pub fn render(width: u32, height: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(width, height, Rgb(BACKGROUND));

        // Shelf lines every quarter of the height, 2px thick
        let step = (height / 4).max(1);
        let mut y = step;
        while y < height {
            for dy in 0..2 {
                if y + dy < height {
                    for x in 0..width {
                        img.put_pixel(x, y + dy, Rgb(SHELF));
                    }
                }
            }
            y += step;
        }

        let sx = width as f32 / BASE_WIDTH;
        let sy = height as f32 / BASE_HEIGHT;
        for food in FOODS {
            let x = food.pos.0 * sx;
            let y = food.pos.1 * sy;
            let w = food.size.0 * sx;
            let h = food.size.1 * sy;
            fill_ellipse(&mut img, x + 3.0, y + 3.0, w, h, SHADOW, None);
            fill_ellipse(&mut img, x, y, w, h, food.color, Some(OUTLINE));
        }
        img
    }

    /// Render and save one image; the format follows the file extension.
    pub fn generate(path: &Path, width: u32, height: u32) -> Result<(), FridgeError> {
        Self::render(width, height).save(path)?;
        tracing::info!("Sample image created: {:?} ({}x{})", path, width, height);
        Ok(())
    }

    /// Write the default sample set into `dir`, creating it if needed.
    pub fn generate_default_set(dir: &Path) -> Result<Vec<PathBuf>, FridgeError> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(DEFAULT_SAMPLES.len());
        for spec in DEFAULT_SAMPLES {
            let path = dir.join(spec.file_name);
            Self::generate(&path, spec.width, spec.height)?;
            tracing::debug!("Created {}", spec.description);
            written.push(path);
        }
        Ok(written)
    }
}

/// Fill the ellipse inscribed in the box `(x, y, w, h)`, with an optional 1px outline.
fn fill_ellipse(
    img: &mut RgbImage,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    fill: [u8; 3],
    outline: Option<[u8; 3]>,
) {
    let (width, height) = img.dimensions();
    let rx = w / 2.0;
    let ry = h / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }
    let cx = x + rx;
    let cy = y + ry;
    // Normalized radius where the outline band starts
    let inner = 1.0 - 1.5 / rx.min(ry);

    let x_start = x.floor().max(0.0) as u32;
    let y_start = y.floor().max(0.0) as u32;
    let x_end = ((x + w).ceil() as u32).min(width);
    let y_end = ((y + h).ceil() as u32).min(height);

    for py in y_start..y_end {
        for px in x_start..x_end {
            let dx = (px as f32 + 0.5 - cx) / rx;
            let dy = (py as f32 + 0.5 - cy) / ry;
            let d = (dx * dx + dy * dy).sqrt();
            if d > 1.0 {
                continue;
            }
            let color = match outline {
                Some(line) if d >= inner => line,
                _ => fill,
            };
            img.put_pixel(px, py, Rgb(color));
        }
    }
}
