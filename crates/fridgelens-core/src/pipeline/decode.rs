//! Image decoding with format detection, validation, and timeout support.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::time::Duration;
use tokio::time::timeout;

use crate::config::LimitsConfig;
use crate::error::DetectError;

/// Image decoder with configurable limits and timeout.
pub struct ImageDecoder {
    limits: LimitsConfig,
}

/// Result of decoding an image.
pub struct DecodedImage {
    /// The decoded image data
    pub image: DynamicImage,
    /// Detected image format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageDecoder {
    /// Create a new decoder with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Decode an in-memory buffer on a blocking thread, bounded by the decode timeout.
    ///
    /// `name` is only used in error messages.
    pub async fn decode_bytes(&self, bytes: Vec<u8>, name: &str) -> Result<DecodedImage, DetectError> {
        let name_owned = name.to_string();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let decode_result = timeout(timeout_duration, async {
            tokio::task::spawn_blocking(move || Self::decode_bytes_sync(&bytes, &name_owned)).await
        })
        .await;

        let decoded = match decode_result {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => {
                return Err(DetectError::ImageDecode {
                    image: name.to_string(),
                    message: format!("decode task failed: {e}"),
                })
            }
            Err(_) => {
                return Err(DetectError::ImageDecode {
                    image: name.to_string(),
                    message: format!(
                        "decode timed out after {}ms",
                        self.limits.decode_timeout_ms
                    ),
                })
            }
        };

        if decoded.width > self.limits.max_image_dimension
            || decoded.height > self.limits.max_image_dimension
        {
            return Err(DetectError::ImageDecode {
                image: name.to_string(),
                message: format!(
                    "image too large ({}x{} > {})",
                    decoded.width, decoded.height, self.limits.max_image_dimension
                ),
            });
        }
        Ok(decoded)
    }

    /// Synchronous decode from bytes (runs in spawn_blocking).
    pub fn decode_bytes_sync(bytes: &[u8], name: &str) -> Result<DecodedImage, DetectError> {
        let reader = image::ImageReader::new(std::io::Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| DetectError::ImageDecode {
                image: name.to_string(),
                message: format!("cannot detect image format: {e}"),
            })?;
        let format = reader.format().ok_or_else(|| DetectError::ImageDecode {
            image: name.to_string(),
            message: "unsupported image format".to_string(),
        })?;
        let image = reader.decode().map_err(|e| DetectError::ImageDecode {
            image: name.to_string(),
            message: e.to_string(),
        })?;

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
        })
    }
}

/// Convert an ImageFormat to its MIME type.
pub fn format_to_mime(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Bmp => "image/bmp",
        other => {
            tracing::warn!("Unknown image format {other:?}, defaulting to image/jpeg");
            "image/jpeg"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use image::RgbImage;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_format_to_mime() {
        assert_eq!(format_to_mime(ImageFormat::Jpeg), "image/jpeg");
        assert_eq!(format_to_mime(ImageFormat::Png), "image/png");
        assert_eq!(format_to_mime(ImageFormat::WebP), "image/webp");
    }

    #[test]
    fn test_format_detected_by_content() {
        let result = ImageDecoder::decode_bytes_sync(&png_bytes(8, 6), "misnamed.jpg").unwrap();
        assert_eq!(result.format, ImageFormat::Png);
        assert_eq!((result.width, result.height), (8, 6));
    }

    #[tokio::test]
    async fn test_decode_truncated_png_fails() {
        let mut bytes = png_bytes(16, 16);
        bytes.truncate(20);
        let decoder = ImageDecoder::new(LimitsConfig::default());
        let err = decoder.decode_bytes(bytes, "broken.png").await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ImageDecodeError);
    }

    #[tokio::test]
    async fn test_decode_rejects_oversized_dimensions() {
        let limits = LimitsConfig {
            max_image_dimension: 10,
            ..LimitsConfig::default()
        };
        let decoder = ImageDecoder::new(limits);
        let err = decoder
            .decode_bytes(png_bytes(32, 4), "wide.png")
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("image too large"));
    }
}
