//! Input validation before decoding.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::DetectError;

/// Validates image files and buffers before decoding.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation of a file before full decode.
    ///
    /// Checks:
    /// - File exists
    /// - File size is within limits
    /// - File has valid image magic bytes
    pub fn validate(&self, path: &Path) -> Result<(), DetectError> {
        if !path.exists() {
            return Err(DetectError::ImageNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| decode_error(path, e))?;
        self.check_size(&path.display().to_string(), metadata.len())?;

        let mut file = std::fs::File::open(path).map_err(|e| decode_error(path, e))?;
        let mut header = [0u8; 12];
        let bytes_read = file.read(&mut header).unwrap_or(0);
        Self::check_header(&path.display().to_string(), &header, bytes_read)
    }

    /// Validate an in-memory buffer (size and magic bytes).
    pub fn validate_bytes(&self, name: &str, bytes: &[u8]) -> Result<(), DetectError> {
        self.check_size(name, bytes.len() as u64)?;

        let mut header = [0u8; 12];
        let bytes_read = bytes.len().min(12);
        header[..bytes_read].copy_from_slice(&bytes[..bytes_read]);
        Self::check_header(name, &header, bytes_read)
    }

    fn check_size(&self, name: &str, len: u64) -> Result<(), DetectError> {
        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if len > max_bytes {
            return Err(DetectError::ImageDecode {
                image: name.to_string(),
                message: format!(
                    "file too large ({}MB > {}MB)",
                    len / (1024 * 1024),
                    self.limits.max_file_size_mb
                ),
            });
        }
        Ok(())
    }

    fn check_header(name: &str, header: &[u8; 12], bytes_read: usize) -> Result<(), DetectError> {
        if bytes_read < 4 {
            return Err(DetectError::ImageDecode {
                image: name.to_string(),
                message: "file too small to be a valid image".to_string(),
            });
        }
        if !Self::is_valid_image_header(header, bytes_read) {
            return Err(DetectError::ImageDecode {
                image: name.to_string(),
                message: "unrecognized image format (invalid magic bytes)".to_string(),
            });
        }
        Ok(())
    }

    /// Check if the header bytes match a format the backends accept.
    fn is_valid_image_header(header: &[u8; 12], bytes_read: usize) -> bool {
        if bytes_read < 4 {
            return false;
        }

        // JPEG: FF D8 FF
        if header[0] == 0xFF && header[1] == 0xD8 && header[2] == 0xFF {
            return true;
        }

        // PNG: 89 50 4E 47
        if header[0] == 0x89 && header[1] == b'P' && header[2] == b'N' && header[3] == b'G' {
            return true;
        }

        // GIF: GIF8
        if &header[0..4] == b"GIF8" {
            return true;
        }

        // WebP: RIFF....WEBP
        if &header[0..4] == b"RIFF" {
            if bytes_read >= 12 {
                return &header[8..12] == b"WEBP";
            }
            return true;
        }

        // BMP: BM
        header[0] == b'B' && header[1] == b'M'
    }
}

fn decode_error(path: &Path, e: std::io::Error) -> DetectError {
    DetectError::ImageDecode {
        image: path.display().to_string(),
        message: format!("cannot read file: {e}"),
    }
}
