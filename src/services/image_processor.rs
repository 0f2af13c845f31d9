// src/services/image_processor.rs
use crate::errors::PotretError;
use crate::models::AspectRatio;
use image::{GenericImageView, codecs::jpeg::JpegEncoder};

/// JPEG quality for recomposed uploads. High enough to stay visually
/// lossless for photos while bounding the upload payload size.
const RECOMPOSE_JPEG_QUALITY: u8 = 95;

pub const RECOMPOSED_MIME: &str = "image/jpeg";

pub struct ImageProcessor;

impl ImageProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_image(&self, data: &[u8]) -> Result<(u32, u32), PotretError> {
        let img = image::load_from_memory(data)
            .map_err(|e| PotretError::ImageProcessing(format!("Invalid image format: {}", e)))?;

        let (width, height) = img.dimensions();

        if width > 4096 || height > 4096 {
            return Err(PotretError::ImageProcessing(
                "Image dimensions exceed 4096x4096".to_string(),
            ));
        }

        Ok((width, height))
    }

    /// Center-crops the image to the target aspect ratio and re-encodes it as
    /// JPEG. Pure crop: no letterboxing, no stretching, no upscaling. Fails
    /// only if the input cannot be decoded.
    pub fn recompose(&self, data: &[u8], target: AspectRatio) -> Result<Vec<u8>, PotretError> {
        let img = image::load_from_memory(data)
            .map_err(|e| PotretError::ImageProcessing(format!("Failed to load image: {}", e)))?;

        let (width, height) = img.dimensions();
        let target_ratio = target.ratio();
        let input_ratio = width as f64 / height as f64;

        let (x, y, crop_w, crop_h) = if input_ratio > target_ratio {
            // Wider than target: crop width, keep full height.
            let crop_w = ((height as f64 * target_ratio).round() as u32).clamp(1, width);
            ((width - crop_w) / 2, 0, crop_w, height)
        } else if input_ratio < target_ratio {
            // Taller than target: crop height, keep full width.
            let crop_h = ((width as f64 / target_ratio).round() as u32).clamp(1, height);
            (0, (height - crop_h) / 2, width, crop_h)
        } else {
            (0, 0, width, height)
        };

        let cropped = img.crop_imm(x, y, crop_w, crop_h).to_rgb8();

        let mut output = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut output);
        let mut encoder = JpegEncoder::new_with_quality(&mut cursor, RECOMPOSE_JPEG_QUALITY);
        encoder.encode_image(&cropped).map_err(|e| {
            PotretError::ImageProcessing(format!("Failed to encode recomposed image: {}", e))
        })?;

        Ok(output)
    }
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}
