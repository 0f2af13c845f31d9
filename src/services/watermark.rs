// src/services/watermark.rs
use crate::errors::PotretError;
use image::{GenericImageView, imageops};

const PADDING_FRACTION: f64 = 0.03;
const MAX_LOGO_WIDTH_FRACTION: f64 = 0.24;

/// Logo geometry for a given base image: scaled size and bottom-right anchor.
/// The logo is shrunk to at most 24% of the base width, never enlarged.
fn logo_placement(
    base_w: u32,
    base_h: u32,
    logo_w: u32,
    logo_h: u32,
) -> (u32, u32, i64, i64) {
    let max_logo_width = base_w as f64 * MAX_LOGO_WIDTH_FRACTION;
    let scale = (max_logo_width / logo_w as f64).min(1.0);
    let scaled_w = ((logo_w as f64 * scale).round() as u32).max(1);
    let scaled_h = ((logo_h as f64 * scale).round() as u32).max(1);

    let padding = (base_w as f64 * PADDING_FRACTION).round() as i64;
    let x = (base_w as i64 - scaled_w as i64 - padding).max(0);
    let y = (base_h as i64 - scaled_h as i64 - padding).max(0);

    (scaled_w, scaled_h, x, y)
}

/// Composites the logo onto the bottom-right corner of the base image and
/// re-encodes as PNG.
pub fn apply_watermark(base: &[u8], logo: &[u8]) -> Result<Vec<u8>, PotretError> {
    let base_img = image::load_from_memory(base)
        .map_err(|e| PotretError::ImageProcessing(format!("Failed to load base image: {}", e)))?;
    let logo_img = image::load_from_memory(logo)
        .map_err(|e| PotretError::ImageProcessing(format!("Failed to load logo image: {}", e)))?;

    let (base_w, base_h) = base_img.dimensions();
    let (logo_w, logo_h) = logo_img.dimensions();
    let (scaled_w, scaled_h, x, y) = logo_placement(base_w, base_h, logo_w, logo_h);

    let scaled_logo = if (scaled_w, scaled_h) == (logo_w, logo_h) {
        logo_img
    } else {
        logo_img.resize_exact(scaled_w, scaled_h, imageops::FilterType::Lanczos3)
    };

    let mut canvas = base_img.to_rgba8();
    imageops::overlay(&mut canvas, &scaled_logo.to_rgba8(), x, y);

    let mut output = Vec::new();
    image::DynamicImage::ImageRgba8(canvas)
        .write_to(&mut std::io::Cursor::new(&mut output), image::ImageFormat::Png)
        .map_err(|e| {
            PotretError::ImageProcessing(format!("Failed to encode watermarked image: {}", e))
        })?;

    Ok(output)
}
