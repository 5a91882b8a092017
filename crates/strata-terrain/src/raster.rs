//! Raster output for previews: an RGBA color image and a 16-bit heightmap,
//! both exportable as PNG.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

/// Errors that can occur while exporting a raster.
#[derive(Debug, Error)]
pub enum ImageExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid height range: min ({0}) >= max ({1})")]
    InvalidRange(f64, f64),
}

/// A 2D preview image stored as row-major RGBA pixels.
#[derive(Clone, Debug)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    /// Length = `width * height * 4`.
    pub pixels: Vec<u8>,
}

impl PreviewImage {
    /// Create a new black, fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Set an opaque pixel.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn set_rgb(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let idx = self.index(x, y);
        self.pixels[idx..idx + 3].copy_from_slice(&rgb);
        self.pixels[idx + 3] = 255;
    }

    /// Get a pixel's RGBA value.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = self.index(x, y);
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Count distinct colors, ignoring alpha.
    pub fn unique_color_count(&self) -> usize {
        let mut colors = rustc_hash::FxHashSet::default();
        for chunk in self.pixels.chunks_exact(4) {
            colors.insert((chunk[0], chunk[1], chunk[2]));
        }
        colors.len()
    }

    /// Write the image as an 8-bit RGBA PNG.
    pub fn save_png(&self, path: &Path) -> Result<(), ImageExportError> {
        let writer = BufWriter::new(File::create(path)?);
        let encoder =
            PngEncoder::new_with_quality(writer, CompressionType::Default, FilterType::Adaptive);
        encoder.write_image(&self.pixels, self.width, self.height, ExtendedColorType::Rgba8)?;
        Ok(())
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

/// Write a row-major height grid as a 16-bit grayscale PNG.
///
/// Heights are normalized over `[min, max]` and clamped.
pub fn save_heightmap_png(
    heights: &[f64],
    width: u32,
    height: u32,
    min: f64,
    max: f64,
    path: &Path,
) -> Result<(), ImageExportError> {
    if min >= max {
        return Err(ImageExportError::InvalidRange(min, max));
    }
    let expected = width as usize * height as usize;
    if heights.len() != expected {
        return Err(ImageExportError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("height grid length {} != expected {}", heights.len(), expected),
        )));
    }

    let range = max - min;
    let samples: Vec<u16> = heights
        .iter()
        .map(|h| (((h - min) / range).clamp(0.0, 1.0) * 65535.0) as u16)
        .collect();

    let writer = BufWriter::new(File::create(path)?);
    let encoder = PngEncoder::new_with_quality(writer, CompressionType::Default, FilterType::Adaptive);
    encoder.write_image(
        bytemuck::cast_slice(&samples),
        width,
        height,
        ExtendedColorType::L16,
    )?;
    Ok(())
}
