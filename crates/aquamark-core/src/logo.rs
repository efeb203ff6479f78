//! Watermark image decoding.

use image::ImageFormat;

use crate::error::{Error, Result};

/// A decoded watermark logo, ready for embedding.
///
/// Holds the raster split into RGB samples and a separate alpha channel,
/// which is the form PDF image XObjects want (base image plus soft mask).
/// Immutable once decoded; one instance is shared read-only across all
/// tiles and pages of a request.
#[derive(Debug, Clone)]
pub struct WatermarkImage {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    alpha: Vec<u8>,
}

impl WatermarkImage {
    /// Decode a watermark logo from PNG bytes.
    ///
    /// The input must be PNG; other raster formats are rejected even when
    /// the `image` crate could decode them, so a misconfigured logo store
    /// surfaces as a format error rather than silently changing behavior.
    pub fn from_png(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::MissingInput("watermark image"));
        }

        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|e| Error::ImageFormat(e.to_string()))?
            .to_rgba8();

        let (width, height) = decoded.dimensions();

        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for pixel in decoded.pixels() {
            rgb.push(pixel[0]);
            rgb.push(pixel[1]);
            rgb.push(pixel[2]);
            alpha.push(pixel[3]);
        }

        Ok(Self {
            width,
            height,
            rgb,
            alpha,
        })
    }

    /// Intrinsic pixel width.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Intrinsic pixel height.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// RGB samples, row-major.
    pub fn rgb_samples(&self) -> &[u8] {
        &self.rgb
    }

    /// Alpha samples, row-major (PDF soft-mask form).
    pub fn alpha_samples(&self) -> &[u8] {
        &self.alpha
    }

    /// Rendered height for a given rendered width, preserving the intrinsic
    /// aspect ratio.
    #[allow(clippy::cast_precision_loss)]
    pub fn scaled_height(&self, render_width: f32) -> f32 {
        render_width * self.height as f32 / self.width as f32
    }
}
