//! Aquamark Core Library
//!
//! This library provides the core functionality for watermarking PDF
//! documents:
//! - Watermark logo decoding (PNG with alpha)
//! - Tile placement planning across each page
//! - Watermark stamping via PDF image XObjects
//! - Jurisdiction advisory resolution

pub mod config;
pub mod disclaimer;
pub mod error;
pub mod logo;
pub mod pdf;
pub mod util;

pub use config::{AppConfig, DisclaimerConfig, TileGrid, WatermarkConfig};
pub use disclaimer::DisclaimerTable;
pub use error::{Error, Result};
pub use logo::WatermarkImage;
pub use pdf::{TilePosition, plan_tiles, watermark_document, watermark_document_with_progress};

use tracing::info;

/// High-level watermarker that combines all components
pub struct Watermarker {
    config: AppConfig,
    disclaimers: DisclaimerTable,
}

/// Result of watermarking a document
pub struct WatermarkOutput {
    /// Watermarked PDF bytes
    pub pdf_bytes: Vec<u8>,
    /// Advisory for the requested jurisdiction, if one was named
    pub disclaimer: Option<String>,
}

impl Watermarker {
    /// Create a new watermarker with the given configuration
    pub fn new(config: AppConfig) -> Result<Self> {
        config.watermark.validate()?;
        let disclaimers = DisclaimerTable::from(&config.disclaimers);

        Ok(Self {
            config,
            disclaimers,
        })
    }

    /// Create with a custom disclaimer table
    pub fn with_disclaimers(config: AppConfig, disclaimers: DisclaimerTable) -> Result<Self> {
        config.watermark.validate()?;

        Ok(Self {
            config,
            disclaimers,
        })
    }

    /// Watermark a document with the given logo.
    pub fn apply(&self, pdf_bytes: &[u8], logo_png: &[u8]) -> Result<Vec<u8>> {
        let image = WatermarkImage::from_png(logo_png)?;
        watermark_document(pdf_bytes, &image, &self.config.watermark)
    }

    /// Watermark a document, reporting `(stamped, total)` after each page.
    pub fn apply_with_progress(
        &self,
        pdf_bytes: &[u8],
        logo_png: &[u8],
        progress: impl FnMut(u32, u32),
    ) -> Result<Vec<u8>> {
        let image = WatermarkImage::from_png(logo_png)?;
        watermark_document_with_progress(pdf_bytes, &image, &self.config.watermark, progress)
    }

    /// Watermark a document and resolve the jurisdiction advisory.
    pub fn process(
        &self,
        pdf_bytes: &[u8],
        logo_png: &[u8],
        jurisdiction: Option<&str>,
    ) -> Result<WatermarkOutput> {
        let pdf_bytes = self.apply(pdf_bytes, logo_png)?;
        let disclaimer = self.disclaimers.advisory(jurisdiction);

        info!(
            output_bytes = pdf_bytes.len(),
            jurisdiction = jurisdiction.unwrap_or("-"),
            "document watermarked"
        );

        Ok(WatermarkOutput {
            pdf_bytes,
            disclaimer,
        })
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    pub const fn disclaimers(&self) -> &DisclaimerTable {
        &self.disclaimers
    }
}
