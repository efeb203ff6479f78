use thiserror::Error;

/// Unified error type for aquamark-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Document operations (loading, stamping, saving)
/// - Watermark image decoding
/// - Input validation
/// - Configuration operations (loading, validation)
/// - General I/O operations
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Document Errors
    // ==========================================================================
    /// Input bytes are not a valid/parseable PDF document
    #[error("failed to load document: {0}")]
    DocumentLoad(String),

    /// Document declares encryption and permissive load is disabled
    #[error("document declares encryption and permissive load is disabled")]
    DocumentEncrypted,

    /// Failed to stamp a watermark tile onto a page
    #[error("failed to stamp page {page}: {reason}")]
    PageStamp { page: u32, reason: String },

    /// Failed to serialize the watermarked document
    #[error("failed to save document: {0}")]
    DocumentSave(String),

    // ==========================================================================
    // Watermark Image Errors
    // ==========================================================================
    /// Watermark image bytes cannot be decoded as PNG
    #[error("failed to decode watermark image: {0}")]
    ImageFormat(String),

    // ==========================================================================
    // Input Validation
    // ==========================================================================
    /// A required input was empty or absent
    #[error("missing required input: {0}")]
    MissingInput(&'static str),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: &'static str, reason: String },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
