use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Tile grid parameters for one page.
///
/// The grid is a fixed count of columns and rows regardless of page size;
/// spacing is derived from the page dimensions at planning time. Margins
/// offset every anchor from the page origin. Small pages may push anchors
/// outside the visible area, which is accepted rather than clipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    /// Number of tile columns per page
    #[serde(default = "default_columns")]
    pub columns: u32,

    /// Number of tile rows per page
    #[serde(default = "default_rows")]
    pub rows: u32,

    /// Horizontal anchor offset in document units
    #[serde(default = "default_margin_x")]
    pub margin_x: f32,

    /// Vertical anchor offset in document units
    #[serde(default = "default_margin_y")]
    pub margin_y: f32,
}

const fn default_columns() -> u32 {
    5
}

const fn default_rows() -> u32 {
    5
}

const fn default_margin_x() -> f32 {
    30.0
}

const fn default_margin_y() -> f32 {
    40.0
}

impl Default for TileGrid {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            rows: default_rows(),
            margin_x: default_margin_x(),
            margin_y: default_margin_y(),
        }
    }
}

impl TileGrid {
    /// Total number of tiles placed on each page.
    pub const fn tile_count(&self) -> u32 {
        self.columns * self.rows
    }
}

/// Watermark composition parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkConfig {
    /// Rendered tile width in document units; height follows the image
    /// aspect ratio
    #[serde(default = "default_tile_width")]
    pub tile_width: f32,

    /// Alpha blend factor applied to every tile (0, 1]
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    /// Counter-clockwise rotation about each tile anchor, in degrees
    #[serde(default = "default_rotation_degrees")]
    pub rotation_degrees: f32,

    /// Tile grid layout
    #[serde(default)]
    pub grid: TileGrid,

    /// Proceed when the source document declares itself encrypted.
    ///
    /// Documents that merely carry an `/Encrypt` entry are still
    /// structurally parseable; with this flag set the load continues and
    /// the overlay is applied as usual. Disabling it turns such documents
    /// into a load failure.
    #[serde(default = "default_true")]
    pub ignore_encryption: bool,
}

const fn default_tile_width() -> f32 {
    80.0
}

const fn default_opacity() -> f32 {
    0.25
}

const fn default_rotation_degrees() -> f32 {
    45.0
}

const fn default_true() -> bool {
    true
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            tile_width: default_tile_width(),
            opacity: default_opacity(),
            rotation_degrees: default_rotation_degrees(),
            grid: TileGrid::default(),
            ignore_encryption: default_true(),
        }
    }
}

impl WatermarkConfig {
    /// Validate composition parameters.
    pub fn validate(&self) -> Result<()> {
        if !(self.opacity > 0.0 && self.opacity <= 1.0) {
            return Err(Error::ConfigInvalid {
                field: "opacity",
                reason: format!("must be in (0, 1], got {}", self.opacity),
            });
        }
        if self.tile_width <= 0.0 {
            return Err(Error::ConfigInvalid {
                field: "tile_width",
                reason: format!("must be positive, got {}", self.tile_width),
            });
        }
        if self.grid.columns == 0 || self.grid.rows == 0 {
            return Err(Error::ConfigInvalid {
                field: "grid",
                reason: format!(
                    "columns and rows must be positive, got {}x{}",
                    self.grid.columns, self.grid.rows
                ),
            });
        }
        Ok(())
    }
}

/// Serializable form of the jurisdiction advisory table.
///
/// Two historical variants of this table exist in deployments, so the
/// mapping is injectable configuration rather than hard-coded. Keys are
/// normalized (lowercased, whitespace stripped) when the table is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisclaimerConfig {
    /// Advisory returned when no entry matches the jurisdiction code
    #[serde(default = "default_advisory")]
    pub default_advisory: String,

    /// Jurisdiction code/name to advisory text
    #[serde(default = "default_entries")]
    pub entries: HashMap<String, String>,
}

fn default_advisory() -> String {
    "Aquamark compliance notice: Broker disclosure applies.".to_string()
}

fn default_entries() -> HashMap<String, String> {
    let ca = "California compliance: Broker disclosures required.";
    let ny = "New York law requires funder-broker transparency.";
    let tx = "Texas compliance: No misrepresentation permitted.";

    [
        ("ca", ca),
        ("california", ca),
        ("ny", ny),
        ("newyork", ny),
        ("tx", tx),
        ("texas", tx),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for DisclaimerConfig {
    fn default() -> Self {
        Self {
            default_advisory: default_advisory(),
            entries: default_entries(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Watermark composition parameters
    #[serde(default)]
    pub watermark: WatermarkConfig,

    /// Jurisdiction advisory table
    #[serde(default)]
    pub disclaimers: DisclaimerConfig,
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        toml::from_str(&content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))
    }

    /// Load from default locations (~/.config/aquamark/config.toml, ./aquamark.toml)
    pub fn load() -> Self {
        // Try user config
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("aquamark").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Try local config
        let local_config = std::path::PathBuf::from("aquamark.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./aquamark.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./aquamark.toml: {}", e);
                }
            }
        }

        // Return defaults
        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}
