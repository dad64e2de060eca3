//! Configuration for Brushlink
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Brushing (update rate, brush size, brush colours)
//! - Filtering (update rate, snapping, query depth)
//! - Input (trigger threshold, ray reach, handedness)
//! - Highlighting (technique and per-technique appearance)

use brushlink_core::{Handedness, HighlightTechnique, Rgba};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// File name used under the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Brushing engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushingSettings {
    /// Maximum query-and-reconcile cycles per second
    pub update_rate_hz: f32,
    /// Sphere brush radius in world units
    pub brush_radius: f32,
    /// Visual depth of the box brush
    pub box_depth: f32,
    /// Half-depth of the box overlap query along the visualization normal
    pub query_half_depth: f32,
    /// Brush colour while adding
    pub additive_color: Rgba,
    /// Brush colour while subtracting
    pub subtractive_color: Rgba,
}

impl Default for BrushingSettings {
    fn default() -> Self {
        Self {
            update_rate_hz: 20.0,
            brush_radius: 0.02,
            box_depth: 0.01,
            query_half_depth: 0.05,
            additive_color: Rgba::new(1.0, 1.0, 0.0, 0.3),
            subtractive_color: Rgba::new(1.0, 0.0, 0.0, 0.3),
        }
    }
}

/// Range filter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Maximum eligibility recomputes per second
    pub update_rate_hz: f32,
    /// Distance within which a handle snaps onto the task threshold
    pub snap_epsilon: f32,
    /// Half-depth of the filter rectangle query
    pub query_half_depth: f32,
    /// Tolerance for "handle is at the end of its track"
    pub handle_epsilon: f32,
    /// Spread applied to coincident range guide endpoints
    pub guide_spread: f32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            update_rate_hz: 10.0,
            snap_epsilon: 0.01,
            query_half_depth: 0.05,
            handle_epsilon: 1e-5,
            guide_spread: 0.005,
        }
    }
}

/// Controller input settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Trigger reading above which a trigger counts as pressed
    pub press_threshold: f32,
    /// Maximum ray length for brushing and handle dragging
    pub max_ray_distance: f32,
    /// Hand holding the active controller
    pub handedness: Handedness,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            press_threshold: 0.35,
            max_ray_distance: 2.0,
            handedness: Handedness::Right,
        }
    }
}

/// Highlight appearance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSettings {
    /// Technique applied to every entity at startup
    pub technique: HighlightTechnique,
    pub outline_color: Rgba,
    pub outline_width: f32,
    /// Flat colour used by the recolor technique
    pub highlight_color: Rgba,
    /// Scale applied by the size technique
    pub size_multiplier: f32,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            technique: HighlightTechnique::Outline,
            outline_color: Rgba::rgb(1.0, 1.0, 0.0),
            outline_width: 5.0,
            highlight_color: Rgba::YELLOW,
            size_multiplier: 1.5,
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Brushing settings
    pub brushing: BrushingSettings,
    /// Filter settings
    pub filter: FilterSettings,
    /// Input settings
    pub input: InputSettings,
    /// Highlight settings
    pub highlight: HighlightSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location under the platform config directory
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string())
        })?;
        Ok(dir.join("brushlink").join(CONFIG_FILE_NAME))
    }

    /// Load config from the default path, falling back to defaults when the
    /// file does not exist
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(&path)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = ConfigFormat::from_path(path)?;

        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
            }
        }

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        // Brushing
        positive("brushing.update_rate_hz", self.brushing.update_rate_hz)?;
        positive("brushing.brush_radius", self.brushing.brush_radius)?;
        positive("brushing.box_depth", self.brushing.box_depth)?;
        positive("brushing.query_half_depth", self.brushing.query_half_depth)?;
        colour("brushing.additive_color", &self.brushing.additive_color)?;
        colour("brushing.subtractive_color", &self.brushing.subtractive_color)?;

        // Filter
        positive("filter.update_rate_hz", self.filter.update_rate_hz)?;
        positive("filter.snap_epsilon", self.filter.snap_epsilon)?;
        positive("filter.query_half_depth", self.filter.query_half_depth)?;
        positive("filter.handle_epsilon", self.filter.handle_epsilon)?;
        if !(self.filter.guide_spread >= 0.0) {
            return Err(SettingsError::invalid("filter.guide_spread", "must be >= 0"));
        }

        // Input
        if !(0.0..1.0).contains(&self.input.press_threshold) {
            return Err(ConfigError::ValueOutOfRange {
                key: "input.press_threshold".to_string(),
                value: self.input.press_threshold.to_string(),
            }
            .into());
        }
        positive("input.max_ray_distance", self.input.max_ray_distance)?;

        // Highlight
        colour("highlight.outline_color", &self.highlight.outline_color)?;
        colour("highlight.highlight_color", &self.highlight.highlight_color)?;
        positive("highlight.outline_width", self.highlight.outline_width)?;
        positive("highlight.size_multiplier", self.highlight.size_multiplier)?;

        Ok(())
    }
}

/// Supported config file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ConfigFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(ConfigFormat::Toml),
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into()),
        }
    }
}

fn positive(key: &str, value: f32) -> SettingsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::invalid(key, format!("must be > 0, got {}", value)))
    }
}

fn colour(key: &str, value: &Rgba) -> SettingsResult<()> {
    if value.is_normalized() {
        Ok(())
    } else {
        Err(SettingsError::invalid(key, "components must be within [0, 1]"))
    }
}
