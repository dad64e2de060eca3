//! Brushlink Settings Crate
//!
//! Handles configuration loading, saving and validation.

pub mod config;
pub mod error;

pub use config::{
    BrushingSettings, Config, ConfigFormat, FilterSettings, HighlightSettings, InputSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
