// filepath: src/config.rs
//! Configuration handling for unlock-indicator
//!
//! This file defines the configuration structure and provides
//! functionality to load and save configuration from/to files.
//! Every former compile-time toggle (fill, separator, per-state texts)
//! is a plain field here, resolved once at startup.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::color::{Rgb, Rgba};
use crate::error::{IndicatorError, Result};

/// How a background image is laid out on the target surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    /// Painted once with its top-left corner at the origin.
    #[default]
    Origin,
    /// Repeated across the whole surface.
    Tile,
    /// Painted once centered on every region.
    Centered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Flat fill as `rrggbb`, used when no image is configured.
    pub color: String,
    pub image: Option<PathBuf>,
    pub mode: BackgroundMode,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            color: "ffffff".to_string(),
            image: None,
            mode: BackgroundMode::Origin,
        }
    }
}

/// Button dimensions in logical (unscaled) units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    pub radius: f64,
    /// Space between the ring and the edge of the widget surface.
    pub margin: f64,
    pub line_width: f64,
    /// Draw at 1:1 regardless of the reported scaling factor.
    pub ignore_scaling: bool,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            radius: 90.0,
            margin: 5.0,
            line_width: 10.0,
            ignore_scaling: false,
        }
    }
}

/// Which state labels are drawn. Colors apply either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextToggles {
    pub verify: bool,
    pub lock: bool,
    pub wrong: bool,
    pub lock_failed: bool,
    pub nothing_to_delete: bool,
}

impl Default for TextToggles {
    fn default() -> Self {
        Self {
            verify: true,
            lock: true,
            wrong: true,
            lock_failed: true,
            nothing_to_delete: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    pub fill_circle: bool,
    pub draw_separator: bool,
    pub text: TextToggles,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            fill_circle: true,
            draw_separator: true,
            text: TextToggles::default(),
        }
    }
}

/// Fill and stroke for one visual state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateColors {
    pub fill: Rgba,
    pub stroke: Rgb,
}

impl StateColors {
    const fn new(fill: Rgb, alpha: f64, stroke: Rgb) -> Self {
        Self {
            fill: Rgba { rgb: fill, alpha },
            stroke,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub verify: StateColors,
    pub lock: StateColors,
    pub wrong: StateColors,
    pub lock_failed: StateColors,
    pub nothing_to_delete: StateColors,
    pub idle: StateColors,
    /// Highlight wedge while typing.
    pub key_highlight: Rgb,
    /// Highlight wedge while deleting.
    pub backspace_highlight: Rgb,
    /// Thin marks at both ends of the highlight wedge.
    pub highlight_separator: Rgb,
    /// Ring between stroke and fill.
    pub fill_separator: Rgb,
    pub fill_separator_width: f64,
}

impl Default for Palette {
    fn default() -> Self {
        let blue = Rgb::new(0, 114, 255);
        let red = Rgb::new(250, 0, 0);
        let violet = Rgb::new(51, 0, 250);
        let brown = Rgb::new(125, 51, 0);
        Self {
            verify: StateColors::new(blue, 0.75, violet),
            lock: StateColors::new(blue, 0.75, violet),
            wrong: StateColors::new(red, 0.75, brown),
            lock_failed: StateColors::new(red, 0.75, brown),
            nothing_to_delete: StateColors::new(red, 0.75, brown),
            idle: StateColors::new(Rgb::BLACK, 0.75, Rgb::new(51, 125, 0)),
            key_highlight: Rgb::new(51, 219, 0),
            backspace_highlight: Rgb::new(219, 51, 0),
            highlight_separator: Rgb::BLACK,
            fill_separator: Rgb::BLACK,
            fill_separator_width: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// TrueType/OpenType font file; common system paths are tried when unset.
    pub font: Option<PathBuf>,
    pub size: f64,
    pub color: Rgb,
    pub attempts_size: f64,
    pub attempts_color: Rgb,
    pub modifier_size: f64,
    /// Distance below the center line for the modifier line.
    pub modifier_offset: f64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            font: None,
            size: 28.0,
            color: Rgb::BLACK,
            attempts_size: 32.0,
            attempts_color: Rgb::new(255, 0, 0),
            modifier_size: 14.0,
            modifier_offset: 28.0,
        }
    }
}

/// Configuration for the indicator appearance and behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub unlock_indicator: bool,
    pub show_failed_attempts: bool,
    pub background: BackgroundConfig,
    pub button: ButtonConfig,
    pub features: FeatureToggles,
    pub palette: Palette,
    pub text: TextConfig,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            unlock_indicator: true,
            show_failed_attempts: false,
            background: BackgroundConfig::default(),
            button: ButtonConfig::default(),
            features: FeatureToggles::default(),
            palette: Palette::default(),
            text: TextConfig::default(),
        }
    }
}

impl IndicatorConfig {
    /// Get the path to the configuration file
    pub fn get_config_path() -> PathBuf {
        let config_dir = if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("unlock-indicator")
        } else {
            PathBuf::from(".config/unlock-indicator")
        };

        config_dir.join("config.toml")
    }

    /// Load configuration from the default location, writing defaults if not found
    pub fn load_from_file() -> Result<Self> {
        Self::load_or_create(&Self::get_config_path())
    }

    /// Load configuration from `path`, writing defaults there if it does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let default_config = Self::default();
                default_config.save_to(path)?;
                Ok(default_config)
            }
            Err(e) => Err(IndicatorError::io(path, e)),
        }
    }

    /// Load configuration from an explicit path, which must exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| IndicatorError::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create the directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| IndicatorError::io(parent, e))?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| IndicatorError::io(path, e))?;

        Ok(())
    }

    /// Reject values the drawing code cannot make sense of.
    pub fn validate(&self) -> Result<()> {
        self.background_color()?;

        let button = &self.button;
        let invalid = |details: String| Err(IndicatorError::InvalidConfig { details });
        if !(button.radius.is_finite() && button.radius > 0.0) {
            return invalid(format!("button.radius must be positive, got {}", button.radius));
        }
        if !(button.margin.is_finite() && button.margin >= 0.0) {
            return invalid(format!("button.margin must not be negative, got {}", button.margin));
        }
        if !(button.line_width.is_finite() && button.line_width > 0.0) {
            return invalid(format!(
                "button.line_width must be positive, got {}",
                button.line_width
            ));
        }
        for (name, size) in [
            ("text.size", self.text.size),
            ("text.attempts_size", self.text.attempts_size),
            ("text.modifier_size", self.text.modifier_size),
        ] {
            if !(size.is_finite() && size > 0.0) {
                return invalid(format!("{name} must be positive, got {size}"));
            }
        }
        Ok(())
    }

    /// The decoded flat background color.
    pub fn background_color(&self) -> Result<Rgb> {
        Rgb::from_hex(&self.background.color)
    }
}
