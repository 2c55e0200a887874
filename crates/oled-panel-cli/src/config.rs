//! Configuration management.

use anyhow::{anyhow, bail, Context, Result};
use oled_panel_hw::PanelDescriptor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Preset name, or "custom" to use the `[custom]` table
    #[serde(default = "default_panel")]
    pub panel: String,

    /// Controller family; derived from the panel when unset
    #[serde(default)]
    pub controller: Option<String>,

    /// Bus address; the panel's default when unset
    #[serde(default)]
    pub address: Option<u8>,

    /// Contrast override
    #[serde(default)]
    pub contrast: Option<u8>,

    /// Geometry for custom panels
    #[serde(default)]
    pub custom: CustomConfig,

    /// Preview output
    #[serde(default)]
    pub render: RenderConfig,
}

/// Custom panel geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomConfig {
    #[serde(default = "default_width")]
    pub width: u8,

    #[serde(default = "default_height")]
    pub height: u8,

    /// First visible controller column
    #[serde(default)]
    pub x: u8,

    /// First visible controller row
    #[serde(default)]
    pub y: u8,
}

impl Default for CustomConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            x: 0,
            y: 0,
        }
    }
}

/// PNG preview settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Output pixels per panel pixel
    #[serde(default = "default_scale")]
    pub scale: u32,

    /// Color of lit pixels (hex, e.g., "#FFFFFF")
    #[serde(default = "default_foreground")]
    pub foreground: String,

    /// Color of dark pixels
    #[serde(default = "default_background")]
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            foreground: default_foreground(),
            background: default_background(),
        }
    }
}

// Default value functions

fn default_panel() -> String {
    "1in3".to_string()
}

fn default_width() -> u8 {
    128
}

fn default_height() -> u8 {
    64
}

fn default_scale() -> u32 {
    4
}

fn default_foreground() -> String {
    "#FFFFFF".to_string()
}

fn default_background() -> String {
    "#000000".to_string()
}

/// Controller family driving the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    Ssd1306,
    Ch1120,
}

impl FromStr for ControllerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ssd1306" => Ok(ControllerKind::Ssd1306),
            "ch1120" => Ok(ControllerKind::Ch1120),
            _ => Err(anyhow!("Unknown controller: {}", s)),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }

    /// Resolves the panel descriptor and its controller family.
    pub fn resolve(&self) -> Result<(PanelDescriptor, ControllerKind)> {
        let panel = if self.panel.eq_ignore_ascii_case("custom") {
            PanelDescriptor::custom(
                self.custom.width,
                self.custom.height,
                self.custom.x,
                self.custom.y,
            )
        } else {
            PanelDescriptor::preset(&self.panel)
                .cloned()
                .ok_or_else(|| anyhow!("Unknown panel: {}", self.panel))?
        };

        let kind = match &self.controller {
            Some(name) => name.parse()?,
            None if panel.name == "1in5" => ControllerKind::Ch1120,
            None => ControllerKind::Ssd1306,
        };
        Ok((panel, kind))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            panel: default_panel(),
            controller: None,
            address: None,
            contrast: None,
            custom: CustomConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Parses a "#RRGGBB" color.
pub fn parse_hex_color(s: &str) -> Result<[u8; 3]> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        bail!("Invalid color: {}", s);
    }
    let mut rgb = [0u8; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .with_context(|| format!("Invalid color: {}", s))?;
    }
    Ok(rgb)
}
