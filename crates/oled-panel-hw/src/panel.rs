//! Panel descriptors.
//!
//! A panel is described by value: its visible size, where that region sits
//! in controller memory, the electrical parameters its setup sequence needs,
//! and its bus addresses. Controllers take a descriptor instead of having
//! one driver type per product.

use crate::gfx::Viewport;
use crate::{Error, Result};

/// Physical display product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelDescriptor {
    pub name: &'static str,
    pub width: u8,
    pub height: u8,
    /// First controller column of the visible region.
    pub x_offset: u8,
    /// First controller row of the visible region.
    pub y_offset: u8,
    /// COM pins hardware configuration.
    pub com_pins: u8,
    /// Pre-charge period.
    pub pre_charge: u8,
    /// VCOMH deselect level.
    pub vcom_deselect: u8,
    /// Contrast sent during setup.
    pub contrast: u8,
    /// Default bus address.
    pub address: u8,
    /// Jumper-selectable alternate address.
    pub alt_address: u8,
}

/// 1.3" 128x64 panel on an SSD1306-class controller.
pub const OLED_1IN3: PanelDescriptor = PanelDescriptor {
    name: "1in3",
    width: 128,
    height: 64,
    x_offset: 0,
    y_offset: 0,
    com_pins: 0x12,
    pre_charge: 0xF1,
    vcom_deselect: 0x40,
    contrast: 0xCF,
    address: 0x3D,
    alt_address: 0x3C,
};

/// 64x48 micro panel; its visible columns start at controller column 2.
pub const MICRO_OLED: PanelDescriptor = PanelDescriptor {
    name: "micro",
    width: 64,
    height: 48,
    x_offset: 2,
    y_offset: 0,
    com_pins: 0x12,
    pre_charge: 0xF1,
    vcom_deselect: 0x40,
    contrast: 0x8F,
    address: 0x3D,
    alt_address: 0x3C,
};

/// 128x32 narrow panel.
pub const NARROW_OLED: PanelDescriptor = PanelDescriptor {
    name: "narrow",
    width: 128,
    height: 32,
    x_offset: 0,
    y_offset: 0,
    com_pins: 0x02,
    pre_charge: 0xF1,
    vcom_deselect: 0x40,
    contrast: 0x8F,
    address: 0x3C,
    alt_address: 0x3C,
};

/// 128x64 transparent panel.
pub const TRANSPARENT_OLED: PanelDescriptor = PanelDescriptor {
    name: "transparent",
    width: 128,
    height: 64,
    x_offset: 0,
    y_offset: 0,
    com_pins: 0x12,
    pre_charge: 0x25,
    vcom_deselect: 0x40,
    contrast: 0x8F,
    address: 0x3C,
    alt_address: 0x3C,
};

/// 1.5" 128x128 panel on a CH1120-class controller.
pub const OLED_1IN5: PanelDescriptor = PanelDescriptor {
    name: "1in5",
    width: 128,
    height: 128,
    x_offset: 0,
    y_offset: 0,
    com_pins: 0x00,
    pre_charge: 0xF1,
    vcom_deselect: 0x3F,
    contrast: 0xCF,
    address: 0x3C,
    alt_address: 0x3D,
};

/// Every fixed preset.
pub const PRESETS: [&PanelDescriptor; 5] = [
    &OLED_1IN3,
    &MICRO_OLED,
    &NARROW_OLED,
    &TRANSPARENT_OLED,
    &OLED_1IN5,
];

impl PanelDescriptor {
    /// A user-sized panel with SSD1306 defaults.
    pub fn custom(width: u8, height: u8, x_offset: u8, y_offset: u8) -> Self {
        Self {
            name: "custom",
            width,
            height,
            x_offset,
            y_offset,
            ..OLED_1IN3
        }
    }

    /// Looks up a preset by name.
    pub fn preset(name: &str) -> Option<&'static PanelDescriptor> {
        PRESETS
            .iter()
            .copied()
            .find(|panel| panel.name.eq_ignore_ascii_case(name))
    }

    /// The same panel showing `viewport` instead of its own region.
    pub fn with_viewport(&self, viewport: Viewport) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            x_offset: viewport.x,
            y_offset: viewport.y,
            ..self.clone()
        }
    }

    /// Visible region inside controller memory.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.x_offset, self.y_offset, self.width, self.height)
    }

    /// Number of pages covering the panel.
    pub fn pages(&self) -> u8 {
        self.height.div_ceil(8)
    }

    /// Checks the geometry against a controller's memory.
    pub fn validate(&self, physical_columns: u8, physical_pages: u8) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidPanel(format!(
                "{}: zero size {}x{}",
                self.name, self.width, self.height
            )));
        }
        if self.height % 8 != 0 {
            return Err(Error::InvalidPanel(format!(
                "{}: height {} is not a multiple of 8",
                self.name, self.height
            )));
        }
        if u16::from(self.x_offset) + u16::from(self.width) > u16::from(physical_columns) {
            return Err(Error::InvalidPanel(format!(
                "{}: columns {}..{} exceed controller width {}",
                self.name,
                self.x_offset,
                u16::from(self.x_offset) + u16::from(self.width),
                physical_columns
            )));
        }
        if self.y_offset % 8 != 0 {
            return Err(Error::InvalidPanel(format!(
                "{}: row offset {} is not a multiple of 8",
                self.name, self.y_offset
            )));
        }
        let last_page = self.y_offset / 8 + self.pages();
        if last_page > physical_pages {
            return Err(Error::InvalidPanel(format!(
                "{}: pages {}..{} exceed controller memory of {}",
                self.name,
                self.y_offset / 8,
                last_page,
                physical_pages
            )));
        }
        Ok(())
    }
}
