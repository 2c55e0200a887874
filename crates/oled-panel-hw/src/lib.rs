//! OLED Panel Hardware Library
//!
//! Monochrome graphics buffer with dirty-region tracking, synchronized to
//! SSD1306 and CH1120 class OLED controllers over any byte-oriented bus.

pub mod bus;
pub mod dirty;
pub mod error;
pub mod gfx;
#[cfg(feature = "hid-bridge")]
pub mod hid_bridge;
pub mod oled;
pub mod panel;
pub mod raster;
pub mod resource;
pub mod sim;

pub use bus::Bus;
pub use error::{Error, Result};
pub use gfx::{Canvas, PageBuffer, Viewport};
#[cfg(feature = "hid-bridge")]
pub use hid_bridge::HidBridge;
pub use oled::{
    Ch1120, Ch1120Oled, Controller, Oled, ScrollDirection, ScrollInterval, Ssd1306, Ssd1306Oled,
};
pub use panel::{
    PanelDescriptor, MICRO_OLED, NARROW_OLED, OLED_1IN3, OLED_1IN5, PRESETS, TRANSPARENT_OLED,
};
pub use raster::RasterOp;
pub use resource::{Bitmap, Font, BMP_TRUCK, FONT_5X7};
pub use sim::SimulatedPanel;

