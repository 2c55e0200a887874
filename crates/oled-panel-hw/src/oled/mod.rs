//! OLED controllers and the device synchronizer.

mod ch1120;
mod controller;
mod device;
pub mod protocol;
mod scroll;
mod ssd1306;

pub use ch1120::{Ch1120, ControlByte};
pub use controller::Controller;
pub use device::{Ch1120Oled, Oled, Ssd1306Oled};
pub use scroll::{ScrollDirection, ScrollInterval};
pub use ssd1306::Ssd1306;
