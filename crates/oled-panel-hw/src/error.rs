//! Error types for the OLED panel hardware library.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when driving a panel.
///
/// Drawing outside the viewport is never an error; primitives clip silently.
#[derive(Error, Debug)]
pub enum Error {
    /// No communication bus has been attached to the device.
    #[error("No communication bus attached")]
    BusNotAttached,

    /// The device did not answer the presence probe.
    #[error("OLED device not found at address 0x{0:02X}")]
    DeviceNotFound(u8),

    /// A drawing backend was built without the mandatory pixel hook.
    #[error("Drawing backend has no pixel hook")]
    MissingPixelHook,

    /// The transport reported a failure mid-transfer.
    #[error("Bus transfer to 0x{address:02X} failed: {reason}")]
    BusTransfer { address: u8, reason: String },

    /// The transport accepted fewer bytes than requested.
    #[error("Short bus write: expected {expected} bytes, wrote {written}")]
    ShortWrite { expected: usize, written: usize },

    /// Scroll stop page precedes the start page.
    #[error("Invalid scroll range: stop page {stop} is before start page {start}")]
    InvalidScrollRange { start: u8, stop: u8 },

    /// Screen buffer address outside the visible panel.
    #[error("Screen address out of range: page {page}, column {column}")]
    AddressOutOfRange { page: u8, column: u8 },

    /// Panel geometry the controller cannot drive.
    #[error("Invalid panel: {0}")]
    InvalidPanel(String),

    /// Invalid raster operation name.
    #[error("Invalid raster operation: {0}")]
    InvalidRasterOp(String),

    /// Invalid scroll direction name.
    #[error("Invalid scroll direction: {0}")]
    InvalidScrollDirection(String),

    /// Invalid scroll interval value.
    #[error("Invalid scroll interval: {0}")]
    InvalidScrollInterval(String),

    /// USB HID communication error.
    #[cfg(feature = "hid-bridge")]
    #[error("USB HID error: {0}")]
    Hid(#[from] hidapi::HidError),

    /// USB I2C bridge not found or could not be opened.
    #[cfg(feature = "hid-bridge")]
    #[error("USB I2C bridge not found (VID:PID 04D8:00DD)")]
    BridgeNotFound,
}
