//! OLED controller protocol definitions and encoding.
//!
//! Protocol structure:
//! - Every transfer targets one register on the device address
//! - Register 0x00 carries command bytes, register 0x40 carries display RAM
//! - Display RAM is addressed by page (8 rows) and column

use crate::bus::Bus;
use crate::{Error, Result};

/// Register that receives command bytes.
pub const COMMAND_REGISTER: u8 = 0x00;

/// Register that receives display RAM bytes.
pub const DATA_REGISTER: u8 = 0x40;

/// Page address base; OR'd with the page on page-addressed controllers.
pub const PAGE_ADDRESS: u8 = 0xB0;

/// Column high nibble base.
pub const COLUMN_HIGH: u8 = 0x10;

/// Column low nibble mask.
pub const COLUMN_LOW: u8 = 0x0F;

/// Commands shared by the supported controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Stop hardware scrolling.
    DeactivateScroll = 0x2E,
    /// Start hardware scrolling with the last configuration.
    ActivateScroll = 0x2F,
    /// Contrast; followed by the value.
    SetContrast = 0x81,
    /// Show RAM content.
    EntireDisplayResume = 0xA4,
    /// Lit pixels for set bits.
    NormalDisplay = 0xA6,
    /// Lit pixels for clear bits.
    InvertDisplay = 0xA7,
    /// Panel off (sleep).
    DisplayOff = 0xAE,
    /// Panel on.
    DisplayOn = 0xAF,
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd as u8
    }
}

/// Builds the three page-mode address bytes for `page` and `column`.
pub fn page_address_bytes(page: u8, column: u8) -> [u8; 3] {
    [
        PAGE_ADDRESS | (page & 0x0F),
        COLUMN_HIGH | (column >> 4),
        COLUMN_LOW & column,
    ]
}

/// Command and data channel to one device on a bus.
pub struct Link<'a, B: ?Sized> {
    bus: &'a mut B,
    address: u8,
    command_register: u8,
    data_register: u8,
}

impl<'a, B: Bus + ?Sized> Link<'a, B> {
    pub fn new(bus: &'a mut B, address: u8, command_register: u8, data_register: u8) -> Self {
        Self {
            bus,
            address,
            command_register,
            data_register,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Sends one command byte.
    pub fn command(&mut self, byte: impl Into<u8>) -> Result<()> {
        self.bus
            .write_register_byte(self.address, self.command_register, byte.into())
    }

    /// Sends command bytes one write at a time.
    pub fn commands(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.command(byte)?;
        }
        Ok(())
    }

    /// Sends command bytes as a single block write.
    pub fn command_block(&mut self, bytes: &[u8]) -> Result<()> {
        let written = self
            .bus
            .write_register_region(self.address, self.command_register, bytes)?;
        check_written(bytes.len(), written)
    }

    /// Streams bytes into display RAM at the current address.
    pub fn data(&mut self, bytes: &[u8]) -> Result<()> {
        let written = self
            .bus
            .write_register_region(self.address, self.data_register, bytes)?;
        check_written(bytes.len(), written)
    }
}

fn check_written(expected: usize, written: usize) -> Result<()> {
    if written != expected {
        tracing::warn!("Short bus write: {} of {} bytes", written, expected);
        return Err(Error::ShortWrite { expected, written });
    }
    Ok(())
}
