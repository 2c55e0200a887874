//! Byte-oriented bus transport.
//!
//! The synchronizer only ever sends single command bytes and raw data blocks
//! to a register on a device address. Anything that can do that (an I2C
//! adapter, a USB bridge, an in-memory simulator) implements [`Bus`].

use crate::Result;

/// Raw probe/command/data primitives for one bus.
pub trait Bus {
    /// Returns true if a device acknowledges at `address`.
    fn probe(&mut self, address: u8) -> bool;

    /// Writes one byte to `register` on the device at `address`.
    fn write_register_byte(&mut self, address: u8, register: u8, value: u8) -> Result<()>;

    /// Writes a block of bytes to `register` and returns how many were sent.
    ///
    /// Transports with small transfer limits split the block into several
    /// transactions, each prefixed with `register`.
    fn write_register_region(&mut self, address: u8, register: u8, data: &[u8]) -> Result<usize>;
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn probe(&mut self, address: u8) -> bool {
        (**self).probe(address)
    }

    fn write_register_byte(&mut self, address: u8, register: u8, value: u8) -> Result<()> {
        (**self).write_register_byte(address, register, value)
    }

    fn write_register_region(&mut self, address: u8, register: u8, data: &[u8]) -> Result<usize> {
        (**self).write_register_region(address, register, data)
    }
}

impl<B: Bus + ?Sized> Bus for Box<B> {
    fn probe(&mut self, address: u8) -> bool {
        (**self).probe(address)
    }

    fn write_register_byte(&mut self, address: u8, register: u8, value: u8) -> Result<()> {
        (**self).write_register_byte(address, register, value)
    }

    fn write_register_region(&mut self, address: u8, register: u8, data: &[u8]) -> Result<usize> {
        (**self).write_register_region(address, register, data)
    }
}
