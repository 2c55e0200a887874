//! In-memory panel for tests and previews.
//!
//! [`SimulatedPanel`] implements [`Bus`] and interprets the command stream
//! of either controller into display RAM and display state, so a driver can
//! be exercised end to end without hardware.

use crate::bus::Bus;
use crate::gfx::Viewport;
use crate::oled::protocol::{COMMAND_REGISTER, DATA_REGISTER};
use crate::{Error, Result};
use tracing::trace;

/// Command dialect the simulator decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Page number OR'd into the page opcode.
    Ssd1306,
    /// Page number sent as a parameter byte.
    Ch1120,
}

/// One recorded register write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub address: u8,
    pub register: u8,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
struct Pending {
    opcode: u8,
    remaining: usize,
    params: Vec<u8>,
}

/// Simulated OLED controller on a simulated bus.
#[derive(Debug, Clone)]
pub struct SimulatedPanel {
    dialect: Dialect,
    columns: u8,
    ram: Vec<Vec<u8>>,
    page: u8,
    column: u8,
    pending: Option<Pending>,
    contrast: u8,
    inverted: bool,
    on: bool,
    scrolling: bool,
    scroll_config: Vec<u8>,
    segment_remap: bool,
    com_scan_reversed: bool,
    present: bool,
    respond_to: Option<u8>,
    fail_after: Option<usize>,
    log: Vec<Transaction>,
}

impl SimulatedPanel {
    fn new(dialect: Dialect, columns: u8, pages: u8) -> Self {
        Self {
            dialect,
            columns,
            ram: vec![vec![0; usize::from(columns)]; usize::from(pages)],
            page: 0,
            column: 0,
            pending: None,
            contrast: 0,
            inverted: false,
            on: false,
            scrolling: false,
            scroll_config: Vec::new(),
            segment_remap: false,
            com_scan_reversed: false,
            present: true,
            respond_to: None,
            fail_after: None,
            log: Vec::new(),
        }
    }

    /// An SSD1306 with 8 pages of 128 columns.
    pub fn ssd1306() -> Self {
        Self::new(Dialect::Ssd1306, 128, 8)
    }

    /// A CH1120 with 20 pages of 160 columns.
    pub fn ch1120() -> Self {
        Self::new(Dialect::Ch1120, 160, 20)
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Makes the device answer (or not) the presence probe.
    pub fn set_present(&mut self, present: bool) {
        self.present = present;
    }

    /// Only answers at `address`. By default every address answers.
    pub fn respond_to(mut self, address: u8) -> Self {
        self.respond_to = Some(address);
        self
    }

    /// Fails every write after the next `writes` successful ones.
    pub fn fail_after(&mut self, writes: usize) {
        self.fail_after = Some(writes);
    }

    /// Stops injecting faults.
    pub fn clear_fault(&mut self) {
        self.fail_after = None;
    }

    /// Recorded writes since the last [`clear_log`](Self::clear_log).
    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// Number of recorded writes.
    pub fn writes(&self) -> usize {
        self.log.len()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Every command byte in write order.
    pub fn command_bytes(&self) -> Vec<u8> {
        self.log
            .iter()
            .filter(|t| t.register != DATA_REGISTER)
            .flat_map(|t| t.bytes.iter().copied())
            .collect()
    }

    /// Total display RAM bytes written.
    pub fn data_bytes_written(&self) -> usize {
        self.log
            .iter()
            .filter(|t| t.register == DATA_REGISTER)
            .map(|t| t.bytes.len())
            .sum()
    }

    /// Display RAM of one page, or an empty slice past the end.
    pub fn ram(&self, page: usize) -> &[u8] {
        self.ram.get(page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pixel at a physical column and row of display RAM.
    pub fn pixel(&self, column: u8, row: u8) -> bool {
        self.ram(usize::from(row / 8))
            .get(usize::from(column))
            .is_some_and(|byte| byte & (1 << (row % 8)) != 0)
    }

    /// Pixel at `(x, y)` of a viewport, as the panel shows it.
    ///
    /// A mirrored segment map reads RAM from the far end of the controller's
    /// columns; a mirrored COM scan reverses rows within the viewport.
    pub fn visible_pixel(&self, x: u8, y: u8, viewport: &Viewport) -> bool {
        if x >= viewport.width || y >= viewport.height {
            return self.inverted;
        }
        let segment = u16::from(viewport.x) + u16::from(x);
        let column = if self.columns_mirrored() {
            u16::from(self.columns).checked_sub(segment + 1)
        } else {
            Some(segment)
        };
        let row = if self.rows_mirrored() {
            viewport.height - 1 - y
        } else {
            y
        };
        let row = u16::from(viewport.y) + u16::from(row);
        let lit = match (column.and_then(|c| u8::try_from(c).ok()), u8::try_from(row)) {
            (Some(column), Ok(row)) => self.pixel(column, row),
            _ => false,
        };
        lit != self.inverted
    }

    /// Mounted orientation differs per controller: SSD1306 modules read
    /// upright with the segment remap and reversed COM scan set, CH1120
    /// modules with both cleared.
    fn columns_mirrored(&self) -> bool {
        match self.dialect {
            Dialect::Ssd1306 => !self.segment_remap,
            Dialect::Ch1120 => self.segment_remap,
        }
    }

    fn rows_mirrored(&self) -> bool {
        match self.dialect {
            Dialect::Ssd1306 => !self.com_scan_reversed,
            Dialect::Ch1120 => self.com_scan_reversed,
        }
    }

    /// RAM cursor as `(page, column)`.
    pub fn cursor(&self) -> (u8, u8) {
        (self.page, self.column)
    }

    pub fn contrast(&self) -> u8 {
        self.contrast
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    /// Last scroll setup, opcode first.
    pub fn scroll_config(&self) -> &[u8] {
        &self.scroll_config
    }

    pub fn is_segment_remapped(&self) -> bool {
        self.segment_remap
    }

    pub fn is_com_scan_reversed(&self) -> bool {
        self.com_scan_reversed
    }

    fn record(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<()> {
        if let Some(remaining) = self.fail_after.as_mut() {
            if *remaining == 0 {
                trace!("Injected fault on write to 0x{:02X}", address);
                return Err(Error::BusTransfer {
                    address,
                    reason: "injected fault".to_string(),
                });
            }
            *remaining -= 1;
        }
        if !self.answers(address) {
            return Err(Error::BusTransfer {
                address,
                reason: "no acknowledge".to_string(),
            });
        }
        self.log.push(Transaction {
            address,
            register,
            bytes: bytes.to_vec(),
        });
        match register {
            DATA_REGISTER => self.write_ram(bytes),
            COMMAND_REGISTER => bytes.iter().for_each(|&b| self.feed(b)),
            _ => {}
        }
        Ok(())
    }

    fn answers(&self, address: u8) -> bool {
        self.present && self.respond_to.map_or(true, |a| a == address)
    }

    fn write_ram(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if let Some(cell) = self
                .ram
                .get_mut(usize::from(self.page))
                .and_then(|row| row.get_mut(usize::from(self.column)))
            {
                *cell = byte;
            }
            self.column = if u16::from(self.column) + 1 >= u16::from(self.columns) {
                0
            } else {
                self.column + 1
            };
        }
    }

    fn feed(&mut self, byte: u8) {
        if let Some(mut pending) = self.pending.take() {
            pending.params.push(byte);
            pending.remaining -= 1;
            if pending.remaining == 0 {
                self.execute(pending.opcode, &pending.params);
            } else {
                self.pending = Some(pending);
            }
            return;
        }
        match self.param_count(byte) {
            0 => self.execute(byte, &[]),
            remaining => {
                self.pending = Some(Pending {
                    opcode: byte,
                    remaining,
                    params: Vec::with_capacity(remaining),
                })
            }
        }
    }

    fn param_count(&self, opcode: u8) -> usize {
        match (self.dialect, opcode) {
            (Dialect::Ssd1306, 0x81 | 0x8D | 0xA8 | 0xD3 | 0xD5 | 0xD9 | 0xDA | 0xDB | 0x20) => 1,
            (Dialect::Ssd1306, 0x21 | 0x22 | 0xA3) => 2,
            (Dialect::Ssd1306, 0x29 | 0x2A) => 5,
            (Dialect::Ssd1306, 0x26 | 0x27) => 6,
            (
                Dialect::Ch1120,
                0xB0 | 0xA2 | 0x81 | 0xAC | 0x20 | 0xA3 | 0xA8 | 0xD3 | 0xD5 | 0x93 | 0xD8 | 0xD9
                | 0xDA | 0xDB | 0xAD,
            ) => 1,
            (Dialect::Ch1120, 0x24..=0x27) => 5,
            _ => 0,
        }
    }

    fn execute(&mut self, opcode: u8, params: &[u8]) {
        match opcode {
            0x00..=0x0F => self.column = (self.column & 0xF0) | opcode,
            0x10..=0x1F => self.column = (self.column & 0x0F) | ((opcode & 0x0F) << 4),
            0x24..=0x2A => {
                self.scroll_config = std::iter::once(opcode).chain(params.iter().copied()).collect();
            }
            0x2E => self.scrolling = false,
            0x2F => self.scrolling = true,
            0x81 => self.contrast = params.first().copied().unwrap_or(self.contrast),
            0xA0 | 0xA1 => self.segment_remap = opcode == 0xA1,
            0xA6 => self.inverted = false,
            0xA7 => self.inverted = true,
            0xAE => self.on = false,
            0xAF => self.on = true,
            0xB0..=0xBF => {
                self.page = match self.dialect {
                    Dialect::Ssd1306 => opcode & 0x0F,
                    Dialect::Ch1120 => params.first().copied().unwrap_or(0),
                };
            }
            0xC0 | 0xC8 => self.com_scan_reversed = opcode == 0xC8,
            _ => {}
        }
    }
}

impl Bus for SimulatedPanel {
    fn probe(&mut self, address: u8) -> bool {
        self.answers(address)
    }

    fn write_register_byte(&mut self, address: u8, register: u8, value: u8) -> Result<()> {
        self.record(address, register, &[value])
    }

    fn write_register_region(&mut self, address: u8, register: u8, data: &[u8]) -> Result<usize> {
        self.record(address, register, data)?;
        Ok(data.len())
    }
}
