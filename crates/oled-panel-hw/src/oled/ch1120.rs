//! CH1120 controller.
//!
//! Display RAM is 20 pages of 160 columns. Partial-row writes are not
//! reliable on this part, so every page that needs a flush is streamed in
//! full. Page and column are sent as separate command bytes rather than
//! OR'd into the opcode.

use super::controller::Controller;
use super::protocol::{Command, Link, COLUMN_HIGH, COLUMN_LOW, PAGE_ADDRESS};
use super::scroll::{ScrollDirection, ScrollInterval};
use crate::bus::Bus;
use crate::gfx::Viewport;
use crate::panel::PanelDescriptor;
use crate::Result;

/// Control bytes selecting what the rest of a transfer carries.
pub struct ControlByte;

impl ControlByte {
    /// Command stream.
    pub const COMMAND: u8 = 0x00;
    /// Display RAM write.
    pub const RAM: u8 = 0x40;
}

const START_LINE: u8 = 0xA2;
const GRAY_MONO: u8 = 0xAC;
const ADDRESSING_MODE: u8 = 0x20;
const SEG_REMAP_DOWN: u8 = 0xA0;
const SEG_REMAP_UP: u8 = 0xA1;
const COM_SCAN_FIRST: u8 = 0xC0;
const COM_SCAN_LAST: u8 = 0xC8;
const DISPLAY_ROTATION: u8 = 0xA3;
const DISPLAY_OFFSET: u8 = 0xD3;
const DISCHARGE_FRONT: u8 = 0x93;
const DISCHARGE_BACK: u8 = 0xD8;
const PRE_CHARGE: u8 = 0xD9;
const SEG_PADS: u8 = 0xDA;
const VCOM_DESELECT: u8 = 0xDB;
const EXTERNAL_IREF: u8 = 0xAD;

const DOWN_VERTICAL_SCROLL: u8 = 0x24;
const UP_VERTICAL_SCROLL: u8 = 0x25;
const RIGHT_HORIZONTAL_SCROLL: u8 = 0x26;
const LEFT_HORIZONTAL_SCROLL: u8 = 0x27;

/// Default scroll window edge for a 128-pixel panel.
const SCROLL_WINDOW_END: u8 = 0x7F;

/// CH1120 controller (full-row transfer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ch1120 {
    /// Column correction applied while horizontally mirrored.
    flip_offset: u8,
}

impl Ch1120 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mirrored-column correction.
    pub fn flip_offset(&self) -> u8 {
        self.flip_offset
    }
}

impl Controller for Ch1120 {
    const NAME: &'static str = "ch1120";
    const COMMAND: u8 = ControlByte::COMMAND;
    const DATA: u8 = ControlByte::RAM;
    const PHYSICAL_COLUMNS: u8 = 160;
    const PHYSICAL_PAGES: u8 = 20;

    fn setup<B: Bus + ?Sized>(
        &mut self,
        link: &mut Link<'_, B>,
        panel: &PanelDescriptor,
        contrast: u8,
        clear_display: bool,
    ) -> Result<()> {
        if clear_display {
            link.command(Command::DisplayOff)?;
        }
        self.set_raw_address(link, 0, 0)?;
        link.commands(&[
            START_LINE,
            0x00,
            Command::SetContrast as u8,
            contrast,
            GRAY_MONO,
            0x01,
            ADDRESSING_MODE,
            0x01,
            SEG_REMAP_DOWN,
            COM_SCAN_FIRST,
            DISPLAY_ROTATION,
            0x01,
            Command::EntireDisplayResume as u8,
            DISPLAY_OFFSET,
            0x10,
            DISCHARGE_FRONT,
            0x02,
            DISCHARGE_BACK,
            0x02,
            PRE_CHARGE,
            panel.pre_charge,
            SEG_PADS,
            panel.com_pins,
            VCOM_DESELECT,
            panel.vcom_deselect,
            EXTERNAL_IREF,
            0x02,
        ])?;
        if clear_display {
            link.command(Command::DisplayOn)?;
        }
        Ok(())
    }

    fn set_raw_address<B: Bus + ?Sized>(
        &self,
        link: &mut Link<'_, B>,
        page: u8,
        column: u8,
    ) -> Result<()> {
        link.commands(&[
            PAGE_ADDRESS,
            page,
            COLUMN_HIGH | (column >> 4),
            COLUMN_LOW & column,
        ])
    }

    fn column_offset(&self, viewport: &Viewport) -> u16 {
        u16::from(viewport.x) + u16::from(self.flip_offset)
    }

    fn transfer_span(&self, _bounds: (u8, u8), width: u8) -> (u8, u8) {
        (0, width.saturating_sub(1))
    }

    fn flip_vertical_command(&self, flip: bool) -> u8 {
        if flip {
            COM_SCAN_LAST
        } else {
            COM_SCAN_FIRST
        }
    }

    fn flip_horizontal_command(&mut self, flip: bool, viewport: &Viewport) -> u8 {
        if flip {
            self.flip_offset = Self::PHYSICAL_COLUMNS.saturating_sub(viewport.width);
            SEG_REMAP_UP
        } else {
            self.flip_offset = 0;
            SEG_REMAP_DOWN
        }
    }

    fn interval_code(&self, interval: ScrollInterval) -> u8 {
        match interval {
            ScrollInterval::Frames6 => 0x00,
            ScrollInterval::Frames32 => 0x01,
            ScrollInterval::Frames64 => 0x02,
            ScrollInterval::Frames128 => 0x03,
            ScrollInterval::Frames3 => 0x04,
            ScrollInterval::Frames4 => 0x05,
            ScrollInterval::Frames5 => 0x06,
            ScrollInterval::Frames2 => 0x07,
            // Nearest supported: 32 and 128 frames.
            ScrollInterval::Frames25 => 0x01,
            ScrollInterval::Frames256 => 0x03,
        }
    }

    /// `[direction, col_start, col_end, row_start, row_end, interval]`.
    /// Page bounds scale to 8-pixel units on the scrolled axis.
    fn scroll_config(
        &self,
        direction: ScrollDirection,
        start: u8,
        stop: u8,
        interval: ScrollInterval,
    ) -> Vec<u8> {
        let first = start.saturating_mul(8);
        let last = stop.saturating_mul(8).saturating_add(7);
        let mut config = vec![
            RIGHT_HORIZONTAL_SCROLL,
            0x00,
            SCROLL_WINDOW_END,
            0x00,
            SCROLL_WINDOW_END,
            self.interval_code(interval),
        ];
        match direction {
            ScrollDirection::Right | ScrollDirection::Left => {
                if direction == ScrollDirection::Left {
                    config[0] = LEFT_HORIZONTAL_SCROLL;
                }
                config[1] = first;
                config[2] = last;
            }
            ScrollDirection::VerticalRight | ScrollDirection::VerticalLeft => {
                config[0] = if direction == ScrollDirection::UP {
                    UP_VERTICAL_SCROLL
                } else {
                    DOWN_VERTICAL_SCROLL
                };
                config[3] = first;
                config[4] = last;
            }
        }
        config
    }
}
