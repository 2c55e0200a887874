//! SSD1306 page-addressed controller.
//!
//! Display RAM is 8 pages of 128 columns. A flush addresses each dirty page
//! at its first changed column and streams only the changed span.

use super::controller::Controller;
use super::protocol::{page_address_bytes, Command, Link, COMMAND_REGISTER, DATA_REGISTER};
use super::scroll::{ScrollDirection, ScrollInterval};
use crate::bus::Bus;
use crate::gfx::Viewport;
use crate::panel::PanelDescriptor;
use crate::Result;

const SET_DISPLAY_CLOCK_DIV: u8 = 0xD5;
const SET_MULTIPLEX: u8 = 0xA8;
const SET_DISPLAY_OFFSET: u8 = 0xD3;
const SET_START_LINE: u8 = 0x40;
const CHARGE_PUMP: u8 = 0x8D;
const MEMORY_MODE: u8 = 0x20;
const SEG_REMAP: u8 = 0xA0;
const COM_SCAN_INC: u8 = 0xC0;
const COM_SCAN_DEC: u8 = 0xC8;
const SET_COM_PINS: u8 = 0xDA;
const SET_PRE_CHARGE: u8 = 0xD9;
const SET_VCOM_DESELECT: u8 = 0xDB;

const RIGHT_HORIZONTAL_SCROLL: u8 = 0x26;
const LEFT_HORIZONTAL_SCROLL: u8 = 0x27;
const VERTICAL_RIGHT_SCROLL: u8 = 0x29;
const VERTICAL_LEFT_SCROLL: u8 = 0x2A;

/// Page addressing mode.
const PAGE_ADDRESSING: u8 = 0b10;
/// Internal charge pump enabled.
const CHARGE_PUMP_ON: u8 = 0x14;

/// SSD1306 controller (page/column differential transfer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ssd1306;

impl Controller for Ssd1306 {
    const NAME: &'static str = "ssd1306";
    const COMMAND: u8 = COMMAND_REGISTER;
    const DATA: u8 = DATA_REGISTER;
    const PHYSICAL_COLUMNS: u8 = 128;
    const PHYSICAL_PAGES: u8 = 8;

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
        link.commands(&[
            SET_DISPLAY_CLOCK_DIV,
            0x80,
            SET_MULTIPLEX,
            panel.height.saturating_sub(1),
            SET_DISPLAY_OFFSET,
            0x00,
            SET_START_LINE,
            CHARGE_PUMP,
            CHARGE_PUMP_ON,
            MEMORY_MODE,
            PAGE_ADDRESSING,
            Command::NormalDisplay as u8,
            Command::EntireDisplayResume as u8,
            SEG_REMAP | 0x01,
            COM_SCAN_DEC,
            SET_COM_PINS,
            panel.com_pins,
            Command::SetContrast as u8,
            contrast,
            SET_PRE_CHARGE,
            panel.pre_charge,
            SET_VCOM_DESELECT,
            panel.vcom_deselect,
            Command::DeactivateScroll as u8,
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
        link.commands(&page_address_bytes(page, column))
    }

    fn flip_vertical_command(&self, flip: bool) -> u8 {
        if flip {
            COM_SCAN_INC
        } else {
            COM_SCAN_DEC
        }
    }

    fn flip_horizontal_command(&mut self, flip: bool, _viewport: &Viewport) -> u8 {
        SEG_REMAP | if flip { 0x00 } else { 0x01 }
    }

    fn interval_code(&self, interval: ScrollInterval) -> u8 {
        match interval {
            ScrollInterval::Frames5 => 0x00,
            ScrollInterval::Frames64 => 0x01,
            ScrollInterval::Frames128 => 0x02,
            ScrollInterval::Frames256 => 0x03,
            ScrollInterval::Frames3 => 0x04,
            ScrollInterval::Frames4 => 0x05,
            ScrollInterval::Frames25 => 0x06,
            ScrollInterval::Frames2 => 0x07,
            // Nearest supported: 5 and 25 frames.
            ScrollInterval::Frames6 => 0x00,
            ScrollInterval::Frames32 => 0x06,
        }
    }

    fn scroll_config(
        &self,
        direction: ScrollDirection,
        start: u8,
        stop: u8,
        interval: ScrollInterval,
    ) -> Vec<u8> {
        let code = self.interval_code(interval);
        match direction {
            ScrollDirection::Right | ScrollDirection::Left => {
                let cmd = if direction == ScrollDirection::Right {
                    RIGHT_HORIZONTAL_SCROLL
                } else {
                    LEFT_HORIZONTAL_SCROLL
                };
                vec![cmd, 0x00, start, code, stop, 0x00, 0xFF]
            }
            ScrollDirection::VerticalRight | ScrollDirection::VerticalLeft => {
                let cmd = if direction == ScrollDirection::VerticalRight {
                    VERTICAL_RIGHT_SCROLL
                } else {
                    VERTICAL_LEFT_SCROLL
                };
                // Last byte is the vertical offset in rows per step.
                vec![cmd, 0x00, start, code, stop, 0x01]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{MICRO_OLED, NARROW_OLED, OLED_1IN3};
    use crate::sim::SimulatedPanel;
    use crate::Error;

    #[test]
    fn test_setup_sequence() {
        let mut sim = SimulatedPanel::ssd1306();
        let mut link = Link::new(&mut sim, 0x3D, Ssd1306::COMMAND, Ssd1306::DATA);
        Ssd1306.setup(&mut link, &NARROW_OLED, 0x8F, true).unwrap();
        assert_eq!(
            sim.command_bytes(),
            vec![
                0xAE, 0xD5, 0x80, 0xA8, 31, 0xD3, 0x00, 0x40, 0x8D, 0x14, 0x20, 0x02, 0xA6, 0xA4,
                0xA1, 0xC8, 0xDA, 0x02, 0x81, 0x8F, 0xD9, 0xF1, 0xDB, 0x40, 0x2E, 0xAF,
            ]
        );
    }

    #[test]
    fn test_setup_without_clear_keeps_power() {
        let mut sim = SimulatedPanel::ssd1306();
        let mut link = Link::new(&mut sim, 0x3D, Ssd1306::COMMAND, Ssd1306::DATA);
        Ssd1306.setup(&mut link, &OLED_1IN3, 0xCF, false).unwrap();
        let bytes = sim.command_bytes();
        assert_eq!(bytes.first(), Some(&0xD5));
        assert_eq!(bytes.last(), Some(&0x2E));
    }

    #[test]
    fn test_address_applies_viewport_offset() {
        let mut sim = SimulatedPanel::ssd1306();
        let mut link = Link::new(&mut sim, 0x3D, Ssd1306::COMMAND, Ssd1306::DATA);
        Ssd1306
            .set_address(&mut link, &MICRO_OLED.viewport(), 2, 14)
            .unwrap();
        // Column 14 + 2 = 0x10.
        assert_eq!(sim.command_bytes(), vec![0xB2, 0x11, 0x00]);
    }

    #[test]
    fn test_address_out_of_range() {
        let mut sim = SimulatedPanel::ssd1306();
        let mut link = Link::new(&mut sim, 0x3D, Ssd1306::COMMAND, Ssd1306::DATA);
        let vp = MICRO_OLED.viewport();
        assert!(matches!(
            Ssd1306.set_address(&mut link, &vp, 6, 0),
            Err(Error::AddressOutOfRange { page: 6, column: 0 })
        ));
        assert!(Ssd1306.set_address(&mut link, &vp, 0, 64).is_err());
        assert!(sim.command_bytes().is_empty());
    }

    #[test]
    fn test_address_beyond_controller_memory() {
        let mut sim = SimulatedPanel::ssd1306();
        let mut link = Link::new(&mut sim, 0x3D, Ssd1306::COMMAND, Ssd1306::DATA);
        // Inside the viewport, past column 127 of the controller.
        let shifted = Viewport::new(100, 0, 128, 64);
        assert!(matches!(
            Ssd1306.set_address(&mut link, &shifted, 0, 27),
            Err(Error::AddressOutOfRange { page: 0, column: 27 })
        ));
        // Inside the viewport, past page 7 of the controller.
        let tall = Viewport::new(0, 0, 128, 72);
        assert!(Ssd1306.set_address(&mut link, &tall, 8, 5).is_err());
        assert!(sim.command_bytes().is_empty());
    }

    #[test]
    fn test_address_applies_page_offset() {
        let mut sim = SimulatedPanel::ssd1306();
        let mut link = Link::new(&mut sim, 0x3D, Ssd1306::COMMAND, Ssd1306::DATA);
        let lower = Viewport::new(0, 32, 128, 32);
        Ssd1306.set_address(&mut link, &lower, 1, 0).unwrap();
        assert_eq!(sim.command_bytes(), vec![0xB5, 0x10, 0x00]);
        let mut link = Link::new(&mut sim, 0x3D, Ssd1306::COMMAND, Ssd1306::DATA);
        assert!(Ssd1306.set_address(&mut link, &lower, 4, 0).is_err());
    }

    #[test]
    fn test_clear_memory_covers_all_pages() {
        let mut sim = SimulatedPanel::ssd1306();
        let mut link = Link::new(&mut sim, 0x3D, Ssd1306::COMMAND, Ssd1306::DATA);
        Ssd1306.clear_memory(&mut link).unwrap();
        assert_eq!(sim.data_bytes_written(), 8 * 128);
    }

    #[test]
    fn test_interval_codes() {
        let expected = [
            (ScrollInterval::Frames2, 0x07),
            (ScrollInterval::Frames3, 0x04),
            (ScrollInterval::Frames4, 0x05),
            (ScrollInterval::Frames5, 0x00),
            (ScrollInterval::Frames6, 0x00),
            (ScrollInterval::Frames25, 0x06),
            (ScrollInterval::Frames32, 0x06),
            (ScrollInterval::Frames64, 0x01),
            (ScrollInterval::Frames128, 0x02),
            (ScrollInterval::Frames256, 0x03),
        ];
        for (interval, code) in expected {
            assert_eq!(Ssd1306.interval_code(interval), code, "{interval}");
        }
    }

    #[test]
    fn test_scroll_config() {
        assert_eq!(
            Ssd1306.scroll_config(ScrollDirection::Left, 0, 7, ScrollInterval::Frames2),
            vec![0x27, 0x00, 0x00, 0x07, 0x07, 0x00, 0xFF]
        );
        assert_eq!(
            Ssd1306.scroll_config(ScrollDirection::VerticalRight, 1, 3, ScrollInterval::Frames64),
            vec![0x29, 0x00, 0x01, 0x01, 0x03, 0x01]
        );
    }

    #[test]
    fn test_flip_commands() {
        let vp = OLED_1IN3.viewport();
        let mut ctl = Ssd1306;
        assert_eq!(ctl.flip_vertical_command(true), 0xC0);
        assert_eq!(ctl.flip_vertical_command(false), 0xC8);
        assert_eq!(ctl.flip_horizontal_command(true, &vp), 0xA0);
        assert_eq!(ctl.flip_horizontal_command(false, &vp), 0xA1);
    }
}
