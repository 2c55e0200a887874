//! Controller abstraction.
//!
//! A controller knows its command set and how display RAM is addressed. The
//! generic [`Oled`](super::Oled) synchronizer drives any controller through
//! this trait; panel geometry and electrical parameters come from a
//! [`PanelDescriptor`].

use super::protocol::Link;
use super::scroll::{ScrollDirection, ScrollInterval};
use crate::bus::Bus;
use crate::gfx::Viewport;
use crate::panel::PanelDescriptor;
use crate::{Error, Result};

/// Command set and memory addressing of one OLED controller family.
pub trait Controller {
    /// Human-readable controller name.
    const NAME: &'static str;
    /// Register select for command bytes.
    const COMMAND: u8;
    /// Register select for display RAM bytes.
    const DATA: u8;
    /// Columns of controller memory.
    const PHYSICAL_COLUMNS: u8;
    /// Pages of controller memory.
    const PHYSICAL_PAGES: u8;

    /// Sends the setup sequence. Display off/on brackets the sequence only
    /// when `clear_display` is set.
    fn setup<B: Bus + ?Sized>(
        &mut self,
        link: &mut Link<'_, B>,
        panel: &PanelDescriptor,
        contrast: u8,
        clear_display: bool,
    ) -> Result<()>;

    /// Moves the RAM cursor to a physical page and column.
    fn set_raw_address<B: Bus + ?Sized>(
        &self,
        link: &mut Link<'_, B>,
        page: u8,
        column: u8,
    ) -> Result<()>;

    /// Column added to every viewport column when addressing RAM.
    fn column_offset(&self, viewport: &Viewport) -> u16 {
        u16::from(viewport.x)
    }

    /// Page added to every viewport page when addressing RAM.
    fn page_offset(&self, viewport: &Viewport) -> u16 {
        u16::from(viewport.y / 8)
    }

    /// Moves the RAM cursor to `column` of `page`, both relative to the
    /// viewport. Fails if either lies outside the viewport or the resulting
    /// physical address lies outside controller memory.
    fn set_address<B: Bus + ?Sized>(
        &self,
        link: &mut Link<'_, B>,
        viewport: &Viewport,
        page: u8,
        column: u8,
    ) -> Result<()> {
        if usize::from(page) >= viewport.pages() || column >= viewport.width {
            return Err(Error::AddressOutOfRange { page, column });
        }
        let physical_column = u16::from(column) + self.column_offset(viewport);
        let physical_page = u16::from(page) + self.page_offset(viewport);
        if physical_column >= u16::from(Self::PHYSICAL_COLUMNS)
            || physical_page >= u16::from(Self::PHYSICAL_PAGES)
        {
            return Err(Error::AddressOutOfRange { page, column });
        }
        self.set_raw_address(link, physical_page as u8, physical_column as u8)
    }

    /// Zeroes all of controller memory, visible or not.
    fn clear_memory<B: Bus + ?Sized>(&self, link: &mut Link<'_, B>) -> Result<()> {
        let zeros = vec![0u8; usize::from(Self::PHYSICAL_COLUMNS)];
        for page in 0..Self::PHYSICAL_PAGES {
            self.set_raw_address(link, page, 0)?;
            link.data(&zeros)?;
        }
        Ok(())
    }

    /// Columns actually streamed for a page whose tracked range is `bounds`.
    fn transfer_span(&self, bounds: (u8, u8), _width: u8) -> (u8, u8) {
        bounds
    }

    /// Command byte selecting normal or mirrored row scan.
    fn flip_vertical_command(&self, flip: bool) -> u8;

    /// Command byte selecting normal or mirrored column mapping. Updates
    /// any addressing correction the mirrored mode needs.
    fn flip_horizontal_command(&mut self, flip: bool, viewport: &Viewport) -> u8;

    /// Hardware code for a scroll interval.
    fn interval_code(&self, interval: ScrollInterval) -> u8;

    /// Scroll setup block sent between deactivate and activate.
    fn scroll_config(
        &self,
        direction: ScrollDirection,
        start: u8,
        stop: u8,
        interval: ScrollInterval,
    ) -> Vec<u8>;
}
