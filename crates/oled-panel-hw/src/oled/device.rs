//! Generic OLED device: a frame buffer synchronized to one controller.

use super::ch1120::Ch1120;
use super::controller::Controller;
use super::protocol::{Command, Link};
use super::scroll::{ScrollDirection, ScrollInterval};
use super::ssd1306::Ssd1306;
use crate::bus::Bus;
use crate::gfx::{Blit, Canvas, PageBuffer, Surface, Viewport};
use crate::panel::PanelDescriptor;
use crate::raster::RasterOp;
use crate::resource::{Bitmap, Font};
use crate::{Error, Result};
use tracing::{debug, info, warn};

/// An SSD1306-driven panel.
pub type Ssd1306Oled<B> = Oled<B, Ssd1306>;

/// A CH1120-driven panel.
pub type Ch1120Oled<B> = Oled<B, Ch1120>;

/// OLED panel driver.
///
/// Owns the frame buffer for a panel and pushes changed regions to the
/// controller on [`display`](Self::display). Drawing never touches the bus.
/// Panel-control calls made before [`init`](Self::init) succeed without
/// doing anything.
#[derive(Debug)]
pub struct Oled<B, C> {
    panel: PanelDescriptor,
    controller: C,
    canvas: Canvas<PageBuffer>,
    bus: Option<B>,
    address: u8,
    contrast: u8,
    initialized: bool,
}

impl<B: Bus, C: Controller> Oled<B, C> {
    /// Creates a driver for `panel`. No bus is attached yet.
    pub fn new(panel: PanelDescriptor, controller: C) -> Result<Self> {
        panel.validate(C::PHYSICAL_COLUMNS, C::PHYSICAL_PAGES)?;
        let canvas = Canvas::new(PageBuffer::new(panel.viewport()), &PageBuffer::hooks())?;
        Ok(Self {
            address: panel.address,
            contrast: panel.contrast,
            panel,
            controller,
            canvas,
            bus: None,
            initialized: false,
        })
    }

    /// Attaches a bus, builder style.
    pub fn with_bus(mut self, bus: B) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Attaches a bus and the device address to use on it.
    pub fn set_comm_bus(&mut self, bus: B, address: u8) {
        self.bus = Some(bus);
        self.address = address;
    }

    /// Changes the device address, e.g. to the panel's alternate address.
    pub fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn bus(&self) -> Option<&B> {
        self.bus.as_ref()
    }

    pub fn bus_mut(&mut self) -> Option<&mut B> {
        self.bus.as_mut()
    }

    /// Detaches and returns the bus. The device becomes uninitialized.
    pub fn release_bus(&mut self) -> Option<B> {
        self.initialized = false;
        self.bus.take()
    }

    pub fn panel(&self) -> &PanelDescriptor {
        &self.panel
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Probes the device, runs the setup sequence and zeroes local and
    /// device memory.
    ///
    /// On failure the device stays uninitialized.
    pub fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.probe()?;
        self.setup(true)?;
        self.init_buffers()?;
        self.initialized = true;
        info!(
            "{} panel '{}' initialized at 0x{:02X} ({}x{})",
            C::NAME,
            self.panel.name,
            self.address,
            self.width(),
            self.height()
        );
        Ok(())
    }

    /// Re-runs the setup sequence, optionally clearing both buffers.
    pub fn reset(&mut self, clear_display: bool) -> Result<()> {
        if !self.initialized {
            return self.init();
        }
        self.probe()?;
        self.setup(clear_display)?;
        if clear_display {
            self.init_buffers()?;
        }
        info!("{} panel reset (clear: {})", C::NAME, clear_display);
        Ok(())
    }

    fn probe(&mut self) -> Result<()> {
        let address = self.address;
        let bus = self.bus.as_mut().ok_or(Error::BusNotAttached)?;
        if !bus.probe(address) {
            warn!("No OLED device answered at 0x{:02X}", address);
            return Err(Error::DeviceNotFound(address));
        }
        Ok(())
    }

    fn setup(&mut self, clear_display: bool) -> Result<()> {
        let address = self.address;
        let bus = self.bus.as_mut().ok_or(Error::BusNotAttached)?;
        let mut link = Link::new(bus, address, C::COMMAND, C::DATA);
        self.controller
            .setup(&mut link, &self.panel, self.contrast, clear_display)
    }

    /// Zeroes device memory, then the local buffer and trackers. If the
    /// device clear fails the trackers still describe what the device
    /// shows, so a later erase and flush can blank it.
    fn init_buffers(&mut self) -> Result<()> {
        self.clear_device_memory()?;
        self.canvas.surface_mut().clear();
        Ok(())
    }

    fn clear_device_memory(&mut self) -> Result<()> {
        let address = self.address;
        let bus = self.bus.as_mut().ok_or(Error::BusNotAttached)?;
        let mut link = Link::new(bus, address, C::COMMAND, C::DATA);
        self.controller.clear_memory(&mut link)
    }

    fn send_commands(&mut self, bytes: &[u8]) -> Result<()> {
        let address = self.address;
        let bus = self.bus.as_mut().ok_or(Error::BusNotAttached)?;
        Link::new(bus, address, C::COMMAND, C::DATA).commands(bytes)
    }

    /// Sends every changed region of the buffer to the device.
    ///
    /// A page is sent when it has dirty columns, or erased columns after an
    /// [`erase`](Self::erase). Clean pages cost no bus traffic.
    pub fn display(&mut self) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }
        let address = self.address;
        let bus = self.bus.as_mut().ok_or(Error::BusNotAttached)?;
        let mut link = Link::new(bus, address, C::COMMAND, C::DATA);
        let buffer = self.canvas.surface_mut();
        let viewport = buffer.viewport();

        let mut pages_sent = 0usize;
        let mut bytes_sent = 0usize;
        for page in 0..buffer.pages() {
            let Some(bounds) = buffer.tracker().transfer_range(page).bounds() else {
                continue;
            };
            let (first, last) = self.controller.transfer_span(bounds, viewport.width);
            // Page count fits in u8; the panel was validated against the controller.
            self.controller
                .set_address(&mut link, &viewport, page as u8, first)?;
            link.data(&buffer.page(page)[usize::from(first)..=usize::from(last)])?;
            buffer.tracker_mut().commit(page);
            pages_sent += 1;
            bytes_sent += usize::from(last - first) + 1;
        }
        buffer.tracker_mut().finish_flush();

        if pages_sent > 0 {
            debug!("Flushed {} pages, {} bytes", pages_sent, bytes_sent);
        }
        Ok(())
    }

    /// Clears everything drawn since the last full clear. The device is
    /// blanked on the next [`display`](Self::display).
    pub fn erase(&mut self) {
        self.canvas.surface_mut().erase();
    }

    /// Marks everything the device currently shows for resending and
    /// flushes.
    fn resend_graphics(&mut self) -> Result<()> {
        self.canvas.surface_mut().tracker_mut().absorb_erase_all();
        self.display()
    }

    /// Inverts lit and unlit pixels on the device.
    pub fn invert(&mut self, invert: bool) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }
        let cmd = if invert {
            Command::InvertDisplay
        } else {
            Command::NormalDisplay
        };
        self.send_commands(&[cmd as u8])
    }

    /// Mirrors the display vertically and resends the visible content.
    pub fn flip_vertical(&mut self, flip: bool) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }
        let cmd = self.controller.flip_vertical_command(flip);
        debug!("Vertical flip: {}", flip);
        self.send_commands(&[cmd])?;
        self.resend_graphics()
    }

    /// Mirrors the display horizontally and resends the visible content.
    pub fn flip_horizontal(&mut self, flip: bool) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }
        let viewport = self.viewport();
        let cmd = self.controller.flip_horizontal_command(flip, &viewport);
        debug!("Horizontal flip: {}", flip);
        self.send_commands(&[cmd])?;
        self.resend_graphics()
    }

    /// Starts a hardware scroll over pages `start..=stop`.
    ///
    /// Scrolling is stopped, reconfigured and restarted in three separate
    /// writes, so a running scroll can be retuned.
    pub fn scroll(
        &mut self,
        direction: ScrollDirection,
        start: u8,
        stop: u8,
        interval: ScrollInterval,
    ) -> Result<()> {
        if stop < start {
            return Err(Error::InvalidScrollRange { start, stop });
        }
        if !self.initialized {
            return Ok(());
        }
        let config = self
            .controller
            .scroll_config(direction, start, stop, interval);
        debug!(
            "Scroll {} pages {}..={} every {}: {:02X?}",
            direction, start, stop, interval, config
        );
        let address = self.address;
        let bus = self.bus.as_mut().ok_or(Error::BusNotAttached)?;
        let mut link = Link::new(bus, address, C::COMMAND, C::DATA);
        link.command(Command::DeactivateScroll)?;
        link.command_block(&config)?;
        link.command(Command::ActivateScroll)
    }

    /// Stops scrolling, blanks all controller memory and resends the
    /// visible content.
    pub fn stop_scroll(&mut self) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.send_commands(&[Command::DeactivateScroll as u8])?;
        self.clear_device_memory()?;
        self.resend_graphics()
    }

    /// Turns the panel on or off. Display RAM is retained.
    pub fn display_power(&mut self, on: bool) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }
        let cmd = if on {
            Command::DisplayOn
        } else {
            Command::DisplayOff
        };
        self.send_commands(&[cmd as u8])
    }

    /// Sets the contrast. Before init the value is only stored for setup.
    pub fn set_contrast(&mut self, contrast: u8) -> Result<()> {
        self.contrast = contrast;
        if !self.initialized {
            return Ok(());
        }
        debug!("Contrast: 0x{:02X}", contrast);
        self.send_commands(&[Command::SetContrast as u8, contrast])
    }

    pub fn contrast(&self) -> u8 {
        self.contrast
    }

    /// Moves or resizes the drawing area. Device memory is cleared when
    /// initialized so no stale pixels remain outside the new area; content
    /// kept by a move is resent on the next flush.
    ///
    /// Fails with [`Error::InvalidPanel`] if the area does not fit the
    /// controller's memory; the current viewport is kept.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.panel
            .with_viewport(viewport)
            .validate(C::PHYSICAL_COLUMNS, C::PHYSICAL_PAGES)?;
        self.canvas.set_viewport(viewport);
        if !self.initialized {
            return Ok(());
        }
        let buffer = self.canvas.surface_mut();
        buffer.tracker_mut().reset(viewport.pages());
        for page in 0..buffer.pages() {
            if buffer.page(page).iter().any(|&b| b != 0) {
                buffer
                    .tracker_mut()
                    .mark_span(page, 0, viewport.width.saturating_sub(1));
            }
        }
        self.clear_device_memory()
    }

    pub fn viewport(&self) -> Viewport {
        self.canvas.viewport()
    }

    pub fn width(&self) -> u8 {
        self.viewport().width
    }

    pub fn height(&self) -> u8 {
        self.viewport().height
    }

    pub fn canvas(&self) -> &Canvas<PageBuffer> {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas<PageBuffer> {
        &mut self.canvas
    }

    /// The local frame buffer.
    pub fn buffer(&self) -> &PageBuffer {
        self.canvas.surface()
    }

    // Drawing, delegated to the canvas.

    pub fn pixel(&mut self, x: u8, y: u8, color: bool) {
        self.canvas.pixel(x, y, color);
    }

    pub fn get_pixel(&self, x: u8, y: u8) -> bool {
        self.canvas.surface().get_pixel(x, y)
    }

    pub fn line(&mut self, x0: u8, y0: u8, x1: u8, y1: u8, color: bool) {
        self.canvas.line(x0, y0, x1, y1, color);
    }

    pub fn rectangle(&mut self, x: u8, y: u8, width: u8, height: u8, color: bool) {
        self.canvas.rectangle(x, y, width, height, color);
    }

    pub fn rectangle_fill(&mut self, x: u8, y: u8, width: u8, height: u8, color: bool) {
        self.canvas.rectangle_fill(x, y, width, height, color);
    }

    pub fn circle(&mut self, x: u8, y: u8, radius: u8, color: bool) {
        self.canvas.circle(x, y, radius, color);
    }

    pub fn circle_fill(&mut self, x: u8, y: u8, radius: u8, color: bool) {
        self.canvas.circle_fill(x, y, radius, color);
    }

    pub fn blit(&mut self, blit: &Blit<'_>) {
        self.canvas.blit(blit);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn bitmap_raw(
        &mut self,
        x: u8,
        y: u8,
        width: u8,
        height: u8,
        data: &[u8],
        source_width: u8,
        source_height: u8,
    ) {
        self.canvas
            .bitmap_raw(x, y, width, height, data, source_width, source_height);
    }

    pub fn bitmap(&mut self, x: u8, y: u8, bitmap: &Bitmap<'_>) {
        self.canvas.bitmap(x, y, bitmap);
    }

    pub fn text(&mut self, x: u8, y: u8, text: &str, color: bool) {
        self.canvas.text(x, y, text, color);
    }

    pub fn set_font(&mut self, font: &'static Font) {
        self.canvas.set_font(font);
    }

    pub fn font(&self) -> &'static Font {
        self.canvas.font()
    }

    pub fn measure_string(&self, text: &str) -> (u16, u16) {
        self.canvas.measure_string(text)
    }

    pub fn set_raster_op(&mut self, op: RasterOp) {
        self.canvas.set_raster_op(op);
    }

    pub fn raster_op(&self) -> RasterOp {
        self.canvas.raster_op()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{MICRO_OLED, OLED_1IN3, OLED_1IN5};
    use crate::sim::SimulatedPanel;

    fn ssd1306() -> Ssd1306Oled<SimulatedPanel> {
        let mut oled = Oled::new(OLED_1IN3, Ssd1306)
            .unwrap()
            .with_bus(SimulatedPanel::ssd1306());
        oled.init().unwrap();
        oled.bus_mut().unwrap().clear_log();
        oled
    }

    #[test]
    fn test_init_without_bus() {
        let mut oled: Ssd1306Oled<SimulatedPanel> = Oled::new(OLED_1IN3, Ssd1306).unwrap();
        assert!(matches!(oled.init(), Err(Error::BusNotAttached)));
        assert!(!oled.is_initialized());
    }

    #[test]
    fn test_init_absent_device() {
        let mut sim = SimulatedPanel::ssd1306();
        sim.set_present(false);
        let mut oled = Oled::new(OLED_1IN3, Ssd1306).unwrap().with_bus(sim);
        assert!(matches!(oled.init(), Err(Error::DeviceNotFound(0x3D))));
        assert!(!oled.is_initialized());
        assert_eq!(oled.bus().unwrap().writes(), 0);
    }

    #[test]
    fn test_invalid_panel_rejected() {
        let panel = PanelDescriptor::custom(128, 128, 0, 0);
        assert!(matches!(
            Oled::<SimulatedPanel, _>::new(panel, Ssd1306),
            Err(Error::InvalidPanel(_))
        ));
    }

    #[test]
    fn test_second_display_is_silent() {
        let mut oled = ssd1306();
        oled.line(0, 0, 127, 0, true);
        oled.display().unwrap();
        assert!(oled.bus().unwrap().writes() > 0);
        oled.bus_mut().unwrap().clear_log();
        oled.display().unwrap();
        assert_eq!(oled.bus().unwrap().writes(), 0);
    }

    #[test]
    fn test_display_sends_only_dirty_span() {
        let mut oled = ssd1306();
        oled.pixel(40, 9, true);
        oled.pixel(44, 9, true);
        oled.display().unwrap();
        let sim = oled.bus().unwrap();
        assert_eq!(sim.command_bytes(), vec![0xB1, 0x12, 0x08]);
        assert_eq!(sim.data_bytes_written(), 5);
        assert_eq!(sim.ram(1)[40], 0b10);
    }

    #[test]
    fn test_before_init_controls_are_noops() {
        let mut oled = Oled::new(OLED_1IN3, Ssd1306)
            .unwrap()
            .with_bus(SimulatedPanel::ssd1306());
        oled.pixel(1, 1, true);
        oled.display().unwrap();
        oled.invert(true).unwrap();
        oled.display_power(false).unwrap();
        oled.set_contrast(0x10).unwrap();
        oled.stop_scroll().unwrap();
        assert_eq!(oled.bus().unwrap().writes(), 0);
        assert_eq!(oled.contrast(), 0x10);
    }

    #[test]
    fn test_contrast_stored_for_setup() {
        let mut oled = Oled::new(OLED_1IN3, Ssd1306)
            .unwrap()
            .with_bus(SimulatedPanel::ssd1306());
        oled.set_contrast(0x42).unwrap();
        oled.init().unwrap();
        assert_eq!(oled.bus().unwrap().contrast(), 0x42);
        oled.set_contrast(0x7F).unwrap();
        assert_eq!(oled.bus().unwrap().contrast(), 0x7F);
    }

    #[test]
    fn test_scroll_rejects_reversed_range() {
        let mut oled = ssd1306();
        assert!(matches!(
            oled.scroll(ScrollDirection::Right, 5, 2, ScrollInterval::Frames2),
            Err(Error::InvalidScrollRange { start: 5, stop: 2 })
        ));
        assert_eq!(oled.bus().unwrap().writes(), 0);
    }

    #[test]
    fn test_scroll_is_three_writes() {
        let mut oled = ssd1306();
        oled.scroll(ScrollDirection::Right, 0, 7, ScrollInterval::Frames2)
            .unwrap();
        let sim = oled.bus().unwrap();
        assert_eq!(sim.writes(), 3);
        assert_eq!(
            sim.command_bytes(),
            vec![0x2E, 0x26, 0x00, 0x00, 0x07, 0x07, 0x00, 0xFF, 0x2F]
        );
        assert!(sim.is_scrolling());
    }

    #[test]
    fn test_power_and_invert() {
        let mut oled = ssd1306();
        oled.invert(true).unwrap();
        oled.display_power(false).unwrap();
        let sim = oled.bus().unwrap();
        assert!(sim.is_inverted());
        assert!(!sim.is_on());
    }

    #[test]
    fn test_release_bus_uninitializes() {
        let mut oled = ssd1306();
        assert!(oled.release_bus().is_some());
        assert!(!oled.is_initialized());
        assert!(oled.bus().is_none());
    }

    #[test]
    fn test_micro_columns_offset() {
        let mut oled = Oled::new(MICRO_OLED, Ssd1306)
            .unwrap()
            .with_bus(SimulatedPanel::ssd1306());
        oled.init().unwrap();
        oled.pixel(0, 0, true);
        oled.display().unwrap();
        let sim = oled.bus().unwrap();
        assert_eq!(sim.ram(0)[2], 0x01);
        assert_eq!(sim.ram(0)[0], 0x00);
    }

    #[test]
    fn test_ch1120_streams_full_rows() {
        let mut oled = Oled::new(OLED_1IN5, Ch1120::new())
            .unwrap()
            .with_bus(SimulatedPanel::ch1120());
        oled.init().unwrap();
        oled.bus_mut().unwrap().clear_log();
        oled.pixel(70, 20, true);
        oled.display().unwrap();
        let sim = oled.bus().unwrap();
        assert_eq!(sim.data_bytes_written(), 128);
        assert_eq!(sim.command_bytes(), vec![0xB0, 0x02, 0x10, 0x00]);
        assert_eq!(sim.ram(2)[70], 0b1_0000);
    }

    #[test]
    fn test_set_viewport_clears_device() {
        let mut oled = ssd1306();
        oled.set_viewport(Viewport::new(0, 0, 64, 32)).unwrap();
        assert_eq!(oled.width(), 64);
        assert_eq!(oled.buffer().pages(), 4);
        assert_eq!(oled.bus().unwrap().data_bytes_written(), 8 * 128);
    }

    #[test]
    fn test_set_viewport_rejects_unaddressable_area() {
        let mut oled = ssd1306();
        oled.bus_mut().unwrap().clear_log();
        for viewport in [
            Viewport::new(0, 0, 128, 72),
            Viewport::new(100, 0, 128, 64),
            Viewport::new(0, 4, 128, 32),
            Viewport::new(0, 0, 0, 8),
        ] {
            assert!(matches!(
                oled.set_viewport(viewport),
                Err(Error::InvalidPanel(_))
            ));
        }
        assert_eq!(oled.viewport(), OLED_1IN3.viewport());
        assert_eq!(oled.bus().unwrap().writes(), 0);
    }
}
