//! Page-layout monochrome frame buffer.

use super::blit::{bit_span, Blit};
use super::hooks::{DrawHooks, ResolvedHooks};
use super::{generic, Surface, Viewport};
use crate::dirty::PageTracker;
use crate::raster::RasterOp;

/// 1-bit frame buffer laid out in pages.
///
/// Byte `x + page * width` holds rows `page * 8 ..= page * 8 + 7` of column
/// `x`, least significant bit on top. Every write goes through the current
/// raster operation and widens the page's dirty range.
#[derive(Debug, Clone)]
pub struct PageBuffer {
    pub(super) data: Vec<u8>,
    viewport: Viewport,
    pub(super) tracker: PageTracker,
    rop: RasterOp,
}

impl PageBuffer {
    /// Creates a zeroed buffer covering `viewport`.
    pub fn new(viewport: Viewport) -> Self {
        let pages = viewport.pages();
        Self {
            data: vec![0; usize::from(viewport.width) * pages],
            viewport,
            tracker: PageTracker::new(pages),
            rop: RasterOp::default(),
        }
    }

    /// Hooks for the fast byte-level primitives of this buffer.
    pub fn hooks() -> DrawHooks<Self> {
        DrawHooks {
            pixel: Some(Self::set_pixel),
            line_horizontal: Some(line_horizontal_hook),
            line_vertical: Some(line_vertical_hook),
            rect_filled: Some(rect_filled_hook),
            circle_filled: Some(generic::circle_filled),
            bitmap: Some(bitmap_hook),
            ..DrawHooks::default()
        }
    }

    /// Returns the width of the buffer.
    pub fn width(&self) -> u8 {
        self.viewport.width
    }

    /// Returns the height of the buffer.
    pub fn height(&self) -> u8 {
        self.viewport.height
    }

    /// Number of pages.
    pub fn pages(&self) -> usize {
        self.viewport.pages()
    }

    /// Returns a reference to the raw page data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes of one page, or an empty slice past the end.
    pub fn page(&self, page: usize) -> &[u8] {
        let width = usize::from(self.viewport.width);
        self.data
            .get(page * width..(page + 1) * width)
            .unwrap_or(&[])
    }

    pub fn tracker(&self) -> &PageTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut PageTracker {
        &mut self.tracker
    }

    /// Zeroes the buffer and forgets all dirty and erase state.
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.tracker.reset(self.viewport.pages());
    }

    /// Gets the pixel at the given coordinates; outside reads are unset.
    pub fn get_pixel(&self, x: u8, y: u8) -> bool {
        if x >= self.viewport.width || y >= self.viewport.height {
            return false;
        }
        self.data[self.index(x, y)] & (1 << (y % 8)) != 0
    }

    /// Sets a pixel at the given coordinates through the raster operation.
    pub fn set_pixel(&mut self, x: u8, y: u8, color: bool) {
        if x >= self.viewport.width || y >= self.viewport.height {
            return;
        }
        let bit = 1 << (y % 8);
        let idx = self.index(x, y);
        self.data[idx] = self.rop.apply(self.data[idx], if color { bit } else { 0 }, bit);
        self.tracker.mark(usize::from(y / 8), x);
    }

    /// Horizontal run on row `y` between `x0` and `x1`, clipped.
    pub fn line_horizontal(&mut self, x0: u8, x1: u8, y: u8, color: bool) {
        let (x0, x1) = (x0.min(x1), x0.max(x1));
        if y >= self.viewport.height || x0 >= self.viewport.width {
            return;
        }
        let x1 = x1.min(self.viewport.width - 1);
        let bit = 1 << (y % 8);
        let src = if color { bit } else { 0 };
        let start = self.index(x0, y);
        for byte in &mut self.data[start..=start + usize::from(x1 - x0)] {
            *byte = self.rop.apply(*byte, src, bit);
        }
        self.tracker.mark_span(usize::from(y / 8), x0, x1);
    }

    /// Vertical run in column `x` between `y0` and `y1`, clipped.
    pub fn line_vertical(&mut self, x: u8, y0: u8, y1: u8, color: bool) {
        let (y0, y1) = (y0.min(y1), y0.max(y1));
        if x >= self.viewport.width || y0 >= self.viewport.height {
            return;
        }
        let y1 = y1.min(self.viewport.height - 1);
        self.fill_columns(x, x, y0, y1, color);
    }

    /// Filled rectangle with corners `(x0, y0)` and `(x1, y1)`, clipped.
    pub fn fill_rect(&mut self, x0: u8, y0: u8, x1: u8, y1: u8, color: bool) {
        let (x0, x1) = (x0.min(x1), x0.max(x1));
        let (y0, y1) = (y0.min(y1), y0.max(y1));
        if x0 >= self.viewport.width || y0 >= self.viewport.height {
            return;
        }
        let x1 = x1.min(self.viewport.width - 1);
        let y1 = y1.min(self.viewport.height - 1);
        self.fill_columns(x0, x1, y0, y1, color);
    }

    /// Applies one masked byte per page to every column in `x0..=x1`.
    /// Bounds are already clipped.
    fn fill_columns(&mut self, x0: u8, x1: u8, y0: u8, y1: u8, color: bool) {
        let (first, last) = (y0 / 8, y1 / 8);
        for page in first..=last {
            let start = if page == first { y0 % 8 } else { 0 };
            let end = if page == last { y1 % 8 } else { 7 };
            let mask = bit_span(start, end);
            let src = if color { mask } else { 0 };
            let base = usize::from(page) * usize::from(self.viewport.width);
            for byte in &mut self.data[base + usize::from(x0)..=base + usize::from(x1)] {
                *byte = self.rop.apply(*byte, src, mask);
            }
            self.tracker.mark_span(usize::from(page), x0, x1);
        }
    }

    /// Clears everything drawn or shown since the last flush.
    ///
    /// Each page's dirty range is widened by what the device currently
    /// shows, those bytes are zeroed locally, and the next flush is told to
    /// resend the erased regions.
    pub fn erase(&mut self) {
        let width = usize::from(self.viewport.width);
        for page in 0..self.tracker.pages() {
            self.tracker.absorb_erase(page);
            if let Some((min, max)) = self.tracker.take_dirty(page) {
                let base = page * width;
                self.data[base + usize::from(min)..=base + usize::from(max)].fill(0);
            }
        }
        self.tracker.set_pending_erase();
    }

    #[inline]
    fn index(&self, x: u8, y: u8) -> usize {
        usize::from(x) + usize::from(y / 8) * usize::from(self.viewport.width)
    }
}

impl Surface for PageBuffer {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Reallocates when the size changes. Position-only changes keep content.
    fn set_viewport(&mut self, viewport: Viewport) {
        let resized = viewport.width != self.viewport.width || viewport.height != self.viewport.height;
        self.viewport = viewport;
        if resized {
            self.data = vec![0; usize::from(viewport.width) * viewport.pages()];
            self.tracker.reset(viewport.pages());
        }
    }

    fn raster_op(&self) -> RasterOp {
        self.rop
    }

    fn set_raster_op(&mut self, op: RasterOp) {
        self.rop = op;
    }
}

fn line_horizontal_hook(
    buf: &mut PageBuffer,
    _: &ResolvedHooks<PageBuffer>,
    x0: u8,
    y0: u8,
    x1: u8,
    _y1: u8,
    color: bool,
) {
    buf.line_horizontal(x0, x1, y0, color);
}

fn line_vertical_hook(
    buf: &mut PageBuffer,
    _: &ResolvedHooks<PageBuffer>,
    x0: u8,
    y0: u8,
    _x1: u8,
    y1: u8,
    color: bool,
) {
    buf.line_vertical(x0, y0, y1, color);
}

fn rect_filled_hook(
    buf: &mut PageBuffer,
    _: &ResolvedHooks<PageBuffer>,
    x0: u8,
    y0: u8,
    x1: u8,
    y1: u8,
    color: bool,
) {
    buf.fill_rect(x0, y0, x1, y1, color);
}

fn bitmap_hook(buf: &mut PageBuffer, _: &ResolvedHooks<PageBuffer>, blit: &Blit<'_>) {
    buf.blit(blit);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> PageBuffer {
        PageBuffer::new(Viewport::new(0, 0, 128, 64))
    }

    #[test]
    fn test_new_is_zeroed() {
        let buf = buffer();
        assert_eq!(buf.data().len(), 128 * 8);
        assert!(buf.data().iter().all(|&b| b == 0));
        assert!(buf.tracker().is_clean());
    }

    #[test]
    fn test_pixel_layout() {
        let mut buf = buffer();
        buf.set_pixel(3, 10, true);
        assert_eq!(buf.data()[3 + 128], 0b0000_0100);
        assert!(buf.get_pixel(3, 10));
        assert_eq!(buf.tracker().dirty(1).bounds(), Some((3, 3)));
        assert!(buf.tracker().dirty(0).is_clean());
    }

    #[test]
    fn test_pixel_out_of_bounds_is_noop() {
        let mut buf = buffer();
        buf.set_pixel(128, 0, true);
        buf.set_pixel(0, 64, true);
        assert!(buf.data().iter().all(|&b| b == 0));
        assert!(buf.tracker().is_clean());
    }

    #[test]
    fn test_horizontal_line_full_width() {
        let mut buf = buffer();
        buf.line_horizontal(0, 127, 0, true);
        assert!(buf.page(0).iter().all(|&b| b == 0x01));
        assert_eq!(buf.tracker().dirty(0).bounds(), Some((0, 127)));
    }

    #[test]
    fn test_horizontal_line_clips_right() {
        let mut buf = buffer();
        buf.line_horizontal(200, 120, 9, true);
        assert_eq!(buf.tracker().dirty(1).bounds(), Some((120, 127)));
        assert!(buf.get_pixel(127, 9));
        buf.line_horizontal(130, 140, 9, true);
        assert_eq!(buf.tracker().dirty(1).bounds(), Some((120, 127)));
    }

    #[test]
    fn test_vertical_line_spans_pages() {
        let mut buf = buffer();
        buf.line_vertical(5, 20, 3, true);
        assert_eq!(buf.page(0)[5], 0b1111_1000);
        assert_eq!(buf.page(1)[5], 0xFF);
        assert_eq!(buf.page(2)[5], 0b0001_1111);
        assert_eq!(buf.page(3)[5], 0);
        for page in 0..3 {
            assert_eq!(buf.tracker().dirty(page).bounds(), Some((5, 5)));
        }
    }

    #[test]
    fn test_vertical_line_inside_one_byte() {
        let mut buf = buffer();
        buf.line_vertical(0, 2, 5, true);
        assert_eq!(buf.page(0)[0], 0b0011_1100);
    }

    #[test]
    fn test_fill_then_clear_is_zero() {
        let mut buf = buffer();
        buf.fill_rect(10, 5, 40, 30, true);
        assert!(buf.get_pixel(10, 5));
        assert!(buf.get_pixel(40, 30));
        assert!(!buf.get_pixel(41, 30));
        buf.fill_rect(10, 5, 40, 30, false);
        assert!(buf.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_xor_pixel_twice_restores() {
        let mut buf = buffer();
        buf.set_pixel(7, 7, true);
        buf.set_raster_op(RasterOp::Xor);
        buf.fill_rect(0, 0, 15, 15, true);
        buf.fill_rect(0, 0, 15, 15, true);
        assert!(buf.get_pixel(7, 7));
        assert!(!buf.get_pixel(8, 7));
    }

    #[test]
    fn test_erase_clears_dirty_and_shown() {
        let mut buf = buffer();
        buf.line_horizontal(0, 50, 0, true);
        // Pretend page 0 was flushed.
        buf.tracker_mut().commit(0);
        buf.tracker_mut().finish_flush();
        buf.set_pixel(100, 20, true);

        buf.erase();
        assert!(buf.data().iter().all(|&b| b == 0));
        assert!(buf.tracker().dirty(0).is_clean());
        assert!(buf.tracker().pending_erase());
        assert_eq!(buf.tracker().transfer_range(0).bounds(), Some((0, 50)));
    }

    #[test]
    fn test_set_viewport_resizes() {
        let mut buf = buffer();
        buf.set_pixel(1, 1, true);
        buf.set_viewport(Viewport::new(0, 0, 64, 48));
        assert_eq!(buf.data().len(), 64 * 6);
        assert_eq!(buf.tracker().pages(), 6);
        assert!(!buf.get_pixel(1, 1));
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let buf = buffer();
        assert!(buf.page(8).is_empty());
        assert_eq!(buf.page(7).len(), 128);
    }
}
