//! Public drawing API.

use super::blit::Blit;
use super::hooks::{DrawHooks, ResolvedHooks};
use super::{generic, Surface, Viewport};
use crate::raster::RasterOp;
use crate::resource::{Bitmap, Font, FONT_5X7};
use crate::Result;

/// Drawing front end over a surface and its resolved hooks.
///
/// Coordinates are viewport-relative. Anything outside the viewport is
/// clipped silently; drawing never fails.
#[derive(Debug)]
pub struct Canvas<S> {
    surface: S,
    hooks: ResolvedHooks<S>,
    font: &'static Font,
}

impl<S: Surface> Canvas<S> {
    /// Binds `hooks` to `surface`, filling in fallbacks.
    ///
    /// Fails with [`crate::Error::MissingPixelHook`] if no pixel hook is given.
    pub fn new(surface: S, hooks: &DrawHooks<S>) -> Result<Self> {
        Ok(Self {
            surface,
            hooks: hooks.resolve()?,
            font: &FONT_5X7,
        })
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn viewport(&self) -> Viewport {
        self.surface.viewport()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.surface.set_viewport(viewport);
    }

    pub fn raster_op(&self) -> RasterOp {
        self.surface.raster_op()
    }

    pub fn set_raster_op(&mut self, op: RasterOp) {
        self.surface.set_raster_op(op);
    }

    pub fn font(&self) -> &'static Font {
        self.font
    }

    pub fn set_font(&mut self, font: &'static Font) {
        self.font = font;
    }

    /// Sets one pixel.
    pub fn pixel(&mut self, x: u8, y: u8, color: bool) {
        let viewport = self.viewport();
        if x >= viewport.width || y >= viewport.height {
            return;
        }
        (self.hooks.pixel)(&mut self.surface, x, y, color);
    }

    /// Draws a line. Axis-aligned lines use the dedicated hooks.
    pub fn line(&mut self, x0: u8, y0: u8, x1: u8, y1: u8, color: bool) {
        let hook = if x0 == x1 {
            self.hooks.line_vertical
        } else if y0 == y1 {
            self.hooks.line_horizontal
        } else {
            self.hooks.line
        };
        hook(&mut self.surface, &self.hooks, x0, y0, x1, y1, color);
    }

    /// Draws a rectangle outline with its top-left corner at `(x, y)`.
    pub fn rectangle(&mut self, x: u8, y: u8, width: u8, height: u8, color: bool) {
        if let Some((x1, y1)) = self.rect_corner(x, y, width, height) {
            if width <= 1 || height <= 1 {
                self.line(x, y, x1, y1, color);
            } else {
                (self.hooks.rect)(&mut self.surface, &self.hooks, x, y, x1, y1, color);
            }
        }
    }

    /// Draws a filled rectangle with its top-left corner at `(x, y)`.
    pub fn rectangle_fill(&mut self, x: u8, y: u8, width: u8, height: u8, color: bool) {
        if let Some((x1, y1)) = self.rect_corner(x, y, width, height) {
            if width <= 1 || height <= 1 {
                self.line(x, y, x1, y1, color);
            } else {
                (self.hooks.rect_filled)(&mut self.surface, &self.hooks, x, y, x1, y1, color);
            }
        }
    }

    /// Bottom-right corner of a rectangle, or `None` if nothing is visible.
    /// The corner saturates at 255, which lies outside any viewport.
    fn rect_corner(&self, x: u8, y: u8, width: u8, height: u8) -> Option<(u8, u8)> {
        let viewport = self.viewport();
        if width == 0 || height == 0 || x >= viewport.width || y >= viewport.height {
            return None;
        }
        Some((x.saturating_add(width - 1), y.saturating_add(height - 1)))
    }

    /// Draws a circle outline.
    pub fn circle(&mut self, x: u8, y: u8, radius: u8, color: bool) {
        if !self.circle_visible(x, y, radius) {
            return;
        }
        if radius == 1 {
            self.pixel(x, y, color);
            return;
        }
        (self.hooks.circle)(&mut self.surface, &self.hooks, x, y, radius, color);
    }

    /// Draws a filled circle.
    pub fn circle_fill(&mut self, x: u8, y: u8, radius: u8, color: bool) {
        if !self.circle_visible(x, y, radius) {
            return;
        }
        if radius == 1 {
            self.pixel(x, y, color);
            return;
        }
        (self.hooks.circle_filled)(&mut self.surface, &self.hooks, x, y, radius, color);
    }

    fn circle_visible(&self, x: u8, y: u8, radius: u8) -> bool {
        let viewport = self.viewport();
        let r = i16::from(radius);
        radius != 0
            && i16::from(x) - r < i16::from(viewport.width)
            && i16::from(y) - r < i16::from(viewport.height)
    }

    /// Copies a blit request through the bitmap hook.
    pub fn blit(&mut self, blit: &Blit<'_>) {
        (self.hooks.bitmap)(&mut self.surface, &self.hooks, blit);
    }

    /// Draws raw column-byte image data at `(x, y)`, clipped to
    /// `width` x `height`.
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
        self.blit(&Blit::new(x, y, width, height, data, source_width, source_height));
    }

    /// Draws a whole bitmap at `(x, y)`.
    pub fn bitmap(&mut self, x: u8, y: u8, bitmap: &Bitmap<'_>) {
        self.bitmap_raw(
            x,
            y,
            bitmap.width,
            bitmap.height,
            bitmap.data,
            bitmap.width,
            bitmap.height,
        );
    }

    /// Renders `text` with the current font, starting at `(x, y)`.
    ///
    /// Characters without a glyph are skipped and do not advance the pen.
    pub fn text(&mut self, x: u8, y: u8, text: &str, color: bool) {
        let viewport = self.viewport();
        if text.is_empty() || x >= viewport.width || y >= viewport.height {
            return;
        }
        let font = self.font;
        let mut pen = i32::from(x);
        for ch in text.bytes() {
            if pen >= i32::from(viewport.width) {
                break;
            }
            let Some(offset) = font.glyph_offset(ch) else {
                continue;
            };
            if font.height <= 8 {
                self.glyph_opaque(font, offset, pen, i32::from(y), color);
            } else {
                self.glyph_transparent(font, offset, pen, i32::from(y), color);
            }
            pen += i32::from(advance(font));
        }
    }

    /// Single-byte glyphs write every pixel, unset bits as background.
    fn glyph_opaque(&mut self, font: &Font, offset: usize, x: i32, y: i32, color: bool) {
        let columns = font.data.get(offset..offset + usize::from(font.width)).unwrap_or(&[]);
        for (dx, &byte) in columns.iter().enumerate() {
            for row in 0..font.height {
                let on = byte & (1 << row) != 0;
                generic::plot(
                    &mut self.surface,
                    &self.hooks,
                    x + dx as i32,
                    y + i32::from(row),
                    if on { color } else { !color },
                );
            }
        }
        if font.is_builtin_5x7() {
            let gap = x + i32::from(font.width);
            for row in 0..font.height {
                generic::plot(&mut self.surface, &self.hooks, gap, y + i32::from(row), !color);
            }
        }
    }

    /// Multi-byte glyphs write only set bits.
    fn glyph_transparent(&mut self, font: &Font, offset: usize, x: i32, y: i32, color: bool) {
        let map_width = usize::from(font.map_width);
        for page in 0..font.pages() {
            let start = offset + page * map_width;
            let columns = font.data.get(start..start + usize::from(font.width)).unwrap_or(&[]);
            for (dx, &byte) in columns.iter().enumerate() {
                for bit in 0..8u8 {
                    let row = page as i32 * 8 + i32::from(bit);
                    if row >= i32::from(font.height) {
                        break;
                    }
                    if byte & (1 << bit) != 0 {
                        generic::plot(&mut self.surface, &self.hooks, x + dx as i32, y + row, color);
                    }
                }
            }
        }
    }

    /// Width and height `text` would occupy in the current font.
    pub fn measure_string(&self, text: &str) -> (u16, u16) {
        let width = text
            .bytes()
            .filter(|&ch| self.font.contains(ch))
            .map(|_| u16::from(advance(self.font)))
            .sum();
        (width, u16::from(self.font.height))
    }
}

/// Horizontal pen advance per glyph.
fn advance(font: &Font) -> u8 {
    if font.is_builtin_5x7() {
        font.width + 1
    } else {
        font.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::PageBuffer;
    use crate::Error;

    fn canvas(width: u8, height: u8) -> Canvas<PageBuffer> {
        Canvas::new(PageBuffer::new(Viewport::new(0, 0, width, height)), &PageBuffer::hooks()).unwrap()
    }

    fn lit(canvas: &Canvas<PageBuffer>) -> Vec<(u8, u8)> {
        let vp = canvas.viewport();
        let mut points = Vec::new();
        for y in 0..vp.height {
            for x in 0..vp.width {
                if canvas.surface().get_pixel(x, y) {
                    points.push((x, y));
                }
            }
        }
        points
    }

    static TALL_DATA: [u8; 4] = [0x01, 0x80, 0x03, 0x00];
    static TALL: Font = Font {
        name: "tall",
        width: 2,
        height: 12,
        start: b'A',
        count: 1,
        map_width: 2,
        data: &TALL_DATA,
    };

    static NARROW_DATA: [u8; 2] = [0x01, 0x00];
    static NARROW: Font = Font {
        name: "narrow",
        width: 2,
        height: 3,
        start: b'a',
        count: 1,
        map_width: 2,
        data: &NARROW_DATA,
    };

    #[test]
    fn test_missing_pixel_hook() {
        let surface = PageBuffer::new(Viewport::new(0, 0, 8, 8));
        let result = Canvas::new(surface, &DrawHooks::default());
        assert!(matches!(result, Err(Error::MissingPixelHook)));
    }

    #[test]
    fn test_line_point_equals_pixel() {
        let mut a = canvas(32, 16);
        let mut b = canvas(32, 16);
        a.line(9, 9, 9, 9, true);
        b.pixel(9, 9, true);
        assert_eq!(a.surface().data(), b.surface().data());
        assert_eq!(lit(&a), vec![(9, 9)]);
    }

    #[test]
    fn test_top_row_line() {
        let mut c = canvas(128, 64);
        c.line(0, 0, 127, 0, true);
        assert!(c.surface().page(0).iter().all(|&b| b == 0x01));
        assert_eq!(c.surface().tracker().dirty(0).bounds(), Some((0, 127)));
    }

    #[test]
    fn test_diagonal_line_marks_bounding_columns() {
        let mut c = canvas(64, 32);
        c.line(4, 1, 20, 6, true);
        assert_eq!(c.surface().tracker().dirty(0).bounds(), Some((4, 20)));
        assert!(c.surface().get_pixel(4, 1));
        assert!(c.surface().get_pixel(20, 6));
    }

    #[test]
    fn test_rectangle_outline() {
        let mut c = canvas(32, 32);
        c.rectangle(2, 3, 5, 4, true);
        let points = lit(&c);
        assert_eq!(points.len(), 14);
        assert!(points.contains(&(2, 3)));
        assert!(points.contains(&(6, 6)));
        assert!(!points.contains(&(4, 4)));
    }

    #[test]
    fn test_rectangle_xor_thin_does_not_cancel() {
        let mut c = canvas(32, 32);
        c.set_raster_op(RasterOp::Xor);
        c.rectangle(0, 0, 4, 2, true);
        assert_eq!(lit(&c).len(), 8);
        c.rectangle(10, 10, 4, 3, true);
        assert_eq!(lit(&c).len(), 8 + 10);
    }

    #[test]
    fn test_rectangle_degenerates_to_line() {
        let mut c = canvas(32, 32);
        c.rectangle(1, 1, 1, 5, true);
        assert_eq!(lit(&c), vec![(1, 1), (1, 2), (1, 3), (1, 4), (1, 5)]);
        c.rectangle(10, 1, 0, 5, true);
        assert_eq!(lit(&c).len(), 5);
    }

    #[test]
    fn test_rectangle_offscreen_origin() {
        let mut c = canvas(16, 16);
        c.rectangle(16, 0, 4, 4, true);
        c.rectangle_fill(0, 16, 4, 4, true);
        assert!(lit(&c).is_empty());
    }

    #[test]
    fn test_rectangle_fill_then_clear() {
        let mut c = canvas(32, 24);
        c.rectangle_fill(3, 5, 20, 15, true);
        assert_eq!(lit(&c).len(), 20 * 15);
        c.rectangle_fill(3, 5, 20, 15, false);
        assert!(c.surface().data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rectangle_fill_clips() {
        let mut c = canvas(16, 16);
        c.rectangle_fill(10, 10, 200, 200, true);
        assert_eq!(lit(&c).len(), 36);
    }

    #[test]
    fn test_circle_radius_zero_and_one() {
        let mut c = canvas(32, 32);
        c.circle(10, 10, 0, true);
        c.circle_fill(10, 10, 0, true);
        assert!(lit(&c).is_empty());
        c.circle_fill(10, 10, 1, true);
        assert_eq!(lit(&c), vec![(10, 10)]);
    }

    #[test]
    fn test_circle_rejected_when_outside() {
        let mut c = canvas(32, 32);
        c.circle(40, 10, 5, true);
        c.circle_fill(10, 40, 5, true);
        assert!(lit(&c).is_empty());
        // Partially visible from the right.
        c.circle(35, 10, 5, true);
        assert!(!lit(&c).is_empty());
    }

    #[test]
    fn test_circle_fill_xor_round_trip() {
        let mut c = canvas(64, 64);
        c.set_raster_op(RasterOp::Xor);
        c.circle_fill(30, 30, 12, true);
        assert!(c.surface().get_pixel(30, 30));
        assert!(c.surface().get_pixel(30, 18));
        c.circle_fill(30, 30, 12, true);
        assert!(c.surface().data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bitmap_descriptor() {
        let data = [0xFF, 0x81, 0xFF];
        let bmp = Bitmap::new("box", 3, 8, &data);
        let mut c = canvas(16, 16);
        c.bitmap(4, 4, &bmp);
        assert!(c.surface().get_pixel(4, 4));
        assert!(c.surface().get_pixel(5, 4));
        assert!(!c.surface().get_pixel(5, 5));
        assert!(c.surface().get_pixel(5, 11));
        assert_eq!(lit(&c).len(), 8 + 2 + 8);
    }

    #[test]
    fn test_text_5x7_glyph_and_gap() {
        let mut c = canvas(32, 16);
        c.rectangle_fill(0, 0, 32, 16, true);
        c.text(0, 0, "!", true);
        // '!' is column 2 = 0x5F; everything else in the 6x7 cell is background.
        for y in 0..7 {
            for x in 0..6 {
                let expected = x == 2 && (0x5F & (1 << y)) != 0;
                assert_eq!(c.surface().get_pixel(x, y), expected, "({x}, {y})");
            }
        }
        assert!(c.surface().get_pixel(6, 0));
        assert!(c.surface().get_pixel(0, 7));
    }

    #[test]
    fn test_text_skips_unknown_without_advance() {
        let mut a = canvas(64, 8);
        let mut b = canvas(64, 8);
        a.text(0, 0, "A\u{7f}B", true);
        b.text(0, 0, "AB", true);
        assert_eq!(a.surface().data(), b.surface().data());
    }

    #[test]
    fn test_measure_string() {
        let mut c = canvas(64, 32);
        assert_eq!(c.measure_string("abc"), (18, 7));
        assert_eq!(c.measure_string("a\u{1}b"), (12, 7));
        c.set_font(&NARROW);
        assert_eq!(c.measure_string("aaa"), (6, 3));
        assert_eq!(c.font().name, "narrow");
    }

    #[test]
    fn test_text_single_byte_font_has_no_gap() {
        let mut c = canvas(16, 8);
        c.set_font(&NARROW);
        c.rectangle_fill(0, 0, 16, 8, true);
        c.text(0, 0, "a", true);
        assert!(c.surface().get_pixel(0, 0));
        assert!(!c.surface().get_pixel(0, 1));
        assert!(!c.surface().get_pixel(1, 0));
        // Column 2 is the next glyph's cell, untouched.
        assert!(c.surface().get_pixel(2, 0));
    }

    #[test]
    fn test_text_multi_byte_font_is_transparent() {
        let mut c = canvas(16, 16);
        c.set_font(&TALL);
        c.text(3, 2, "A", true);
        // Column 0: rows 0, 8 and 9; column 1: row 7.
        assert_eq!(lit(&c), vec![(3, 2), (4, 9), (3, 10), (3, 11)]);
    }

    #[test]
    fn test_text_clips_at_right_edge() {
        let mut c = canvas(10, 8);
        c.text(0, 0, "WWWW", true);
        assert_eq!(c.surface().tracker().dirty(0).bounds(), Some((0, 9)));
    }
}
