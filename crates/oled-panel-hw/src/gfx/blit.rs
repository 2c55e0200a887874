//! Bitmap blit arithmetic.
//!
//! Source images and the frame buffer share a layout: one byte per column
//! per page, least significant bit at the top. A destination page is filled
//! from up to two source bytes per column, because the source row cursor
//! need not be byte aligned with the destination.

use super::buffer::PageBuffer;
use super::{Surface, Viewport};

/// Mask with bits `start..=end` set. Requires `start <= end <= 7`.
#[inline]
pub fn bit_span(start: u8, end: u8) -> u8 {
    (0xFF >> (7 - end)) & (0xFF << start)
}

/// A request to copy a bit-packed image to `(x, y)`.
#[derive(Debug, Clone, Copy)]
pub struct Blit<'a> {
    pub x: u8,
    pub y: u8,
    /// Requested destination width.
    pub width: u8,
    /// Requested destination height.
    pub height: u8,
    pub source: &'a [u8],
    pub source_width: u8,
    pub source_height: u8,
}

impl<'a> Blit<'a> {
    pub fn new(
        x: u8,
        y: u8,
        width: u8,
        height: u8,
        source: &'a [u8],
        source_width: u8,
        source_height: u8,
    ) -> Self {
        Self {
            x,
            y,
            width,
            height,
            source,
            source_width,
            source_height,
        }
    }

    /// Destination extent after clipping to the viewport and the source.
    ///
    /// Returns `None` when nothing would be drawn.
    pub fn clip(&self, viewport: &Viewport) -> Option<(u8, u8)> {
        if self.x >= viewport.width
            || self.y >= viewport.height
            || self.source_width == 0
            || self.source_height == 0
        {
            return None;
        }
        let width = self
            .width
            .min(viewport.width - self.x)
            .min(self.source_width);
        let height = self
            .height
            .min(viewport.height - self.y)
            .min(self.source_height);
        if width == 0 || height == 0 {
            return None;
        }
        Some((width, height))
    }

    /// Source byte at column `x` of page `page`; missing bytes read as 0.
    #[inline]
    fn source_byte(&self, page: usize, x: u8) -> u8 {
        self.source
            .get(page * usize::from(self.source_width) + usize::from(x))
            .copied()
            .unwrap_or(0)
    }

    /// Source pixel at `(x, y)`.
    pub fn source_bit(&self, x: u8, y: u8) -> bool {
        self.source_byte(usize::from(y / 8), x) & (1 << (y % 8)) != 0
    }
}

impl PageBuffer {
    /// Copies `blit` into the buffer a page at a time using the current
    /// raster operation.
    pub fn blit(&mut self, blit: &Blit<'_>) {
        let Some((width, height)) = blit.clip(&self.viewport()) else {
            return;
        };

        let x0 = blit.x;
        let x1 = x0 + (width - 1);
        let last_row = u16::from(blit.y) + u16::from(height) - 1;
        let op = self.raster_op();
        let stride = usize::from(self.viewport().width);

        let mut dst_y = u16::from(blit.y);
        let mut src_y: u16 = 0;

        while dst_y <= last_row {
            let page = usize::from(dst_y / 8);
            let dst_start = (dst_y % 8) as u8;
            let dst_end = if dst_y - u16::from(dst_start) + 7 > last_row {
                (last_row % 8) as u8
            } else {
                7
            };
            let dst_mask = bit_span(dst_start, dst_end);
            let needed = dst_end - dst_start + 1;

            // The needed run may start mid-byte in the source and spill
            // into the next source page.
            let src_page = usize::from(src_y / 8);
            let src_start = (src_y % 8) as u8;
            let src_end = (src_start + needed - 1).min(7);
            let first_mask = bit_span(src_start, src_end);
            let first_bits = src_end - src_start + 1;
            let remaining = needed - first_bits;

            for dx in 0..width {
                let mut bits = (blit.source_byte(src_page, dx) & first_mask) >> src_start;
                if remaining > 0 {
                    let second_mask = bit_span(0, remaining - 1);
                    bits |= (blit.source_byte(src_page + 1, dx) & second_mask) << first_bits;
                }
                let idx = page * stride + usize::from(x0 + dx);
                let dst = self.data[idx];
                self.data[idx] = op.apply(dst, bits << dst_start, dst_mask);
            }

            self.tracker.mark_span(page, x0, x1);
            dst_y += u16::from(needed);
            src_y += u16::from(needed);
        }
    }
}
