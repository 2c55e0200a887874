//! Immutable font and bitmap resources.
//!
//! Both use the frame buffer's own layout: one byte holds eight vertically
//! stacked pixels, least significant bit on top, and rows of bytes ("pages")
//! follow each other.

mod bitmaps;
mod font_5x7;

pub use bitmaps::BMP_TRUCK;
pub use font_5x7::FONT_5X7;

/// Every built-in font.
pub static FONTS: [&Font; 1] = [&FONT_5X7];

/// Every built-in bitmap.
pub static BITMAPS: [&Bitmap<'static>; 1] = [&BMP_TRUCK];

/// Looks up a built-in font by name.
pub fn font(name: &str) -> Option<&'static Font> {
    FONTS
        .iter()
        .copied()
        .find(|f| f.name.eq_ignore_ascii_case(name))
}

/// Looks up a built-in bitmap by name.
pub fn bitmap(name: &str) -> Option<&'static Bitmap<'static>> {
    BITMAPS
        .iter()
        .copied()
        .find(|b| b.name.eq_ignore_ascii_case(name))
}

/// Bit-packed monospaced font.
///
/// Glyphs are stored side by side in a map `map_width` pixels wide; a map row
/// holds `map_width / width` glyphs and is `pages()` bytes tall.
#[derive(Debug)]
pub struct Font {
    pub name: &'static str,
    /// Glyph width in pixels.
    pub width: u8,
    /// Glyph height in pixels.
    pub height: u8,
    /// First character code present.
    pub start: u8,
    /// Number of glyphs present.
    pub count: u8,
    /// Width of the glyph map in pixels; a multiple of `width`.
    pub map_width: u16,
    pub data: &'static [u8],
}

impl Font {
    /// Byte rows needed for one glyph.
    pub fn pages(&self) -> usize {
        usize::from(self.height).div_ceil(8)
    }

    /// Glyphs in one row of the map.
    pub fn glyphs_per_row(&self) -> usize {
        usize::from(self.map_width) / usize::from(self.width.max(1))
    }

    /// Bytes spanned by one row of the map.
    pub fn row_bytes(&self) -> usize {
        usize::from(self.map_width) * self.pages()
    }

    /// Returns true if `ch` has a glyph.
    pub fn contains(&self, ch: u8) -> bool {
        ch >= self.start && u16::from(ch) < u16::from(self.start) + u16::from(self.count)
    }

    /// Offset of the first byte of `ch`'s glyph, or `None` if absent.
    pub fn glyph_offset(&self, ch: u8) -> Option<usize> {
        if !self.contains(ch) || self.glyphs_per_row() == 0 {
            return None;
        }
        let code = usize::from(ch - self.start);
        let per_row = self.glyphs_per_row();
        Some((code / per_row) * self.row_bytes() + (code % per_row) * usize::from(self.width))
    }

    /// Returns true if this is the built-in 5x7 font.
    pub fn is_builtin_5x7(&self) -> bool {
        std::ptr::eq(self, &FONT_5X7)
    }
}

/// Bit-packed monochrome image.
#[derive(Debug, Clone, Copy)]
pub struct Bitmap<'a> {
    pub name: &'a str,
    pub width: u8,
    pub height: u8,
    pub data: &'a [u8],
}

impl<'a> Bitmap<'a> {
    /// Wraps raw column-byte data.
    pub const fn new(name: &'a str, width: u8, height: u8, data: &'a [u8]) -> Self {
        Self {
            name,
            width,
            height,
            data,
        }
    }

    /// Byte rows in the image.
    pub fn pages(&self) -> usize {
        usize::from(self.height).div_ceil(8)
    }

    /// Returns true if `data` holds every byte the dimensions call for.
    pub fn is_complete(&self) -> bool {
        self.data.len() >= usize::from(self.width) * self.pages()
    }

    /// Reads pixel `(x, y)`; out-of-range reads are unset.
    pub fn pixel(&self, x: u8, y: u8) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = usize::from(y / 8) * usize::from(self.width) + usize::from(x);
        self.data
            .get(idx)
            .map(|byte| byte & (1 << (y % 8)) != 0)
            .unwrap_or(false)
    }
}
