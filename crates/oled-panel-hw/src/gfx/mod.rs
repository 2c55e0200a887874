//! Drawing core.
//!
//! A [`Canvas`] owns a drawing [`Surface`] and the hooks that rasterize
//! primitives onto it. Backends supply a pixel hook and may specialize the
//! rest; anything left unspecialized is bound to a generic algorithm once,
//! when the canvas is built.

mod blit;
mod buffer;
mod canvas;
pub mod generic;
mod hooks;

pub use blit::{bit_span, Blit};
pub use buffer::PageBuffer;
pub use canvas::Canvas;
pub use hooks::{
    BitmapHook, CircleHook, DrawHooks, LineHook, PixelHook, RectHook, ResolvedHooks,
};

use crate::raster::RasterOp;

/// Visible region of a panel.
///
/// `x` and `y` locate the region inside controller memory; drawing
/// coordinates are always relative to the region's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: u8,
    pub y: u8,
    pub width: u8,
    pub height: u8,
}

impl Viewport {
    pub const fn new(x: u8, y: u8, width: u8, height: u8) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of byte pages needed to cover the height.
    pub fn pages(&self) -> usize {
        usize::from(self.height).div_ceil(8)
    }

    /// Returns true if `(x, y)` lies inside the region.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < i32::from(self.width) && y < i32::from(self.height)
    }
}

/// Something a canvas can draw on.
pub trait Surface {
    /// Current visible region.
    fn viewport(&self) -> Viewport;

    /// Replaces the visible region. Content is not preserved.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Raster operation applied by every write.
    fn raster_op(&self) -> RasterOp;

    /// Changes the raster operation for subsequent writes.
    fn set_raster_op(&mut self, op: RasterOp);
}
