//! Capability hooks.

use super::blit::Blit;
use super::{generic, Surface};
use crate::{Error, Result};

/// Writes one pixel. Coordinates are already inside the viewport.
pub type PixelHook<S> = fn(&mut S, u8, u8, bool);

/// Draws a line from `(x0, y0)` to `(x1, y1)`.
pub type LineHook<S> = fn(&mut S, &ResolvedHooks<S>, u8, u8, u8, u8, bool);

/// Draws a rectangle with corners `(x0, y0)` and `(x1, y1)`, `x0 <= x1`, `y0 <= y1`.
pub type RectHook<S> = fn(&mut S, &ResolvedHooks<S>, u8, u8, u8, u8, bool);

/// Draws a circle centered at `(x, y)` with the given radius.
pub type CircleHook<S> = fn(&mut S, &ResolvedHooks<S>, u8, u8, u8, bool);

/// Copies a bit-packed image into the surface.
pub type BitmapHook<S> = fn(&mut S, &ResolvedHooks<S>, &Blit<'_>);

/// Hooks a backend offers. Only `pixel` is mandatory.
pub struct DrawHooks<S> {
    pub pixel: Option<PixelHook<S>>,
    pub line: Option<LineHook<S>>,
    pub line_horizontal: Option<LineHook<S>>,
    pub line_vertical: Option<LineHook<S>>,
    pub rect: Option<RectHook<S>>,
    pub rect_filled: Option<RectHook<S>>,
    pub circle: Option<CircleHook<S>>,
    pub circle_filled: Option<CircleHook<S>>,
    pub bitmap: Option<BitmapHook<S>>,
}

impl<S> Default for DrawHooks<S> {
    fn default() -> Self {
        Self {
            pixel: None,
            line: None,
            line_horizontal: None,
            line_vertical: None,
            rect: None,
            rect_filled: None,
            circle: None,
            circle_filled: None,
            bitmap: None,
        }
    }
}

impl<S> DrawHooks<S> {
    /// Hooks with only a pixel writer; everything else falls back.
    pub fn with_pixel(pixel: PixelHook<S>) -> Self {
        Self {
            pixel: Some(pixel),
            ..Self::default()
        }
    }
}

impl<S: Surface> DrawHooks<S> {
    /// Binds every missing hook to its fallback.
    ///
    /// Axis-aligned lines fall back to the general line, filled shapes to
    /// their outlines, and the rest to the generic algorithms in
    /// [`generic`].
    pub fn resolve(&self) -> Result<ResolvedHooks<S>> {
        let pixel = self.pixel.ok_or(Error::MissingPixelHook)?;
        let line = self.line.unwrap_or(generic::line);
        let rect = self.rect.unwrap_or(generic::rect);
        let circle = self.circle.unwrap_or(generic::circle);

        Ok(ResolvedHooks {
            pixel,
            line,
            line_horizontal: self.line_horizontal.unwrap_or(line),
            line_vertical: self.line_vertical.unwrap_or(line),
            rect,
            rect_filled: self.rect_filled.unwrap_or(rect),
            circle,
            circle_filled: self.circle_filled.unwrap_or(circle),
            bitmap: self.bitmap.unwrap_or(generic::bitmap),
        })
    }
}

/// Fully bound hook table. Every entry is callable.
pub struct ResolvedHooks<S> {
    pub pixel: PixelHook<S>,
    pub line: LineHook<S>,
    pub line_horizontal: LineHook<S>,
    pub line_vertical: LineHook<S>,
    pub rect: RectHook<S>,
    pub rect_filled: RectHook<S>,
    pub circle: CircleHook<S>,
    pub circle_filled: CircleHook<S>,
    pub bitmap: BitmapHook<S>,
}

// Derive would require S: Clone.
impl<S> Clone for ResolvedHooks<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for ResolvedHooks<S> {}

impl<S> std::fmt::Debug for ResolvedHooks<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedHooks").finish_non_exhaustive()
    }
}
