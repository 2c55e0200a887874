//! Generic rasterization built on the pixel hook.
//!
//! These are the fallbacks bound to any hook a backend leaves open. They
//! clip every pixel against the viewport, so callers may pass coordinates
//! that fall partly off the surface.

use super::blit::Blit;
use super::hooks::ResolvedHooks;
use super::Surface;

/// Writes one pixel if it lies inside the viewport.
#[inline]
pub fn plot<S: Surface>(surface: &mut S, hooks: &ResolvedHooks<S>, x: i32, y: i32, color: bool) {
    if surface.viewport().contains(x, y) {
        (hooks.pixel)(surface, x as u8, y as u8, color);
    }
}

/// Bresenham line, walking the shallow axis left to right.
#[allow(clippy::too_many_arguments)]
pub fn line<S: Surface>(
    surface: &mut S,
    hooks: &ResolvedHooks<S>,
    x0: u8,
    y0: u8,
    x1: u8,
    y1: u8,
    color: bool,
) {
    let (mut x0, mut y0, mut x1, mut y1) = (
        i32::from(x0),
        i32::from(y0),
        i32::from(x1),
        i32::from(y1),
    );

    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    if steep {
        std::mem::swap(&mut x0, &mut y0);
        std::mem::swap(&mut x1, &mut y1);
    }
    if x0 > x1 {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut y0, &mut y1);
    }

    let dx = x1 - x0;
    let dy = (y1 - y0).abs();
    let step = if y0 < y1 { 1 } else { -1 };
    let mut err = dx / 2;
    let mut y = y0;

    for x in x0..=x1 {
        if steep {
            plot(surface, hooks, y, x, color);
        } else {
            plot(surface, hooks, x, y, color);
        }
        err -= dy;
        if err < 0 {
            y += step;
            err += dx;
        }
    }
}

/// Rectangle outline from its two horizontal edges and the columns between.
///
/// Vertical edges stop one row short of each horizontal edge so no pixel
/// is written twice.
pub fn rect<S: Surface>(
    surface: &mut S,
    hooks: &ResolvedHooks<S>,
    x0: u8,
    y0: u8,
    x1: u8,
    y1: u8,
    color: bool,
) {
    (hooks.line_horizontal)(surface, hooks, x0, y0, x1, y0, color);
    if y1 == y0 {
        return;
    }
    (hooks.line_horizontal)(surface, hooks, x0, y1, x1, y1, color);

    if y1 - y0 < 2 {
        return;
    }
    (hooks.line_vertical)(surface, hooks, x0, y0 + 1, x0, y1 - 1, color);
    if x1 != x0 {
        (hooks.line_vertical)(surface, hooks, x1, y0 + 1, x1, y1 - 1, color);
    }
}

/// Filled rectangle as one vertical span per column.
pub fn rect_filled<S: Surface>(
    surface: &mut S,
    hooks: &ResolvedHooks<S>,
    x0: u8,
    y0: u8,
    x1: u8,
    y1: u8,
    color: bool,
) {
    let width = surface.viewport().width;
    for x in x0..=x1.min(width.saturating_sub(1)) {
        (hooks.line_vertical)(surface, hooks, x, y0, x, y1, color);
    }
}

/// Midpoint circle outline with eight-way symmetry.
pub fn circle<S: Surface>(
    surface: &mut S,
    hooks: &ResolvedHooks<S>,
    x0: u8,
    y0: u8,
    radius: u8,
    color: bool,
) {
    let (cx, cy, r) = (i32::from(x0), i32::from(y0), i32::from(radius));
    if r == 0 {
        return;
    }

    plot(surface, hooks, cx, cy + r, color);
    plot(surface, hooks, cx, cy - r, color);
    plot(surface, hooks, cx + r, cy, color);
    plot(surface, hooks, cx - r, cy, color);

    for_each_octant_step(radius, |x, y| {
        // Past the diagonal every point mirrors one already drawn.
        if x > y {
            return;
        }
        let (x, y) = (i32::from(x), i32::from(y));
        plot(surface, hooks, cx + x, cy + y, color);
        plot(surface, hooks, cx - x, cy + y, color);
        plot(surface, hooks, cx + x, cy - y, color);
        plot(surface, hooks, cx - x, cy - y, color);
        // On the diagonal the mirrored points are the same pixels.
        if x != y {
            plot(surface, hooks, cx + y, cy + x, color);
            plot(surface, hooks, cx - y, cy + x, color);
            plot(surface, hooks, cx + y, cy - x, color);
            plot(surface, hooks, cx - y, cy - x, color);
        }
    });
}

/// Filled circle as vertical spans, each column drawn exactly once.
pub fn circle_filled<S: Surface>(
    surface: &mut S,
    hooks: &ResolvedHooks<S>,
    x0: u8,
    y0: u8,
    radius: u8,
    color: bool,
) {
    if radius == 0 {
        return;
    }

    // Half-height of the span at each horizontal distance from the center.
    let mut half = [0u8; 256];
    half[0] = radius;
    for_each_octant_step(radius, |x, y| {
        half[usize::from(x)] = half[usize::from(x)].max(y);
        half[usize::from(y)] = half[usize::from(y)].max(x);
    });

    let viewport = surface.viewport();
    let (cx, cy) = (i32::from(x0), i32::from(y0));
    for dx in 0..=i32::from(radius) {
        let h = i32::from(half[dx as usize]);
        let top = (cy - h).max(0);
        let bottom = (cy + h).min(i32::from(viewport.height) - 1);
        if top > bottom {
            continue;
        }
        let columns = if dx == 0 { [cx, -1] } else { [cx + dx, cx - dx] };
        for x in columns {
            if x < 0 || x >= i32::from(viewport.width) {
                continue;
            }
            (hooks.line_vertical)(surface, hooks, x as u8, top as u8, x as u8, bottom as u8, color);
        }
    }
}

/// Runs the midpoint circle walk for one octant, reporting each `(x, y)`
/// after the initial axis points.
fn for_each_octant_step(radius: u8, mut visit: impl FnMut(u8, u8)) {
    let r = i32::from(radius);
    let mut f = 1 - r;
    let mut ddf_x = 1;
    let mut ddf_y = -2 * r;
    let mut x = 0;
    let mut y = r;

    while x < y {
        if f >= 0 {
            y -= 1;
            ddf_y += 2;
            f += ddf_y;
        }
        x += 1;
        ddf_x += 2;
        f += ddf_x;
        visit(x as u8, y as u8);
    }
}

/// Per-pixel bitmap copy. Source bits are written opaque through the pixel
/// hook, so unset source bits become background pixels.
pub fn bitmap<S: Surface>(surface: &mut S, hooks: &ResolvedHooks<S>, blit: &Blit<'_>) {
    let Some((width, height)) = blit.clip(&surface.viewport()) else {
        return;
    };
    for dy in 0..height {
        for dx in 0..width {
            let bit = blit.source_bit(dx, dy);
            (hooks.pixel)(surface, blit.x + dx, blit.y + dy, bit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{DrawHooks, Viewport};
    use crate::raster::RasterOp;
    use std::collections::HashMap;

    /// Pixel-only surface counting writes per coordinate.
    struct Grid {
        viewport: Viewport,
        writes: HashMap<(u8, u8), usize>,
    }

    impl Grid {
        fn new(width: u8, height: u8) -> Self {
            Self {
                viewport: Viewport::new(0, 0, width, height),
                writes: HashMap::new(),
            }
        }

        fn set(&self) -> Vec<(u8, u8)> {
            let mut points: Vec<_> = self.writes.keys().copied().collect();
            points.sort();
            points
        }

        fn max_writes(&self) -> usize {
            self.writes.values().copied().max().unwrap_or(0)
        }
    }

    impl Surface for Grid {
        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn set_viewport(&mut self, viewport: Viewport) {
            self.viewport = viewport;
        }

        fn raster_op(&self) -> RasterOp {
            RasterOp::Copy
        }

        fn set_raster_op(&mut self, _op: RasterOp) {}
    }

    fn grid_pixel(grid: &mut Grid, x: u8, y: u8, _color: bool) {
        *grid.writes.entry((x, y)).or_insert(0) += 1;
    }

    fn hooks() -> ResolvedHooks<Grid> {
        DrawHooks::with_pixel(grid_pixel).resolve().unwrap()
    }

    #[test]
    fn test_line_single_point() {
        let mut grid = Grid::new(32, 32);
        line(&mut grid, &hooks(), 5, 6, 5, 6, true);
        assert_eq!(grid.set(), vec![(5, 6)]);
    }

    #[test]
    fn test_line_shallow_diagonal() {
        let mut grid = Grid::new(32, 32);
        line(&mut grid, &hooks(), 0, 0, 4, 2, true);
        assert_eq!(grid.set(), vec![(0, 0), (1, 0), (2, 1), (3, 1), (4, 2)]);
    }

    #[test]
    fn test_line_steep_reversed() {
        let mut grid = Grid::new(32, 32);
        line(&mut grid, &hooks(), 1, 3, 0, 0, true);
        let points = grid.set();
        assert_eq!(points.len(), 4);
        assert!(points.contains(&(0, 0)));
        assert!(points.contains(&(1, 3)));
    }

    #[test]
    fn test_line_clips() {
        let mut grid = Grid::new(8, 8);
        line(&mut grid, &hooks(), 0, 0, 20, 20, true);
        assert_eq!(grid.set().len(), 8);
        assert!(grid.set().iter().all(|&(x, y)| x < 8 && y < 8));
    }

    #[test]
    fn test_rect_outline_writes_each_pixel_once() {
        let mut grid = Grid::new(32, 32);
        rect(&mut grid, &hooks(), 2, 2, 6, 5, true);
        // 5 wide, 4 tall: 2*5 + 2*2 border pixels.
        assert_eq!(grid.set().len(), 14);
        assert_eq!(grid.max_writes(), 1);
        assert!(!grid.writes.contains_key(&(3, 3)));
    }

    #[test]
    fn test_rect_two_rows_has_no_vertical_edges() {
        let mut grid = Grid::new(32, 32);
        rect(&mut grid, &hooks(), 0, 0, 3, 1, true);
        assert_eq!(grid.set().len(), 8);
        assert_eq!(grid.max_writes(), 1);
    }

    #[test]
    fn test_rect_filled_covers_area() {
        let mut grid = Grid::new(32, 32);
        rect_filled(&mut grid, &hooks(), 1, 1, 3, 4, true);
        assert_eq!(grid.set().len(), 12);
        assert_eq!(grid.max_writes(), 1);
    }

    #[test]
    fn test_circle_is_symmetric_without_overdraw() {
        let mut grid = Grid::new(64, 64);
        circle(&mut grid, &hooks(), 20, 20, 7, true);
        assert_eq!(grid.max_writes(), 1);
        for &(x, y) in grid.writes.keys() {
            let mx = 40 - x;
            let my = 40 - y;
            assert!(grid.writes.contains_key(&(mx, y)));
            assert!(grid.writes.contains_key(&(x, my)));
            assert!(grid.writes.contains_key(&(y, x)));
        }
        assert!(grid.writes.contains_key(&(20, 13)));
        assert!(grid.writes.contains_key(&(27, 20)));
    }

    #[test]
    fn test_circle_filled_no_overdraw_and_contains_outline() {
        let mut outline = Grid::new(64, 64);
        circle(&mut outline, &hooks(), 30, 30, 9, true);

        let mut filled = Grid::new(64, 64);
        circle_filled(&mut filled, &hooks(), 30, 30, 9, true);
        assert_eq!(filled.max_writes(), 1);
        for point in outline.writes.keys() {
            assert!(filled.writes.contains_key(point), "missing {point:?}");
        }
        assert!(filled.writes.contains_key(&(30, 30)));
    }

    #[test]
    fn test_circle_filled_clips_at_edges() {
        let mut grid = Grid::new(16, 16);
        circle_filled(&mut grid, &hooks(), 0, 0, 5, true);
        assert!(grid.set().iter().all(|&(x, y)| x < 16 && y < 16));
        assert!(grid.writes.contains_key(&(0, 5)));
        assert!(grid.writes.contains_key(&(5, 0)));
    }

    #[test]
    fn test_bitmap_writes_opaque() {
        let data = [0b0000_0101u8, 0b0000_0010];
        let blit = Blit::new(3, 4, 2, 3, &data, 2, 3);
        let mut grid = Grid::new(16, 16);
        bitmap(&mut grid, &hooks(), &blit);
        assert_eq!(grid.set().len(), 6);
        assert!(grid.writes.contains_key(&(3, 4)));
        assert!(grid.writes.contains_key(&(4, 6)));
    }
}
