//! Scene files: an ordered list of drawing and device operations.
//!
//! ```toml
//! [[ops]]
//! op = "text"
//! x = 0
//! y = 0
//! text = "Hello"
//!
//! [[ops]]
//! op = "circle_fill"
//! x = 64
//! y = 40
//! radius = 10
//! ```

use anyhow::{anyhow, Context, Result};
use oled_panel_hw::{
    resource, Bitmap, Bus, Controller, Oled, RasterOp, ScrollDirection, ScrollInterval,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// One scene step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Pixel {
        x: u8,
        y: u8,
        #[serde(default = "default_on")]
        on: bool,
    },
    Line {
        x0: u8,
        y0: u8,
        x1: u8,
        y1: u8,
        #[serde(default = "default_on")]
        on: bool,
    },
    Rect {
        x: u8,
        y: u8,
        width: u8,
        height: u8,
        #[serde(default = "default_on")]
        on: bool,
    },
    RectFill {
        x: u8,
        y: u8,
        width: u8,
        height: u8,
        #[serde(default = "default_on")]
        on: bool,
    },
    Circle {
        x: u8,
        y: u8,
        radius: u8,
        #[serde(default = "default_on")]
        on: bool,
    },
    CircleFill {
        x: u8,
        y: u8,
        radius: u8,
        #[serde(default = "default_on")]
        on: bool,
    },
    Text {
        x: u8,
        y: u8,
        text: String,
        #[serde(default = "default_on")]
        on: bool,
    },
    /// Selects a built-in font by name.
    Font { name: String },
    /// Draws a built-in bitmap by name.
    Bitmap { x: u8, y: u8, name: String },
    /// Draws inline column-byte data.
    RawBitmap {
        x: u8,
        y: u8,
        width: u8,
        height: u8,
        data: Vec<u8>,
    },
    RasterOp { mode: String },
    Erase,
    Display,
    Invert {
        #[serde(default = "default_on")]
        on: bool,
    },
    FlipVertical {
        #[serde(default = "default_on")]
        on: bool,
    },
    FlipHorizontal {
        #[serde(default = "default_on")]
        on: bool,
    },
    Scroll {
        direction: String,
        start: u8,
        stop: u8,
        #[serde(default = "default_frames")]
        frames: u16,
    },
    StopScroll,
    Contrast { value: u8 },
    Power { on: bool },
}

fn default_on() -> bool {
    true
}

fn default_frames() -> u16 {
    2
}

/// Ordered list of operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub ops: Vec<DrawOp>,
}

impl Scene {
    /// Loads a scene from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).context("Failed to read scene file")?;
        Self::parse(&content)
    }

    /// Parses a scene from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse scene")
    }

    /// Runs every operation against `oled` in order.
    pub fn apply<B: Bus, C: Controller>(&self, oled: &mut Oled<B, C>) -> Result<()> {
        for (index, op) in self.ops.iter().enumerate() {
            debug!("Scene op {}: {:?}", index, op);
            apply_op(op, oled).with_context(|| format!("Scene op {} failed", index))?;
        }
        Ok(())
    }
}

fn apply_op<B: Bus, C: Controller>(op: &DrawOp, oled: &mut Oled<B, C>) -> Result<()> {
    match op {
        DrawOp::Pixel { x, y, on } => oled.pixel(*x, *y, *on),
        DrawOp::Line { x0, y0, x1, y1, on } => oled.line(*x0, *y0, *x1, *y1, *on),
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            on,
        } => oled.rectangle(*x, *y, *width, *height, *on),
        DrawOp::RectFill {
            x,
            y,
            width,
            height,
            on,
        } => oled.rectangle_fill(*x, *y, *width, *height, *on),
        DrawOp::Circle { x, y, radius, on } => oled.circle(*x, *y, *radius, *on),
        DrawOp::CircleFill { x, y, radius, on } => oled.circle_fill(*x, *y, *radius, *on),
        DrawOp::Text { x, y, text, on } => oled.text(*x, *y, text, *on),
        DrawOp::Font { name } => {
            let font = resource::font(name).ok_or_else(|| anyhow!("Unknown font: {}", name))?;
            oled.set_font(font);
        }
        DrawOp::Bitmap { x, y, name } => {
            let bitmap =
                resource::bitmap(name).ok_or_else(|| anyhow!("Unknown bitmap: {}", name))?;
            oled.bitmap(*x, *y, bitmap);
        }
        DrawOp::RawBitmap {
            x,
            y,
            width,
            height,
            data,
        } => {
            let bitmap = Bitmap::new("inline", *width, *height, data);
            if !bitmap.is_complete() {
                return Err(anyhow!(
                    "Inline bitmap {}x{} needs {} bytes, got {}",
                    width,
                    height,
                    usize::from(*width) * bitmap.pages(),
                    data.len()
                ));
            }
            oled.bitmap(*x, *y, &bitmap);
        }
        DrawOp::RasterOp { mode } => oled.set_raster_op(mode.parse::<RasterOp>()?),
        DrawOp::Erase => oled.erase(),
        DrawOp::Display => oled.display()?,
        DrawOp::Invert { on } => oled.invert(*on)?,
        DrawOp::FlipVertical { on } => oled.flip_vertical(*on)?,
        DrawOp::FlipHorizontal { on } => oled.flip_horizontal(*on)?,
        DrawOp::Scroll {
            direction,
            start,
            stop,
            frames,
        } => {
            let direction: ScrollDirection = direction.parse()?;
            let interval = ScrollInterval::nearest(*frames);
            if interval.frames() != *frames {
                debug!("Scroll interval {} frames snapped to {}", frames, interval);
            }
            oled.scroll(direction, *start, *stop, interval)?;
        }
        DrawOp::StopScroll => oled.stop_scroll()?,
        DrawOp::Contrast { value } => oled.set_contrast(*value)?,
        DrawOp::Power { on } => oled.display_power(*on)?,
    }
    Ok(())
}
