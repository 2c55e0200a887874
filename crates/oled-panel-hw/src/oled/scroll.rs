//! Hardware scroll parameters.

use crate::{Error, Result};
use std::str::FromStr;

/// Direction of a hardware scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    #[default]
    Right,
    Left,
    /// Vertical scroll combined with a rightward shift where supported.
    VerticalRight,
    /// Vertical scroll combined with a leftward shift where supported.
    VerticalLeft,
}

impl ScrollDirection {
    /// Upward scroll on controllers with pure vertical scrolling.
    pub const UP: ScrollDirection = ScrollDirection::VerticalRight;
    /// Downward scroll on controllers with pure vertical scrolling.
    pub const DOWN: ScrollDirection = ScrollDirection::VerticalLeft;

    pub fn is_vertical(&self) -> bool {
        matches!(
            self,
            ScrollDirection::VerticalRight | ScrollDirection::VerticalLeft
        )
    }
}

impl FromStr for ScrollDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "right" => Ok(ScrollDirection::Right),
            "left" => Ok(ScrollDirection::Left),
            "vertical-right" | "vertical_right" | "up" => Ok(ScrollDirection::VerticalRight),
            "vertical-left" | "vertical_left" | "down" => Ok(ScrollDirection::VerticalLeft),
            _ => Err(Error::InvalidScrollDirection(s.to_string())),
        }
    }
}

impl std::fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrollDirection::Right => write!(f, "right"),
            ScrollDirection::Left => write!(f, "left"),
            ScrollDirection::VerticalRight => write!(f, "vertical-right"),
            ScrollDirection::VerticalLeft => write!(f, "vertical-left"),
        }
    }
}

/// Frames between scroll steps.
///
/// Each controller supports a subset; unsupported values snap to the
/// nearest supported one when encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollInterval {
    #[default]
    Frames2,
    Frames3,
    Frames4,
    Frames5,
    Frames6,
    Frames25,
    Frames32,
    Frames64,
    Frames128,
    Frames256,
}

impl ScrollInterval {
    pub const ALL: [ScrollInterval; 10] = [
        ScrollInterval::Frames2,
        ScrollInterval::Frames3,
        ScrollInterval::Frames4,
        ScrollInterval::Frames5,
        ScrollInterval::Frames6,
        ScrollInterval::Frames25,
        ScrollInterval::Frames32,
        ScrollInterval::Frames64,
        ScrollInterval::Frames128,
        ScrollInterval::Frames256,
    ];

    /// Frame count this interval stands for.
    pub fn frames(&self) -> u16 {
        match self {
            ScrollInterval::Frames2 => 2,
            ScrollInterval::Frames3 => 3,
            ScrollInterval::Frames4 => 4,
            ScrollInterval::Frames5 => 5,
            ScrollInterval::Frames6 => 6,
            ScrollInterval::Frames25 => 25,
            ScrollInterval::Frames32 => 32,
            ScrollInterval::Frames64 => 64,
            ScrollInterval::Frames128 => 128,
            ScrollInterval::Frames256 => 256,
        }
    }

    /// Interval whose frame count is closest to `frames`; ties go to the
    /// shorter interval.
    pub fn nearest(frames: u16) -> Self {
        let mut best = ScrollInterval::Frames2;
        for interval in Self::ALL {
            if interval.frames().abs_diff(frames) < best.frames().abs_diff(frames) {
                best = interval;
            }
        }
        best
    }
}

impl FromStr for ScrollInterval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let frames: u16 = s
            .trim()
            .trim_end_matches("frames")
            .trim()
            .parse()
            .map_err(|_| Error::InvalidScrollInterval(s.to_string()))?;
        Self::ALL
            .into_iter()
            .find(|interval| interval.frames() == frames)
            .ok_or_else(|| Error::InvalidScrollInterval(s.to_string()))
    }
}

impl std::fmt::Display for ScrollInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} frames", self.frames())
    }
}
