//! Raster operations.
//!
//! A raster operation decides how source bits combine with the bits already
//! in a destination byte. Only the bits selected by the mask change.

use crate::{Error, Result};
use std::str::FromStr;

/// Pixel combination rule applied by every drawing primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum RasterOp {
    /// Masked bits take the source value.
    #[default]
    Copy = 0,
    /// Masked bits take the complement of the source.
    NotCopy = 1,
    /// Masked bits are complemented in place; the source is ignored.
    NotDest = 2,
    /// Masked bits become destination XOR source.
    Xor = 3,
    /// Masked bits are forced to 0.
    Black = 4,
    /// Masked bits are forced to 1.
    White = 5,
}

impl RasterOp {
    /// All operations, in register order.
    pub const ALL: [RasterOp; 6] = [
        RasterOp::Copy,
        RasterOp::NotCopy,
        RasterOp::NotDest,
        RasterOp::Xor,
        RasterOp::Black,
        RasterOp::White,
    ];

    /// Combines `src` into `dst` for the bits set in `mask`.
    #[inline]
    pub fn apply(self, dst: u8, src: u8, mask: u8) -> u8 {
        let keep = dst & !mask;
        match self {
            RasterOp::Copy => keep | (src & mask),
            RasterOp::NotCopy => keep | (!src & mask),
            RasterOp::NotDest => keep | (!dst & mask),
            RasterOp::Xor => keep | ((dst ^ src) & mask),
            RasterOp::Black => keep,
            RasterOp::White => dst | mask,
        }
    }
}

impl FromStr for RasterOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "copy" => Ok(RasterOp::Copy),
            "not-copy" | "not_copy" => Ok(RasterOp::NotCopy),
            "not-dest" | "not_dest" | "not" => Ok(RasterOp::NotDest),
            "xor" => Ok(RasterOp::Xor),
            "black" => Ok(RasterOp::Black),
            "white" => Ok(RasterOp::White),
            _ => Err(Error::InvalidRasterOp(s.to_string())),
        }
    }
}

impl std::fmt::Display for RasterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RasterOp::Copy => write!(f, "copy"),
            RasterOp::NotCopy => write!(f, "not-copy"),
            RasterOp::NotDest => write!(f, "not-dest"),
            RasterOp::Xor => write!(f, "xor"),
            RasterOp::Black => write!(f, "black"),
            RasterOp::White => write!(f, "white"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_replaces_masked_bits() {
        assert_eq!(RasterOp::Copy.apply(0b1010_1010, 0b0101_0101, 0x0F), 0b1010_0101);
        assert_eq!(RasterOp::Copy.apply(0xFF, 0x00, 0x00), 0xFF);
    }

    #[test]
    fn test_not_copy_is_bitwise() {
        // 0x02 is "true" but only bit 1 is set; bit 0 must come out set.
        assert_eq!(RasterOp::NotCopy.apply(0x00, 0x02, 0x03), 0x01);
        assert_eq!(RasterOp::NotCopy.apply(0xF0, 0xFF, 0x0F), 0xF0);
    }

    #[test]
    fn test_not_dest_ignores_source() {
        assert_eq!(RasterOp::NotDest.apply(0b1100_0011, 0xFF, 0x0F), 0b1100_1100);
        assert_eq!(RasterOp::NotDest.apply(0b1100_0011, 0x00, 0x0F), 0b1100_1100);
    }

    #[test]
    fn test_xor() {
        assert_eq!(RasterOp::Xor.apply(0b1111_0000, 0b1010_1010, 0xFF), 0b0101_1010);
        assert_eq!(RasterOp::Xor.apply(0b1111_0000, 0b1010_1010, 0x0F), 0b1111_1010);
    }

    #[test]
    fn test_black_and_white() {
        assert_eq!(RasterOp::Black.apply(0xFF, 0xFF, 0x3C), 0xC3);
        assert_eq!(RasterOp::White.apply(0x00, 0x00, 0x3C), 0x3C);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("xor".parse::<RasterOp>().unwrap(), RasterOp::Xor);
        assert_eq!("NOT-COPY".parse::<RasterOp>().unwrap(), RasterOp::NotCopy);
        assert_eq!("not_dest".parse::<RasterOp>().unwrap(), RasterOp::NotDest);
        assert!("blend".parse::<RasterOp>().is_err());
    }

    #[test]
    fn test_display_round_trips_names() {
        for op in RasterOp::ALL {
            assert_eq!(op.to_string().parse::<RasterOp>().unwrap(), op);
        }
    }
}
