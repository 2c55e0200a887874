//! Built-in bitmaps.

use super::Bitmap;

static TRUCK_DATA: [u8; 38] = [
    0xFF, 0x01, 0xC1, 0x41, 0x41, 0x41, 0x71, 0x11, 0x11, 0x11, 0x11, 0x11, 0x71, 0x41, 0x41, 0xC1,
    0x81, 0x01, 0xFF, 0xFF, 0x80, 0x83, 0x82, 0x86, 0x8F, 0x8F, 0x86, 0x82, 0x82, 0x82, 0x86, 0x8F,
    0x8F, 0x86, 0x83, 0x81, 0x80, 0xFF,
];

/// 19x16 delivery truck in a frame.
pub static BMP_TRUCK: Bitmap<'static> = Bitmap::new("truck", 19, 16, &TRUCK_DATA);
