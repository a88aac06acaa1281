//! Monochrome bitmaps sized to one sign

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use flipapps_protocol::WireBitmap;

/// Bitmap construction or conversion failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapError {
    /// Pixel count does not equal width × height
    SizeMismatch { expected: usize, actual: usize },
    /// Bit-packed data does not match the declared dimensions
    Packing,
}

impl fmt::Display for BitmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitmapError::SizeMismatch { expected, actual } => {
                write!(f, "bitmap has {actual} pixels, expected {expected}")
            }
            BitmapError::Packing => f.write_str("packed bitmap does not match its dimensions"),
        }
    }
}

impl core::error::Error for BitmapError {}

/// Flat row-major boolean raster; `true` is a lit (flipped) dot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl Bitmap {
    /// Create a bitmap from row-major pixels
    pub fn new(width: u32, height: u32, pixels: Vec<bool>) -> Result<Self, BitmapError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(BitmapError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// All-false bitmap
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// (width, height)
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Pixel at (x, y); out-of-range reads as unlit
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set pixel at (x, y); out-of-range writes are ignored
    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = on;
        }
    }

    /// Whether no pixel is lit
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&on| !on)
    }

    /// Copy `other` onto this bitmap with its top-left corner at (x, y),
    /// clipping anything that falls outside
    pub fn stamp(&mut self, other: &Bitmap, x: u32, y: u32) {
        for oy in 0..other.height {
            for ox in 0..other.width {
                self.set(x + ox, y + oy, other.get(ox, oy));
            }
        }
    }

    /// Bit-packed wire form
    pub fn to_wire(&self) -> WireBitmap {
        WireBitmap::pack(self.width, self.height, &self.pixels)
    }
}

impl TryFrom<&WireBitmap> for Bitmap {
    type Error = BitmapError;

    fn try_from(wire: &WireBitmap) -> Result<Self, Self::Error> {
        let pixels = wire.unpack().map_err(|_| BitmapError::Packing)?;
        Bitmap::new(wire.width, wire.height, pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        let result = Bitmap::new(3, 2, vec![false; 5]);
        assert_eq!(
            result,
            Err(BitmapError::SizeMismatch {
                expected: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn test_row_major_indexing() {
        let mut bitmap = Bitmap::blank(3, 2);
        bitmap.set(2, 1, true);

        assert_eq!(bitmap.pixels()[5], true);
        assert!(bitmap.get(2, 1));
        assert!(!bitmap.get(1, 2));
    }

    #[test]
    fn test_stamp_clips_at_edge() {
        let mut base = Bitmap::blank(2, 1);
        let glyph = Bitmap::new(2, 1, vec![true, true]).unwrap();
        base.stamp(&glyph, 1, 0);

        assert_eq!(base.pixels(), &[false, true]);
    }

    #[test]
    fn test_wire_conversion() {
        let bitmap = Bitmap::new(3, 3, vec![true, false, true, false, true, false, true, false, true])
            .unwrap();
        let wire = bitmap.to_wire();

        assert_eq!(wire.bits.len(), 2);
        assert_eq!(Bitmap::try_from(&wire).unwrap(), bitmap);
    }

    #[test]
    fn test_blank() {
        let bitmap = Bitmap::blank(4, 2);
        assert!(bitmap.is_blank());
        assert_eq!(bitmap.pixels().len(), 8);
    }
}
