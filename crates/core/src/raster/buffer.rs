//! Borrowed single-channel raster.

use crate::error::{DetectError, Result};
use crate::geometry::PixelRect;

/// Read-only view over an 8-bit intensity raster, row-major, one byte per
/// pixel. The rasterizer owns the bytes; the engine only borrows them.
#[derive(Clone, Copy, Debug)]
pub struct PixelBuffer<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> PixelBuffer<'a> {
    /// Wrap `data` as a `width` x `height` raster.
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        Self::for_page(0, data, width, height)
    }

    /// Like [`PixelBuffer::new`], naming `page` in the error.
    pub fn for_page(page: usize, data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        let expected = width as usize * height as usize;
        if expected == 0 || data.len() != expected {
            return Err(DetectError::CorruptRaster {
                page,
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn bounds(&self) -> PixelRect {
        PixelRect::full(self.width, self.height)
    }

    /// Intensity at `(x, y)`. Callers keep coordinates inside the buffer.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    #[inline]
    pub fn is_ink(&self, x: u32, y: u32, threshold: u8) -> bool {
        self.get(x, y) < threshold
    }

    pub fn row(&self, y: u32) -> &'a [u8] {
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_size_mismatch() {
        let data = vec![255u8; 10];
        let err = PixelBuffer::for_page(2, &data, 4, 3).unwrap_err();
        assert_eq!(
            err,
            DetectError::CorruptRaster {
                page: 2,
                expected: 12,
                got: 10
            }
        );
    }

    #[test]
    fn rejects_empty_raster() {
        assert!(PixelBuffer::new(&[], 0, 0).is_err());
    }

    #[test]
    fn indexes_row_major() {
        let data: Vec<u8> = (0..12).collect();
        let buf = PixelBuffer::new(&data, 4, 3).unwrap();
        assert_eq!(buf.get(1, 2), 9);
        assert_eq!(buf.row(1), &[4, 5, 6, 7]);
        assert!(buf.is_ink(0, 0, 1));
        assert!(!buf.is_ink(1, 0, 1));
    }
}
