//! Pixel-space and document-space geometry.
//!
//! Pixel space has its origin at the top-left corner of the raster with y
//! growing downward. Document space has its origin at the bottom-left corner
//! of the page with y growing upward. Every conversion is computed directly
//! from the page and image dimensions, never chained from a previous result.

use crate::error::{DetectError, Result};

/// Points per inch in document space.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Compares two floats for approximate equality.
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Axis-aligned rectangle in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole `width` x `height` buffer.
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Exclusive right edge, saturating at `u32::MAX`.
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `u32::MAX`.
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether the half-open span `[x0, x1)` shares any column with this rectangle.
    pub fn overlaps_span(&self, x0: u32, x1: u32) -> bool {
        x0 < self.right() && x1 > self.x
    }

    /// Build a rectangle from float bounds grown by `padding`, clipped to a
    /// `max_width` x `max_height` buffer.
    ///
    /// Returns `InvalidRegion` when nothing of the padded rectangle lies inside
    /// the buffer or the bounds are degenerate.
    pub fn from_bounds_clipped(
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        padding: u32,
        max_width: u32,
        max_height: u32,
    ) -> Result<Self> {
        let invalid = || DetectError::InvalidRegion {
            x: x0.floor() as i64,
            y: y0.floor() as i64,
            width: (x1 - x0).ceil() as i64,
            height: (y1 - y0).ceil() as i64,
        };
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return Err(invalid());
        }
        if x1 <= x0 || y1 <= y0 {
            return Err(invalid());
        }
        let pad = f64::from(padding);
        let left = (x0 - pad).floor().max(0.0);
        let top = (y0 - pad).floor().max(0.0);
        let right = (x1 + pad).ceil().min(f64::from(max_width));
        let bottom = (y1 + pad).ceil().min(f64::from(max_height));
        if right <= left || bottom <= top {
            return Err(invalid());
        }
        Ok(Self::new(
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }

    /// Clip to a `max_width` x `max_height` buffer.
    pub fn clipped(&self, max_width: u32, max_height: u32) -> Result<Self> {
        let right = self.right().min(max_width);
        let bottom = self.bottom().min(max_height);
        if self.is_empty() || self.x >= right || self.y >= bottom {
            return Err(DetectError::InvalidRegion {
                x: i64::from(self.x),
                y: i64::from(self.y),
                width: i64::from(self.width),
                height: i64::from(self.height),
            });
        }
        Ok(Self::new(self.x, self.y, right - self.x, bottom - self.y))
    }
}

/// Axis-aligned rectangle in document space, `(x1, y1)` bottom-left and
/// `(x2, y2)` top-right.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DocRect {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl DocRect {
    /// Build from two corners in any order.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            x1: a.0.min(b.0),
            y1: a.1.min(b.1),
            x2: a.0.max(b.0),
            y2: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }
}

/// Page size in document units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
}

impl PageGeometry {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Page size implied by a raster rendered at `dpi`.
    pub fn from_dpi(image_width: u32, image_height: u32, dpi: f64) -> Self {
        let scale = POINTS_PER_INCH / dpi;
        Self {
            width: f64::from(image_width) * scale,
            height: f64::from(image_height) * scale,
        }
    }
}

/// Convert a pixel coordinate to document space.
pub fn pixel_to_document(
    px: f64,
    py: f64,
    image_width: f64,
    image_height: f64,
    page_width: f64,
    page_height: f64,
) -> (f64, f64) {
    (
        px * page_width / image_width,
        page_height - py * page_height / image_height,
    )
}

/// Convert a document coordinate to pixel space.
pub fn document_to_pixel(
    x: f64,
    y: f64,
    image_width: f64,
    image_height: f64,
    page_width: f64,
    page_height: f64,
) -> (f64, f64) {
    (
        x * image_width / page_width,
        (page_height - y) * image_height / page_height,
    )
}

/// Bidirectional mapping between one page's raster and its document space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageTransform {
    image_width: f64,
    image_height: f64,
    page_width: f64,
    page_height: f64,
}

impl PageTransform {
    /// Returns `InvalidPageGeometry` for zero or non-finite dimensions.
    pub fn new(
        page: usize,
        image_width: u32,
        image_height: u32,
        geometry: PageGeometry,
    ) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if image_width == 0
            || image_height == 0
            || !valid(geometry.width)
            || !valid(geometry.height)
        {
            return Err(DetectError::InvalidPageGeometry { page });
        }
        Ok(Self {
            image_width: f64::from(image_width),
            image_height: f64::from(image_height),
            page_width: geometry.width,
            page_height: geometry.height,
        })
    }

    /// Document units per pixel along x.
    pub fn scale_x(&self) -> f64 {
        self.page_width / self.image_width
    }

    /// Document units per pixel along y.
    pub fn scale_y(&self) -> f64 {
        self.page_height / self.image_height
    }

    pub fn page_width(&self) -> f64 {
        self.page_width
    }

    pub fn page_height(&self) -> f64 {
        self.page_height
    }

    pub fn to_document(&self, px: f64, py: f64) -> (f64, f64) {
        pixel_to_document(
            px,
            py,
            self.image_width,
            self.image_height,
            self.page_width,
            self.page_height,
        )
    }

    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        document_to_pixel(
            x,
            y,
            self.image_width,
            self.image_height,
            self.page_width,
            self.page_height,
        )
    }

    /// Map a document rectangle to float pixel bounds `(x0, top, x1, bottom)`.
    pub fn doc_rect_to_pixel_bounds(&self, rect: &DocRect) -> (f64, f64, f64, f64) {
        let (x0, top) = self.to_pixel(rect.x1, rect.y2);
        let (x1, bottom) = self.to_pixel(rect.x2, rect.y1);
        (x0, top, x1, bottom)
    }

    pub fn pixel_rect_to_document(&self, rect: &PixelRect) -> DocRect {
        DocRect::from_corners(
            self.to_document(f64::from(rect.x), f64::from(rect.y)),
            self.to_document(f64::from(rect.right()), f64::from(rect.bottom())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter_at_150dpi() -> PageTransform {
        PageTransform::new(0, 1275, 1650, PageGeometry::new(612.0, 792.0)).unwrap()
    }

    #[test]
    fn pixel_origin_maps_to_top_left_of_page() {
        let t = letter_at_150dpi();
        assert_eq!(t.to_document(0.0, 0.0), (0.0, 792.0));
        assert_eq!(t.to_document(1275.0, 1650.0), (612.0, 0.0));
    }

    #[test]
    fn round_trip_within_tolerance() {
        let t = letter_at_150dpi();
        for px in [0.0, 1.0, 17.5, 333.0, 1274.0] {
            for py in [0.0, 3.0, 500.0, 1649.5] {
                let (x, y) = t.to_document(px, py);
                let (rx, ry) = t.to_pixel(x, y);
                assert!(approx_eq(rx, px, 1e-6), "{rx} vs {px}");
                assert!(approx_eq(ry, py, 1e-6), "{ry} vs {py}");
            }
        }
    }

    #[test]
    fn repeated_round_trips_do_not_drift() {
        let t = letter_at_150dpi();
        let (x0, y0) = (123.456, 654.321);
        let (mut x, mut y) = (x0, y0);
        for _ in 0..1000 {
            let (px, py) = t.to_pixel(x, y);
            (x, y) = t.to_document(px, py);
        }
        assert!(approx_eq(x, x0, 1e-6));
        assert!(approx_eq(y, y0, 1e-6));
    }

    #[test]
    fn rejects_degenerate_geometry() {
        assert_eq!(
            PageTransform::new(4, 0, 10, PageGeometry::new(1.0, 1.0)),
            Err(DetectError::InvalidPageGeometry { page: 4 })
        );
        assert!(PageTransform::new(0, 10, 10, PageGeometry::new(f64::NAN, 1.0)).is_err());
    }

    #[test]
    fn from_dpi_uses_points() {
        let g = PageGeometry::from_dpi(1275, 1650, 150.0);
        assert!(approx_eq(g.width, 612.0, 1e-9));
        assert!(approx_eq(g.height, 792.0, 1e-9));
    }

    #[test]
    fn padded_bounds_are_clipped_to_buffer() {
        let r = PixelRect::from_bounds_clipped(5.0, 5.0, 50.0, 20.0, 15, 40, 100).unwrap();
        assert_eq!(r, PixelRect::new(0, 0, 40, 35));
    }

    #[test]
    fn bounds_outside_buffer_are_invalid() {
        let err = PixelRect::from_bounds_clipped(500.0, 10.0, 600.0, 20.0, 0, 100, 100);
        assert!(matches!(err, Err(DetectError::InvalidRegion { .. })));
        let err = PixelRect::from_bounds_clipped(10.0, 10.0, 10.0, 20.0, 0, 100, 100);
        assert!(matches!(err, Err(DetectError::InvalidRegion { .. })));
    }

    #[test]
    fn far_out_of_bounds_rect_is_invalid_not_overflow() {
        let far = PixelRect::new(u32::MAX - 5, 0, 10, 10);
        assert_eq!(far.right(), u32::MAX);
        assert!(matches!(
            far.clipped(100, 100),
            Err(DetectError::InvalidRegion { .. })
        ));
        let tall = PixelRect::new(0, u32::MAX - 1, 10, u32::MAX);
        assert!(tall.clipped(100, 100).is_err());
    }

    #[test]
    fn pixel_rect_maps_to_document_rect() {
        let t = PageTransform::new(0, 100, 200, PageGeometry::new(50.0, 100.0)).unwrap();
        let r = t.pixel_rect_to_document(&PixelRect::new(10, 20, 30, 40));
        assert_eq!(
            r,
            DocRect {
                x1: 5.0,
                y1: 70.0,
                x2: 20.0,
                y2: 90.0
            }
        );
    }
}
