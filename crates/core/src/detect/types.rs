//! Detection inputs and results.

use crate::error::Result;
use crate::geometry::{DocRect, PageGeometry, PageTransform};
use crate::raster::PixelBuffer;
use crate::text::FieldKind;

/// Which detector produced an area.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceTag {
    /// Raster scan of a crop around a text-derived region of interest.
    Targeted,
    /// Whole-page raster scan outside every targeted crop.
    Supplemental,
    /// Blank run in extracted text with no raster line found for it.
    Text,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Targeted => "targeted",
            SourceTag::Supplemental => "supplemental",
            SourceTag::Text => "text",
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One place to put a form field, in document space.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedArea {
    pub page: usize,
    pub rect: DocRect,
    pub field_kind: FieldKind,
    pub source: SourceTag,
    pub context: String,
}

impl DetectedArea {
    pub fn x(&self) -> f64 {
        self.rect.x1
    }

    /// Bottom edge, which sits on the detected line.
    pub fn y(&self) -> f64 {
        self.rect.y1
    }

    pub fn width(&self) -> f64 {
        self.rect.width()
    }

    pub fn height(&self) -> f64 {
        self.rect.height()
    }
}

/// A rendered page handed to the engine.
#[derive(Clone, Copy, Debug)]
pub struct PageRaster<'a> {
    /// Zero-based page index, matching [`crate::text::TextElement::page`].
    pub page: usize,
    pub buffer: PixelBuffer<'a>,
    pub geometry: PageGeometry,
}

impl<'a> PageRaster<'a> {
    /// Validate `data` against its dimensions and the page geometry.
    pub fn new(
        page: usize,
        data: &'a [u8],
        width: u32,
        height: u32,
        geometry: PageGeometry,
    ) -> Result<Self> {
        let buffer = PixelBuffer::for_page(page, data, width, height)?;
        PageTransform::new(page, width, height, geometry)?;
        Ok(Self {
            page,
            buffer,
            geometry,
        })
    }

    pub fn transform(&self) -> Result<PageTransform> {
        PageTransform::new(
            self.page,
            self.buffer.width(),
            self.buffer.height(),
            self.geometry,
        )
    }
}

/// Counters for one page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageStats {
    pub page: usize,
    pub regions_of_interest: usize,
    pub regions_scanned: usize,
    pub skipped_regions: usize,
    pub targeted_segments: usize,
    pub supplemental_segments: usize,
    /// Supplemental segments dropped for lying in an already scanned crop.
    pub supplemental_overlaps: usize,
    pub text_hits: usize,
}

/// Result of one page.
#[derive(Clone, Debug, Default)]
pub struct PageDetection {
    pub areas: Vec<DetectedArea>,
    pub stats: PageStats,
}

/// Result of a whole document.
#[derive(Clone, Debug, Default)]
pub struct DocumentDetection {
    /// Areas ordered by page, then targeted, supplemental and text hits.
    pub areas: Vec<DetectedArea>,
    pub pages: Vec<PageStats>,
    /// Text elements naming a page with no raster.
    pub skipped_elements: usize,
}

impl DocumentDetection {
    pub fn areas_on(&self, page: usize) -> impl Iterator<Item = &DetectedArea> {
        self.areas.iter().filter(move |a| a.page == page)
    }

    pub fn count_by_source(&self, source: SourceTag) -> usize {
        self.areas.iter().filter(|a| a.source == source).count()
    }
}
