//! fillline - locate fill-in lines on rendered document pages.
//!
//! The engine scans binarized page rasters for horizontal rules, reconciles
//! them with blank runs found in extracted text, and reports each accepted
//! line as a document-space rectangle tagged with a field kind.

pub mod detect;
pub mod error;
pub mod geometry;
pub mod params;
pub mod raster;
pub mod text;

pub use detect::{
    DetectedArea, DocumentDetection, PageDetection, PageRaster, PageStats, SourceTag,
    detect_document, detect_page, extract_text_hits,
};
pub use error::{DetectError, Result};
pub use geometry::{DocRect, PageGeometry, PageTransform, PixelRect};
pub use params::{DensityParams, DetectParams, Margins, ScanParams};
pub use text::{FieldKind, TextElement};
