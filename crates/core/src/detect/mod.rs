//! Fill-in area detection over rendered pages.
//!
//! Combines raster line scanning with text-run extraction and maps every
//! accepted line into document space.

mod orchestrator;
mod types;

pub use orchestrator::{detect_document, detect_page, extract_text_hits, scan_region};
pub use types::{
    DetectedArea, DocumentDetection, PageDetection, PageRaster, PageStats, SourceTag,
};
