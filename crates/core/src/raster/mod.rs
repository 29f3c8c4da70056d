//! Raster line detection.
//!
//! This module scans binarized page rasters for horizontal line candidates,
//! flags decorative bands by segment density, and filters the candidates
//! down to likely fill-in lines.

mod buffer;
mod density;
mod filter;
mod scanner;
mod scratch;

pub use buffer::PixelBuffer;
pub use density::{DecorativeBand, DecorativeBands, classify_density};
pub use filter::{
    dedup_rows, filter_bands, filter_bounds, filter_segments, median_length, reject_outliers,
};
pub use scanner::{LineScanner, Segment, estimate_thickness};
pub use scratch::PageScratch;
