//! Segment filtering and deduplication.
//!
//! Stages run in a fixed order: bounds and margins, decorative bands,
//! vertical deduplication, then relative-length outlier rejection. Band
//! removal comes before deduplication so decorative noise never anchors a
//! cluster, and outlier rejection comes last because its statistic must be
//! taken over the cleaned population.

use itertools::Itertools;
use tracing::debug;

use crate::error::{DetectError, Result};
use crate::params::ScanParams;

use super::density::DecorativeBand;
use super::scanner::Segment;

/// Median segment length.
pub fn median_length(segments: &[Segment]) -> Result<f64> {
    if segments.is_empty() {
        return Err(DetectError::DegenerateStatistic);
    }
    let lengths: Vec<u32> = segments.iter().map(|s| s.length).sorted_unstable().collect();
    let mid = lengths.len() / 2;
    Ok(if lengths.len() % 2 == 0 {
        (f64::from(lengths[mid - 1]) + f64::from(lengths[mid])) / 2.0
    } else {
        f64::from(lengths[mid])
    })
}

/// Drop segments outside the length bounds or inside the margins.
pub fn filter_bounds(
    segments: Vec<Segment>,
    page_width: u32,
    page_height: u32,
    params: &ScanParams,
) -> Vec<Segment> {
    let (w, h) = (f64::from(page_width), f64::from(page_height));
    let max_length = params.max_length_ratio * w;
    let m = &params.margins;
    let (top, bottom) = (m.top * h, h - m.bottom * h);
    let (left, right) = (m.left * w, w - m.right * w);
    segments
        .into_iter()
        .filter(|s| {
            let y = f64::from(s.y);
            s.length >= params.min_length
                && f64::from(s.length) <= max_length
                && y >= top
                && y < bottom
                && f64::from(s.start_x) >= left
                && f64::from(s.end_x) <= right
        })
        .collect()
}

/// Drop segments whose row lies inside a decorative band.
pub fn filter_bands(segments: Vec<Segment>, bands: &[DecorativeBand]) -> Vec<Segment> {
    if bands.is_empty() {
        return segments;
    }
    segments
        .into_iter()
        .filter(|s| !bands.iter().any(|b| b.contains(s.y)))
        .collect()
}

/// Collapse segments lying within `min_y_distance` rows of an earlier kept,
/// horizontally overlapping segment. The topmost of a cluster is kept.
///
/// Proximity alone is not enough: segments sharing no column are separate
/// blanks on one form row (for example "Name ____  Date ____") and are both
/// kept.
pub fn dedup_rows(segments: Vec<Segment>, min_y_distance: u32) -> Vec<Segment> {
    let mut kept: Vec<Segment> = Vec::with_capacity(segments.len());
    for seg in segments.into_iter().sorted_by_key(|s| (s.y, s.start_x)) {
        let duplicate = kept
            .iter()
            .rev()
            .take_while(|k| seg.y - k.y < min_y_distance)
            .any(|k| k.overlaps_x(&seg));
        if !duplicate {
            kept.push(seg);
        }
    }
    kept
}

/// Drop segments shorter than `ratio` times the median length.
pub fn reject_outliers(segments: Vec<Segment>, ratio: f64) -> Result<Vec<Segment>> {
    let median = median_length(&segments)?;
    let min = ratio * median;
    Ok(segments
        .into_iter()
        .filter(|s| f64::from(s.length) >= min)
        .collect())
}

/// Run every filtering stage over `segments` in page coordinates.
pub fn filter_segments(
    segments: Vec<Segment>,
    page_width: u32,
    page_height: u32,
    bands: &[DecorativeBand],
    params: &ScanParams,
) -> Vec<Segment> {
    let raw = segments.len();
    let bounded = filter_bounds(segments, page_width, page_height, params);
    let unbanded = filter_bands(bounded, bands);
    let deduped = dedup_rows(unbanded, params.min_y_distance);
    let deduped_len = deduped.len();
    let accepted = match reject_outliers(deduped, params.outlier_ratio) {
        Ok(kept) => kept,
        // Only an empty population has no median, so there is nothing to
        // pass through.
        Err(err) => {
            debug!(%err, "skipping outlier rejection");
            Vec::new()
        }
    };
    debug!(
        raw,
        deduped = deduped_len,
        accepted = accepted.len(),
        "filtered segments"
    );
    accepted
}
