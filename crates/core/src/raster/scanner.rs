//! Row-by-row horizontal line scanning.
//!
//! A region is swept one row at a time. Ink pixels accumulate into a run
//! while background gaps stay within `max_gap`; each closed run long enough
//! is measured downward to find how many rows thick the mark is. Rows below
//! a measured run are consumed for its columns so a thick rule is reported
//! once, at its first row.

use bumpalo::Bump;
use bumpalo::collections::Vec as BumpVec;

use crate::error::Result;
use crate::geometry::PixelRect;
use crate::params::ScanParams;

use super::buffer::PixelBuffer;

/// Columns sampled along a run when measuring thickness.
pub(crate) const THICKNESS_SAMPLES: u32 = 10;

/// Rows below the run examined when measuring thickness.
pub(crate) const THICKNESS_MAX_ROWS: u32 = 10;

/// A row counts as part of the rule when more than this share of the sampled
/// columns are ink.
pub(crate) const THICKNESS_INK_RATIO: f64 = 0.7;

/// A horizontal line candidate in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Segment {
    pub start_x: u32,
    /// Exclusive.
    pub end_x: u32,
    pub y: u32,
    pub length: u32,
    pub thickness: u32,
}

impl Segment {
    pub fn new(start_x: u32, end_x: u32, y: u32, thickness: u32) -> Self {
        Self {
            start_x,
            end_x,
            y,
            length: end_x - start_x,
            thickness: thickness.max(1),
        }
    }

    /// Shift from a crop's local frame into its parent frame.
    pub fn translate(&self, dx: u32, dy: u32) -> Self {
        Self {
            start_x: self.start_x + dx,
            end_x: self.end_x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Whether both segments share at least one column.
    pub fn overlaps_x(&self, other: &Segment) -> bool {
        self.start_x < other.end_x && other.start_x < self.end_x
    }
}

/// Columns `[x0, x1)` consumed on rows `[y0, y1)`.
#[derive(Clone, Copy, Debug)]
struct ConsumedSpan {
    x0: u32,
    x1: u32,
    y0: u32,
    y1: u32,
}

impl ConsumedSpan {
    fn covers(&self, x0: u32, x1: u32, y: u32) -> bool {
        y >= self.y0 && y < self.y1 && x0 < self.x1 && self.x0 < x1
    }
}

/// Count rows below `(x, y)` whose sampled columns along `[x, x + length)`
/// stay mostly ink, looking at most `max_rows` rows down and never past
/// `bottom`. Returns the count plus one for the run's own row.
fn ink_rows_below(
    buf: &PixelBuffer<'_>,
    x: u32,
    y: u32,
    length: u32,
    bottom: u32,
    threshold: u8,
    max_rows: u32,
) -> u32 {
    if length == 0 {
        return 1;
    }
    let samples = length.min(THICKNESS_SAMPLES);
    let mut thickness = 1;
    for row in (y + 1)..bottom.min(y.saturating_add(max_rows).saturating_add(1)) {
        let ink = (0..samples)
            .filter(|&i| {
                let sx = x + ((2 * i + 1) * length) / (2 * samples);
                buf.is_ink(sx, row, threshold)
            })
            .count();
        if (ink as f64) / (samples as f64) > THICKNESS_INK_RATIO {
            thickness += 1;
        } else {
            break;
        }
    }
    thickness
}

/// Estimate how many rows thick the run starting at `(x, y)` is.
///
/// Samples up to ten evenly spaced columns along the run and walks at most
/// ten rows down. Always at least 1.
pub fn estimate_thickness(
    buf: &PixelBuffer<'_>,
    x: u32,
    y: u32,
    length: u32,
    threshold: u8,
) -> u32 {
    ink_rows_below(buf, x, y, length, buf.height(), threshold, THICKNESS_MAX_ROWS)
}

/// Horizontal line scanner configured from one pass's [`ScanParams`].
#[derive(Clone, Copy, Debug)]
pub struct LineScanner {
    threshold: u8,
    min_length: u32,
    max_thickness: u32,
    max_gap: u32,
    min_fill_ratio: f64,
}

impl LineScanner {
    pub fn new(threshold: u8, min_length: u32, max_thickness: u32, max_gap: u32) -> Self {
        Self {
            threshold,
            min_length: min_length.max(1),
            max_thickness,
            max_gap,
            min_fill_ratio: 0.0,
        }
    }

    pub fn from_params(params: &ScanParams) -> Self {
        Self::new(
            params.binarization_threshold,
            params.min_length,
            params.max_thickness,
            params.max_gap,
        )
        .with_min_fill_ratio(params.min_fill_ratio)
    }

    pub fn with_min_fill_ratio(mut self, ratio: f64) -> Self {
        self.min_fill_ratio = ratio;
        self
    }

    /// Scan `region` of `buf`, returning segments in the region's own frame.
    ///
    /// A region reaching past the buffer is clipped; one with nothing inside
    /// the buffer is an `InvalidRegion`.
    pub fn scan(&self, buf: &PixelBuffer<'_>, region: PixelRect) -> Result<Vec<Segment>> {
        let bump = Bump::new();
        let found = self.scan_in(&bump, buf, region)?;
        Ok(found.iter().copied().collect())
    }

    /// Like [`LineScanner::scan`], allocating into a page arena.
    pub fn scan_in<'b>(
        &self,
        bump: &'b Bump,
        buf: &PixelBuffer<'_>,
        region: PixelRect,
    ) -> Result<BumpVec<'b, Segment>> {
        let region = region.clipped(buf.width(), buf.height())?;
        let mut segments = BumpVec::new_in(bump);
        let mut consumed: BumpVec<'b, ConsumedSpan> = BumpVec::new_in(bump);

        for ly in 0..region.height {
            let gy = region.y + ly;
            consumed.retain(|span| span.y1 > gy);

            let mut run: Option<(u32, u32, u32)> = None; // (start, last ink, ink count)
            for lx in 0..region.width {
                let gx = region.x + lx;
                if buf.is_ink(gx, gy, self.threshold) {
                    run = Some(match run {
                        Some((start, _, ink)) => (start, lx, ink + 1),
                        None => (lx, lx, 1),
                    });
                } else if let Some((start, last, ink)) = run {
                    if lx - last > self.max_gap {
                        self.close_run(
                            buf,
                            region,
                            start,
                            last + 1,
                            ink,
                            ly,
                            &mut consumed,
                            &mut segments,
                        );
                        run = None;
                    }
                }
            }
            // A run still open at the last column is evaluated like any other.
            if let Some((start, last, ink)) = run {
                self.close_run(
                    buf,
                    region,
                    start,
                    last + 1,
                    ink,
                    ly,
                    &mut consumed,
                    &mut segments,
                );
            }
        }

        Ok(segments)
    }

    #[allow(clippy::too_many_arguments)]
    fn close_run<'b>(
        &self,
        buf: &PixelBuffer<'_>,
        region: PixelRect,
        start: u32,
        end: u32,
        ink: u32,
        ly: u32,
        consumed: &mut BumpVec<'b, ConsumedSpan>,
        segments: &mut BumpVec<'b, Segment>,
    ) {
        let length = end - start;
        if length < self.min_length {
            return;
        }
        if (ink as f64) < self.min_fill_ratio * (length as f64) {
            return;
        }
        let (gx0, gx1, gy) = (region.x + start, region.x + end, region.y + ly);
        if consumed.iter().any(|span| span.covers(gx0, gx1, gy)) {
            return;
        }

        // Thickness is measured on the whole buffer so a crop edge cannot
        // cut a filled shape down to a thin line.
        let thickness = ink_rows_below(
            buf,
            gx0,
            gy,
            length,
            buf.height(),
            self.threshold,
            THICKNESS_MAX_ROWS,
        );
        if thickness <= self.max_thickness {
            consumed.push(ConsumedSpan {
                x0: gx0,
                x1: gx1,
                y0: gy + 1,
                y1: gy + thickness,
            });
            segments.push(Segment::new(start, end, ly, thickness));
        } else {
            // A filled shape: consume all of it so its lower rows do not
            // resurface as thin lines.
            let depth = ink_rows_below(
                buf,
                gx0,
                gy,
                length,
                buf.height(),
                self.threshold,
                u32::MAX,
            );
            consumed.push(ConsumedSpan {
                x0: gx0,
                x1: gx1,
                y0: gy + 1,
                y1: gy + depth,
            });
        }
    }
}
