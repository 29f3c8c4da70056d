//! Decorative-band detection by segment density.
//!
//! Logos and header graphics break into many short horizontal runs packed
//! into a few rows. Binning segments by their row and looking for bins that
//! are far busier than the rest isolates those areas without relying on a
//! fixed pixel offset.

use smallvec::SmallVec;

use crate::params::DensityParams;

use super::scanner::Segment;

/// Half-open row range `[start_y, end_y)` flagged as decorative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecorativeBand {
    pub start_y: u32,
    pub end_y: u32,
}

impl DecorativeBand {
    pub fn contains(&self, y: u32) -> bool {
        y >= self.start_y && y < self.end_y
    }

    pub fn translate(&self, dy: u32) -> Self {
        Self {
            start_y: self.start_y + dy,
            end_y: self.end_y + dy,
        }
    }
}

pub type DecorativeBands = SmallVec<[DecorativeBand; 2]>;

#[derive(Clone, Copy, Debug)]
struct DensityBin {
    range_start_y: f64,
    range_end_y: f64,
    count: usize,
}

fn bin_segments(segments: &[Segment], region_height: u32, bins: usize) -> Vec<DensityBin> {
    let bin_height = f64::from(region_height) / bins as f64;
    let mut out: Vec<DensityBin> = (0..bins)
        .map(|i| DensityBin {
            range_start_y: i as f64 * bin_height,
            range_end_y: (i + 1) as f64 * bin_height,
            count: 0,
        })
        .collect();
    for seg in segments {
        let idx = ((f64::from(seg.y) / bin_height) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Flag bands of abnormally high segment density near the top of a region.
///
/// Only bins within the top `top_fraction` of the region may seed a band; a
/// seed's neighbours joining it may lie below that line.
pub fn classify_density(
    segments: &[Segment],
    region_height: u32,
    params: &DensityParams,
) -> DecorativeBands {
    let mut bands = DecorativeBands::new();
    if segments.is_empty() || region_height == 0 || params.bins == 0 {
        return bands;
    }

    let bins = bin_segments(segments, region_height, params.bins);
    let examined = ((params.bins as f64) * params.top_fraction).ceil() as usize;
    let seed = |b: &DensityBin| b.count > params.threshold;
    let joins = |b: &DensityBin| (b.count as f64) > (params.threshold as f64) / 2.0;

    let mut i = 0;
    while i < examined.min(bins.len()) {
        if !seed(&bins[i]) {
            i += 1;
            continue;
        }
        let mut lo = i;
        while lo > 0 && joins(&bins[lo - 1]) {
            lo -= 1;
        }
        let mut hi = i;
        while hi + 1 < bins.len() && joins(&bins[hi + 1]) {
            hi += 1;
        }
        bands.push(DecorativeBand {
            start_y: bins[lo].range_start_y.floor() as u32,
            end_y: (bins[hi].range_end_y.ceil() as u32).min(region_height),
        });
        i = hi + 1;
    }
    bands
}
