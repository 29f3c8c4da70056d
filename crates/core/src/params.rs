//! Detection parameters.
//!
//! Contains the per-pass threshold sets and the document-level options.

use crate::error::{DetectError, Result};

pub(crate) const DEFAULT_BINARIZATION_THRESHOLD: u8 = 50;
pub(crate) const DEFAULT_MAX_THICKNESS: u32 = 3;
pub(crate) const DEFAULT_DENSITY_BINS: usize = 20;
pub(crate) const DEFAULT_DENSITY_TOP_FRACTION: f64 = 0.25;
pub(crate) const DEFAULT_DENSITY_THRESHOLD: usize = 10;
pub(crate) const DEFAULT_ROI_PADDING: u32 = 15;
pub(crate) const DEFAULT_FIELD_HEIGHT: f64 = 14.0;
pub(crate) const DEFAULT_CONTEXT_RADIUS: usize = 50;
pub(crate) const DEFAULT_FILLER_WIDTH_CHARS: usize = 20;

/// Exclusion margins, each a fraction of the page dimension it runs along.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Margins {
    pub const NONE: Margins = Margins {
        top: 0.0,
        bottom: 0.0,
        left: 0.0,
        right: 0.0,
    };
}

impl Default for Margins {
    fn default() -> Self {
        Self::NONE
    }
}

/// Parameters for the decorative-band density classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityParams {
    /// Number of equal-height vertical bins the region is split into.
    pub bins: usize,

    /// Fraction of the region height, from the top, in which a dense bin may
    /// seed a decorative band.
    pub top_fraction: f64,

    /// A bin holding more segments than this seeds a band. Neighbouring bins
    /// holding more than half of it are merged into the band.
    pub threshold: usize,
}

impl Default for DensityParams {
    fn default() -> Self {
        Self {
            bins: DEFAULT_DENSITY_BINS,
            top_fraction: DEFAULT_DENSITY_TOP_FRACTION,
            threshold: DEFAULT_DENSITY_THRESHOLD,
        }
    }
}

/// Threshold set for one scan pass.
///
/// The targeted and supplemental passes share one pipeline and differ only
/// in these values.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanParams {
    /// A pixel is ink when its intensity is strictly below this value.
    pub binarization_threshold: u8,

    /// Minimum run length in pixels, both when scanning and when filtering.
    pub min_length: u32,

    /// Runs thicker than this many rows are rejected as filled shapes.
    pub max_thickness: u32,

    /// Longest run of background pixels bridged inside one run.
    pub max_gap: u32,

    /// Minimum share of ink pixels over a run's span. Bridged text glyphs
    /// fall below it; ruled lines stay well above.
    pub min_fill_ratio: f64,

    /// Segments longer than this fraction of the page width are treated as
    /// table borders and dropped.
    pub max_length_ratio: f64,

    /// Page margins in which segments are dropped.
    pub margins: Margins,

    /// Segments closer than this vertically to an already kept, horizontally
    /// overlapping segment are duplicates of it.
    pub min_y_distance: u32,

    /// Segments shorter than this fraction of the median surviving length
    /// are dropped as noise.
    pub outlier_ratio: f64,

    pub density: DensityParams,
}

impl ScanParams {
    /// Defaults for crops around text-derived regions of interest.
    ///
    /// The text cue is trusted, so short marks are accepted and no page
    /// margins apply.
    pub fn targeted() -> Self {
        Self {
            binarization_threshold: DEFAULT_BINARIZATION_THRESHOLD,
            min_length: 15,
            max_thickness: DEFAULT_MAX_THICKNESS,
            max_gap: 2,
            min_fill_ratio: 0.8,
            max_length_ratio: 0.9,
            margins: Margins::NONE,
            min_y_distance: 15,
            outlier_ratio: 0.35,
            density: DensityParams::default(),
        }
    }

    /// Defaults for the whole-page pass.
    ///
    /// Without a text cue only longer marks are trusted, and the header,
    /// footer and side margins are excluded.
    pub fn supplemental() -> Self {
        Self {
            binarization_threshold: DEFAULT_BINARIZATION_THRESHOLD,
            min_length: 40,
            max_thickness: DEFAULT_MAX_THICKNESS,
            max_gap: 2,
            min_fill_ratio: 0.9,
            max_length_ratio: 0.8,
            margins: Margins {
                top: 0.08,
                bottom: 0.08,
                left: 0.05,
                right: 0.05,
            },
            min_y_distance: 25,
            outlier_ratio: 0.35,
            density: DensityParams::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fraction = |v: f64| (0.0..1.0).contains(&v);
        if self.min_length == 0 {
            return Err(DetectError::InvalidParams("min_length must be positive".into()));
        }
        if self.max_thickness == 0 {
            return Err(DetectError::InvalidParams(
                "max_thickness must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_fill_ratio) {
            return Err(DetectError::InvalidParams(
                "min_fill_ratio must be within [0, 1]".into(),
            ));
        }
        if !(self.max_length_ratio > 0.0 && self.max_length_ratio <= 1.0) {
            return Err(DetectError::InvalidParams(
                "max_length_ratio must be within (0, 1]".into(),
            ));
        }
        let m = &self.margins;
        if ![m.top, m.bottom, m.left, m.right].into_iter().all(fraction)
            || m.top + m.bottom >= 1.0
            || m.left + m.right >= 1.0
        {
            return Err(DetectError::InvalidParams(
                "margins must be fractions leaving part of the page".into(),
            ));
        }
        if !fraction(self.outlier_ratio) {
            return Err(DetectError::InvalidParams(
                "outlier_ratio must be within [0, 1)".into(),
            ));
        }
        let top = self.density.top_fraction;
        if self.density.bins == 0 || !(top > 0.0 && top <= 1.0) {
            return Err(DetectError::InvalidParams(
                "density bins and top_fraction must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ScanParams {
    fn default() -> Self {
        Self::targeted()
    }
}

/// Options for a whole detection call.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectParams {
    pub targeted: ScanParams,
    pub supplemental: ScanParams,

    /// Pixels added around each region of interest before cropping.
    pub roi_padding: u32,

    /// Height, in document units, of the rectangle placed above a line.
    pub field_height: f64,

    /// Width, in characters of the label, assumed for the blank that follows
    /// a filler phrase such as "amount of $".
    pub filler_width_chars: usize,

    /// Characters of text kept on each side of a match for classification.
    pub context_radius: usize,

    /// Run the whole-page supplemental pass after the targeted pass.
    pub supplemental_pass: bool,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            targeted: ScanParams::targeted(),
            supplemental: ScanParams::supplemental(),
            roi_padding: DEFAULT_ROI_PADDING,
            field_height: DEFAULT_FIELD_HEIGHT,
            filler_width_chars: DEFAULT_FILLER_WIDTH_CHARS,
            context_radius: DEFAULT_CONTEXT_RADIUS,
            supplemental_pass: true,
        }
    }
}

impl DetectParams {
    pub fn validate(&self) -> Result<()> {
        self.targeted.validate()?;
        self.supplemental.validate()?;
        if !(self.field_height.is_finite() && self.field_height > 0.0) {
            return Err(DetectError::InvalidParams(
                "field_height must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(DetectParams::default().validate().is_ok());
    }

    #[test]
    fn supplemental_is_stricter_than_targeted() {
        let t = ScanParams::targeted();
        let s = ScanParams::supplemental();
        assert!(s.min_length > t.min_length);
        assert!(s.min_y_distance > t.min_y_distance);
        assert!(s.margins.top > t.margins.top);
    }

    #[test]
    fn rejects_margins_covering_the_page() {
        let mut p = ScanParams::supplemental();
        p.margins.top = 0.6;
        p.margins.bottom = 0.5;
        assert!(matches!(p.validate(), Err(DetectError::InvalidParams(_))));
    }

    #[test]
    fn rejects_zero_min_length() {
        let mut p = DetectParams::default();
        p.targeted.min_length = 0;
        assert!(p.validate().is_err());
    }
}
