//! Per-page targeted and supplemental scanning.
//!
//! A page moves through `Idle -> TargetedScan -> SupplementalScan -> Merged`.
//! The targeted pass scans a padded crop around every text-derived region of
//! interest and records each crop as scanned. The supplemental pass then
//! scans the whole page with stricter thresholds and keeps only segments
//! outside every scanned crop. The scanned list is handed from one pass to
//! the next as plain data.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{DetectError, Result};
use crate::geometry::{DocRect, PageTransform, PixelRect};
use crate::params::{DetectParams, ScanParams};
use crate::raster::{
    LineScanner, PageScratch, PixelBuffer, Segment, classify_density, filter_segments,
};
use crate::text::{
    FieldKind, RunOptions, TextElement, TextRun, classify_field, extract_runs, label_context,
    nearest_label,
};

use super::types::{
    DetectedArea, DocumentDetection, PageDetection, PageRaster, PageStats, SourceTag,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    TargetedScan,
    SupplementalScan,
    Merged,
}

/// Scan `region`, classify its density bands, and filter the result.
///
/// Returns segments in page coordinates.
pub fn scan_region(
    scratch: &PageScratch,
    buf: &PixelBuffer<'_>,
    region: PixelRect,
    params: &ScanParams,
) -> Result<Vec<Segment>> {
    let region = region.clipped(buf.width(), buf.height())?;
    let scanner = LineScanner::from_params(params);
    let local = scanner.scan_in(scratch.bump(), buf, region)?;
    let bands: Vec<_> = classify_density(&local, region.height, &params.density)
        .into_iter()
        .map(|b| b.translate(region.y))
        .collect();
    if !bands.is_empty() {
        debug!(?region, bands = bands.len(), "decorative bands");
    }
    let page_segments: Vec<Segment> = local
        .iter()
        .map(|s| s.translate(region.x, region.y))
        .collect();
    Ok(filter_segments(
        page_segments,
        buf.width(),
        buf.height(),
        &bands,
        params,
    ))
}

fn segment_rect(transform: &PageTransform, seg: &Segment, field_height: f64) -> DocRect {
    let (x1, y) = transform.to_document(f64::from(seg.start_x), f64::from(seg.y));
    let (x2, _) = transform.to_document(f64::from(seg.end_x), f64::from(seg.y));
    DocRect {
        x1,
        y1: y,
        x2,
        y2: y + field_height,
    }
}

fn text_area(run: &TextRun, field_height: f64) -> DetectedArea {
    DetectedArea {
        page: run.page,
        rect: DocRect {
            x1: run.rect.x1,
            y1: run.rect.y1,
            x2: run.rect.x2,
            y2: run.rect.y1 + field_height,
        },
        field_kind: run.field_kind,
        source: SourceTag::Text,
        context: run.context.clone(),
    }
}

fn covered_by(scanned: &[PixelRect], seg: &Segment) -> bool {
    scanned
        .iter()
        .any(|r| seg.y >= r.y && seg.y < r.bottom() && r.overlaps_span(seg.start_x, seg.end_x))
}

struct PageRun<'r, 'a> {
    raster: &'r PageRaster<'a>,
    transform: PageTransform,
    params: &'r DetectParams,
    scratch: PageScratch,
    phase: Phase,
    stats: PageStats,
    scanned: Vec<PixelRect>,
    targeted_segments: Vec<Segment>,
    targeted: Vec<DetectedArea>,
    supplemental: Vec<DetectedArea>,
    text_hits: Vec<DetectedArea>,
}

impl<'r, 'a> PageRun<'r, 'a> {
    fn new(raster: &'r PageRaster<'a>, params: &'r DetectParams) -> Result<Self> {
        Ok(Self {
            raster,
            transform: raster.transform()?,
            params,
            scratch: PageScratch::new(),
            phase: Phase::Idle,
            stats: PageStats {
                page: raster.page,
                ..PageStats::default()
            },
            scanned: Vec::new(),
            targeted_segments: Vec::new(),
            targeted: Vec::new(),
            supplemental: Vec::new(),
            text_hits: Vec::new(),
        })
    }

    fn enter(&mut self, next: Phase) {
        debug!(page = self.raster.page, from = ?self.phase, to = ?next, "page phase");
        self.phase = next;
    }

    /// Index of a line already found by another crop that `seg` repeats.
    fn found_index(&self, seg: &Segment) -> Option<usize> {
        let min_dy = self.params.targeted.min_y_distance;
        self.targeted_segments
            .iter()
            .position(|k| k.y.abs_diff(seg.y) < min_dy && k.overlaps_x(seg))
    }

    fn targeted_pass(&mut self, runs: &[&TextRun]) {
        self.enter(Phase::TargetedScan);
        let buf = self.raster.buffer;
        self.stats.regions_of_interest = runs.len();

        for run in runs {
            let (x0, top, x1, bottom) = self.transform.doc_rect_to_pixel_bounds(&run.rect);
            let crop = PixelRect::from_bounds_clipped(
                x0,
                top,
                x1,
                bottom,
                self.params.roi_padding,
                buf.width(),
                buf.height(),
            )
            .and_then(|crop| {
                scan_region(&self.scratch, &buf, crop, &self.params.targeted).map(|s| (crop, s))
            });
            let (crop, segments) = match crop {
                Ok(found) => found,
                Err(err) => {
                    warn!(
                        page = run.page,
                        element = run.element,
                        %err,
                        "skipping region of interest"
                    );
                    self.stats.skipped_regions += 1;
                    continue;
                }
            };
            self.stats.regions_scanned += 1;
            self.scanned.push(crop);

            if segments.is_empty() {
                if run.kind.is_direct() {
                    self.text_hits.push(text_area(run, self.params.field_height));
                }
                continue;
            }
            for seg in segments {
                let area = DetectedArea {
                    page: self.raster.page,
                    rect: segment_rect(&self.transform, &seg, self.params.field_height),
                    field_kind: run.field_kind,
                    source: SourceTag::Targeted,
                    context: run.context.clone(),
                };
                // A crop clips lines at its edges; the longest sighting wins.
                match self.found_index(&seg) {
                    Some(i) if self.targeted_segments[i].length < seg.length => {
                        self.targeted_segments[i] = seg;
                        self.targeted[i] = area;
                    }
                    Some(_) => {}
                    None => {
                        self.targeted.push(area);
                        self.targeted_segments.push(seg);
                    }
                }
            }
        }
        self.stats.targeted_segments = self.targeted.len();
        self.stats.text_hits = self.text_hits.len();
        debug!(
            page = self.raster.page,
            regions = self.stats.regions_scanned,
            segments = self.stats.targeted_segments,
            "targeted pass done"
        );
    }

    fn supplemental_pass(&mut self, elements: &[TextElement]) {
        self.enter(Phase::SupplementalScan);
        let buf = self.raster.buffer;
        let params = &self.params.supplemental;
        let segments = match scan_region(&self.scratch, &buf, buf.bounds(), params) {
            Ok(segments) => segments,
            Err(err) => {
                warn!(page = self.raster.page, %err, "supplemental pass skipped");
                return;
            }
        };

        let reach = 2.0 * self.params.field_height;
        for seg in segments {
            if covered_by(&self.scanned, &seg) {
                self.stats.supplemental_overlaps += 1;
                continue;
            }
            let rect = segment_rect(&self.transform, &seg, self.params.field_height);
            let context = nearest_label(elements, self.raster.page, &rect, reach)
                .map(|e| label_context(e, self.params.context_radius))
                .unwrap_or_default();
            let field_kind = if context.is_empty() {
                FieldKind::Text
            } else {
                classify_field(&context)
            };
            self.supplemental.push(DetectedArea {
                page: self.raster.page,
                rect,
                field_kind,
                source: SourceTag::Supplemental,
                context,
            });
        }
        self.stats.supplemental_segments = self.supplemental.len();
        debug!(
            page = self.raster.page,
            segments = self.stats.supplemental_segments,
            overlaps = self.stats.supplemental_overlaps,
            "supplemental pass done"
        );
    }

    fn merge(mut self) -> PageDetection {
        self.enter(Phase::Merged);
        let mut areas = self.targeted;
        areas.append(&mut self.supplemental);
        areas.append(&mut self.text_hits);
        debug!(
            page = self.raster.page,
            areas = areas.len(),
            scratch_bytes = self.scratch.allocated_bytes(),
            "page merged"
        );
        PageDetection {
            areas,
            stats: self.stats,
        }
    }
}

fn run_options(params: &DetectParams) -> RunOptions {
    RunOptions {
        context_radius: params.context_radius,
        filler_width_chars: params.filler_width_chars,
    }
}

fn detect_page_with_runs(
    raster: &PageRaster<'_>,
    elements: &[TextElement],
    runs: &[&TextRun],
    params: &DetectParams,
) -> Result<PageDetection> {
    let mut page = PageRun::new(raster, params)?;
    page.targeted_pass(runs);
    if params.supplemental_pass {
        page.supplemental_pass(elements);
    }
    Ok(page.merge())
}

/// Detect fill-in areas on one page.
///
/// `elements` may span several pages; only those on `raster.page` are used.
pub fn detect_page(
    raster: &PageRaster<'_>,
    elements: &[TextElement],
    params: &DetectParams,
) -> Result<PageDetection> {
    params.validate()?;
    let runs = extract_runs(elements, run_options(params));
    let on_page: Vec<&TextRun> = runs.iter().filter(|r| r.page == raster.page).collect();
    detect_page_with_runs(raster, elements, &on_page, params)
}

/// Detect fill-in areas over a whole document, one page per worker.
///
/// Fails only when the document has no rasters or a raster is unusable;
/// problems confined to one region or element are logged and skipped.
pub fn detect_document(
    rasters: &[PageRaster<'_>],
    elements: &[TextElement],
    params: &DetectParams,
) -> Result<DocumentDetection> {
    params.validate()?;
    if rasters.is_empty() {
        return Err(DetectError::NoRasters);
    }
    let mut by_page: BTreeMap<usize, &PageRaster<'_>> = BTreeMap::new();
    for raster in rasters {
        raster.transform()?;
        if by_page.insert(raster.page, raster).is_some() {
            return Err(DetectError::InvalidParams(format!(
                "page {} has more than one raster",
                raster.page
            )));
        }
    }

    let mut skipped_elements = 0;
    for element in elements {
        if !by_page.contains_key(&element.page) {
            let err = DetectError::MissingPageAsset { page: element.page };
            warn!(%err, "skipping text element");
            skipped_elements += 1;
        }
    }

    let runs = extract_runs(elements, run_options(params));
    let mut runs_by_page: BTreeMap<usize, Vec<&TextRun>> = BTreeMap::new();
    for run in &runs {
        if by_page.contains_key(&run.page) {
            runs_by_page.entry(run.page).or_default().push(run);
        }
    }

    let pages: Vec<&PageRaster<'_>> = by_page.into_values().collect();
    let results: Vec<PageDetection> = pages
        .par_iter()
        .map(|raster| {
            let page_runs = runs_by_page
                .get(&raster.page)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            detect_page_with_runs(raster, elements, page_runs, params)
        })
        .collect::<Result<_>>()?;

    let mut out = DocumentDetection {
        skipped_elements,
        ..DocumentDetection::default()
    };
    for page in results {
        out.areas.extend(page.areas);
        out.pages.push(page.stats);
    }
    debug!(
        pages = out.pages.len(),
        areas = out.areas.len(),
        skipped_elements,
        "document done"
    );
    Ok(out)
}

/// Text-only detection: direct blank runs as areas, no raster needed.
pub fn extract_text_hits(elements: &[TextElement], params: &DetectParams) -> Vec<DetectedArea> {
    extract_runs(elements, run_options(params))
        .iter()
        .filter(|run| run.kind.is_direct())
        .map(|run| text_area(run, params.field_height))
        .collect()
}
