//! Scanner, filter and coordinate properties.

mod common;

use common::Page;
use fillline_core::geometry::{document_to_pixel, pixel_to_document};
use fillline_core::raster::{
    DecorativeBand, LineScanner, PixelBuffer, Segment, classify_density, dedup_rows,
    filter_segments,
};
use fillline_core::{DensityParams, Margins, ScanParams};

#[test]
fn one_run_one_segment_for_every_length_and_thickness() {
    let scanner = LineScanner::new(50, 20, 3, 2);
    for length in [20u32, 21, 57, 150, 300] {
        for thickness in 1..=3u32 {
            let mut page = Page::blank(400, 40);
            page.rule(40, 40 + length, 10, thickness);
            let buf = PixelBuffer::new(&page.data, 400, 40).unwrap();
            let segs = scanner.scan(&buf, buf.bounds()).unwrap();
            assert_eq!(
                segs,
                vec![Segment::new(40, 40 + length, 10, thickness)],
                "length {length} thickness {thickness}"
            );
        }
    }
}

#[test]
fn thicker_than_allowed_is_not_reported() {
    let scanner = LineScanner::new(50, 20, 3, 2);
    for thickness in 4..=8u32 {
        let mut page = Page::blank(200, 40);
        page.rule(10, 150, 10, thickness);
        let buf = PixelBuffer::new(&page.data, 200, 40).unwrap();
        assert!(scanner.scan(&buf, buf.bounds()).unwrap().is_empty());
    }
}

#[test]
fn gap_tolerance_boundary() {
    let scanner = LineScanner::new(50, 20, 3, 3);
    for gap in 1..=6u32 {
        let mut page = Page::blank(300, 10);
        page.rule(10, 100, 5, 1);
        page.rule(100 + gap, 200, 5, 1);
        let buf = PixelBuffer::new(&page.data, 300, 10).unwrap();
        let segs = scanner.scan(&buf, buf.bounds()).unwrap();
        if gap <= 3 {
            assert_eq!(segs, vec![Segment::new(10, 200, 5, 1)], "gap {gap}");
        } else {
            assert_eq!(segs.len(), 2, "gap {gap}");
        }
    }
}

#[test]
fn binarization_threshold_is_strict() {
    let mut page = Page::blank(200, 10);
    for x in 10..110 {
        page.data[(4 * 200 + x) as usize] = 50;
    }
    let buf = PixelBuffer::new(&page.data, 200, 10).unwrap();
    assert!(LineScanner::new(50, 20, 3, 2).scan(&buf, buf.bounds()).unwrap().is_empty());
    assert_eq!(LineScanner::new(51, 20, 3, 2).scan(&buf, buf.bounds()).unwrap().len(), 1);
}

#[test]
fn rows_ten_apart_collapse_to_first() {
    let out = dedup_rows(
        vec![Segment::new(50, 250, 110, 1), Segment::new(50, 250, 100, 1)],
        25,
    );
    assert_eq!(out, vec![Segment::new(50, 250, 100, 1)]);
}

#[test]
fn density_flags_only_busy_top_band() {
    let mut segs: Vec<Segment> = (0..15).map(|i| Segment::new(10, 30, 5 + i * 2, 1)).collect();
    for bin in 1..20u32 {
        segs.push(Segment::new(10, 200, bin * 50 + 5, 1));
        segs.push(Segment::new(10, 200, bin * 50 + 25, 1));
    }
    let bands = classify_density(&segs, 1000, &DensityParams::default());
    assert_eq!(
        bands.as_slice(),
        &[DecorativeBand {
            start_y: 0,
            end_y: 50
        }]
    );
}

#[test]
fn filter_stages_compose() {
    let params = ScanParams {
        min_length: 20,
        max_length_ratio: 0.8,
        margins: Margins {
            top: 0.05,
            bottom: 0.05,
            left: 0.0,
            right: 0.0,
        },
        min_y_distance: 25,
        outlier_ratio: 0.35,
        ..ScanParams::supplemental()
    };
    let bands = [DecorativeBand {
        start_y: 100,
        end_y: 150,
    }];
    let segs = vec![
        Segment::new(10, 30, 20, 1),   // top margin
        Segment::new(10, 900, 300, 1), // border
        Segment::new(10, 200, 120, 1), // decorative band
        Segment::new(10, 200, 400, 1),
        Segment::new(50, 180, 410, 1), // duplicate of y=400
        Segment::new(10, 210, 600, 1),
        Segment::new(10, 40, 800, 1), // short outlier
    ];
    let out = filter_segments(segs, 1000, 1000, &bands, &params);
    assert_eq!(
        out,
        vec![Segment::new(10, 200, 400, 1), Segment::new(10, 210, 600, 1)]
    );
}

#[test]
fn coordinate_round_trip_over_image() {
    let (iw, ih, pw, ph) = (1275.0, 1650.0, 612.0, 792.0);
    for px in (0..1275).step_by(37) {
        for py in (0..1650).step_by(41) {
            let (px, py) = (px as f64 + 0.25, py as f64 + 0.5);
            let (x, y) = pixel_to_document(px, py, iw, ih, pw, ph);
            let (rx, ry) = document_to_pixel(x, y, iw, ih, pw, ph);
            assert!((rx - px).abs() < 1e-6 && (ry - py).abs() < 1e-6);
        }
    }
}
