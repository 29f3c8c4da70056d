//! fillline - find fill-in lines on rendered document pages
//!
//! A command line tool that reads one image per page plus the text elements
//! extracted from the same document, and prints the detected fill-in areas
//! as JSON in document coordinates.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use fillline_core::{
    DetectParams, DetectedArea, DocumentDetection, PageGeometry, PageRaster, PageStats,
    TextElement, detect_document, extract_text_hits,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Find fill-in lines on rendered document pages.
#[derive(Parser, Debug)]
#[command(name = "fillline")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page images in page order (PNG, JPEG or TIFF)
    images: Vec<PathBuf>,

    /// JSON file with extracted text elements:
    /// [{"text": "...", "bounds": [x1, y1, x2, y2], "page": 0}, ...]
    #[arg(short = 't', long = "text")]
    text: Option<PathBuf>,

    /// Resolution the pages were rendered at
    #[arg(long, default_value = "150")]
    dpi: f64,

    /// Page size in document units as WIDTH,HEIGHT (overrides --dpi)
    #[arg(long = "page-size", value_parser = parse_page_size)]
    page_size: Option<(f64, f64)>,

    /// Intensity below which a pixel is ink
    #[arg(long, default_value = "50")]
    threshold: u8,

    /// Minimum line length in pixels inside text-derived crops
    #[arg(long = "min-length-targeted", default_value = "15")]
    min_length_targeted: u32,

    /// Minimum line length in pixels for the whole-page pass
    #[arg(long = "min-length-supplemental", default_value = "40")]
    min_length_supplemental: u32,

    /// Maximum line thickness in pixels
    #[arg(long = "max-thickness", default_value = "3")]
    max_thickness: u32,

    /// Segments per density bin that mark a decorative band
    #[arg(long = "density-threshold", default_value = "10")]
    density_threshold: usize,

    /// Pixels of padding around each text-derived region
    #[arg(long, default_value = "15")]
    padding: u32,

    /// Skip the whole-page pass
    #[arg(long = "no-supplemental", action = ArgAction::SetTrue)]
    no_supplemental: bool,

    /// Report blank runs from the text alone, without reading images
    #[arg(long = "text-only", action = ArgAction::SetTrue)]
    text_only: bool,

    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

/// Parse "WIDTH,HEIGHT".
fn parse_page_size(s: &str) -> std::result::Result<(f64, f64), String> {
    let (w, h) = s
        .split_once(',')
        .ok_or_else(|| format!("expected WIDTH,HEIGHT, got {s}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid number: {v}"))
            .and_then(|n| {
                if n > 0.0 {
                    Ok(n)
                } else {
                    Err(format!("page size must be positive, got {n}"))
                }
            })
    };
    Ok((parse(w)?, parse(h)?))
}

#[derive(Deserialize)]
struct TextElementJson {
    text: String,
    bounds: [f64; 4],
    page: usize,
    #[serde(default)]
    font: Option<String>,
}

impl From<TextElementJson> for TextElement {
    fn from(e: TextElementJson) -> Self {
        let element = TextElement::new(e.text, e.bounds, e.page);
        match e.font {
            Some(font) => element.with_font(font),
            None => element,
        }
    }
}

#[derive(Serialize)]
struct AreaJson<'a> {
    page: usize,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    field_kind: &'static str,
    source: &'static str,
    context: &'a str,
}

impl<'a> From<&'a DetectedArea> for AreaJson<'a> {
    fn from(a: &'a DetectedArea) -> Self {
        Self {
            page: a.page,
            x: a.x(),
            y: a.y(),
            width: a.width(),
            height: a.height(),
            field_kind: a.field_kind.as_str(),
            source: a.source.as_str(),
            context: &a.context,
        }
    }
}

#[derive(Serialize)]
struct PageStatsJson {
    page: usize,
    regions_of_interest: usize,
    regions_scanned: usize,
    skipped_regions: usize,
    targeted_segments: usize,
    supplemental_segments: usize,
    supplemental_overlaps: usize,
    text_hits: usize,
}

impl From<&PageStats> for PageStatsJson {
    fn from(s: &PageStats) -> Self {
        Self {
            page: s.page,
            regions_of_interest: s.regions_of_interest,
            regions_scanned: s.regions_scanned,
            skipped_regions: s.skipped_regions,
            targeted_segments: s.targeted_segments,
            supplemental_segments: s.supplemental_segments,
            supplemental_overlaps: s.supplemental_overlaps,
            text_hits: s.text_hits,
        }
    }
}

#[derive(Serialize)]
struct OutputJson<'a> {
    areas: Vec<AreaJson<'a>>,
    pages: Vec<PageStatsJson>,
    skipped_elements: usize,
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn build_params(args: &Args) -> DetectParams {
    let mut params = DetectParams {
        roi_padding: args.padding,
        supplemental_pass: !args.no_supplemental,
        ..DetectParams::default()
    };
    for (pass, min_length) in [
        (&mut params.targeted, args.min_length_targeted),
        (&mut params.supplemental, args.min_length_supplemental),
    ] {
        pass.binarization_threshold = args.threshold;
        pass.min_length = min_length;
        pass.max_thickness = args.max_thickness;
        pass.density.threshold = args.density_threshold;
    }
    params
}

fn load_elements(path: Option<&Path>) -> Result<Vec<TextElement>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let raw: Vec<TextElementJson> = serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("parsing text elements from {}", path.display()))?;
    Ok(raw.into_iter().map(TextElement::from).collect())
}

struct LoadedPage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

fn load_page(path: &Path) -> Result<LoadedPage> {
    let gray = image::open(path)
        .with_context(|| format!("reading image {}", path.display()))?
        .to_luma8();
    let (width, height) = gray.dimensions();
    Ok(LoadedPage {
        width,
        height,
        data: gray.into_raw(),
    })
}

fn write_output(out: &mut dyn Write, detection: &DocumentDetection) -> Result<()> {
    let json = OutputJson {
        areas: detection.areas.iter().map(AreaJson::from).collect(),
        pages: detection.pages.iter().map(PageStatsJson::from).collect(),
        skipped_elements: detection.skipped_elements,
    };
    serde_json::to_writer_pretty(&mut *out, &json)?;
    writeln!(out)?;
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let params = build_params(args);
    let elements = load_elements(args.text.as_deref())?;

    let detection = if args.text_only {
        DocumentDetection {
            areas: extract_text_hits(&elements, &params),
            ..DocumentDetection::default()
        }
    } else {
        if args.images.is_empty() {
            bail!("no page images given (use --text-only to work from text alone)");
        }
        let pages = args
            .images
            .iter()
            .map(|p| load_page(p))
            .collect::<Result<Vec<_>>>()?;
        let rasters = pages
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let geometry = match args.page_size {
                    Some((w, h)) => PageGeometry::new(w, h),
                    None => PageGeometry::from_dpi(p.width, p.height, args.dpi),
                };
                PageRaster::new(i, &p.data, p.width, p.height, geometry)
            })
            .collect::<fillline_core::Result<Vec<_>>>()?;
        detect_document(&rasters, &elements, &params)?
    };
    info!(areas = detection.areas.len(), "detection finished");

    if args.outfile == "-" {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        write_output(&mut out, &detection)?;
        out.flush()?;
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("creating {}", args.outfile))?;
        let mut out = BufWriter::new(file);
        write_output(&mut out, &detection)?;
        out.flush()?;
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_tracing(args.debug);
    if let Err(e) = run(&args) {
        eprintln!("fillline: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_parses() {
        assert_eq!(parse_page_size("612,792"), Ok((612.0, 792.0)));
        assert_eq!(parse_page_size(" 595.5 , 842 "), Ok((595.5, 842.0)));
        assert!(parse_page_size("612").is_err());
        assert!(parse_page_size("0,792").is_err());
    }

    #[test]
    fn flags_reach_both_passes() {
        let args = Args::parse_from([
            "fillline",
            "--threshold",
            "90",
            "--max-thickness",
            "5",
            "--min-length-supplemental",
            "60",
            "--no-supplemental",
            "page.png",
        ]);
        let params = build_params(&args);
        assert_eq!(params.targeted.binarization_threshold, 90);
        assert_eq!(params.supplemental.binarization_threshold, 90);
        assert_eq!(params.supplemental.max_thickness, 5);
        assert_eq!(params.supplemental.min_length, 60);
        assert_eq!(params.targeted.min_length, 15);
        assert!(!params.supplemental_pass);
    }

    #[test]
    fn text_elements_deserialize() {
        let json = r#"[{"text": "Name: ____", "bounds": [10, 20, 110, 32],
                        "page": 1, "font": "Helvetica"}]"#;
        let raw: Vec<TextElementJson> = serde_json::from_str(json).unwrap();
        let elements: Vec<TextElement> = raw.into_iter().map(TextElement::from).collect();
        assert_eq!(elements[0].page, 1);
        assert_eq!(elements[0].bounds.x2, 110.0);
        assert_eq!(elements[0].font.as_deref(), Some("Helvetica"));
    }

    #[test]
    fn output_is_json() {
        let elements = vec![TextElement::new("Date: ______", [0.0, 0.0, 120.0, 10.0], 0)];
        let detection = DocumentDetection {
            areas: extract_text_hits(&elements, &DetectParams::default()),
            ..DocumentDetection::default()
        };
        let mut buf = Vec::new();
        write_output(&mut buf, &detection).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["areas"][0]["field_kind"], "date");
        assert_eq!(value["areas"][0]["source"], "text");
    }
}
