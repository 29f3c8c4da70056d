//! Text-derived signals: blank runs inside extracted text and field-kind
//! classification of the text around them.

mod classify;
mod context;
mod runs;

pub use classify::{FieldKind, classify_field};
pub use context::{label_context, nearest_label};
pub use runs::{RunKind, RunOptions, TextRun, extract_runs};

use crate::geometry::DocRect;

/// A run of extracted text with its document-space bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct TextElement {
    pub text: String,
    pub bounds: DocRect,
    /// Zero-based page index.
    pub page: usize,
    pub font: Option<String>,
}

impl TextElement {
    pub fn new(text: impl Into<String>, bounds: [f64; 4], page: usize) -> Self {
        let [x1, y1, x2, y2] = bounds;
        Self {
            text: text.into(),
            bounds: DocRect::from_corners((x1, y1), (x2, y2)),
            page,
            font: None,
        }
    }

    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Some(font.into());
        self
    }

    /// Average advance of one character across the element.
    pub fn char_width(&self) -> Option<f64> {
        let count = self.text.chars().count();
        (count > 0).then(|| self.bounds.width() / count as f64)
    }
}
