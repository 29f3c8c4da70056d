//! Blank-run extraction from text elements.
//!
//! Forms rendered from word processors often carry their blanks as text:
//! underscore runs, long runs of spaces, or a label such as "amount of $"
//! with nothing after it. Each match is located inside its element by
//! assuming every character has the element's average width.

use std::sync::LazyLock;

use regex::Regex;

use crate::geometry::DocRect;

use super::TextElement;
use super::classify::{FieldKind, classify_field};

/// Three or more underscores, allowing up to two spaces between them.
static UNDERSCORE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(?: {0,2}_){2,}").expect("valid underscore pattern"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {8,}").expect("valid whitespace pattern"));

/// A label that ends the element and expects a value after it.
static FILLER_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\bat:|\bamount of \$)\s*$").expect("valid filler pattern")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunKind {
    Underscore,
    Whitespace,
    FillerPhrase,
}

impl RunKind {
    /// Whether the run's own geometry is a usable field without raster
    /// confirmation. A filler phrase only says a blank follows somewhere.
    pub fn is_direct(&self) -> bool {
        !matches!(self, RunKind::FillerPhrase)
    }
}

/// A blank found inside one text element.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub page: usize,
    /// Index of the source element in the input slice.
    pub element: usize,
    pub kind: RunKind,
    /// Character offset of the blank inside the element text.
    pub char_start: usize,
    pub char_len: usize,
    pub char_width: f64,
    /// Estimated blank in document space: spans the blank horizontally and
    /// the element vertically, `y1` being the element's bottom edge.
    pub rect: DocRect,
    pub context: String,
    pub field_kind: FieldKind,
}

/// Options for [`extract_runs`].
#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    pub context_radius: usize,
    pub filler_width_chars: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            context_radius: crate::params::DEFAULT_CONTEXT_RADIUS,
            filler_width_chars: crate::params::DEFAULT_FILLER_WIDTH_CHARS,
        }
    }
}

/// Characters before the blank decide its kind when they hold a label;
/// otherwise the whole window does.
fn kind_for(before: &str, context: &str) -> FieldKind {
    if before.chars().any(char::is_alphanumeric) {
        classify_field(before)
    } else {
        classify_field(context)
    }
}

fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

/// Scan every element for blank runs.
pub fn extract_runs(elements: &[TextElement], options: RunOptions) -> Vec<TextRun> {
    let mut runs = Vec::new();
    for (index, element) in elements.iter().enumerate() {
        let Some(char_width) = element.char_width() else {
            continue;
        };
        if char_width <= 0.0 {
            continue;
        }
        let chars: Vec<char> = element.text.chars().collect();
        let mut matches: Vec<(RunKind, usize, usize)> = Vec::new();

        for m in UNDERSCORE_RUN.find_iter(&element.text) {
            matches.push((
                RunKind::Underscore,
                char_offset(&element.text, m.start()),
                m.as_str().chars().count(),
            ));
        }
        for m in WHITESPACE_RUN.find_iter(&element.text) {
            // Leading spaces are indentation, not a blank.
            if m.start() == 0 {
                continue;
            }
            matches.push((
                RunKind::Whitespace,
                char_offset(&element.text, m.start()),
                m.as_str().chars().count(),
            ));
        }
        if matches.is_empty() && FILLER_PHRASE.is_match(&element.text) {
            matches.push((RunKind::FillerPhrase, chars.len(), options.filler_width_chars));
        }
        matches.sort_by_key(|&(_, start, _)| start);

        for (kind, start, len) in matches {
            let end = (start + len).min(chars.len());
            let lo = start.saturating_sub(options.context_radius);
            let hi = (end + options.context_radius).min(chars.len());
            let before: String = chars[lo..start.min(chars.len())].iter().collect();
            let context: String = chars[lo..hi].iter().collect();

            let x1 = element.bounds.x1 + start as f64 * char_width;
            let rect = DocRect {
                x1,
                y1: element.bounds.y1,
                x2: x1 + len as f64 * char_width,
                y2: element.bounds.y2,
            };
            runs.push(TextRun {
                page: element.page,
                element: index,
                kind,
                char_start: start,
                char_len: len,
                char_width,
                rect,
                field_kind: kind_for(&before, &context),
                context,
            });
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(text: &str) -> TextElement {
        TextElement::new(text, [100.0, 700.0, 300.0, 715.0], 0)
    }

    #[test]
    fn underscore_run_geometry() {
        let runs = extract_runs(&[el("Name: ______")], RunOptions::default());
        assert_eq!(runs.len(), 1);
        let run = &runs[0];
        let cw = 200.0 / 12.0;
        assert_eq!(run.kind, RunKind::Underscore);
        assert_eq!((run.char_start, run.char_len), (6, 6));
        assert!((run.rect.x1 - (100.0 + 6.0 * cw)).abs() < 1e-9);
        assert!((run.rect.width() - 6.0 * cw).abs() < 1e-9);
        assert_eq!(run.rect.y1, 700.0);
        assert_eq!(run.field_kind, FieldKind::Text);
    }

    #[test]
    fn spaced_underscores_are_one_run() {
        let runs = extract_runs(&[el("Initials _ _ _ _ here")], RunOptions::default());
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].char_len, 7);
    }

    #[test]
    fn two_underscores_are_not_a_blank() {
        assert!(extract_runs(&[el("snake__case")], RunOptions::default()).is_empty());
    }

    #[test]
    fn long_whitespace_is_a_blank() {
        let runs = extract_runs(&[el("Phone:          Fax")], RunOptions::default());
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].kind, RunKind::Whitespace);
        assert_eq!(runs[0].char_start, 6);
        assert_eq!(runs[0].char_len, 10);
    }

    #[test]
    fn leading_indentation_is_ignored() {
        assert!(extract_runs(&[el("          Heading")], RunOptions::default()).is_empty());
    }

    #[test]
    fn filler_phrase_extends_past_element() {
        let runs = extract_runs(&[el("for the amount of $")], RunOptions::default());
        assert_eq!(runs.len(), 1);
        let run = &runs[0];
        assert_eq!(run.kind, RunKind::FillerPhrase);
        assert!(!run.kind.is_direct());
        assert!((run.rect.x1 - 300.0).abs() < 1e-9);
        assert_eq!(run.field_kind, FieldKind::Currency);
    }

    #[test]
    fn label_before_blank_decides_kind() {
        let runs = extract_runs(
            &[el("Signature: ________ Date: ________")],
            RunOptions::default(),
        );
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].field_kind, FieldKind::Signature);
        // Context before the second blank still mentions the signature.
        assert_eq!(runs[1].field_kind, FieldKind::Signature);
        let short = RunOptions {
            context_radius: 8,
            ..RunOptions::default()
        };
        let runs = extract_runs(&[el("Signature: ________ Date: ________")], short);
        assert_eq!(runs[1].field_kind, FieldKind::Date);
    }

    #[test]
    fn context_is_windowed() {
        let text = format!("{}Amount: ____{}", "x".repeat(80), "y".repeat(80));
        let opts = RunOptions {
            context_radius: 10,
            ..RunOptions::default()
        };
        let runs = extract_runs(&[el(&text)], opts);
        assert_eq!(runs[0].context, format!("xx{}", "Amount: ____yyyyyyyyyy"));
    }

    #[test]
    fn empty_text_is_skipped() {
        assert!(extract_runs(&[el("")], RunOptions::default()).is_empty());
    }
}
