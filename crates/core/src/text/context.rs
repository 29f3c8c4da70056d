//! Label lookup for raster-only lines.

use ordered_float::OrderedFloat;

use crate::geometry::DocRect;

use super::TextElement;

/// Find the text element most likely labelling a line at `line`.
///
/// Candidates sit on the same page, start left of the line's right end, and
/// have their bottom edge within `reach` document units of the line's row.
/// The closest by horizontal gap plus vertical offset wins.
pub fn nearest_label<'a>(
    elements: &'a [TextElement],
    page: usize,
    line: &DocRect,
    reach: f64,
) -> Option<&'a TextElement> {
    elements
        .iter()
        .filter(|e| e.page == page && !e.text.trim().is_empty())
        .filter(|e| e.bounds.x1 < line.x2)
        .filter_map(|e| {
            let dy = (e.bounds.y1 - line.y1).abs();
            if dy > reach {
                return None;
            }
            let dx = (line.x1 - e.bounds.x2).max(e.bounds.x1 - line.x2).max(0.0);
            Some((e, dx + dy))
        })
        .min_by_key(|&(_, score)| OrderedFloat(score))
        .map(|(e, _)| e)
}

/// Trailing `radius` characters of the label text, trimmed.
pub fn label_context(element: &TextElement, radius: usize) -> String {
    let text = element.text.trim();
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(radius)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(x1: f64, x2: f64, y: f64) -> DocRect {
        DocRect {
            x1,
            y1: y,
            x2,
            y2: y + 14.0,
        }
    }

    #[test]
    fn picks_label_left_of_line() {
        let elements = vec![
            TextElement::new("Date:", [50.0, 400.0, 80.0, 410.0], 0),
            TextElement::new("Signature:", [50.0, 500.0, 110.0, 510.0], 0),
            TextElement::new("Signature:", [50.0, 500.0, 110.0, 510.0], 1),
        ];
        let found = nearest_label(&elements, 0, &line(115.0, 300.0, 501.0), 20.0).unwrap();
        assert_eq!(found.text, "Signature:");
        assert_eq!(found.page, 0);
    }

    #[test]
    fn ignores_text_right_of_line_and_far_rows() {
        let elements = vec![
            TextElement::new("Notes", [400.0, 500.0, 450.0, 510.0], 0),
            TextElement::new("Header", [50.0, 700.0, 150.0, 710.0], 0),
        ];
        assert!(nearest_label(&elements, 0, &line(100.0, 300.0, 500.0), 20.0).is_none());
    }

    #[test]
    fn context_keeps_trailing_characters() {
        let e = TextElement::new("  Please enter the total amount  ", [0.0, 0.0, 10.0, 10.0], 0);
        assert_eq!(label_context(&e, 12), "total amount");
    }
}
