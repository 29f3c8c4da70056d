/// Semantic kind of a fill-in field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Signature,
    Currency,
    Date,
    Text,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Signature => "signature",
            FieldKind::Currency => "currency",
            FieldKind::Date => "date",
            FieldKind::Text => "text",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const SIGNATURE_KEYWORDS: &[&str] = &["signature", "sign here", "signed"];
const CURRENCY_KEYWORDS: &[&str] = &["$", "amount", "sum", "price"];
const DATE_KEYWORDS: &[&str] = &["date"];

/// Classify a context string. Rules are checked in order, first match wins:
/// signature, currency, date, then plain text.
pub fn classify_field(context: &str) -> FieldKind {
    let lower = context.to_lowercase();
    let has = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));
    if has(SIGNATURE_KEYWORDS) {
        FieldKind::Signature
    } else if has(CURRENCY_KEYWORDS) {
        FieldKind::Currency
    } else if has(DATE_KEYWORDS) {
        FieldKind::Date
    } else {
        FieldKind::Text
    }
}
