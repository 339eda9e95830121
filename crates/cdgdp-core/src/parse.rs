//! Lenient field parsing shared by the CSV sources.

/// Parses a numeric field as formatted in statistical tables.
///
/// Accepts thousands separators, a leading currency symbol, surrounding quotes and
/// whitespace, and accounting negatives such as `(1,234.5)`. Returns `None` for blank,
/// unparseable or non-finite input.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut text = raw.trim().trim_matches('"').trim();
    let mut negative = false;
    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        negative = true;
        text = inner.trim();
    }

    let cleaned: String =
        text.chars().filter(|c| !matches!(c, ',' | '$' | ' ' | '\u{a0}')).collect();
    if cleaned.is_empty() {
        return None;
    }

    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Decodes ISO-8859-1 bytes. Every byte maps to the code point of the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Strips a leading UTF-8 byte order mark.
pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}
