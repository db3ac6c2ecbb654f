use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use num_bigint::BigInt;

use crate::error::DecodeError;
use crate::schema::PrimitiveKind;
use crate::submission::Entry;
use crate::value::FormValue;

// Naive layouts are read as UTC.
const NAIVE_DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Text of an entry, or the fatal error for a file payload.
pub fn require_text<'e>(entry: &'e Entry, path: &str) -> Result<&'e str, DecodeError> {
    match entry {
        Entry::Text(text) => Ok(text),
        Entry::File(file) => {
            tracing::warn!(path, filename = %file.filename, "file payload where text was expected");
            Err(DecodeError::UnsupportedValue {
                path: path.to_string(),
                filename: file.filename.clone(),
            })
        }
    }
}

/// Decode a single leaf entry (absent if `None`).
pub fn leaf(kind: PrimitiveKind, entry: Option<&Entry>, path: &str) -> Result<FormValue, DecodeError> {
    let raw = entry.map(|entry| require_text(entry, path)).transpose()?;
    tracing::trace!(path, kind = kind.name(), present = raw.is_some(), "leaf");
    Ok(primitive(kind, raw))
}

/// Raw text for a field whose schema kind is not understood; validation
/// reports it.
pub fn passthrough(entry: Option<&Entry>, path: &str) -> Result<FormValue, DecodeError> {
    Ok(match entry {
        Some(entry) => FormValue::String(require_text(entry, path)?.to_string()),
        None => FormValue::Undefined,
    })
}

pub fn primitive(kind: PrimitiveKind, raw: Option<&str>) -> FormValue {
    match (kind, raw) {
        (PrimitiveKind::String, Some(text)) => FormValue::String(text.to_string()),
        (PrimitiveKind::String, None) => FormValue::Undefined,
        (PrimitiveKind::Number, raw) => FormValue::Number(raw.map_or(f64::NAN, parse_number)),
        (PrimitiveKind::Boolean, raw) => FormValue::Bool(raw == Some("true")),
        (PrimitiveKind::Date, raw) => FormValue::Date(raw.and_then(parse_date)),
        (PrimitiveKind::BigInt, Some(text)) => match parse_bigint(text) {
            Some(big) => FormValue::BigInt(big),
            None => FormValue::String(text.to_string()),
        },
        (PrimitiveKind::BigInt, None) => FormValue::Undefined,
        (PrimitiveKind::Undefined, None | Some("") | Some("undefined")) => FormValue::Undefined,
        (PrimitiveKind::Null, None | Some("")) => FormValue::Null,
        (PrimitiveKind::Undefined | PrimitiveKind::Null, Some(text)) => {
            FormValue::String(text.to_string())
        }
    }
}

/// Numeric literal as typed into a form field. Empty text is zero;
/// anything unparseable is NaN.
pub fn parse_number(raw: &str) -> f64 {
    let text = raw.trim();
    if text.is_empty() {
        return 0.0;
    }
    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some((radix, digits)) = split_radix(text) {
        if digits.is_empty() {
            return f64::NAN;
        }
        return digits
            .chars()
            .try_fold(0f64, |acc, c| c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d)))
            .unwrap_or(f64::NAN);
    }
    // keeps out "inf", "nan" and friends that `f64::from_str` would accept
    let decimal = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !decimal {
        return f64::NAN;
    }
    text.parse::<f64>().unwrap_or(f64::NAN)
}

pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let text = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn parse_bigint(raw: &str) -> Option<BigInt> {
    let text = raw.trim();
    if text.is_empty() {
        return Some(BigInt::from(0u8));
    }
    if text.contains('_') {
        return None;
    }
    match split_radix(text) {
        Some((radix, digits)) => BigInt::parse_bytes(digits.as_bytes(), radix),
        None => text.parse::<BigInt>().ok(),
    }
}

fn split_radix(text: &str) -> Option<(u32, &str)> {
    let radix = match text.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some((radix, &text[2..]))
}
