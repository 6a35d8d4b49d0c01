use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

use crate::grid::Cell;

/// Explicit date/time patterns accepted in broker exports, most specific
/// first. The first successful parse wins.
const DATETIME_FORMATS: &[&str] = &[
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.3fZ",
    "%Y-%m-%dT%H:%M:%S",
];

/// Day-precision patterns tried by the flexible fallback.
const FALLBACK_DATE_FORMATS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%m/%d/%Y", "%d.%m.%Y"];

/// Spreadsheet serial dates count days from this base.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Largest instant offset a serial value may encode, in milliseconds.
const MAX_SERIAL_OFFSET_MS: f64 = 8.64e15;

/// Strips everything that is not a digit, `.` or `-` and parses the rest.
/// Handles currency symbols and thousands separators ("$1,234.50" → 1234.5).
/// Unparseable values yield NaN, which the row gate later rejects.
pub fn clean_number(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse::<f64>().unwrap_or(f64::NAN)
        }
        Cell::Empty => f64::NAN,
    }
}

/// Converts a raw date cell into an instant.
///
/// Numeric cells are spreadsheet serial day counts (fraction = time of day).
/// Text cells run through the explicit format list, then a flexible
/// fallback. Cells that match nothing yield `None`.
pub fn parse_datetime(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::Number(n) => serial_to_datetime(*n),
        Cell::Text(s) => parse_datetime_str(s),
        Cell::Empty => None,
    }
}

/// Serial day count → instant, base 1899-12-30T00:00:00.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let offset_ms = serial * 86_400_000.0;
    if offset_ms.abs() > MAX_SERIAL_OFFSET_MS {
        return None;
    }

    let (y, m, d) = SERIAL_EPOCH;
    let base = NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0)?;
    base.checked_add_signed(Duration::milliseconds(offset_ms.round() as i64))
}

pub fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }

    // Flexible fallback for anything the explicit list missed, e.g. full
    // RFC 3339 strings with an offset, or long-form dates
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in FALLBACK_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}
