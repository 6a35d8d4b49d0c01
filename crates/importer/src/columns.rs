use std::collections::HashMap;

use crate::error::{ImportError, Result};
use crate::grid::Cell;

/// Accepted header aliases per canonical field, checked in order against the
/// normalized labels. Extending broker support means editing this table.
const SYMBOL_ALIASES: &[&str] = &["symbol", "instrument"];
const SIDE_ALIASES: &[&str] = &["type", "side", "buy sell"];
const SIZE_ALIASES: &[&str] = &["volume", "size", "lots"];
const PL_ALIASES: &[&str] = &["pl", "p l", "profit", "net profit"];
const SL_ALIASES: &[&str] = &["s l", "sl"];
const TP_ALIASES: &[&str] = &["t p", "tp"];
const COMMISSION_ALIASES: &[&str] = &["commission"];
const SWAP_ALIASES: &[&str] = &["swap"];

/// Resolved mapping from canonical trade field to source column index.
///
/// MT4/MT5-style reports repeat the `Time` and `Price` labels for the open
/// and close legs of a position, so `date_closed` and `exit` come from the
/// second occurrence of the same label.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    pub date: Option<usize>,
    pub date_closed: Option<usize>,
    pub symbol: Option<usize>,
    pub side: Option<usize>,
    pub size: Option<usize>,
    pub entry: Option<usize>,
    pub exit: Option<usize>,
    pub pl: Option<usize>,
    pub sl: Option<usize>,
    pub tp: Option<usize>,
    pub commission: Option<usize>,
    pub swap: Option<usize>,
}

impl ColumnMap {
    /// Builds the map from the identified header row, or fails with the list
    /// of required canonical fields that could not be resolved.
    pub fn from_header_row(header_row: &[Cell]) -> Result<ColumnMap> {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, cell) in header_row.iter().enumerate() {
            let normalized = normalize_label(&cell.display_text());
            index.entry(normalized).or_default().push(i);
        }

        let nth = |label: &str, n: usize| index.get(label).and_then(|v| v.get(n)).copied();
        let first_of = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| index.get(*alias).and_then(|v| v.first()).copied())
        };

        let map = ColumnMap {
            date: nth("time", 0),
            date_closed: nth("time", 1),
            entry: nth("price", 0),
            exit: nth("price", 1),
            symbol: first_of(SYMBOL_ALIASES),
            side: first_of(SIDE_ALIASES),
            size: first_of(SIZE_ALIASES),
            pl: first_of(PL_ALIASES),
            sl: first_of(SL_ALIASES),
            tp: first_of(TP_ALIASES),
            commission: first_of(COMMISSION_ALIASES),
            swap: first_of(SWAP_ALIASES),
        };

        let mut missing: Vec<String> = Vec::new();
        for (name, idx) in [
            ("date", map.date),
            ("symbol", map.symbol),
            ("side", map.side),
            ("size", map.size),
            ("entry", map.entry),
            ("exit", map.exit),
        ] {
            if idx.is_none() {
                missing.push(name.to_string());
            }
        }

        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        Ok(map)
    }
}

/// Lower-cases a header label and collapses every non-alphanumeric run into
/// a single space, so "S/L", "s_l" and " S  L " all normalize to "s l".
fn normalize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut pending_space = false;

    for c in label.chars() {
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            for lower in c.to_lowercase() {
                out.push(lower);
            }
        } else {
            pending_space = true;
        }
    }

    out
}
