use models::{Side, Trade};

use crate::columns::ColumnMap;
use crate::error::{ImportError, Result};
use crate::grid::{Cell, RawGrid};
use crate::normalize::{clean_number, parse_datetime};

/// Outcome of a successful import: the ordered trades plus row accounting.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub trades: Vec<Trade>,
    pub total_rows: usize,
    pub dropped_rows: usize,
}

/// Walks every row after the header, assembling one trade per row. Rows that
/// fail validation are dropped quietly and counted; only a batch with zero
/// survivors escalates to an error.
pub fn extract_trades(
    grid: &RawGrid,
    header_index: usize,
    columns: &ColumnMap,
) -> Result<ImportReport> {
    let mut trades = Vec::new();
    let mut total_rows = 0usize;
    let mut dropped_rows = 0usize;

    for row in grid.iter().skip(header_index + 1) {
        total_rows += 1;
        match assemble_row(row, columns) {
            Some(trade) => trades.push(trade),
            None => dropped_rows += 1,
        }
    }

    if trades.is_empty() {
        return Err(ImportError::NoValidTrades {
            dropped: dropped_rows,
        });
    }

    Ok(ImportReport {
        trades,
        total_rows,
        dropped_rows,
    })
}

fn assemble_row(row: &[Cell], columns: &ColumnMap) -> Option<Trade> {
    let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i));
    let number = |idx: Option<usize>| cell(idx).map(clean_number).unwrap_or(f64::NAN);

    let date = parse_datetime(cell(columns.date)?)?;

    let symbol = cell(columns.symbol)
        .map(|c| c.display_text().trim().to_string())
        .filter(|s| !s.is_empty())?;

    let side = Side::infer(
        &cell(columns.side)
            .map(|c| c.display_text())
            .unwrap_or_default(),
    );

    let size = number(columns.size);
    let entry = number(columns.entry);
    let exit = number(columns.exit);

    // A mapped P/L column wins; otherwise derive from the price legs
    let pl = match cell(columns.pl) {
        Some(c) => clean_number(c),
        None => match side {
            Side::Buy => (exit - entry) * size,
            Side::Sell => (entry - exit) * size,
        },
    };

    if !(size.is_finite() && entry.is_finite() && exit.is_finite() && pl.is_finite()) {
        return None;
    }

    let date_closed = cell(columns.date_closed)
        .and_then(parse_datetime)
        .unwrap_or(date);

    Some(Trade {
        date,
        date_closed,
        symbol,
        side,
        size,
        entry,
        exit,
        sl: optional_number(cell(columns.sl)),
        pl,
        commission: optional_number(cell(columns.commission)).unwrap_or(0.0),
        swap: optional_number(cell(columns.swap)).unwrap_or(0.0),
    })
}

/// Empty or unparseable optional cells resolve to `None` rather than NaN, so
/// emitted trades never carry NaN in any numeric field.
fn optional_number(cell: Option<&Cell>) -> Option<f64> {
    let c = cell?;
    if c.is_empty() {
        return None;
    }
    let v = clean_number(c);
    v.is_finite().then_some(v)
}
