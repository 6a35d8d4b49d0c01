use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use csv::ReaderBuilder;

use crate::error::{ImportError, Result};

/// One cell of a decoded spreadsheet or CSV file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Text rendition used for header scanning. Empty cells render as "".
    pub fn display_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

/// Uniform 2-D grid of cells, row-major, as found in the source file.
pub type RawGrid = Vec<Vec<Cell>>;

/// Decode path selected from the uploaded file's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Workbook,
}

impl FileKind {
    pub fn from_file_name(name: &str) -> Option<FileKind> {
        let low = name.to_lowercase();
        if low.ends_with(".csv") {
            Some(FileKind::Csv)
        } else if low.ends_with(".xlsx") {
            Some(FileKind::Workbook)
        } else {
            None
        }
    }
}

/// Splits CSV bytes into a grid. Cells that look numeric become numbers;
/// fully empty records are skipped so they never appear as rows.
pub fn decode_csv(bytes: &[u8]) -> Result<RawGrid> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid: RawGrid = Vec::new();

    for rec in rdr.records() {
        let rec = rec.map_err(|e| ImportError::Decode(e.to_string()))?;

        if rec.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let row = rec.iter().map(typed_cell).collect::<Vec<_>>();
        grid.push(row);
    }

    Ok(grid)
}

fn typed_cell(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(n) => Cell::Number(n),
        Err(_) => Cell::Text(field.to_string()),
    }
}

/// Loads the first sheet of an XLSX workbook. Empty cells stay in place as
/// `Cell::Empty` so column positions line up across rows.
pub fn decode_workbook(bytes: &[u8]) -> Result<RawGrid> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| ImportError::Decode(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::Decode("workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::Decode(e.to_string()))?;

    let mut grid: RawGrid = Vec::new();
    for row in range.rows() {
        grid.push(row.iter().map(workbook_cell).collect());
    }

    Ok(grid)
}

fn workbook_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        // Date cells carry the raw serial value; the normalizer decodes it
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}
