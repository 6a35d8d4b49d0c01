use crate::grid::RawGrid;

/// Labels that mark a row as the column-header row of a trade-history
/// export. Matching is substring-based on the lower-cased cell text, so
/// "Open Time" and "close price" both count.
const HEADER_KEYWORDS: &[&str] = &[
    "time",
    "price",
    "type",
    "volume",
    "profit",
    "symbol",
    "s/l",
    "t/p",
    "commission",
    "swap",
    "p/l",
];

/// How many leading rows are scanned. Broker exports put account banners and
/// report metadata above the table, but never this many lines of it.
const MAX_HEADER_SCAN_ROWS: usize = 10;

/// Finds the row index with the highest keyword-match count among the first
/// rows of the grid. Ties keep the earliest row; a grid where no row matches
/// anything yields `None`.
pub fn find_header_row(grid: &RawGrid) -> Option<usize> {
    let mut best_index: Option<usize> = None;
    let mut max_matches = 0usize;

    for (i, row) in grid.iter().take(MAX_HEADER_SCAN_ROWS).enumerate() {
        let matches = row
            .iter()
            .filter(|cell| {
                let text = cell.display_text().to_lowercase();
                HEADER_KEYWORDS.iter().any(|kw| text.contains(kw))
            })
            .count();

        if matches > max_matches {
            max_matches = matches;
            best_index = Some(i);
        }
    }

    best_index
}
