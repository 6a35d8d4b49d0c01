pub mod assemble;
pub mod columns;
pub mod error;
pub mod grid;
pub mod header;
pub mod normalize;

// Re-export commonly used items
pub use crate::assemble::ImportReport;
pub use crate::columns::ColumnMap;
pub use crate::error::{ImportError, Result};
pub use crate::grid::{Cell, FileKind, RawGrid};

/// Runs the whole import pipeline over one uploaded file.
///
/// The file name only selects the decode path (`.csv` vs `.xlsx`); all
/// further stages work on the decoded grid. This is a pure function from
/// bytes to an import outcome: no file is written and nothing is stored.
pub fn import_file(bytes: &[u8], file_name: &str) -> Result<ImportReport> {
    let kind = FileKind::from_file_name(file_name)
        .ok_or_else(|| ImportError::UnsupportedFileType(file_name.to_string()))?;

    let grid = match kind {
        FileKind::Csv => grid::decode_csv(bytes)?,
        FileKind::Workbook => grid::decode_workbook(bytes)?,
    };

    let header_index = header::find_header_row(&grid).ok_or(ImportError::NoHeaderFound)?;
    let columns = ColumnMap::from_header_row(&grid[header_index])?;

    assemble::extract_trades(&grid, header_index, &columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::Side;

    const MT4_CSV: &str = "\
Account: 1234567,,,,,,,,
,,,,,,,,
Time,Symbol,Type,Volume,Price,S/L,T/P,Time,Price,Commission,Swap,Profit
2023.01.02 10:00:00,EURUSD,buy,0.50,1.0702,1.0650,1.0800,2023.01.02 14:30:00,1.0752,-3.50,-0.12,25.00
2023.01.03 09:15:00,GBPUSD,sell,1.00,1.2050,,,2023.01.03 11:00:00,1.2010,-7.00,0.00,40.00
2023.01.04 08:00:00,XAUUSD,buy,bad,1912.00,,,2023.01.04 09:00:00,1915.00,0.00,0.00,3.00
";

    #[test]
    fn test_unsupported_extension() {
        let err = import_file(b"whatever", "trades.pdf").unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFileType(_)));
    }

    #[test]
    fn test_full_csv_import() {
        let report = import_file(MT4_CSV.as_bytes(), "statement.csv").unwrap();

        assert_eq!(report.total_rows, 3);
        assert_eq!(report.dropped_rows, 1);
        assert_eq!(report.trades.len(), 2);

        let first = &report.trades[0];
        assert_eq!(first.symbol, "EURUSD");
        assert_eq!(first.side, Side::Buy);
        assert_eq!(first.size, 0.5);
        assert_eq!(first.entry, 1.0702);
        assert_eq!(first.exit, 1.0752);
        assert_eq!(first.sl, Some(1.065));
        assert_eq!(first.pl, 25.0);
        assert_eq!(first.commission, -3.5);
        assert_eq!(first.swap, -0.12);
        assert!(first.date_closed > first.date);

        let second = &report.trades[1];
        assert_eq!(second.side, Side::Sell);
        assert_eq!(second.sl, None);
    }

    #[test]
    fn test_reimport_is_deterministic() {
        let a = import_file(MT4_CSV.as_bytes(), "statement.csv").unwrap();
        let b = import_file(MT4_CSV.as_bytes(), "statement.csv").unwrap();

        assert_eq!(a.trades, b.trades);
        assert_eq!(a.dropped_rows, b.dropped_rows);
    }

    #[test]
    fn test_missing_columns_through_pipeline() {
        let csv = "Time,Price,Price,Volume\n2023.01.02 10:00:00,1.0,1.1,0.5\n";
        let err = import_file(csv.as_bytes(), "broken.csv").unwrap_err();

        match err {
            ImportError::MissingColumns(missing) => {
                assert_eq!(missing, vec!["symbol", "side"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_no_header_row() {
        let csv = "just,some,text\n1,2,3\n";
        let err = import_file(csv.as_bytes(), "noise.csv").unwrap_err();
        assert!(matches!(err, ImportError::NoHeaderFound));
    }

    #[test]
    fn test_derived_pl_when_no_profit_column() {
        let csv = "\
Time,Symbol,Type,Volume,Price,Price
2023-01-02 10:00,EURUSD,buy,2,100,110
2023-01-02 11:00,EURUSD,sell,2,100,110
";
        let report = import_file(csv.as_bytes(), "noprofits.csv").unwrap();
        assert_eq!(report.trades[0].pl, 20.0);
        assert_eq!(report.trades[1].pl, -20.0);
    }
}
