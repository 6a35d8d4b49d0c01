use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImportError>;

/// Terminal failures of one import attempt. Every stage fails fast; there is
/// no partial success below the row level.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unsupported file type: '{0}'. Please upload a .csv or .xlsx file")]
    UnsupportedFileType(String),

    #[error("Could not decode file: {0}")]
    Decode(String),

    #[error("Could not find a header row. Expected columns like 'Time', 'Price', 'Symbol'")]
    NoHeaderFound,

    #[error("Could not find required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("No valid trade rows could be extracted ({dropped} dropped)")]
    NoValidTrades { dropped: usize },
}
