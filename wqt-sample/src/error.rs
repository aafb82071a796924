/// Error types for loading sample and station data
use thiserror::Error;

/// Main error type for data-loading operations
#[derive(Error, Debug)]
pub enum LoadError {
    /// Input file does not exist
    #[error("Input file not found: {0}")]
    FileNotFound(String),

    /// A required column is absent from the input header
    #[error("Required column '{0}' not found in input header")]
    MissingColumn(&'static str),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Failed to open or read the station-name workbook
    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    /// The station-name workbook contains no worksheets
    #[error("Workbook contains no worksheets")]
    EmptyWorkbook,

    /// Date parsing failed
    #[error("Failed to parse date '{value}' on data row {row}")]
    DateParse { row: usize, value: String },

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Results using LoadError
pub type Result<T> = std::result::Result<T, LoadError>;
