#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workbook has no worksheets")]
    NoWorksheet,

    #[error("Column '{column}' not found (columns missing in the uploaded file: {missing:?})")]
    MissingColumn {
        column: String,
        missing: Vec<String>,
    },

    #[error("Row {row}: cannot parse date '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("Row {row}: invalid {column} value '{value}'")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("{column} total exceeds {max}")]
    TotalOverflow { column: String, max: u64 },

    #[error("File contains no data rows")]
    EmptyTable,
}

pub type Result<T> = std::result::Result<T, ReportError>;
