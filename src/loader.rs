use crate::error::{ReportError, Result};
use crate::types::{
    PreviewRow, RawRow, Record, COL_CAMPAIGN, COL_CHANNEL, COL_CREATIVE, COL_DATE, COL_ORDERS,
    COL_REVENUE, COL_SPEND, EXPECTED_COLUMNS,
};
use crate::util::{parse_count_safe, parse_date_safe, parse_f64_safe};
use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Cursor;
use tracing::{debug, warn};

const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Spreadsheet,
}

impl UploadFormat {
    /// `.csv` goes through the delimited reader, anything else is a workbook.
    pub fn from_file_name(name: &str) -> Self {
        if name.trim().to_ascii_lowercase().ends_with(".csv") {
            UploadFormat::Csv
        } else {
            UploadFormat::Spreadsheet
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub missing_columns: Vec<String>,
    pub zero_spend_rows: usize,
    pub zero_order_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnCheck {
    pub missing: Vec<String>,
}

impl ColumnCheck {
    pub fn is_missing(&self, column: &str) -> bool {
        self.missing.iter().any(|c| c == column)
    }
}

/// Header row plus data rows, whatever the file format.
struct RawTable {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

/// Parse an uploaded file into typed records.
///
/// Missing columns are reported, not rejected; a row that needs one of
/// them fails with `MissingColumn`. Bad dates and numbers abort the load.
pub fn load_upload(file_name: &str, bytes: &[u8]) -> Result<(Vec<Record>, LoadReport)> {
    let format = UploadFormat::from_file_name(file_name);
    let table = match format {
        UploadFormat::Csv => read_csv(bytes)?,
        UploadFormat::Spreadsheet => read_spreadsheet(bytes)?,
    };
    debug!(
        file = file_name,
        ?format,
        rows = table.rows.len(),
        "read upload"
    );

    let check = check_columns(&table.headers);
    if !check.missing.is_empty() {
        warn!(missing = ?check.missing, "columns missing in the uploaded file");
    }
    if table.rows.is_empty() {
        return Err(ReportError::EmptyTable);
    }

    // Every group sum is bounded by the file total, so one check here keeps
    // aggregation free of overflow.
    let mut total_orders: u64 = 0;
    let mut records = Vec::with_capacity(table.rows.len());
    for (idx, row) in table.rows.iter().enumerate() {
        let raw: RawRow = row.deserialize(Some(&table.headers))?;
        let record = decode_row(idx + 2, raw, &check)?;
        total_orders = total_orders.checked_add(record.orders).ok_or_else(|| {
            ReportError::TotalOverflow {
                column: COL_ORDERS.to_string(),
                max: u64::MAX,
            }
        })?;
        records.push(record);
    }

    let report = LoadReport {
        total_rows: records.len(),
        missing_columns: check.missing,
        zero_spend_rows: records.iter().filter(|r| r.spend == 0.0).count(),
        zero_order_rows: records.iter().filter(|r| r.orders == 0).count(),
    };
    debug!(
        zero_spend = report.zero_spend_rows,
        zero_orders = report.zero_order_rows,
        "normalized records"
    );
    Ok((records, report))
}

pub fn check_columns(headers: &StringRecord) -> ColumnCheck {
    let missing = EXPECTED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    ColumnCheck { missing }
}

/// The first `n` records, formatted for display.
pub fn preview(records: &[Record], n: usize) -> Vec<PreviewRow> {
    records.iter().take(n).map(PreviewRow::from).collect()
}

fn read_csv(bytes: &[u8]) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(bytes);
    let headers = rdr.headers()?.clone();
    let mut rows = Vec::new();
    for result in rdr.records() {
        rows.push(result?);
    }
    Ok(RawTable { headers, rows })
}

fn read_spreadsheet(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ReportError::NoWorksheet)??;

    let mut cells = range.rows();
    let headers = match cells.next() {
        Some(header) => header.iter().map(cell_text).collect::<StringRecord>(),
        None => return Err(ReportError::EmptyTable),
    };
    let rows = cells
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| row.iter().map(cell_text).collect::<StringRecord>())
        .collect();
    Ok(RawTable { headers, rows })
}

/// Spreadsheet cell as the text a CSV export of the same sheet would carry.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::DateTime(_) => cell
            .as_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        Data::DateTimeIso(s) => s.split('T').next().unwrap_or(s).to_string(),
        other => other.to_string(),
    }
}

fn decode_row(row: usize, raw: RawRow, check: &ColumnCheck) -> Result<Record> {
    let date_text = required(raw.date, COL_DATE, check)?;
    let date = parse_date_safe(Some(&date_text)).ok_or_else(|| ReportError::InvalidDate {
        row,
        value: date_text.clone(),
    })?;

    let channel = label(required(raw.channel, COL_CHANNEL, check)?);
    let campaign = label(required(raw.campaign, COL_CAMPAIGN, check)?);
    let creative = label(required(raw.creative, COL_CREATIVE, check)?);

    let spend_text = required(raw.spend, COL_SPEND, check)?;
    let spend = parse_f64_safe(Some(&spend_text))
        .ok_or_else(|| invalid_number(row, COL_SPEND, spend_text))?;
    let revenue_text = required(raw.revenue, COL_REVENUE, check)?;
    let revenue = parse_f64_safe(Some(&revenue_text))
        .ok_or_else(|| invalid_number(row, COL_REVENUE, revenue_text))?;
    let orders_text = required(raw.orders, COL_ORDERS, check)?;
    let orders = parse_count_safe(Some(&orders_text))
        .ok_or_else(|| invalid_number(row, COL_ORDERS, orders_text))?;

    Ok(Record::new(
        date, channel, campaign, creative, spend, revenue, orders,
    ))
}

/// An absent value is fatal only when its whole column is absent; a blank
/// cell in a present column decodes as empty text.
fn required(value: Option<String>, column: &str, check: &ColumnCheck) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None if check.is_missing(column) => Err(ReportError::MissingColumn {
            column: column.to_string(),
            missing: check.missing.clone(),
        }),
        None => Ok(String::new()),
    }
}

fn label(value: String) -> String {
    let value = value.trim();
    if value.is_empty() {
        UNKNOWN_LABEL.to_string()
    } else {
        value.to_string()
    }
}

fn invalid_number(row: usize, column: &str, value: String) -> ReportError {
    ReportError::InvalidNumber {
        row,
        column: column.to_string(),
        value,
    }
}
