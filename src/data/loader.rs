use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef};
use arrow::error::ArrowError;
use arrow::util::display::array_value_to_string;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Column, ColumnNames, SalesDataset, SalesRecord};

// ---------------------------------------------------------------------------
// Errors and options
// ---------------------------------------------------------------------------

/// Anything that stops the dataset from loading. All of these are fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed parquet file: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("reading arrow batch: {0}")]
    Arrow(#[from] ArrowError),
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("row {row}: '{value}' is not a valid date")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}, column '{column}': '{value}' is not a valid number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },
}

/// How to interpret the source file.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub columns: ColumnNames,
    /// Field delimiter for delimited text files.
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            delimiter: b',',
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – delimited text with a header row (`.tsv` forces tabs)
/// * `.json`         – `[{ "Tarih": "2024-01-01", "Şehir": ..., ... }, ...]`
/// * `.parquet`      – one column per header; dates may be Date32/Date64,
///                     Timestamp or text
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<SalesDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" | "txt" => load_delimited(path, options, options.delimiter)?,
        "tsv" => load_delimited(path, options, b'\t')?,
        "json" => load_json(path, options)?,
        "parquet" | "pq" => load_parquet(path, options)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };

    log::debug!(
        "parsed {} rows from {} ({} columns)",
        dataset.len(),
        path.display(),
        dataset.headers.len()
    );
    Ok(dataset)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

fn load_delimited(
    path: &Path,
    options: &LoadOptions,
    delimiter: u8,
) -> Result<SalesDataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(open(path)?);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let rows = reader.into_records().map(|result| {
        result
            .map(|record| record.iter().map(str::to_string).collect::<Vec<_>>())
            .map_err(LoadError::from)
    });

    build_dataset(headers, rows, &options.columns)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Tarih": "2024-01-01", "Şehir": "Ankara", "Kategori": "Gıda",
///     "Toplam Satış": 120.5, "Adet": 3 },
///   ...
/// ]
/// ```
///
/// Headers are the union of object keys in first-seen order.
fn load_json(path: &Path, options: &LoadOptions) -> Result<SalesDataset, LoadError> {
    let root: JsonValue = serde_json::from_reader(std::io::BufReader::new(open(path)?))?;

    let records = root.as_array().ok_or_else(|| LoadError::InvalidRow {
        row: 0,
        message: "expected a top-level JSON array".to_string(),
    })?;

    let mut objects = Vec::with_capacity(records.len());
    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| LoadError::InvalidRow {
            row: i + 1,
            message: "not a JSON object".to_string(),
        })?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows: Vec<Result<Vec<String>, LoadError>> = objects
        .iter()
        .map(|obj| {
            Ok(headers
                .iter()
                .map(|h| obj.get(h).map(json_to_text).unwrap_or_default())
                .collect())
        })
        .collect();

    build_dataset(headers, rows, &options.columns)
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file containing sales rows.
///
/// Every cell is rendered through Arrow's display formatter and then parsed
/// like a text cell, so a Date32 column and an ISO string column behave the
/// same. Works with files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path, options: &LoadOptions) -> Result<SalesDataset, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| arrow_cell_text(col, row))
                .collect::<Result<Vec<_>, ArrowError>>()?;
            rows.push(Ok(cells));
        }
    }

    build_dataset(headers, rows, &options.columns)
}

fn arrow_cell_text(col: &ArrayRef, row: usize) -> Result<String, ArrowError> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    array_value_to_string(col.as_ref(), row)
}

// ---------------------------------------------------------------------------
// Shared row parsing
// ---------------------------------------------------------------------------

/// Map header positions to column roles. The first header matching each
/// configured name wins; everything else becomes an extra column.
pub fn resolve_columns(headers: &[String], names: &ColumnNames) -> Result<Vec<Column>, LoadError> {
    let required = [
        (&names.date, Column::Date),
        (&names.city, Column::City),
        (&names.category, Column::Category),
        (&names.total_sale, Column::TotalSale),
        (&names.quantity, Column::Quantity),
    ];

    let mut columns: Vec<Option<Column>> = vec![None; headers.len()];
    for (name, role) in required {
        let idx = headers
            .iter()
            .enumerate()
            .position(|(i, h)| h == name && columns[i].is_none())
            .ok_or_else(|| LoadError::MissingColumn(name.clone()))?;
        columns[idx] = Some(role);
    }

    let mut next_extra = 0;
    Ok(columns
        .into_iter()
        .map(|c| {
            c.unwrap_or_else(|| {
                next_extra += 1;
                Column::Extra(next_extra - 1)
            })
        })
        .collect())
}

fn build_dataset<I>(headers: Vec<String>, rows: I, names: &ColumnNames) -> Result<SalesDataset, LoadError>
where
    I: IntoIterator<Item = Result<Vec<String>, LoadError>>,
{
    let columns = resolve_columns(&headers, names)?;

    let mut records = Vec::new();
    for (i, cells) in rows.into_iter().enumerate() {
        records.push(parse_row(i + 1, &cells?, &columns, names)?);
    }

    Ok(SalesDataset::from_records(headers, columns, records))
}

fn parse_row(
    row: usize,
    cells: &[String],
    columns: &[Column],
    names: &ColumnNames,
) -> Result<SalesRecord, LoadError> {
    let mut date = None;
    let mut city = String::new();
    let mut category = String::new();
    let mut total_sale = 0.0;
    let mut quantity = 0;
    let mut extra = Vec::new();

    for (col, cell) in columns.iter().zip(cells) {
        match col {
            Column::Date => {
                date = Some(parse_date(cell).ok_or_else(|| LoadError::InvalidDate {
                    row,
                    value: cell.clone(),
                })?);
            }
            Column::City => city = cell.clone(),
            Column::Category => category = cell.clone(),
            Column::TotalSale => {
                total_sale = cell.trim().parse::<f64>().map_err(|_| LoadError::InvalidNumber {
                    row,
                    column: names.total_sale.clone(),
                    value: cell.clone(),
                })?;
            }
            Column::Quantity => {
                quantity = parse_quantity(cell).ok_or_else(|| LoadError::InvalidNumber {
                    row,
                    column: names.quantity.clone(),
                    value: cell.clone(),
                })?;
            }
            Column::Extra(_) => extra.push(cell.clone()),
        }
    }

    let date = date.ok_or_else(|| LoadError::InvalidRow {
        row,
        message: format!("expected {} cells, found {}", columns.len(), cells.len()),
    })?;

    Ok(SalesRecord {
        date,
        city,
        category,
        total_sale,
        quantity,
        extra,
    })
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse a calendar date, dropping any time-of-day component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(d);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Integer counts; whole-valued floats such as `2.0` are accepted as long as
/// they fit in an `i64` (an `as` cast would saturate).
fn parse_quantity(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    let f = s.parse::<f64>().ok()?;
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_supported_date_forms() {
        assert_eq!(parse_date("2024-01-02"), Some(d(2024, 1, 2)));
        assert_eq!(parse_date("2024/01/02"), Some(d(2024, 1, 2)));
        assert_eq!(parse_date("02.01.2024"), Some(d(2024, 1, 2)));
        assert_eq!(parse_date("2024-01-02 23:59:59"), Some(d(2024, 1, 2)));
        assert_eq!(parse_date("2024-01-02T08:30"), Some(d(2024, 1, 2)));
        assert_eq!(parse_date("2024-01-02T08:30:00.250"), Some(d(2024, 1, 2)));
        assert_eq!(parse_date("2024-01-02T23:00:00+03:00"), Some(d(2024, 1, 2)));
        assert_eq!(parse_date(" 2024-01-02 "), Some(d(2024, 1, 2)));
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    #[test]
    fn quantity_accepts_whole_floats_only() {
        assert_eq!(parse_quantity("4"), Some(4));
        assert_eq!(parse_quantity("4.0"), Some(4));
        assert_eq!(parse_quantity("4.5"), None);
        assert_eq!(parse_quantity("four"), None);
    }

    #[test]
    fn quantity_rejects_floats_outside_i64() {
        assert_eq!(parse_quantity("1e30"), None);
        assert_eq!(parse_quantity("1e19"), None);
        assert_eq!(parse_quantity("-1e19"), None);
        assert_eq!(parse_quantity("inf"), None);
        assert_eq!(parse_quantity("1e18"), Some(1_000_000_000_000_000_000));
        assert_eq!(parse_quantity(&i64::MAX.to_string()), Some(i64::MAX));
    }

    #[test]
    fn resolves_localized_columns_and_extras() {
        let hs = headers(&["Tarih", "Şehir", "Ürün", "Kategori", "Adet", "Toplam Satış"]);
        let cols = resolve_columns(&hs, &ColumnNames::default()).unwrap();
        assert_eq!(
            cols,
            vec![
                Column::Date,
                Column::City,
                Column::Extra(0),
                Column::Category,
                Column::Quantity,
                Column::TotalSale,
            ]
        );
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let hs = headers(&["Tarih", "Şehir", "Kategori", "Adet"]);
        let err = resolve_columns(&hs, &ColumnNames::default()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(name) if name == "Toplam Satış"));
    }

    #[test]
    fn bad_cells_fail_the_load() {
        let names = ColumnNames::default();
        let hs = headers(&["Tarih", "Şehir", "Kategori", "Toplam Satış", "Adet"]);

        let bad_date = vec![Ok(headers(&["not a date", "Ankara", "Gıda", "1.0", "1"]))];
        let err = build_dataset(hs.clone(), bad_date, &names).unwrap_err();
        assert!(matches!(err, LoadError::InvalidDate { row: 1, .. }));

        let bad_amount = vec![
            Ok(headers(&["2024-01-01", "Ankara", "Gıda", "1.0", "1"])),
            Ok(headers(&["2024-01-01", "Ankara", "Gıda", "abc", "1"])),
        ];
        let err = build_dataset(hs, bad_amount, &names).unwrap_err();
        assert!(matches!(err, LoadError::InvalidNumber { row: 2, .. }));
    }
}
