use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// ColumnNames – header strings of the five required columns
// ---------------------------------------------------------------------------

/// Header names the loader looks for. Defaults match the localized headers
/// of the supermarket sales file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub date: String,
    pub city: String,
    pub category: String,
    pub total_sale: String,
    pub quantity: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: "Tarih".to_string(),
            city: "Şehir".to_string(),
            category: "Kategori".to_string(),
            total_sale: "Toplam Satış".to_string(),
            quantity: "Adet".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – what a header position holds
// ---------------------------------------------------------------------------

/// Role of one column of the source file, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    City,
    Category,
    TotalSale,
    Quantity,
    /// Any other column; the payload indexes into [`SalesRecord::extra`].
    Extra(usize),
}

// ---------------------------------------------------------------------------
// SalesRecord – one row of the source file
// ---------------------------------------------------------------------------

/// A single sale (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub city: String,
    pub category: String,
    pub total_sale: f64,
    pub quantity: i64,
    /// Untyped columns the dashboard does not interpret, in file order.
    pub extra: Vec<String>,
}

impl SalesRecord {
    pub fn new(
        date: NaiveDate,
        city: impl Into<String>,
        category: impl Into<String>,
        total_sale: f64,
        quantity: i64,
    ) -> Self {
        Self {
            date,
            city: city.into(),
            category: category.into(),
            total_sale,
            quantity,
            extra: Vec::new(),
        }
    }

    /// Text form of one cell, as written by the exporters.
    ///
    /// Amounts use the shortest representation that parses back to the same
    /// `f64`, so re-reading an export reproduces the sums bit for bit.
    pub fn cell(&self, column: Column) -> String {
        match column {
            Column::Date => self.date.format("%Y-%m-%d").to_string(),
            Column::City => self.city.clone(),
            Column::Category => self.category.clone(),
            Column::TotalSale => format!("{:?}", self.total_sale),
            Column::Quantity => self.quantity.to_string(),
            Column::Extra(i) => self.extra.get(i).cloned().unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed distinct values.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    /// Header row exactly as it appeared in the source.
    pub headers: Vec<String>,
    /// Role of each header position; same length as `headers`.
    pub columns: Vec<Column>,
    /// All sales (rows), in file order.
    pub records: Vec<SalesRecord>,
    /// Sorted distinct cities.
    pub cities: BTreeSet<String>,
    /// Sorted distinct categories.
    pub categories: BTreeSet<String>,
    /// Earliest and latest date; `None` for an empty dataset.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl SalesDataset {
    /// Build the distinct-value indices from the loaded records.
    pub fn from_records(
        headers: Vec<String>,
        columns: Vec<Column>,
        records: Vec<SalesRecord>,
    ) -> Self {
        let mut cities = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut date_bounds: Option<(NaiveDate, NaiveDate)> = None;

        for rec in &records {
            cities.insert(rec.city.clone());
            categories.insert(rec.category.clone());
            date_bounds = Some(match date_bounds {
                None => (rec.date, rec.date),
                Some((lo, hi)) => (lo.min(rec.date), hi.max(rec.date)),
            });
        }

        SalesDataset {
            headers,
            columns,
            records,
            cities,
            categories,
            date_bounds,
        }
    }

    /// Dataset with just the five typed columns, in the order
    /// date, city, category, total sale, quantity.
    pub fn with_names(names: &ColumnNames, records: Vec<SalesRecord>) -> Self {
        let headers = vec![
            names.date.clone(),
            names.city.clone(),
            names.category.clone(),
            names.total_sale.clone(),
            names.quantity.clone(),
        ];
        let columns = vec![
            Column::Date,
            Column::City,
            Column::Category,
            Column::TotalSale,
            Column::Quantity,
        ];
        Self::from_records(headers, columns, records)
    }

    /// Header text for a typed column, if present.
    pub fn header_for(&self, column: Column) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| *c == column)
            .map(|i| self.headers[i].as_str())
    }

    /// Number of sales.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
