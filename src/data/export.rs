use std::fmt::Write as _;

use thiserror::Error;

use super::model::{SalesDataset, SalesRecord};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("writing CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("flushing CSV output: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Download formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Html,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Html];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Html => "text/html",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Html => "HTML",
        }
    }

    /// `<stem>.<extension>`
    pub fn file_name(self, stem: &str) -> String {
        format!("{stem}.{}", self.extension())
    }

    /// Serialize the given rows in this format.
    pub fn render<'a, I>(self, dataset: &SalesDataset, rows: I) -> Result<Vec<u8>, ExportError>
    where
        I: IntoIterator<Item = &'a SalesRecord>,
    {
        match self {
            ExportFormat::Csv => to_csv(dataset, rows),
            ExportFormat::Html => Ok(to_html(dataset, rows)),
        }
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Comma-delimited UTF-8 with the dataset's header row and no index column.
pub fn to_csv<'a, I>(dataset: &SalesDataset, rows: I) -> Result<Vec<u8>, ExportError>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&dataset.headers)?;
    for rec in rows {
        writer.write_record(dataset.columns.iter().map(|&c| rec.cell(c)))?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| ExportError::Io(std::io::Error::new(e.error().kind(), e.to_string())))
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

/// HTML table in the layout pandas' `to_html(index=False)` produces.
pub fn to_html<'a, I>(dataset: &SalesDataset, rows: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let mut out = String::new();
    out.push_str("<table border=\"1\" class=\"dataframe\">\n");
    out.push_str("  <thead>\n    <tr style=\"text-align: right;\">\n");
    for h in &dataset.headers {
        let _ = writeln!(out, "      <th>{}</th>", escape_html(h));
    }
    out.push_str("    </tr>\n  </thead>\n  <tbody>\n");
    for rec in rows {
        out.push_str("    <tr>\n");
        for &c in &dataset.columns {
            let _ = writeln!(out, "      <td>{}</td>", escape_html(&rec.cell(c)));
        }
        out.push_str("    </tr>\n");
    }
    out.push_str("  </tbody>\n</table>");
    out.into_bytes()
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
