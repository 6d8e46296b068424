//! Format-independent report table consumed by every export renderer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use trackwise_domain::money::format_money;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Money(Decimal),
    Date(NaiveDate),
}

impl Cell {
    /// Display form shared by CSV cells and PDF text.
    pub fn display(&self, currency: &str) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(n) => n.to_string(),
            Self::Money(amount) => format_money(currency, *amount),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Money,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportColumn {
    pub header: &'static str,
    pub kind: ColumnKind,
}

impl ReportColumn {
    pub const fn new(header: &'static str, kind: ColumnKind) -> Self {
        Self { header, kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub title: String,
    pub company: String,
    pub generated_at: DateTime<Utc>,
    /// Currency symbol used for every money cell.
    pub currency: String,
    pub summary: Vec<(String, Cell)>,
    pub columns: Vec<ReportColumn>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    pub fn headers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.header)
    }

    /// Rows rendered as display strings.
    pub fn display_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows
            .iter()
            .map(|row| row.iter().map(|c| c.display(&self.currency)).collect())
    }

    pub fn generated_label(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Excel,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Excel => "xlsx",
            Self::Csv => "csv",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown export format: {0}")]
pub struct UnknownFormat(String);

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "excel" | "xlsx" => Ok(Self::Excel),
            "csv" => Ok(Self::Csv),
            _ => Err(UnknownFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Lower-case a company name into `[a-z0-9_]`, collapsing separators.
pub fn company_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_end_matches('_');
    if slug.is_empty() {
        "company".to_owned()
    } else {
        slug.to_owned()
    }
}

/// `{prefix}_{company_slug}_{YYYYmmdd_HHMM}.{ext}`
pub fn report_filename(
    prefix: &str,
    company: &str,
    at: DateTime<Utc>,
    format: ExportFormat,
) -> String {
    format!(
        "{prefix}_{}_{}.{}",
        company_slug(company),
        at.format("%Y%m%d_%H%M"),
        format.extension()
    )
}
