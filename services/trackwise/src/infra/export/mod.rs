//! Report renderers. Every format consumes the same [`ReportTable`].

mod csv_file;
mod pdf;
mod xlsx;

use crate::domain::report::{ExportFormat, ReportTable};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("xlsx: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("pdf: {0}")]
    Pdf(String),
}

pub fn render(table: &ReportTable, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Csv => csv_file::render(table),
        ExportFormat::Excel => xlsx::render(table),
        ExportFormat::Pdf => pdf::render(table),
    }
}
