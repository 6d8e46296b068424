use csv::Writer;

use super::ExportError;
use crate::domain::report::ReportTable;

/// Header row followed by one record per row. Money cells carry the
/// currency symbol so the file matches the other formats.
pub(super) fn render(table: &ReportTable) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(table.headers())?;
    for row in table.display_rows() {
        writer.write_record(&row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))
}
