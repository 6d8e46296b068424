use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};

use super::ExportError;
use crate::domain::report::{Cell, ReportTable};

pub const SHEET_NAME: &str = "Report";
const MAX_COLUMN_WIDTH: usize = 50;

/// One "Report" sheet: title block, summary, then the table with numeric
/// money cells formatted as `"{SYMBOL}" #,##0.00`.
pub(super) fn render(table: &ReportTable) -> Result<Vec<u8>, ExportError> {
    let bold = Format::new().set_bold();
    let title = Format::new().set_bold().set_font_size(14);
    let money_pattern = format!(
        "\"{sym}\" #,##0.00;\"{sym}\" -#,##0.00",
        sym = table.currency
    );
    let money = Format::new().set_num_format(&money_pattern);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    sheet.write_string_with_format(0, 0, &table.title, &title)?;
    sheet.write_string(1, 0, format!("Company: {}", table.company))?;
    sheet.write_string(2, 0, format!("Generated: {}", table.generated_label()))?;

    let mut row: u32 = 4;
    for (label, value) in &table.summary {
        sheet.write_string_with_format(row, 0, label, &bold)?;
        write_cell(sheet, row, 1, value, &money)?;
        row += 1;
    }

    row += 1;
    for (col, header) in table.headers().enumerate() {
        sheet.write_string_with_format(row, col as u16, header, &bold)?;
    }
    for cells in &table.rows {
        row += 1;
        for (col, cell) in cells.iter().enumerate() {
            write_cell(sheet, row, col as u16, cell, &money)?;
        }
    }

    for (col, width) in column_widths(table).into_iter().enumerate() {
        sheet.set_column_width(col as u16, width as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_cell(
    sheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    money: &Format,
) -> Result<(), ExportError> {
    match cell {
        Cell::Text(s) => sheet.write_string(row, col, s)?,
        Cell::Integer(n) => sheet.write_number(row, col, *n as f64)?,
        Cell::Money(amount) => {
            sheet.write_number_with_format(row, col, amount.to_f64().unwrap_or_default(), money)?
        }
        Cell::Date(d) => sheet.write_string(row, col, d.format("%Y-%m-%d").to_string())?,
    };
    Ok(())
}

/// Widest display value per column plus padding, capped.
fn column_widths(table: &ReportTable) -> Vec<usize> {
    let mut widths: Vec<usize> = table.headers().map(|h| h.chars().count()).collect();
    for row in table.display_rows() {
        for (width, value) in widths.iter_mut().zip(&row) {
            *width = (*width).max(value.chars().count());
        }
    }
    widths
        .into_iter()
        .map(|w| (w + 2).min(MAX_COLUMN_WIDTH))
        .collect()
}
