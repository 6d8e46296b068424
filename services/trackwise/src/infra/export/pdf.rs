use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};

use super::ExportError;
use crate::domain::report::ReportTable;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const ROW_HEIGHT: f32 = 6.0;
const TABLE_FONT_SIZE: f32 = 8.0;
/// Approximate Helvetica advance at 8pt, in millimetres.
const CHAR_WIDTH: f32 = 1.6;
const LAYER: &str = "Layer 1";

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// A4 portrait: title block, summary, then the table, paginated with the
/// header row repeated on every page.
pub(super) fn render(table: &ReportTable) -> Result<Vec<u8>, ExportError> {
    let (doc, page, layer) = PdfDocument::new(
        pdf_text(&table.title),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        LAYER.to_owned(),
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Pdf(e.to_string()))?,
    };
    let mut current = doc.get_page(page).get_layer(layer);

    let mut y = PAGE_HEIGHT - MARGIN - 5.0;
    current.use_text(pdf_text(&table.title), 16.0, Mm(MARGIN), Mm(y), &fonts.bold);
    y -= 8.0;
    current.use_text(
        pdf_text(&format!("Company: {}", table.company)),
        10.0,
        Mm(MARGIN),
        Mm(y),
        &fonts.regular,
    );
    y -= 5.0;
    current.use_text(
        format!("Generated: {}", table.generated_label()),
        10.0,
        Mm(MARGIN),
        Mm(y),
        &fonts.regular,
    );

    y -= 10.0;
    current.use_text("Summary", 11.0, Mm(MARGIN), Mm(y), &fonts.bold);
    for (label, value) in &table.summary {
        y -= 5.0;
        current.use_text(
            pdf_text(&format!("{label}: {}", value.display(&table.currency))),
            10.0,
            Mm(MARGIN),
            Mm(y),
            &fonts.regular,
        );
    }

    let widths = column_widths(table);
    y -= 10.0;
    draw_header(&current, table, &widths, y, &fonts);

    for row in table.display_rows() {
        y -= ROW_HEIGHT;
        if y < MARGIN {
            current = new_page(&doc);
            y = PAGE_HEIGHT - MARGIN - 5.0;
            draw_header(&current, table, &widths, y, &fonts);
            y -= ROW_HEIGHT;
        }
        let mut x = MARGIN;
        for (value, width) in row.iter().zip(&widths) {
            current.use_text(
                fit(value, *width),
                TABLE_FONT_SIZE,
                Mm(x),
                Mm(y),
                &fonts.regular,
            );
            x += width;
        }
    }

    doc.save_to_bytes()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

fn new_page(doc: &PdfDocumentReference) -> PdfLayerReference {
    let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
    doc.get_page(page).get_layer(layer)
}

fn draw_header(
    layer: &PdfLayerReference,
    table: &ReportTable,
    widths: &[f32],
    y: f32,
    fonts: &Fonts,
) {
    let mut x = MARGIN;
    for (header, width) in table.headers().zip(widths) {
        layer.use_text(fit(header, *width), TABLE_FONT_SIZE, Mm(x), Mm(y), &fonts.bold);
        x += width;
    }
    let rule_y = y - 1.5;
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN), Mm(rule_y)), false),
            (Point::new(Mm(PAGE_WIDTH - MARGIN), Mm(rule_y)), false),
        ],
        is_closed: false,
    });
}

/// Split the printable width in proportion to each column's widest value.
fn column_widths(table: &ReportTable) -> Vec<f32> {
    let mut chars: Vec<usize> = table.headers().map(|h| h.chars().count()).collect();
    for row in table.display_rows() {
        for (width, value) in chars.iter_mut().zip(&row) {
            *width = (*width).max(value.chars().count());
        }
    }
    let chars: Vec<f32> = chars.into_iter().map(|c| c.clamp(4, 40) as f32).collect();
    let total: f32 = chars.iter().sum();
    let usable = PAGE_WIDTH - 2.0 * MARGIN;
    chars.into_iter().map(|c| usable * c / total).collect()
}

/// Truncate to what fits in `width` millimetres.
fn fit(value: &str, width: f32) -> String {
    let max = ((width - 1.0) / CHAR_WIDTH).max(1.0) as usize;
    let text = pdf_text(value);
    if text.chars().count() <= max {
        text
    } else {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Builtin fonts only cover Latin-1.
fn pdf_text(value: &str) -> String {
    value
        .chars()
        .map(|c| if (c as u32) < 0x100 { c } else { '?' })
        .collect()
}
