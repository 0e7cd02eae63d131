use crate::document::{Cell, ReportDocument, Sheet};
use crate::error::ReportResult;
use crate::util::format_number;
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style};
use tracing::info;

/// `<out_dir>/report_<input stem>.xlsx`
pub fn report_path(out_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "shifts".to_string());
    out_dir.join(format!("report_{}.xlsx", stem))
}

fn write_cell(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: &Format,
) -> ReportResult<()> {
    match cell {
        Cell::Text(s) => {
            ws.write_string_with_format(row, col, s, format)?;
        }
        // Excel has no NaN/inf; keep the value visible as text.
        Cell::Number(n) if !n.is_finite() => {
            ws.write_string_with_format(row, col, n.to_string(), format)?;
        }
        Cell::Number(n) => {
            ws.write_number_with_format(row, col, *n, format)?;
        }
    }
    Ok(())
}

fn write_sheet(
    workbook: &mut Workbook,
    sheet: &Sheet,
    formats: &SheetFormats,
) -> ReportResult<()> {
    let ws = workbook.add_worksheet();
    ws.set_name(&sheet.name)?;

    for (col, column) in sheet.columns.iter().enumerate() {
        let col = col as u16;
        ws.set_column_width(col, column.width)?;
        ws.write_string_with_format(0, col, &column.header, &formats.header)?;
    }

    for (r, row) in sheet.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            write_cell(ws, r as u32 + 1, c as u16, cell, &formats.plain)?;
        }
    }

    // The merged region is created blank, then its first cell is rewritten
    // with the typed value so numeric labels stay numeric.
    for m in &sheet.merges {
        let (first, col) = (m.first_row as u32 + 1, m.column as u16);
        ws.merge_range(first, col, m.last_row as u32 + 1, col, "", &formats.merged)?;
        write_cell(ws, first, col, &sheet.rows[m.first_row][m.column], &formats.merged)?;
    }
    Ok(())
}

struct SheetFormats {
    header: Format,
    plain: Format,
    merged: Format,
}

fn build_workbook(doc: &ReportDocument) -> ReportResult<Workbook> {
    let mut workbook = Workbook::new();
    let formats = SheetFormats {
        header: Format::new().set_bold(),
        plain: Format::new(),
        merged: Format::new().set_align(FormatAlign::VerticalCenter),
    };
    for sheet in &doc.sheets {
        write_sheet(&mut workbook, sheet, &formats)?;
    }
    Ok(workbook)
}

/// Render the document as an in-memory xlsx file.
pub fn render_xlsx(doc: &ReportDocument) -> ReportResult<Vec<u8>> {
    Ok(build_workbook(doc)?.save_to_buffer()?)
}

pub fn write_xlsx(path: &Path, doc: &ReportDocument) -> ReportResult<()> {
    let mut workbook = build_workbook(doc)?;
    workbook.save(path)?;
    info!(path = %path.display(), sheets = doc.sheets.len(), "wrote workbook");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> ReportResult<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

fn preview_text(cell: &Cell) -> String {
    match cell {
        Cell::Number(n) if n.fract() == 0.0 => format_number(*n, 0),
        Cell::Number(n) => format_number(*n, 2),
        other => other.display(),
    }
}

/// Markdown table of the header plus the first `max_rows` rows.
pub fn render_preview(sheet: &Sheet, max_rows: usize) -> String {
    if sheet.rows.is_empty() {
        return "(no rows)".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(sheet.columns.iter().map(|c| c.header.clone()));
    for row in sheet.rows.iter().take(max_rows) {
        builder.push_record(row.iter().map(preview_text));
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn preview_sheet(sheet: &Sheet, max_rows: usize) {
    println!("{}\n", sheet.name);
    println!("{}\n", render_preview(sheet, max_rows));
}
