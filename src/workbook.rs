use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use serde_json::Value;

use crate::backend::types::ResultRow;
use crate::config::Config;
use crate::richtext::split_bold_runs;

const HEADER_FILL: Color = Color::RGB(0x7030A0);
const DATA_FONT: &str = "Arial";
const DATA_FONT_SIZE: f64 = 11.0;
/// Leading serial marker on first-column values, dropped for display.
const SERIAL_PREFIX_CHARS: usize = 2;
/// Columns rendered at the narrow width before switching to wide.
const NARROW_COLUMNS: u16 = 3;
/// Words removed from column keys before title-casing the header.
const DROPPED_HEADER_WORDS: [&str; 2] = ["display", "name"];

struct Styles {
    header: Format,
    cell: Format,
    cell_bold: Format,
    run: Format,
    run_bold: Format,
}

impl Styles {
    fn new() -> Self {
        let header = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(HEADER_FILL)
            .set_align(FormatAlign::Top)
            .set_border(FormatBorder::Thin);
        let cell = Format::new()
            .set_font_name(DATA_FONT)
            .set_font_size(DATA_FONT_SIZE)
            .set_font_color(Color::Black)
            .set_text_wrap()
            .set_align(FormatAlign::Top)
            .set_border(FormatBorder::Thin);
        let cell_bold = cell.clone().set_bold();
        let run = Format::new()
            .set_font_name(DATA_FONT)
            .set_font_size(DATA_FONT_SIZE)
            .set_font_color(Color::Black);
        let run_bold = run.clone().set_bold();
        Self { header, cell, cell_bold, run, run_bold }
    }
}

/// Encode result rows as a single-sheet XLSX workbook, in memory.
///
/// Column layout comes from the first row's key order. Rows are written in
/// the order given; sorting is the caller's concern.
pub fn encode(cfg: &Config, rows: &[ResultRow]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let styles = Styles::new();

    let columns: Vec<String> = rows
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();

    for (col, key) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, column_header(key), &styles.header)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let row_num = idx as u32 + 1;
        for (col, key) in columns.iter().enumerate() {
            let rendered = render_value(row.get(key));
            let text = if col == 0 {
                strip_serial_prefix(&rendered)
            } else {
                rendered.as_str()
            };
            write_cell(worksheet, row_num, col as u16, text, &styles)?;
        }
    }

    for (col, _) in columns.iter().enumerate() {
        let width = if (col as u16) < NARROW_COLUMNS {
            cfg.export.narrow_column_width
        } else {
            cfg.export.wide_column_width
        };
        worksheet.set_column_width(col as u16, width)?;
    }

    workbook.save_to_buffer().context("serializing workbook")
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    text: &str,
    styles: &Styles,
) -> Result<()> {
    if !text.contains('*') {
        worksheet.write_string_with_format(row, col, text, &styles.cell)?;
        return Ok(());
    }

    let runs = split_bold_runs(text);
    match runs.as_slice() {
        [] => {
            worksheet.write_string_with_format(row, col, "", &styles.cell)?;
        }
        [only] => {
            let format = if only.bold { &styles.cell_bold } else { &styles.cell };
            worksheet.write_string_with_format(row, col, &only.text, format)?;
        }
        _ => {
            let segments: Vec<(&Format, &str)> = runs
                .iter()
                .map(|run| {
                    let format = if run.bold { &styles.run_bold } else { &styles.run };
                    (format, run.text.as_str())
                })
                .collect();
            worksheet.write_rich_string_with_format(row, col, &segments, &styles.cell)?;
        }
    }
    Ok(())
}

/// Human header for a snake_case column key: underscores become spaces,
/// the words "display" and "name" are dropped, the rest is title-cased.
/// `company_display_name` renders as `Company`.
pub fn column_header(key: &str) -> String {
    key.replace('_', " ")
        .split_whitespace()
        .filter(|word| !DROPPED_HEADER_WORDS.iter().any(|d| word.eq_ignore_ascii_case(d)))
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn strip_serial_prefix(text: &str) -> &str {
    let mut chars = text.chars();
    for _ in 0..SERIAL_PREFIX_CHARS {
        if chars.next().is_none() {
            return "";
        }
    }
    chars.as_str()
}

fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}
