use calamine::{Data, Range, Reader, Xlsx};
use gapsheet::backend::types::ResultRow;
use gapsheet::config::Config;
use gapsheet::workbook::{column_header, encode};
use serde_json::{json, Value};
use std::io::Cursor;

fn mk_row(pairs: &[(&str, Value)]) -> ResultRow {
    let mut row = ResultRow::new();
    for (key, value) in pairs {
        row.insert(key.to_string(), value.clone());
    }
    row
}

fn read_back(buf: Vec<u8>) -> Range<Data> {
    let mut xlsx: Xlsx<_> = Xlsx::new(Cursor::new(buf)).expect("parse xlsx");
    xlsx.worksheet_range("Sheet1").expect("worksheet")
}

fn cell_text(range: &Range<Data>, pos: (u32, u32)) -> String {
    match range.get_value(pos) {
        Some(Data::String(s)) => s.clone(),
        Some(Data::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[test]
fn header_keys_format_for_display() {
    assert_eq!(column_header("company_display_name"), "Company");
    assert_eq!(column_header("created_at"), "Created At");
    assert_eq!(column_header("control_id"), "Control Id");
    assert_eq!(column_header("observation"), "Observation");
}

#[test]
fn encodes_headers_and_strips_first_column_prefix() {
    let cfg = Config::default();
    let rows = vec![
        mk_row(&[
            ("control_id", json!("A-1.1")),
            ("observation", json!("Policy exists")),
            ("score", json!(2)),
        ]),
        mk_row(&[
            ("control_id", json!("A-1.2")),
            ("observation", json!("No evidence")),
            ("score", json!(4)),
        ]),
    ];

    let buf = encode(&cfg, &rows).expect("encode workbook");
    let range = read_back(buf);

    assert_eq!(cell_text(&range, (0, 0)), "Control Id");
    assert_eq!(cell_text(&range, (0, 1)), "Observation");
    assert_eq!(cell_text(&range, (0, 2)), "Score");

    // First two characters of the first column are dropped for display.
    assert_eq!(cell_text(&range, (1, 0)), "1.1");
    assert_eq!(cell_text(&range, (2, 0)), "1.2");
    assert_eq!(cell_text(&range, (1, 2)), "2");
}

#[test]
fn bold_spans_survive_as_text() {
    let cfg = Config::default();
    let rows = vec![mk_row(&[
        ("control_id", json!("A-1.1")),
        ("finding", json!("Missing **access review** procedure")),
    ])];

    let buf = encode(&cfg, &rows).expect("encode workbook");
    let range = read_back(buf);

    // Rich text cells read back as their concatenated text.
    assert_eq!(cell_text(&range, (1, 1)), "Missing access review procedure");
}

#[test]
fn column_layout_follows_first_row() {
    let cfg = Config::default();
    let rows = vec![
        mk_row(&[("control_id", json!("A-1.1")), ("status", json!("open"))]),
        // Second row carries an extra key; it gets no column of its own.
        mk_row(&[
            ("control_id", json!("A-1.2")),
            ("status", json!("closed")),
            ("stray", json!("ignored")),
        ]),
    ];

    let buf = encode(&cfg, &rows).expect("encode workbook");
    let range = read_back(buf);

    assert_eq!(range.get_size(), (3, 2));
    assert_eq!(cell_text(&range, (2, 1)), "closed");
}

#[test]
fn missing_and_null_values_render_empty() {
    let cfg = Config::default();
    let rows = vec![
        mk_row(&[("control_id", json!("A-1.1")), ("note", json!(null))]),
        mk_row(&[("control_id", json!("A-1.2"))]),
    ];

    let buf = encode(&cfg, &rows).expect("encode workbook");
    let range = read_back(buf);

    assert_eq!(cell_text(&range, (1, 1)), "");
    assert_eq!(cell_text(&range, (2, 1)), "");
}

#[test]
fn empty_results_still_produce_a_workbook() {
    let cfg = Config::default();
    let buf = encode(&cfg, &[]).expect("encode empty workbook");
    assert!(!buf.is_empty());

    let mut xlsx: Xlsx<_> = Xlsx::new(Cursor::new(buf)).expect("parse xlsx");
    assert!(xlsx.worksheet_range("Sheet1").is_ok());
}
