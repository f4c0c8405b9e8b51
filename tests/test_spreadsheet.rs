mod common;

use common::{date, dec, number_cell, text_cell, Fixture};
use sales_dashboard::config::LoadOptions;
use sales_dashboard::data::{load_sales, DataLoader, SourceRef};
use sales_dashboard::error::DataSourceError;
use std::path::PathBuf;

/// Two sheets: "Sales" with a header and two dated rows, then an empty "Empty".
fn sales_workbook(fx: &Fixture) -> PathBuf {
    let sales = [
        format!(
            r#"<row r="1">{}{}{}</row>"#,
            text_cell("A1", "Date"),
            text_cell("B1", "Sales"),
            text_cell("C1", "Category")
        ),
        format!(
            r#"<row r="2">{}{}{}</row>"#,
            number_cell("A2", 45292.0, true),
            number_cell("B2", 100.5, false),
            text_cell("C2", "Widget")
        ),
        format!(
            r#"<row r="3">{}{}{}</row>"#,
            number_cell("A3", 45323.0, true),
            number_cell("B3", 20.0, false),
            text_cell("C3", "Gadget")
        ),
    ]
    .concat();
    fx.write_xlsx("sales.xlsx", &[("Sales", &sales), ("Empty", "")])
}

#[test]
fn reads_header_row_and_iso_dates() {
    let fx = Fixture::new();
    let path = sales_workbook(&fx);

    let raw = DataLoader::load_path(&path, &LoadOptions::default()).unwrap();
    assert_eq!(raw.get_columns(), vec!["Date", "Sales", "Category"]);
    assert_eq!(raw.get_row_count(), 2);

    let dates = raw.column_text("Date").unwrap();
    assert_eq!(dates[0].as_deref(), Some("2024-01-01"));
    assert_eq!(dates[1].as_deref(), Some("2024-02-01"));
    let sales = raw.column_text("Sales").unwrap();
    assert_eq!(sales[0].as_deref(), Some("100.5"));
}

#[test]
fn sheet_selected_by_name_or_index() {
    let fx = Fixture::new();
    let path = sales_workbook(&fx);

    for sheet in ["Sales", "0"] {
        let raw = DataLoader::load_path(&path, &LoadOptions::new().sheet(sheet)).unwrap();
        assert_eq!(raw.get_row_count(), 2, "sheet {sheet}");
    }

    let err = DataLoader::load_path(&path, &LoadOptions::new().sheet("Missing")).unwrap_err();
    assert!(matches!(err, DataSourceError::Excel(_)), "got {err:?}");
}

#[test]
fn empty_worksheet_is_empty_source() {
    let fx = Fixture::new();
    let path = sales_workbook(&fx);

    for sheet in ["Empty", "1"] {
        let err = DataLoader::load_path(&path, &LoadOptions::new().sheet(sheet)).unwrap_err();
        assert!(matches!(err, DataSourceError::Empty(_)), "sheet {sheet}: got {err:?}");
    }
}

#[test]
fn workbook_validates_into_sales_table() {
    let fx = Fixture::new();
    let path = sales_workbook(&fx);

    let validated = load_sales(&SourceRef::Local(path), &LoadOptions::default()).unwrap();
    assert!(validated.report.dropped.is_empty());

    let records = validated.table.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].date, date(2024, 1, 1));
    assert_eq!(records[0].amount, dec("100.5"));
    assert_eq!(records[0].category, "Widget");
    assert_eq!(records[1].date, date(2024, 2, 1));
}
