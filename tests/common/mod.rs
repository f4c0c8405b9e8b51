//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sales_dashboard::data::{SalesRecord, SalesTable};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::ZipWriter;

pub const SAMPLE_CSV: &str = "\
Order Date,Product,Region,Revenue,Qty
2024-01-03,Widget,North,100.00,2
2024-01-01,Gadget,South,50.50,1
2024-01-15,Widget,South,75.25,3
2024-02-02,Gizmo,North,20.00,1
2024-02-10,Gadget,,30.00,2
";

/// A temp directory that is removed when dropped, with helpers to drop files into it.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, contents).expect("write fixture file");
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a minimal .xlsx workbook. Each sheet is a name plus the inner XML
    /// of its `<sheetData>`. Cell style `s="1"` is the built-in date format.
    pub fn write_xlsx(&self, name: &str, sheets: &[(&str, &str)]) -> PathBuf {
        let path = self.path(name);
        let file = File::create(&path).expect("create xlsx fixture");
        let mut zip = ZipWriter::new(file);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Stored);

        let mut overrides = String::new();
        let mut entries = String::new();
        let mut rels = String::new();
        for (idx, (sheet, _)) in sheets.iter().enumerate() {
            let n = idx + 1;
            overrides.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
            ));
            entries.push_str(&format!(r#"<sheet name="{sheet}" sheetId="{n}" r:id="rId{n}"/>"#));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
            ));
        }

        let mut parts = vec![
            (
                "[Content_Types].xml".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>{overrides}</Types>"#
                ),
            ),
            (
                "_rels/.rels".to_string(),
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
                    .to_string(),
            ),
            (
                "xl/workbook.xml".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{entries}</sheets></workbook>"#
                ),
            ),
            (
                "xl/_rels/workbook.xml.rels".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
                ),
            ),
            (
                "xl/styles.xml".to_string(),
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="14"/></cellXfs></styleSheet>"#
                    .to_string(),
            ),
        ];
        for (idx, (_, data)) in sheets.iter().enumerate() {
            parts.push((
                format!("xl/worksheets/sheet{}.xml", idx + 1),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{data}</sheetData></worksheet>"#
                ),
            ));
        }

        for (part, body) in parts {
            zip.start_file(part, options).expect("start xlsx part");
            zip.write_all(body.as_bytes()).expect("write xlsx part");
        }
        zip.finish().expect("finish xlsx");
        path
    }
}

/// An inline-string cell.
pub fn text_cell(r: &str, text: &str) -> String {
    format!(r#"<c r="{r}" t="inlineStr"><is><t>{text}</t></is></c>"#)
}

/// A numeric cell, optionally styled as a date (Excel serial days).
pub fn number_cell(r: &str, value: f64, date: bool) -> String {
    let style = if date { r#" s="1""# } else { "" };
    format!(r#"<c r="{r}"{style}><v>{value}</v></c>"#)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).expect("valid decimal")
}

/// The five-row table used across filter and aggregation tests.
pub fn sample_table() -> SalesTable {
    SalesTable::from_records(vec![
        SalesRecord::new(date(2024, 1, 1), dec("50.50"), "Gadget")
            .with_region("South")
            .with_quantity(1),
        SalesRecord::new(date(2024, 1, 3), dec("100.00"), "Widget")
            .with_region("North")
            .with_quantity(2),
        SalesRecord::new(date(2024, 1, 15), dec("75.25"), "Widget")
            .with_region("South")
            .with_quantity(3),
        SalesRecord::new(date(2024, 2, 2), dec("20.00"), "Gizmo")
            .with_region("North")
            .with_quantity(1),
        SalesRecord::new(date(2024, 2, 10), dec("30.00"), "Gadget").with_quantity(2),
    ])
}
