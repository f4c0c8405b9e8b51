//! Export Module
//! Writes the filtered table and its summary statistics to downloadable files.

use crate::config::EXPORT_DATE_FORMAT;
use crate::data::SalesTable;
use crate::error::ExportError;
use crate::stats::{Aggregator, Kpis, StatsCalculator, Summary};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Summary export layout, picked from the target file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryFormat {
    Csv,
    Json,
}

impl SummaryFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SummaryFormat::Json,
            _ => SummaryFormat::Csv,
        }
    }
}

/// Statistics of the amount column plus the headline KPIs.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub column: String,
    pub statistics: Summary,
    pub kpis: Kpis,
}

impl SummaryReport {
    pub fn from_table(table: &SalesTable) -> Self {
        Self {
            column: table.schema().amount.clone(),
            statistics: StatsCalculator::describe_amounts(table),
            kpis: Aggregator::kpis(table),
        }
    }
}

pub struct DataExporter;

impl DataExporter {
    /// `sales_data_filtered_YYYYMMDD.csv`
    pub fn default_file_name(today: NaiveDate) -> String {
        format!("sales_data_filtered_{}.csv", today.format("%Y%m%d"))
    }

    /// Lay the table out with its source header names and column order. Amounts
    /// are written as exact decimal text.
    pub fn to_dataframe(table: &SalesTable) -> PolarsResult<DataFrame> {
        let schema = table.schema();
        let records = table.records();

        let mut columns = vec![
            Column::new(
                schema.date.as_str().into(),
                records
                    .iter()
                    .map(|r| r.date.format(EXPORT_DATE_FORMAT).to_string())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                schema.amount.as_str().into(),
                records.iter().map(|r| r.amount.to_string()).collect::<Vec<_>>(),
            ),
            Column::new(
                schema.category.as_str().into(),
                records.iter().map(|r| r.category.clone()).collect::<Vec<_>>(),
            ),
        ];

        if let Some(name) = &schema.region {
            columns.push(Column::new(
                name.as_str().into(),
                records.iter().map(|r| r.region.clone()).collect::<Vec<_>>(),
            ));
        }
        if let Some(name) = &schema.quantity {
            columns.push(Column::new(
                name.as_str().into(),
                records.iter().map(|r| r.quantity).collect::<Vec<_>>(),
            ));
        }
        if let Some(name) = &schema.customer {
            columns.push(Column::new(
                name.as_str().into(),
                records.iter().map(|r| r.customer.clone()).collect::<Vec<_>>(),
            ));
        }
        for (idx, name) in schema.measures.iter().enumerate() {
            columns.push(Column::new(
                name.as_str().into(),
                records
                    .iter()
                    .map(|r| r.measures.get(idx).copied().flatten())
                    .collect::<Vec<_>>(),
            ));
        }

        for (idx, name) in schema.extra.iter().enumerate() {
            columns.push(Column::new(
                name.as_str().into(),
                records
                    .iter()
                    .map(|r| r.extra.get(idx).cloned().flatten())
                    .collect::<Vec<_>>(),
            ));
        }

        let df = DataFrame::new(columns)?;
        if schema.columns.is_empty() {
            Ok(df)
        } else {
            df.select(schema.columns.iter().map(String::as_str))
        }
    }

    pub fn write_csv<W: Write>(table: &SalesTable, writer: W) -> Result<(), ExportError> {
        let mut df = Self::to_dataframe(table)?;
        CsvWriter::new(writer).include_header(true).finish(&mut df)?;
        Ok(())
    }

    /// CSV bytes of the table, for clipboard or in-memory download.
    pub fn csv_bytes(table: &SalesTable) -> Result<Vec<u8>, ExportError> {
        let mut buf = Vec::new();
        Self::write_csv(table, &mut buf)?;
        Ok(buf)
    }

    pub fn save_csv(table: &SalesTable, path: &Path) -> Result<(), ExportError> {
        let mut writer = BufWriter::new(File::create(path)?);
        Self::write_csv(table, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// `statistic,<amount column>` rows in describe order, or a JSON report.
    pub fn write_summary<W: Write>(report: &SummaryReport, format: SummaryFormat, mut writer: W) -> Result<(), ExportError> {
        match format {
            SummaryFormat::Csv => {
                let rows = report.statistics.rows();
                let mut df = DataFrame::new(vec![
                    Column::new(
                        "statistic".into(),
                        rows.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
                    ),
                    Column::new(
                        report.column.as_str().into(),
                        rows.iter().map(|(_, value)| *value).collect::<Vec<_>>(),
                    ),
                ])?;
                CsvWriter::new(&mut writer).include_header(true).finish(&mut df)?;
            }
            SummaryFormat::Json => {
                serde_json::to_writer_pretty(&mut writer, report)?;
                writer.write_all(b"\n")?;
            }
        }
        Ok(())
    }

    pub fn save_summary(table: &SalesTable, path: &Path) -> Result<(), ExportError> {
        if table.is_empty() {
            return Err(ExportError::NoData("no rows match the current filters"));
        }
        let report = SummaryReport::from_table(table);
        let mut writer = BufWriter::new(File::create(path)?);
        Self::write_summary(&report, SummaryFormat::from_path(path), &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
