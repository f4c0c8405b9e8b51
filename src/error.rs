//! Error taxonomy for the dashboard pipeline.
//! One enum per stage; `DashboardError` wraps them for callers that drive
//! the whole pipeline.

use thiserror::Error;

/// Load-time failures: the source cannot be read or holds no data.
#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("Source unreachable: {0}")]
    Unreachable(String),
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("Source is empty: {0}")]
    Empty(String),
    #[error("Failed to read CSV: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
    #[error("Failed to read spreadsheet: {0}")]
    Excel(String),
    #[error("Download failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<std::io::Error> for DataSourceError {
    fn from(err: std::io::Error) -> Self {
        DataSourceError::Unreachable(err.to_string())
    }
}

/// Required columns could not be resolved from the header row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Missing required column(s): {}", .missing.join(", "))]
pub struct SchemaError {
    /// Each entry names the field by its accepted aliases, e.g. `amount/sales/revenue`.
    pub missing: Vec<String>,
}

/// A cell that could not be converted to its field's type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Row {row}, column '{column}': cannot interpret '{value}'")]
pub struct TypeCoercionError {
    /// 1-based data row number (the header is not counted).
    pub row: usize,
    pub column: String,
    pub value: String,
}

/// Output generation failures.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to write CSV: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to render chart: {0}")]
    Render(String),
    #[error("Nothing to export: {0}")]
    NoData(&'static str),
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    TypeCoercion(#[from] TypeCoercionError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
