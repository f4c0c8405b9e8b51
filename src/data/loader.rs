//! Sales Data Loader Module
//! Reads CSV/Excel files from a local path or a link-shared Google Drive file
//! into a raw text table using Polars and calamine.

use crate::config::{LoadOptions, DRIVE_DOWNLOAD_URL};
use crate::error::DataSourceError;
use calamine::{open_workbook_auto, Data, DataType as _, Reader as _};
use polars::prelude::*;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where a sales file comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    Local(PathBuf),
    Drive(DriveSource),
}

impl SourceRef {
    /// Short human-readable description for status messages.
    pub fn describe(&self) -> String {
        match self {
            SourceRef::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            SourceRef::Drive(drive) => format!("Google Drive file {}", drive.file_id),
        }
    }
}

/// A link-shared Google Drive file plus the optional token used for the one
/// download call. Lives only as long as the load request that carries it.
#[derive(Clone, PartialEq, Eq)]
pub struct DriveSource {
    pub file_id: String,
    pub access_token: Option<String>,
}

impl std::fmt::Debug for DriveSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveSource")
            .field("file_id", &self.file_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl DriveSource {
    /// Accepts either a bare file ID or a full shareable link.
    pub fn new(id_or_link: &str) -> Result<Self, DataSourceError> {
        let file_id = extract_file_id(id_or_link).ok_or_else(|| {
            DataSourceError::Unreachable(format!("'{}' is not a Drive file ID or link", id_or_link.trim()))
        })?;
        Ok(Self {
            file_id,
            access_token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn download_url(&self) -> String {
        format!("{}{}", DRIVE_DOWNLOAD_URL, self.file_id)
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Pull the file ID out of a shareable link (`.../d/<id>/view`, `...?id=<id>`)
/// or accept an already bare ID.
pub fn extract_file_id(input: &str) -> Option<String> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    let tail = s
        .find("/d/")
        .map(|pos| &s[pos + 3..])
        .or_else(|| s.find("id=").map(|pos| &s[pos + 3..]));

    let id: String = match tail {
        Some(rest) => rest.chars().take_while(|c| is_id_char(*c)).collect(),
        None if s.chars().all(is_id_char) => s.to_string(),
        None => return None,
    };

    (!id.is_empty()).then_some(id)
}

/// Physical file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
}

impl FileFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, DataSourceError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(FileFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(FileFormat::Spreadsheet),
            "" => Err(DataSourceError::UnsupportedFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
            other => Err(DataSourceError::UnsupportedFormat(format!(".{other}"))),
        }
    }

    /// Guess the format of downloaded bytes: ZIP (xlsx/ods) and OLE (xls)
    /// containers are spreadsheets, everything else is read as CSV.
    pub fn sniff(bytes: &[u8]) -> (Self, &'static str) {
        const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
        const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        if bytes.starts_with(ZIP_MAGIC) {
            (FileFormat::Spreadsheet, ".xlsx")
        } else if bytes.starts_with(OLE_MAGIC) {
            (FileFormat::Spreadsheet, ".xls")
        } else {
            (FileFormat::Csv, ".csv")
        }
    }
}

/// Loaded but not yet validated table. Every column holds text.
#[derive(Debug, Clone)]
pub struct RawTable {
    df: DataFrame,
    source: String,
}

impl RawTable {
    pub fn new(df: DataFrame, source: impl Into<String>) -> Self {
        Self {
            df,
            source: source.into(),
        }
    }

    /// Wrap an in-memory frame (used when data does not come from a file).
    pub fn from_dataframe(df: DataFrame) -> Self {
        Self::new(df, "in-memory")
    }

    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn get_row_count(&self) -> usize {
        self.df.height()
    }

    pub fn get_dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Cells of one column as trimmed text; blanks become `None`.
    pub fn column_text(&self, name: &str) -> Result<Vec<Option<String>>, PolarsError> {
        let column = self.df.column(name)?.cast(&DataType::String)?;
        let values = column.as_materialized_series().str()?;
        Ok(values
            .into_iter()
            .map(|v| {
                v.map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .collect())
    }
}

/// Reads sales files into [`RawTable`]s. Each call performs exactly one read
/// of the underlying storage and never retries.
pub struct DataLoader;

impl DataLoader {
    pub fn load(source: &SourceRef, options: &LoadOptions) -> Result<RawTable, DataSourceError> {
        match source {
            SourceRef::Local(path) => Self::load_path(path, options),
            SourceRef::Drive(drive) => Self::load_drive(drive, options),
        }
    }

    /// Load a local CSV or spreadsheet file.
    pub fn load_path(path: &Path, options: &LoadOptions) -> Result<RawTable, DataSourceError> {
        let format = FileFormat::from_path(path)?;
        let df = Self::read_file(path, format, options)?;
        Ok(RawTable::new(df, path.display().to_string()))
    }

    /// Download a link-shared Drive file and load it.
    pub fn load_drive(drive: &DriveSource, options: &LoadOptions) -> Result<RawTable, DataSourceError> {
        let bytes = Self::download(drive, options)?;
        if bytes.is_empty() {
            return Err(DataSourceError::Empty(format!(
                "Drive file {} has no content",
                drive.file_id
            )));
        }

        let (format, suffix) = FileFormat::sniff(&bytes);
        let mut temp = tempfile::Builder::new()
            .prefix("sales_data_")
            .suffix(suffix)
            .tempfile()?;
        temp.write_all(&bytes)?;
        temp.flush()?;

        let df = Self::read_file(temp.path(), format, options)?;
        if let Err(e) = temp.close() {
            eprintln!("Failed to remove temporary download: {e}");
        }
        Ok(RawTable::new(df, format!("drive:{}", drive.file_id)))
    }

    fn download(drive: &DriveSource, options: &LoadOptions) -> Result<Vec<u8>, DataSourceError> {
        let client = Client::builder()
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        let mut request = client.get(drive.download_url());
        if let Some(token) = &drive.access_token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .map_err(|e| DataSourceError::Unreachable(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DataSourceError::Unreachable(format!(
                "HTTP {} for Drive file {}",
                status, drive.file_id
            )));
        }

        // Drive answers with an HTML page when the file is not shared by link
        // or needs an interactive confirmation.
        let is_html = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/html"));
        if is_html {
            return Err(DataSourceError::Unreachable(format!(
                "Drive file {} is not link-shareable (got a web page instead of file data)",
                drive.file_id
            )));
        }

        Ok(resp.bytes()?.to_vec())
    }

    fn read_file(path: &Path, format: FileFormat, options: &LoadOptions) -> Result<DataFrame, DataSourceError> {
        let meta = fs::metadata(path)
            .map_err(|e| DataSourceError::Unreachable(format!("{}: {}", path.display(), e)))?;
        if meta.len() == 0 {
            return Err(DataSourceError::Empty(format!("{} is an empty file", path.display())));
        }

        let df = match format {
            FileFormat::Csv => Self::read_csv(path)?,
            FileFormat::Spreadsheet => Self::read_spreadsheet(path, options.sheet.as_deref())?,
        };

        if df.width() == 0 || df.height() == 0 {
            return Err(DataSourceError::Empty(format!(
                "{} contains no data rows",
                path.display()
            )));
        }
        Ok(df)
    }

    /// Read every CSV column as text; the validator owns type coercion.
    fn read_csv(path: &Path) -> Result<DataFrame, DataSourceError> {
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;
        Ok(df)
    }

    /// Read one worksheet; the first row is the header.
    fn read_spreadsheet(path: &Path, sheet: Option<&str>) -> Result<DataFrame, DataSourceError> {
        let excel_err = |e: calamine::Error| DataSourceError::Excel(e.to_string());

        let mut workbook = open_workbook_auto(path).map_err(excel_err)?;
        let range = match sheet {
            Some(sel) => match sel.parse::<usize>() {
                Ok(idx) => workbook
                    .worksheet_range_at(idx)
                    .ok_or_else(|| DataSourceError::Excel(format!("no sheet at index {idx}")))?
                    .map_err(excel_err)?,
                Err(_) => workbook.worksheet_range(sel).map_err(excel_err)?,
            },
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| DataSourceError::Excel("workbook has no worksheets".to_string()))?
                .map_err(excel_err)?,
        };

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            return Err(DataSourceError::Empty(format!("{} has an empty worksheet", path.display())));
        };

        let headers = unique_headers(header_row.iter().map(|c| cell_to_text(c).unwrap_or_default()));
        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

        for row in rows {
            if row.iter().all(|c| c.is_empty()) {
                continue;
            }
            for (idx, values) in columns.iter_mut().enumerate() {
                values.push(row.get(idx).and_then(cell_to_text));
            }
        }

        let columns: Vec<Column> = headers
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name.into(), values))
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

/// Blank headers become `column_N`; repeated names get a numeric suffix.
fn unique_headers(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .enumerate()
        .map(|(idx, name)| {
            let base = if name.trim().is_empty() {
                format!("column_{}", idx + 1)
            } else {
                name.trim().to_string()
            };
            let mut candidate = base.clone();
            let mut n = 2;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{base}_{n}");
                n += 1;
            }
            candidate
        })
        .collect()
}

/// Render a spreadsheet cell as the text the validator expects.
fn cell_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(_) => cell.as_datetime().map(|dt| {
            if dt.time() == chrono::NaiveTime::MIN {
                dt.date().format("%Y-%m-%d").to_string()
            } else {
                dt.format("%Y-%m-%d %H:%M:%S").to_string()
            }
        }),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
        Data::Error(e) => Some(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_id_from_share_link() {
        let link = "https://drive.google.com/file/d/1ABC123xyz456/view?usp=sharing";
        assert_eq!(extract_file_id(link).as_deref(), Some("1ABC123xyz456"));
    }

    #[test]
    fn file_id_from_open_link() {
        let link = "https://drive.google.com/open?id=1A-b_C";
        assert_eq!(extract_file_id(link).as_deref(), Some("1A-b_C"));
    }

    #[test]
    fn bare_file_id_is_kept() {
        assert_eq!(extract_file_id("  1ABC123xyz456 ").as_deref(), Some("1ABC123xyz456"));
        assert_eq!(extract_file_id("not an id"), None);
        assert_eq!(extract_file_id(""), None);
    }

    #[test]
    fn token_is_not_printed() {
        let drive = DriveSource::new("abc").unwrap().with_token("secret");
        assert!(!format!("{drive:?}").contains("secret"));
    }

    #[test]
    fn sniff_detects_zip_container() {
        assert_eq!(FileFormat::sniff(b"PK\x03\x04rest").0, FileFormat::Spreadsheet);
        assert_eq!(FileFormat::sniff(b"Date,Sales\n").0, FileFormat::Csv);
    }

    #[test]
    fn duplicate_headers_are_suffixed() {
        let names = vec!["Date".to_string(), "".to_string(), "Date".to_string()];
        assert_eq!(unique_headers(names.into_iter()), vec!["Date", "column_2", "Date_2"]);
    }
}
