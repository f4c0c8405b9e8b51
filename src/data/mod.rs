//! Data module - loading, validation and filtering

mod filter;
mod loader;
mod model;
mod validator;

pub use filter::FilterCriteria;
pub use loader::{extract_file_id, DataLoader, DriveSource, FileFormat, RawTable, SourceRef};
pub use model::{ResolvedSchema, SalesRecord, SalesTable};
pub use validator::{
    normalize_header, parse_amount, parse_date, parse_quantity, ColumnBinding, Field,
    SchemaValidator, Validated, ValidationReport,
};

use crate::config::LoadOptions;
use crate::error::Result;

/// Load and validate in one step.
pub fn load_sales(source: &SourceRef, options: &LoadOptions) -> Result<Validated> {
    let raw = DataLoader::load(source, options)?;
    SchemaValidator::validate(&raw, options.policy)
}
