//! Schema Validator Module
//! Resolves the column-name contract through a static alias table and coerces
//! raw text cells into typed [`SalesRecord`]s.

use crate::config::{
    CoercionPolicy, DATETIME_FORMATS, DATE_FORMATS, MAX_ABS_AMOUNT, MAX_QUANTITY,
};
use crate::data::loader::RawTable;
use crate::data::model::{ResolvedSchema, SalesRecord, SalesTable};
use crate::error::{DataSourceError, Result, SchemaError, TypeCoercionError};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;

/// Canonical sales fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    Amount,
    Category,
    Region,
    Quantity,
    Customer,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Date,
        Field::Amount,
        Field::Category,
        Field::Region,
        Field::Quantity,
        Field::Customer,
    ];

    pub fn is_required(self) -> bool {
        matches!(self, Field::Date | Field::Amount | Field::Category)
    }

    /// Accepted header names in priority order (already normalised).
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Date => &["date", "order date", "transaction date", "sale date", "invoice date"],
            Field::Amount => &["amount", "sales", "revenue", "total", "sales amount", "total sales"],
            Field::Category => &["category", "product", "product name", "item", "product category"],
            Field::Region => &["region", "area", "territory", "location"],
            Field::Quantity => &["quantity", "qty", "units", "units sold"],
            Field::Customer => &["customer", "customer name", "client"],
        }
    }

    /// Substrings that bind a header when no alias matches exactly.
    fn keywords(self) -> &'static [&'static str] {
        match self {
            Field::Date => &["date"],
            Field::Amount => &["sales", "revenue", "amount"],
            Field::Category => &["product", "category", "item"],
            Field::Region => &["region"],
            Field::Quantity => &["quantity", "qty"],
            Field::Customer => &["customer"],
        }
    }

    /// Name used in error messages, e.g. `amount/sales/revenue`.
    pub fn label(self) -> String {
        self.aliases().iter().take(3).copied().collect::<Vec<_>>().join("/")
    }
}

/// Lowercase, trim, strip a UTF-8 BOM and treat `_`/`-` as spaces.
pub fn normalize_header(name: &str) -> String {
    let cleaned: String = name
        .trim_start_matches('\u{feff}')
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Header binding for every field; optional fields may be unbound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnBinding {
    pub date: Option<String>,
    pub amount: Option<String>,
    pub category: Option<String>,
    pub region: Option<String>,
    pub quantity: Option<String>,
    pub customer: Option<String>,
}

impl ColumnBinding {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Date => &mut self.date,
            Field::Amount => &mut self.amount,
            Field::Category => &mut self.category,
            Field::Region => &mut self.region,
            Field::Quantity => &mut self.quantity,
            Field::Customer => &mut self.customer,
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Date => self.date.as_deref(),
            Field::Amount => self.amount.as_deref(),
            Field::Category => self.category.as_deref(),
            Field::Region => self.region.as_deref(),
            Field::Quantity => self.quantity.as_deref(),
            Field::Customer => self.customer.as_deref(),
        }
    }

    fn bound(&self) -> HashSet<&str> {
        Field::ALL.iter().filter_map(|f| self.get(*f)).collect()
    }
}

/// Rows dropped while coercing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub total_rows: usize,
    pub dropped: Vec<TypeCoercionError>,
}

impl ValidationReport {
    pub fn kept_rows(&self) -> usize {
        self.total_rows - self.dropped.len()
    }
}

#[derive(Debug, Clone)]
pub struct Validated {
    pub table: SalesTable,
    pub report: ValidationReport,
}

/// Validates raw tables into [`SalesTable`]s.
pub struct SchemaValidator;

impl SchemaValidator {
    /// Bind headers to fields: exact aliases first, then keyword containment.
    /// Each header is bound at most once.
    pub fn resolve(columns: &[String]) -> std::result::Result<ColumnBinding, SchemaError> {
        let normalized: Vec<String> = columns.iter().map(|c| normalize_header(c)).collect();
        let mut binding = ColumnBinding::default();
        let mut taken = vec![false; columns.len()];

        for field in Field::ALL {
            let hit = field.aliases().iter().find_map(|alias| {
                normalized
                    .iter()
                    .enumerate()
                    .position(|(i, n)| !taken[i] && n == alias)
            });
            if let Some(idx) = hit {
                taken[idx] = true;
                *binding.slot(field) = Some(columns[idx].clone());
            }
        }

        for field in Field::ALL {
            if binding.get(field).is_some() {
                continue;
            }
            let hit = normalized
                .iter()
                .enumerate()
                .position(|(i, n)| !taken[i] && field.keywords().iter().any(|k| n.contains(k)));
            if let Some(idx) = hit {
                taken[idx] = true;
                *binding.slot(field) = Some(columns[idx].clone());
            }
        }

        let missing: Vec<String> = Field::ALL
            .iter()
            .filter(|f| f.is_required() && binding.get(**f).is_none())
            .map(|f| f.label())
            .collect();

        if missing.is_empty() {
            Ok(binding)
        } else {
            Err(SchemaError { missing })
        }
    }

    /// Resolve the schema and coerce every row.
    ///
    /// Under [`CoercionPolicy::DropInvalid`] offending rows are dropped and
    /// listed in the report; if no row survives, the first offending cell is
    /// returned as the error. Under [`CoercionPolicy::Strict`] the first
    /// offending cell fails the load.
    pub fn validate(raw: &RawTable, policy: CoercionPolicy) -> Result<Validated> {
        let columns = raw.get_columns();
        let binding = Self::resolve(&columns)?;
        let text = |name: &str| -> Result<Vec<Option<String>>> {
            raw.column_text(name)
                .map_err(|e| DataSourceError::Polars(e).into())
        };
        let optional = |field: Field| -> Result<Option<Vec<Option<String>>>> {
            binding.get(field).map(text).transpose()
        };

        // Required columns are bound at this point.
        let date_col = binding.date.clone().unwrap_or_default();
        let amount_col = binding.amount.clone().unwrap_or_default();
        let category_col = binding.category.clone().unwrap_or_default();
        let quantity_col = binding.quantity.clone().unwrap_or_default();

        let dates = text(&date_col)?;
        let amounts = text(&amount_col)?;
        let categories = text(&category_col)?;
        let regions = optional(Field::Region)?;
        let quantities = optional(Field::Quantity)?;
        let customers = optional(Field::Customer)?;

        let bound = binding.bound();
        let mut measures: Vec<(String, Vec<Option<f64>>)> = Vec::new();
        let mut extra: Vec<(String, Vec<Option<String>>)> = Vec::new();
        for name in columns.iter().filter(|c| !bound.contains(c.as_str())) {
            let values = text(name)?;
            match numeric_column(&values) {
                Some(numbers) => measures.push((name.clone(), numbers)),
                None => extra.push((name.clone(), values)),
            }
        }

        let max_amount = Decimal::from(MAX_ABS_AMOUNT);
        let total_rows = raw.get_row_count();
        let mut records = Vec::with_capacity(total_rows);
        let mut dropped = Vec::new();

        for i in 0..total_rows {
            let issue = |column: &str, value: &Option<String>| TypeCoercionError {
                row: i + 1,
                column: column.to_string(),
                value: value.clone().unwrap_or_default(),
            };
            let cell = |values: &Option<Vec<Option<String>>>| -> Option<String> {
                values.as_ref().and_then(|v| v[i].clone())
            };

            let row = (|| -> std::result::Result<SalesRecord, TypeCoercionError> {
                let date = dates[i]
                    .as_deref()
                    .and_then(parse_date)
                    .ok_or_else(|| issue(&date_col, &dates[i]))?;
                let amount = amounts[i]
                    .as_deref()
                    .and_then(parse_amount)
                    .filter(|a| a.abs() <= max_amount)
                    .ok_or_else(|| issue(&amount_col, &amounts[i]))?;
                let category = categories[i]
                    .clone()
                    .ok_or_else(|| issue(&category_col, &categories[i]))?;
                let quantity = match cell(&quantities) {
                    Some(q) => Some(
                        parse_quantity(&q)
                            .filter(|n| *n <= MAX_QUANTITY)
                            .ok_or_else(|| issue(&quantity_col, &Some(q.clone())))?,
                    ),
                    None => None,
                };

                Ok(SalesRecord {
                    date,
                    amount,
                    category,
                    region: cell(&regions),
                    quantity,
                    customer: cell(&customers),
                    measures: measures.iter().map(|(_, values)| values[i]).collect(),
                    extra: extra.iter().map(|(_, values)| values[i].clone()).collect(),
                })
            })();

            match row {
                Ok(record) => records.push(record),
                Err(err) if policy == CoercionPolicy::Strict => return Err(err.into()),
                Err(err) => dropped.push(err),
            }
        }

        if records.is_empty() {
            if let Some(first) = dropped.first().cloned() {
                return Err(first.into());
            }
        }

        if !dropped.is_empty() {
            eprintln!(
                "Validation dropped {} of {} rows from {}",
                dropped.len(),
                total_rows,
                raw.source()
            );
        }

        let schema = ResolvedSchema {
            date: date_col,
            amount: amount_col,
            category: category_col,
            region: binding.region,
            quantity: binding.quantity,
            customer: binding.customer,
            measures: measures.into_iter().map(|(name, _)| name).collect(),
            extra: extra.into_iter().map(|(name, _)| name).collect(),
            columns,
        };

        Ok(Validated {
            table: SalesTable::new(schema, records),
            report: ValidationReport {
                total_rows,
                dropped,
            },
        })
    }
}

/// Values of a column if every non-blank cell is numeric and at least one is present.
fn numeric_column(values: &[Option<String>]) -> Option<Vec<Option<f64>>> {
    let mut any = false;
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        match value {
            Some(s) => {
                out.push(Some(parse_amount(s)?.to_f64()?));
                any = true;
            }
            None => out.push(None),
        }
    }
    any.then_some(out)
}

/// Parse a calendar date in any accepted layout; a time part is discarded.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Parse a currency value: currency symbols, thousands separators and
/// accounting parentheses are accepted. Non-finite text is rejected.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut s = raw.trim();
    let negative = s.len() > 2 && s.starts_with('(') && s.ends_with(')');
    if negative {
        s = &s[1..s.len() - 1];
    }

    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '¥' | ',' | ' ' | '\u{a0}'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;
    Some(if negative { -value } else { value })
}

/// Parse a non-negative whole quantity (`3`, `3.0`, `1,200`).
pub fn parse_quantity(raw: &str) -> Option<u64> {
    let value = parse_amount(raw)?;
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    if !value.fract().is_zero() {
        return None;
    }
    value.trunc().abs().to_u64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_normalized() {
        assert_eq!(normalize_header("  Order_Date "), "order date");
        assert_eq!(normalize_header("\u{feff}Units-Sold"), "units sold");
    }

    #[test]
    fn amount_label_lists_aliases() {
        assert_eq!(Field::Amount.label(), "amount/sales/revenue");
    }

    #[test]
    fn product_name_outranks_item_for_category() {
        assert_eq!(Field::Category.label(), "category/product/product name");

        let columns: Vec<String> = ["Date", "Item", "Product Name", "Sales"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let binding = SchemaValidator::resolve(&columns).unwrap();
        assert_eq!(binding.category.as_deref(), Some("Product Name"));
    }

    #[test]
    fn amounts_accept_currency_formatting() {
        assert_eq!(parse_amount("$1,234.50"), Some(Decimal::from_str("1234.50").unwrap()));
        assert_eq!(parse_amount("(20)"), Some(Decimal::from(-20)));
        assert_eq!(parse_amount("1e3"), Some(Decimal::from(1000)));
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn quantities_must_be_whole_and_non_negative() {
        assert_eq!(parse_quantity("3"), Some(3));
        assert_eq!(parse_quantity("3.0"), Some(3));
        assert_eq!(parse_quantity("1,200"), Some(1200));
        assert_eq!(parse_quantity("2.5"), None);
        assert_eq!(parse_quantity("-1"), None);
    }

    #[test]
    fn dates_accept_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        for raw in [
            "2024-03-05",
            "2024/03/05",
            "03/05/2024",
            "05.03.2024",
            "05-Mar-2024",
            "Mar 05, 2024",
            "2024-03-05 13:45:00",
            "2024-03-05T13:45:00",
            "2024-03-05T13:45:00+02:00",
        ] {
            assert_eq!(parse_date(raw), Some(expected), "{raw}");
        }
        assert_eq!(parse_date("2024-02-30"), None);
    }
}
