//! Sales Data Model
//! Typed records produced by validation and the table that owns them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

/// One validated sales row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub category: String,
    pub region: Option<String>,
    pub quantity: Option<u64>,
    pub customer: Option<String>,
    /// Extra numeric columns, aligned with [`ResolvedSchema::measures`].
    pub measures: Vec<Option<f64>>,
    /// Remaining source columns as text, aligned with [`ResolvedSchema::extra`].
    pub extra: Vec<Option<String>>,
}

impl SalesRecord {
    pub fn new(date: NaiveDate, amount: Decimal, category: impl Into<String>) -> Self {
        Self {
            date,
            amount,
            category: category.into(),
            region: None,
            quantity: None,
            customer: None,
            measures: Vec::new(),
            extra: Vec::new(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_quantity(mut self, quantity: u64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }
}

/// Source header names bound to each canonical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSchema {
    pub date: String,
    pub amount: String,
    pub category: String,
    pub region: Option<String>,
    pub quantity: Option<String>,
    pub customer: Option<String>,
    /// Extra columns whose values are all numeric.
    pub measures: Vec<String>,
    /// Every other source column, carried through untouched.
    pub extra: Vec<String>,
    /// Source header order. Empty for tables not read from a file.
    pub columns: Vec<String>,
}

impl Default for ResolvedSchema {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            amount: "Sales".to_string(),
            category: "Category".to_string(),
            region: None,
            quantity: None,
            customer: None,
            measures: Vec::new(),
            extra: Vec::new(),
            columns: Vec::new(),
        }
    }
}

/// Chronologically ordered, immutable set of validated records.
///
/// Filtering produces a new table that shares the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesTable {
    schema: Arc<ResolvedSchema>,
    records: Vec<SalesRecord>,
}

impl SalesTable {
    /// Build a table, ordering records by date. Rows on the same date keep
    /// their relative order.
    pub fn new(schema: ResolvedSchema, mut records: Vec<SalesRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Self {
            schema: Arc::new(schema),
            records,
        }
    }

    /// Convenience constructor with the default schema.
    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        Self::new(ResolvedSchema::default(), records)
    }

    /// Derive a table over the same schema. Callers pass records already in
    /// table order.
    pub(crate) fn derive(&self, records: Vec<SalesRecord>) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            records,
        }
    }

    /// The first `n` rows over the same schema.
    pub fn head(&self, n: usize) -> Self {
        self.derive(self.records.iter().take(n).cloned().collect())
    }

    pub fn schema(&self) -> &ResolvedSchema {
        &self.schema
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SalesRecord> {
        self.records.iter()
    }

    /// First and last date, if any rows.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.records.first()?.date, self.records.last()?.date))
    }

    /// Sorted distinct categories.
    pub fn categories(&self) -> Vec<String> {
        self.distinct(|r| Some(r.category.as_str()))
    }

    /// Sorted distinct regions, ignoring rows without one.
    pub fn regions(&self) -> Vec<String> {
        self.distinct(|r| r.region.as_deref())
    }

    pub fn customers(&self) -> Vec<String> {
        self.distinct(|r| r.customer.as_deref())
    }

    fn distinct<'a, F>(&'a self, key: F) -> Vec<String>
    where
        F: Fn(&'a SalesRecord) -> Option<&'a str>,
    {
        self.records
            .iter()
            .filter_map(key)
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Amounts as floats for statistics and charting.
    pub fn amounts_f64(&self) -> Vec<f64> {
        use rust_decimal::prelude::ToPrimitive;
        self.records
            .iter()
            .filter_map(|r| r.amount.to_f64())
            .collect()
    }
}

impl<'a> IntoIterator for &'a SalesTable {
    type Item = &'a SalesRecord;
    type IntoIter = std::slice::Iter<'a, SalesRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
