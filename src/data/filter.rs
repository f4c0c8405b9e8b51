//! Filter Engine
//! Narrows a sales table by date range, category, region and customer.

use crate::data::model::{SalesRecord, SalesTable};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Row restrictions. `None` means "no restriction"; an empty set selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Inclusive on both ends.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub categories: Option<BTreeSet<String>>,
    pub regions: Option<BTreeSet<String>>,
    pub customers: Option<BTreeSet<String>>,
}

fn to_set<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some((start, end));
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(to_set(categories));
        self
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = Some(to_set(regions));
        self
    }

    pub fn with_customers<I, S>(mut self, customers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.customers = Some(to_set(customers));
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.date_range.is_none()
            && self.categories.is_none()
            && self.regions.is_none()
            && self.customers.is_none()
    }

    /// Whether a single record passes every restriction. A record without a
    /// region (or customer) never passes a region (or customer) restriction.
    pub fn matches(&self, record: &SalesRecord) -> bool {
        if let Some((start, end)) = self.date_range {
            if record.date < start || record.date > end {
                return false;
            }
        }
        if let Some(categories) = &self.categories {
            if !categories.contains(&record.category) {
                return false;
            }
        }
        if !optional_matches(&self.regions, record.region.as_deref()) {
            return false;
        }
        optional_matches(&self.customers, record.customer.as_deref())
    }

    /// Produce a new table with the matching rows in their original order.
    /// The input is left untouched.
    pub fn apply(&self, table: &SalesTable) -> SalesTable {
        if self.is_unrestricted() {
            return table.clone();
        }
        let records = table
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();
        table.derive(records)
    }
}

fn optional_matches(allowed: &Option<BTreeSet<String>>, value: Option<&str>) -> bool {
    match (allowed, value) {
        (None, _) => true,
        (Some(set), Some(v)) => set.contains(v),
        (Some(_), None) => false,
    }
}
