//! Aggregator Module
//! Grouped sums, counts and averages over a sales table, plus the headline KPIs.

use crate::config::UNSPECIFIED_LABEL;
use crate::data::{SalesRecord, SalesTable};
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Calendar bucket for trend grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Period {
    #[default]
    Day,
    /// ISO week, starting Monday.
    Week,
    Month,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Day, Period::Week, Period::Month];

    /// First date of the bucket containing `date`.
    pub fn bucket(self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => date,
            Period::Week => date - Duration::days(i64::from(date.weekday().num_days_from_monday())),
            Period::Month => date.with_day(1).unwrap_or(date),
        }
    }

    /// Display label of a bucket start.
    pub fn label(self, bucket: NaiveDate) -> String {
        match self {
            Period::Day => bucket.format("%Y-%m-%d").to_string(),
            Period::Week => bucket.format("%G-W%V").to_string(),
            Period::Month => bucket.format("%Y-%m").to_string(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Period::Day => "Day",
            Period::Week => "Week",
            Period::Month => "Month",
        };
        f.write_str(name)
    }
}

/// What rows are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GroupKey {
    Category,
    Region,
    Customer,
    Period(Period),
}

/// Summary of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    /// Bucket start for period groupings.
    pub bucket: Option<NaiveDate>,
    pub sum: Decimal,
    pub count: u64,
    /// `None` only for a group without rows.
    pub mean: Option<Decimal>,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub key: GroupKey,
    /// Categorical groups ordered by key, period groups chronologically.
    pub groups: Vec<GroupSummary>,
}

impl AggregateResult {
    /// Sum across all groups.
    pub fn total(&self) -> Decimal {
        saturating_sum(self.groups.iter().map(|g| g.sum))
    }

    pub fn count(&self) -> u64 {
        self.groups.iter().map(|g| g.count).sum()
    }

    pub fn get(&self, key: &str) -> Option<&GroupSummary> {
        self.groups.iter().find(|g| g.key == key)
    }

    /// Group sums keyed by label.
    pub fn sums(&self) -> BTreeMap<String, Decimal> {
        self.groups.iter().map(|g| (g.key.clone(), g.sum)).collect()
    }

    /// The `n` largest groups by sum (ties broken by key).
    pub fn top_n(&self, n: usize) -> Vec<GroupSummary> {
        let mut groups = self.groups.clone();
        groups.sort_by(|a, b| b.sum.cmp(&a.sum).then_with(|| a.key.cmp(&b.key)));
        groups.truncate(n);
        groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Headline metrics shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_sales: Decimal,
    /// `None` for an empty table.
    pub average_sale: Option<Decimal>,
    pub transactions: usize,
    pub unique_products: usize,
    pub total_quantity: u64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

#[derive(Default)]
struct Accumulator {
    sum: Decimal,
    count: u64,
    quantity: u64,
}

impl Accumulator {
    fn add(&mut self, record: &SalesRecord) {
        self.sum = self.sum.saturating_add(record.amount);
        self.count += 1;
        self.quantity = self.quantity.saturating_add(record.quantity.unwrap_or(0));
    }

    fn finish(self, key: String, bucket: Option<NaiveDate>) -> GroupSummary {
        GroupSummary {
            key,
            bucket,
            sum: self.sum,
            count: self.count,
            mean: mean(self.sum, self.count),
            quantity: self.quantity,
        }
    }
}

/// Sum that clamps at `Decimal::MAX`/`MIN` instead of panicking. Validated
/// amounts are bounded so this only clamps for hand-built tables.
pub fn saturating_sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

fn mean(sum: Decimal, count: u64) -> Option<Decimal> {
    if count == 0 {
        return None;
    }
    sum.checked_div(Decimal::from(count))
}

fn fold<'a, K, F>(records: impl Iterator<Item = &'a SalesRecord>, key: F) -> BTreeMap<K, Accumulator>
where
    K: Ord,
    F: Fn(&'a SalesRecord) -> K,
{
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    for record in records {
        groups.entry(key(record)).or_default().add(record);
    }
    groups
}

fn label_or_unspecified(value: Option<&str>) -> String {
    value.unwrap_or(UNSPECIFIED_LABEL).to_string()
}

/// Computes grouped summaries and KPIs.
pub struct Aggregator;

impl Aggregator {
    /// Group and reduce a table. Only groups with at least one row appear;
    /// rows with no region or customer fall under `(unspecified)` so group
    /// sums always add up to the table total.
    pub fn aggregate(table: &SalesTable, key: GroupKey) -> AggregateResult {
        let groups: Vec<GroupSummary> = match key {
            GroupKey::Category => fold(table.iter(), |r| r.category.clone())
                .into_iter()
                .map(|(k, acc)| acc.finish(k, None))
                .collect(),
            GroupKey::Region => fold(table.iter(), |r| label_or_unspecified(r.region.as_deref()))
                .into_iter()
                .map(|(k, acc)| acc.finish(k, None))
                .collect(),
            GroupKey::Customer => fold(table.iter(), |r| label_or_unspecified(r.customer.as_deref()))
                .into_iter()
                .map(|(k, acc)| acc.finish(k, None))
                .collect(),
            GroupKey::Period(period) => fold(table.iter(), |r| period.bucket(r.date))
                .into_iter()
                .map(|(bucket, acc)| acc.finish(period.label(bucket), Some(bucket)))
                .collect(),
        };
        AggregateResult { key, groups }
    }

    pub fn kpis(table: &SalesTable) -> Kpis {
        let total_sales = saturating_sum(table.iter().map(|r| r.amount));
        let transactions = table.len();
        let unique_products = table
            .iter()
            .map(|r| r.category.as_str())
            .collect::<BTreeSet<_>>()
            .len();
        let total_quantity = table
            .iter()
            .filter_map(|r| r.quantity)
            .fold(0u64, u64::saturating_add);
        let span = table.date_span();

        Kpis {
            total_sales,
            average_sale: mean(total_sales, transactions as u64),
            transactions,
            unique_products,
            total_quantity,
            first_date: span.map(|(first, _)| first),
            last_date: span.map(|(_, last)| last),
        }
    }
}
