//! Chart Series Module
//! Shapes filtered tables and aggregates into the inputs the chart widgets
//! and the static renderer draw from.

use crate::config::{HISTOGRAM_BINS, SHARE_SLICES};
use crate::data::SalesTable;
use crate::stats::{
    saturating_sum, AggregateResult, Aggregator, BoxSpread, CorrelationMatrix, GroupKey,
    GroupSummary, HistogramBin, Kpis, Period, StatsCalculator, Summary,
};
use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// One point of the sales trend. `x` is the bucket start as days from CE so
/// gaps between buckets keep their real width.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub label: String,
    pub x: f64,
    pub value: f64,
}

/// Parallel labels/values for bar charts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl BarSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShareSlice {
    pub label: String,
    pub value: f64,
    /// Portion of the total, 0..=1.
    pub fraction: f64,
}

/// Everything the dashboard draws for one filtered view.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub kpis: Kpis,
    pub summary: Summary,
    pub period: Period,
    pub trend: Vec<TrendPoint>,
    pub top_products: BarSeries,
    /// Sales per region; empty when the source has no region column.
    pub by_region: BarSeries,
    pub share: Vec<ShareSlice>,
    pub histogram: Vec<HistogramBin>,
    pub spread: Option<BoxSpread>,
    pub correlation: Option<CorrelationMatrix>,
}

impl ChartData {
    pub fn build(table: &SalesTable, period: Period, top_n: usize) -> Self {
        let amounts = table.amounts_f64();
        let by_category = Aggregator::aggregate(table, GroupKey::Category);

        Self {
            kpis: Aggregator::kpis(table),
            summary: StatsCalculator::describe(&amounts),
            period,
            trend: trend_series(&Aggregator::aggregate(table, GroupKey::Period(period))),
            top_products: bar_series(&by_category.top_n(top_n)),
            by_region: if table.schema().region.is_some() {
                let by_region = Aggregator::aggregate(table, GroupKey::Region);
                bar_series(&by_region.top_n(by_region.groups.len()))
            } else {
                BarSeries::default()
            },
            share: share_slices(&by_category, SHARE_SLICES),
            histogram: StatsCalculator::histogram(&amounts, HISTOGRAM_BINS),
            spread: StatsCalculator::box_spread(&amounts),
            correlation: StatsCalculator::correlation_matrix(table),
        }
    }
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

pub fn date_to_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Period aggregate as line points, chronological.
pub fn trend_series(result: &AggregateResult) -> Vec<TrendPoint> {
    result
        .groups
        .iter()
        .filter_map(|g| {
            Some(TrendPoint {
                label: g.key.clone(),
                x: date_to_x(g.bucket?),
                value: to_f64(g.sum),
            })
        })
        .collect()
}

pub fn bar_series(groups: &[GroupSummary]) -> BarSeries {
    BarSeries {
        labels: groups.iter().map(|g| g.key.clone()).collect(),
        values: groups.iter().map(|g| to_f64(g.sum)).collect(),
    }
}

/// Largest `slices` groups, the rest folded into "Other".
pub fn share_slices(result: &AggregateResult, slices: usize) -> Vec<ShareSlice> {
    let total = to_f64(result.total());
    let ranked = result.top_n(result.groups.len());
    let (head, tail) = ranked.split_at(slices.min(ranked.len()));

    let fraction = |value: f64| if total != 0.0 { value / total } else { 0.0 };
    let mut out: Vec<ShareSlice> = head
        .iter()
        .map(|g| {
            let value = to_f64(g.sum);
            ShareSlice {
                label: g.key.clone(),
                value,
                fraction: fraction(value),
            }
        })
        .collect();

    if !tail.is_empty() {
        let rest = saturating_sum(tail.iter().map(|g| g.sum));
        let value = to_f64(rest);
        out.push(ShareSlice {
            label: "Other".to_string(),
            value,
            fraction: fraction(value),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SalesRecord;

    fn table() -> SalesTable {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        SalesTable::from_records(
            (1..=10)
                .map(|i| SalesRecord::new(d(i), Decimal::from(i), format!("P{i:02}")))
                .collect(),
        )
    }

    #[test]
    fn share_folds_tail_into_other() {
        let by_category = Aggregator::aggregate(&table(), GroupKey::Category);
        let share = share_slices(&by_category, 8);
        assert_eq!(share.len(), 9);
        assert_eq!(share[0].label, "P10");
        assert_eq!(share[8].label, "Other");
        assert_eq!(share[8].value, 3.0);
        let total: f64 = share.iter().map(|s| s.fraction).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn trend_points_round_trip_dates() {
        let data = ChartData::build(&table(), Period::Day, 5);
        assert_eq!(data.trend.len(), 10);
        assert_eq!(x_to_date(data.trend[0].x), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(data.top_products.labels, vec!["P10", "P09", "P08", "P07", "P06"]);
    }
}
