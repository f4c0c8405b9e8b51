//! Statistics module - aggregation, KPIs and descriptive statistics

mod aggregator;
mod calculator;

pub use aggregator::{
    saturating_sum, AggregateResult, Aggregator, GroupKey, GroupSummary, Kpis, Period,
};
pub use calculator::{BoxSpread, CorrelationMatrix, HistogramBin, StatsCalculator, Summary};
