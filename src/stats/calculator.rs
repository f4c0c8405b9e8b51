//! Statistics Calculator Module
//! Descriptive statistics, distribution shapes and correlations for the
//! amount column and the other numeric columns of a sales table.

use crate::data::SalesTable;
use rayon::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Descriptive statistics, in the order a summary export lists them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            median: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        }
    }
}

impl Summary {
    /// `(statistic, value)` pairs.
    pub fn rows(&self) -> [(&'static str, f64); 8] {
        [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.p25),
            ("50%", self.median),
            ("75%", self.p75),
            ("max", self.max),
        ]
    }
}

/// One histogram bar: `[lower, upper)`, the last bin closed on the right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Box-plot geometry with 1.5 IQR whiskers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSpread {
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

/// Pearson correlations between numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major, `labels.len()` squared; `NaN` where undefined.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied()
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn describe(values: &[f64]) -> Summary {
        let n = values.len();
        if n == 0 {
            return Summary::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Summary {
            count: n,
            mean: Statistics::mean(values.iter()),
            std: Statistics::std_dev(values.iter()),
            min: sorted[0],
            p25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            p75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Summary of the amount column.
    pub fn describe_amounts(table: &SalesTable) -> Summary {
        Self::describe(&table.amounts_f64())
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Equal-width bins spanning the value range.
    pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return Vec::new();
        }

        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if min == max {
            return vec![HistogramBin {
                lower: min,
                upper: max,
                count: finite.len(),
            }];
        }

        let width = (max - min) / bins as f64;
        let mut counts = vec![0usize; bins];
        for v in &finite {
            let idx = (((v - min) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: min + i as f64 * width,
                upper: min + (i + 1) as f64 * width,
                count,
            })
            .collect()
    }

    pub fn box_spread(values: &[f64]) -> Option<BoxSpread> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let q1 = Self::percentile(&sorted, 25.0);
        let median = Self::percentile(&sorted, 50.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;

        let whisker_low = sorted.iter().copied().find(|&v| v >= low_fence).unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < low_fence || v > high_fence)
            .collect();

        Some(BoxSpread {
            whisker_low,
            q1,
            median,
            q3,
            whisker_high,
            outliers,
        })
    }

    /// Pearson correlation over rows where both values are present.
    /// `NaN` with fewer than two pairs or a constant column.
    pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
        let (xs, ys): (Vec<f64>, Vec<f64>) = x
            .iter()
            .zip(y.iter())
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .unzip();
        if xs.len() < 2 {
            return f64::NAN;
        }

        let sx = Statistics::std_dev(xs.iter());
        let sy = Statistics::std_dev(ys.iter());
        if sx == 0.0 || sy == 0.0 || !sx.is_finite() || !sy.is_finite() {
            return f64::NAN;
        }
        Statistics::covariance(xs.iter(), ys.iter()) / (sx * sy)
    }

    /// Numeric columns of a table: amount, quantity (if present) and measures.
    pub fn numeric_columns(table: &SalesTable) -> Vec<(String, Vec<Option<f64>>)> {
        let schema = table.schema();
        let mut columns = vec![(
            schema.amount.clone(),
            table.iter().map(|r| r.amount.to_f64()).collect::<Vec<_>>(),
        )];

        if let Some(name) = &schema.quantity {
            let values: Vec<Option<f64>> = table.iter().map(|r| r.quantity.map(|q| q as f64)).collect();
            if values.iter().any(Option::is_some) {
                columns.push((name.clone(), values));
            }
        }

        for (idx, name) in schema.measures.iter().enumerate() {
            let values = table
                .iter()
                .map(|r| r.measures.get(idx).copied().flatten())
                .collect();
            columns.push((name.clone(), values));
        }
        columns
    }

    /// Correlation matrix over all numeric columns, pairs computed in
    /// parallel. `None` with fewer than two numeric columns.
    pub fn correlation_matrix(table: &SalesTable) -> Option<CorrelationMatrix> {
        let columns = Self::numeric_columns(table);
        let n = columns.len();
        if n < 2 {
            return None;
        }

        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();

        // Use rayon for parallel computation
        let coefficients: Vec<(usize, usize, f64)> = pairs
            .par_iter()
            .map(|&(i, j)| (i, j, Self::pearson(&columns[i].1, &columns[j].1)))
            .collect();

        let mut values = vec![vec![f64::NAN; n]; n];
        for (i, row) in values.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        for (i, j, r) in coefficients {
            values[i][j] = r;
            values[j][i] = r;
        }

        Some(CorrelationMatrix {
            labels: columns.into_iter().map(|(name, _)| name).collect(),
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_matches_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(StatsCalculator::percentile(&sorted, 50.0), 2.5);
        assert_eq!(StatsCalculator::percentile(&sorted, 25.0), 1.75);
        assert!(StatsCalculator::percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn describe_matches_sample_statistics() {
        let s = StatsCalculator::describe(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(s.count, 8);
        assert!((s.mean - 5.0).abs() < 1e-12);
        assert!((s.std - 2.138_089_935_299_395).abs() < 1e-9);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
        assert_eq!(s.median, 4.5);
    }

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let bins = StatsCalculator::histogram(&values, 30);
        assert_eq!(bins.len(), 30);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_eq!(StatsCalculator::histogram(&[5.0, 5.0], 30).len(), 1);
    }

    #[test]
    fn box_spread_flags_outliers() {
        let spread = StatsCalculator::box_spread(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(spread.outliers, vec![100.0]);
        assert_eq!(spread.whisker_high, 4.0);
    }

    #[test]
    fn pearson_of_linear_relation_is_one() {
        let x: Vec<Option<f64>> = [1.0, 2.0, 3.0].iter().map(|v| Some(*v)).collect();
        let y: Vec<Option<f64>> = [2.0, 4.0, 6.0].iter().map(|v| Some(*v)).collect();
        assert!((StatsCalculator::pearson(&x, &y) - 1.0).abs() < 1e-12);
        assert!(StatsCalculator::pearson(&x[..1], &y[..1]).is_nan());
    }
}
