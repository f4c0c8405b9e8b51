//! Charts module - Chart series, interactive plots and static rendering

mod plotter;
mod renderer;
mod series;

pub use plotter::ChartPlotter;
pub use renderer::StaticChartRenderer;
pub use series::{
    bar_series, date_to_x, share_slices, to_f64, trend_series, x_to_date, BarSeries, ChartData,
    ShareSlice, TrendPoint,
};
