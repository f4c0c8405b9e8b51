//! Static Chart Renderer
//! Writes the trend and top-products charts of the current view to a PNG
//! file with plotters.
//!
//! Layout:
//! 1. Top half: "Sales Over Time" line with markers
//! 2. Bottom half: "Top N Products by Sales" bars

use crate::charts::series::{x_to_date, ChartData};
use crate::config::EXPORT_DATE_FORMAT;
use crate::error::ExportError;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

const LINE_COLOR: RGBColor = RGBColor(99, 110, 250);
const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);
const LABEL_CHARS: usize = 14;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

fn render_err<E: std::fmt::Display>(err: E) -> ExportError {
    ExportError::Render(err.to_string())
}

fn short_label(label: &str) -> String {
    if label.chars().count() > LABEL_CHARS {
        let head: String = label.chars().take(LABEL_CHARS - 1).collect();
        format!("{head}…")
    } else {
        label.to_string()
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the trend and top-products charts into one PNG.
    pub fn render_png(data: &ChartData, path: &Path, width: u32, height: u32) -> Result<(), ExportError> {
        if data.trend.is_empty() && data.top_products.is_empty() {
            return Err(ExportError::NoData("no rows match the current filters"));
        }

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let (upper, lower) = root.split_vertically((height / 2) as i32);
        Self::draw_trend(&upper, data)?;
        Self::draw_top_products(&lower, data)?;

        root.present().map_err(render_err)?;
        Ok(())
    }

    fn draw_trend(area: &Area<'_>, data: &ChartData) -> Result<(), ExportError> {
        let points = &data.trend;
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Ok(());
        };

        let (x_min, mut x_max) = (first.x, last.x);
        if x_max <= x_min {
            x_max = x_min + 1.0;
        }
        let y_max = points.iter().map(|p| p.value).fold(0.0, f64::max).max(1.0) * 1.1;
        let y_min = points.iter().map(|p| p.value).fold(0.0, f64::min) * 1.1;

        let mut chart = ChartBuilder::on(area)
            .caption(format!("Sales Over Time (by {})", data.period), ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(80)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&|x| {
                x_to_date(*x)
                    .map(|d| d.format(EXPORT_DATE_FORMAT).to_string())
                    .unwrap_or_default()
            })
            .y_desc("Sales")
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(LineSeries::new(points.iter().map(|p| (p.x, p.value)), &LINE_COLOR))
            .map_err(render_err)?;
        chart
            .draw_series(
                points
                    .iter()
                    .map(|p| Circle::new((p.x, p.value), 3, LINE_COLOR.filled())),
            )
            .map_err(render_err)?;
        Ok(())
    }

    fn draw_top_products(area: &Area<'_>, data: &ChartData) -> Result<(), ExportError> {
        let bars = &data.top_products;
        if bars.is_empty() {
            return Ok(());
        }

        let n = bars.len() as u32;
        let y_max = bars.max_value().max(1.0) * 1.1;
        let labels: Vec<String> = bars.labels.iter().map(|l| short_label(l)).collect();

        let mut chart = ChartBuilder::on(area)
            .caption(format!("Top {} Products by Sales", bars.len()), ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(80)
            .build_cartesian_2d((0u32..n).into_segmented(), 0.0..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len())
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .y_desc("Sales")
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(BAR_COLOR.filled())
                    .margin(8)
                    .data(bars.values.iter().enumerate().map(|(i, v)| (i as u32, *v))),
            )
            .map_err(render_err)?;
        Ok(())
    }
}
