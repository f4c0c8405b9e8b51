//! Chart Plotter Module
//! Draws the dashboard's interactive charts with egui_plot.

use crate::charts::series::{x_to_date, BarSeries, ChartData};
use crate::stats::CorrelationMatrix;
use egui::{Align2, Color32, FontId, RichText, Sense};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points};

pub const TREND_COLOR: Color32 = Color32::from_rgb(99, 110, 250);
pub const HISTOGRAM_COLOR: Color32 = Color32::from_rgb(99, 110, 250);
pub const BOX_COLOR: Color32 = Color32::from_rgb(239, 85, 59);

/// Color palette for categorical bars
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219), // Blue
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(121, 85, 72),  // Brown
    Color32::from_rgb(96, 125, 139), // Blue Grey
];

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn palette_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Blue intensity proportional to `value / max`, like a continuous color scale.
    fn scaled_blue(value: f64, max: f64) -> Color32 {
        let t = if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 };
        let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
        Color32::from_rgb(lerp(198.0, 8.0), lerp(219.0, 48.0), lerp(239.0, 107.0))
    }

    /// Red-white-blue diverging color for a correlation in -1..=1.
    fn diverging(r: f64) -> Color32 {
        if !r.is_finite() {
            return Color32::from_gray(200);
        }
        let t = r.clamp(-1.0, 1.0);
        let fade = |full: u8, amount: f64| (255.0 - (255.0 - f64::from(full)) * amount).round() as u8;
        if t >= 0.0 {
            Color32::from_rgb(fade(33, t), fade(102, t), fade(172, t))
        } else {
            Color32::from_rgb(fade(178, -t), fade(24, -t), fade(43, -t))
        }
    }

    /// Sales over time, one marker per period bucket.
    pub fn draw_trend_chart(ui: &mut egui::Ui, data: &ChartData, height: f32) {
        let points: Vec<[f64; 2]> = data.trend.iter().map(|p| [p.x, p.value]).collect();
        let labels: Vec<(f64, String)> = data.trend.iter().map(|p| (p.x, p.label.clone())).collect();

        Plot::new("sales_trend")
            .height(height)
            .allow_scroll(false)
            .x_axis_label(format!("Date (by {})", data.period))
            .y_axis_label("Sales")
            .x_axis_formatter(|mark, _range| {
                x_to_date(mark.value)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            })
            .label_formatter(move |_name, value| {
                let label = labels
                    .iter()
                    .min_by(|a, b| (a.0 - value.x).abs().total_cmp(&(b.0 - value.x).abs()))
                    .map(|(_, l)| l.clone())
                    .unwrap_or_default();
                format!("{}\n{:.2}", label, value.y)
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().copied()))
                        .color(TREND_COLOR)
                        .width(2.0)
                        .name("Sales"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(3.5)
                        .color(TREND_COLOR),
                );
            });
    }

    /// Vertical bars with category labels on the x axis, shaded by value.
    pub fn draw_bar_chart(ui: &mut egui::Ui, id: &str, series: &BarSeries, height: f32) {
        let max = series.max_value();
        let bars: Vec<Bar> = series
            .labels
            .iter()
            .zip(series.values.iter())
            .enumerate()
            .map(|(i, (label, value))| {
                Bar::new(i as f64, *value)
                    .width(0.7)
                    .name(label)
                    .fill(Self::scaled_blue(*value, max))
            })
            .collect();
        let labels = series.labels.clone();

        Plot::new(id)
            .height(height)
            .allow_scroll(false)
            .y_axis_label("Sales")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Sales"));
            });
    }

    /// Distribution of single-sale amounts.
    pub fn draw_histogram(ui: &mut egui::Ui, data: &ChartData, height: f32) {
        let bars: Vec<Bar> = data
            .histogram
            .iter()
            .map(|bin| {
                let width = (bin.upper - bin.lower).max(f64::EPSILON);
                Bar::new((bin.lower + bin.upper) / 2.0, bin.count as f64)
                    .width(width)
                    .name(format!("{:.2} – {:.2}", bin.lower, bin.upper))
            })
            .collect();

        Plot::new("sales_histogram")
            .height(height)
            .allow_scroll(false)
            .x_axis_label("Sale amount")
            .y_axis_label("Count")
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(HISTOGRAM_COLOR).name("Sales"));
            });
    }

    /// Box plot of single-sale amounts with outliers as points.
    pub fn draw_box_plot(ui: &mut egui::Ui, data: &ChartData, height: f32) {
        let Some(spread) = &data.spread else {
            ui.label("No data");
            return;
        };

        let elem = BoxElem::new(
            0.0,
            BoxSpread::new(
                spread.whisker_low,
                spread.q1,
                spread.median,
                spread.q3,
                spread.whisker_high,
            ),
        )
        .box_width(0.5)
        .fill(BOX_COLOR.gamma_multiply(0.3))
        .stroke(egui::Stroke::new(1.5, BOX_COLOR))
        .name("Sales");

        let outliers: PlotPoints = spread.outliers.iter().map(|&v| [0.0, v]).collect();

        Plot::new("sales_box")
            .height(height)
            .allow_scroll(false)
            .show_x(false)
            .y_axis_label("Sale amount")
            .include_x(-1.0)
            .include_x(1.0)
            .show(ui, |plot_ui| {
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name("Sales"));
                plot_ui.points(
                    Points::new(outliers)
                        .radius(3.0)
                        .color(BOX_COLOR)
                        .name("Outliers"),
                );
            });
    }

    /// Share of sales per product: one horizontal bar per slice with its percentage.
    pub fn draw_share_chart(ui: &mut egui::Ui, data: &ChartData, height: f32) {
        let bars: Vec<Bar> = data
            .share
            .iter()
            .enumerate()
            .map(|(i, slice)| {
                Bar::new(i as f64, slice.fraction * 100.0)
                    .width(0.7)
                    .name(format!("{} ({:.1}%)", slice.label, slice.fraction * 100.0))
                    .fill(Self::palette_color(i))
            })
            .collect();
        let labels: Vec<String> = data.share.iter().map(|s| s.label.clone()).collect();

        Plot::new("sales_share")
            .height(height)
            .allow_scroll(false)
            .legend(Legend::default())
            .y_axis_label("Share of sales (%)")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Share"));
            });
    }

    /// Correlation matrix as a grid of colored cells with coefficients.
    pub fn draw_heatmap(ui: &mut egui::Ui, matrix: &CorrelationMatrix) {
        let n = matrix.labels.len();
        let cell = ((ui.available_width() - 140.0) / n as f32).clamp(40.0, 110.0);

        egui::Grid::new("correlation_heatmap")
            .spacing([2.0, 2.0])
            .show(ui, |ui| {
                ui.label("");
                for label in &matrix.labels {
                    ui.add_sized([cell, 20.0], egui::Label::new(RichText::new(label).strong()).truncate());
                }
                ui.end_row();

                for (row, label) in matrix.labels.iter().enumerate() {
                    ui.add_sized([130.0, cell], egui::Label::new(RichText::new(label).strong()).truncate());
                    for col in 0..n {
                        let r = matrix.get(row, col).unwrap_or(f64::NAN);
                        let (rect, response) = ui.allocate_exact_size(egui::vec2(cell, cell), Sense::hover());
                        ui.painter().rect_filled(rect, 2.0, Self::diverging(r));
                        let text = if r.is_finite() { format!("{r:.2}") } else { "–".to_string() };
                        let text_color = if r.abs() > 0.6 { Color32::WHITE } else { Color32::BLACK };
                        ui.painter().text(
                            rect.center(),
                            Align2::CENTER_CENTER,
                            text,
                            FontId::proportional(13.0),
                            text_color,
                        );
                        response.on_hover_text(format!("{} vs {}", matrix.labels[row], matrix.labels[col]));
                    }
                    ui.end_row();
                }
            });
    }
}
