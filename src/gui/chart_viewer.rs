//! Chart Viewer Widget
//! Central panel: KPI cards, tabbed charts and the optional raw data grid.

use crate::charts::{ChartData, ChartPlotter};
use crate::config::RAW_GRID_MAX_ROWS;
use crate::data::SalesTable;
use crate::export::DataExporter;
use egui::{Color32, RichText, ScrollArea};
use polars::prelude::{AnyValue, DataFrame};

const CHART_HEIGHT: f32 = 380.0;
const CARD_WIDTH: f32 = 190.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartTab {
    #[default]
    Trends,
    Distribution,
    Breakdown,
    Heatmap,
}

impl ChartTab {
    const ALL: [ChartTab; 4] = [
        ChartTab::Trends,
        ChartTab::Distribution,
        ChartTab::Breakdown,
        ChartTab::Heatmap,
    ];

    fn title(self) -> &'static str {
        match self {
            ChartTab::Trends => "📈 Trends",
            ChartTab::Distribution => "📊 Distribution",
            ChartTab::Breakdown => "🧩 Breakdown",
            ChartTab::Heatmap => "🔥 Heatmap",
        }
    }
}

/// Scrollable dashboard for the current filtered view.
#[derive(Default)]
pub struct ChartViewer {
    pub chart_data: Option<ChartData>,
    pub tab: ChartTab,
    /// Rows in the loaded table before filtering.
    pub total_rows: usize,
    /// Rows in the current filtered view.
    pub filtered_rows: usize,
    /// First rows of the filtered view, laid out for the raw data grid.
    raw_preview: Option<Result<DataFrame, String>>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.chart_data = None;
        self.total_rows = 0;
        self.filtered_rows = 0;
        self.raw_preview = None;
    }

    /// Install the charts and raw data preview for a new filtered view.
    pub fn set_view(&mut self, chart_data: ChartData, filtered: &SalesTable) {
        self.chart_data = Some(chart_data);
        self.filtered_rows = filtered.len();
        self.raw_preview = Some(
            DataExporter::to_dataframe(&filtered.head(RAW_GRID_MAX_ROWS)).map_err(|e| e.to_string()),
        );
    }

    /// Draw the dashboard.
    pub fn show(&mut self, ui: &mut egui::Ui, show_raw: bool) {
        let Some(data) = &self.chart_data else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(RichText::new("📊 Sales Analytics Dashboard").size(22.0).strong());
                ui.label(
                    RichText::new(format!("Showing {} of {} rows", self.filtered_rows, self.total_rows))
                        .size(12.0)
                        .color(Color32::GRAY),
                );
                ui.add_space(10.0);

                Self::draw_kpis(ui, data);
                ui.add_space(15.0);

                if data.kpis.transactions == 0 {
                    ui.label(
                        RichText::new("No rows match the current filters.")
                            .size(16.0)
                            .color(Color32::from_rgb(243, 156, 18)),
                    );
                } else {
                    ui.horizontal(|ui| {
                        for tab in ChartTab::ALL {
                            ui.selectable_value(&mut self.tab, tab, RichText::new(tab.title()).size(14.0));
                        }
                    });
                    ui.separator();
                    ui.add_space(8.0);

                    match self.tab {
                        ChartTab::Trends => Self::draw_trends(ui, data),
                        ChartTab::Distribution => Self::draw_distribution(ui, data),
                        ChartTab::Breakdown => Self::draw_breakdown(ui, data),
                        ChartTab::Heatmap => Self::draw_heatmap(ui, data),
                    }
                }

                if show_raw {
                    if let Some(preview) = &self.raw_preview {
                        ui.add_space(15.0);
                        ui.separator();
                        Self::draw_raw_grid(ui, preview, self.filtered_rows);
                    }
                }
            });
    }

    fn card(ui: &mut egui::Ui, title: &str, value: String) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, Color32::from_rgb(100, 149, 237)))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(CARD_WIDTH);
                ui.label(RichText::new(title).size(12.0).color(Color32::GRAY));
                ui.label(RichText::new(value).size(22.0).strong());
            });
    }

    fn draw_kpis(ui: &mut egui::Ui, data: &ChartData) {
        let kpis = &data.kpis;
        ui.horizontal_wrapped(|ui| {
            Self::card(ui, "Total Sales", format!("{:.2}", kpis.total_sales));
            Self::card(
                ui,
                "Average Sale",
                kpis.average_sale
                    .map(|v| format!("{v:.2}"))
                    .unwrap_or_else(|| "–".to_string()),
            );
            Self::card(ui, "Transactions", kpis.transactions.to_string());
            Self::card(ui, "Unique Products", kpis.unique_products.to_string());
            if kpis.total_quantity > 0 {
                Self::card(ui, "Units Sold", kpis.total_quantity.to_string());
            }
        });
        if let (Some(first), Some(last)) = (kpis.first_date, kpis.last_date) {
            ui.label(
                RichText::new(format!("Period: {first} to {last}"))
                    .size(12.0)
                    .color(Color32::GRAY),
            );
        }
    }

    fn section(ui: &mut egui::Ui, title: &str) {
        ui.add_space(6.0);
        ui.label(RichText::new(title).size(16.0).strong());
        ui.add_space(4.0);
    }

    fn draw_trends(ui: &mut egui::Ui, data: &ChartData) {
        Self::section(ui, &format!("Sales Over Time (by {})", data.period));
        ChartPlotter::draw_trend_chart(ui, data, CHART_HEIGHT);

        Self::section(ui, &format!("Top {} Products by Sales", data.top_products.len()));
        ChartPlotter::draw_bar_chart(ui, "top_products", &data.top_products, CHART_HEIGHT);
    }

    fn draw_distribution(ui: &mut egui::Ui, data: &ChartData) {
        let half = (ui.available_width() - 20.0) / 2.0;
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.set_width(half);
                Self::section(ui, "Sales Distribution");
                ChartPlotter::draw_histogram(ui, data, CHART_HEIGHT);
            });
            ui.add_space(10.0);
            ui.vertical(|ui| {
                ui.set_width(half);
                Self::section(ui, "Sales Box Plot");
                ChartPlotter::draw_box_plot(ui, data, CHART_HEIGHT);
            });
        });

        Self::section(ui, "Summary Statistics");
        egui::Grid::new("summary_stats")
            .striped(true)
            .spacing([30.0, 4.0])
            .show(ui, |ui| {
                for (name, value) in data.summary.rows() {
                    ui.label(RichText::new(name).strong());
                    ui.label(format!("{value:.2}"));
                    ui.end_row();
                }
            });
    }

    fn draw_breakdown(ui: &mut egui::Ui, data: &ChartData) {
        Self::section(ui, "Sales Share by Product");
        ChartPlotter::draw_share_chart(ui, data, CHART_HEIGHT);

        if !data.by_region.is_empty() {
            Self::section(ui, "Sales by Region");
            ChartPlotter::draw_bar_chart(ui, "sales_by_region", &data.by_region, CHART_HEIGHT);
        }
    }

    fn draw_heatmap(ui: &mut egui::Ui, data: &ChartData) {
        Self::section(ui, "Correlation Heatmap");
        match &data.correlation {
            Some(matrix) => ChartPlotter::draw_heatmap(ui, matrix),
            None => {
                ui.label(
                    RichText::new("Not enough numeric columns for a correlation matrix.")
                        .color(Color32::GRAY),
                );
            }
        }
    }

    fn draw_raw_grid(ui: &mut egui::Ui, preview: &Result<DataFrame, String>, total: usize) {
        Self::section(ui, "Raw Data");

        let df = match preview {
            Ok(df) => df,
            Err(e) => {
                ui.colored_label(Color32::from_rgb(220, 53, 69), format!("Error: {e}"));
                return;
            }
        };
        let shown = df.height();
        if shown < total {
            ui.label(
                RichText::new(format!("First {shown} of {total} rows"))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }

        let columns = df.get_columns();
        ScrollArea::both()
            .id_salt("raw_grid")
            .max_height(400.0)
            .show(ui, |ui| {
                egui::Grid::new("raw_data")
                    .striped(true)
                    .spacing([16.0, 4.0])
                    .show(ui, |ui| {
                        for column in columns {
                            ui.label(RichText::new(column.name().as_str()).strong());
                        }
                        ui.end_row();

                        for row in 0..shown {
                            for column in columns {
                                let text = match column.get(row) {
                                    Ok(AnyValue::Null) | Err(_) => String::new(),
                                    Ok(AnyValue::String(s)) => s.to_string(),
                                    Ok(value) => value.to_string(),
                                };
                                ui.label(text);
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SalesRecord;
    use crate::stats::Period;
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;

    #[test]
    fn raw_preview_is_capped_and_built_once_per_view() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records = (0..RAW_GRID_MAX_ROWS + 25)
            .map(|i| SalesRecord::new(start + Duration::days(i as i64), Decimal::from(i as i64 + 1), "Widget"))
            .collect();
        let table = SalesTable::from_records(records);

        let mut viewer = ChartViewer::new();
        viewer.set_view(ChartData::build(&table, Period::Month, 5), &table);
        assert_eq!(viewer.filtered_rows, RAW_GRID_MAX_ROWS + 25);
        let preview = viewer.raw_preview.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(preview.height(), RAW_GRID_MAX_ROWS);

        viewer.clear();
        assert!(viewer.raw_preview.is_none());
        assert_eq!(viewer.filtered_rows, 0);
    }
}
