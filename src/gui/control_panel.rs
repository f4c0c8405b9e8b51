//! Control Panel Widget
//! Left side panel: data source, filters, export buttons and status.

use crate::config::{TOP_N_MAX, TOP_N_MIN, TOP_N_DEFAULT};
use crate::data::{parse_date, FilterCriteria, SalesTable};
use crate::stats::Period;
use chrono::NaiveDate;
use egui::{Color32, RichText, ScrollArea};
use std::path::PathBuf;

/// Where the next load comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    #[default]
    Upload,
    Drive,
}

/// User settings for the dashboard
#[derive(Clone)]
pub struct UserSettings {
    pub source_mode: SourceMode,
    pub file_path: Option<PathBuf>,
    /// Drive file ID or shareable link.
    pub drive_input: String,
    pub show_raw: bool,
    pub date_from: String,
    pub date_to: String,
    pub period: Period,
    pub top_n: usize,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            source_mode: SourceMode::default(),
            file_path: None,
            drive_input: String::new(),
            show_raw: false,
            date_from: String::new(),
            date_to: String::new(),
            period: Period::default(),
            top_n: TOP_N_DEFAULT,
        }
    }
}

/// A multi-select list where every option starts selected.
#[derive(Default, Clone)]
pub struct MultiSelect {
    pub options: Vec<String>,
    pub selected: Vec<bool>,
}

impl MultiSelect {
    pub fn new(options: Vec<String>) -> Self {
        let selected = vec![true; options.len()];
        Self { options, selected }
    }

    /// `None` when nothing is deselected (no restriction).
    pub fn restriction(&self) -> Option<Vec<String>> {
        if self.selected.iter().all(|s| *s) {
            return None;
        }
        Some(
            self.options
                .iter()
                .zip(self.selected.iter())
                .filter(|(_, &selected)| selected)
                .map(|(opt, _)| opt.clone())
                .collect(),
        )
    }

    fn show(&mut self, ui: &mut egui::Ui, id: &str) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt(id)
                    .max_height(140.0)
                    .show(ui, |ui| {
                        for (i, opt) in self.options.iter().enumerate() {
                            if i < self.selected.len() {
                                ui.checkbox(&mut self.selected[i], opt);
                            }
                        }
                    });
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if ui.small_button("Select All").clicked() {
                self.selected.iter_mut().for_each(|v| *v = true);
            }
            if ui.small_button("Clear All").clicked() {
                self.selected.iter_mut().for_each(|v| *v = false);
            }
        });
    }
}

/// Left side control panel with data source, filters and exports.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub categories: MultiSelect,
    pub regions: MultiSelect,
    pub customers: MultiSelect,
    pub progress: f32,
    pub status: String,
    pub data_loaded: bool,
    /// Bounds of the loaded data, shown as hints in the date inputs.
    pub date_span: Option<(NaiveDate, NaiveDate)>,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            categories: MultiSelect::default(),
            regions: MultiSelect::default(),
            customers: MultiSelect::default(),
            progress: 0.0,
            status: "Ready".to_string(),
            data_loaded: false,
            date_span: None,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset filter options for a freshly loaded table.
    pub fn update_options(&mut self, table: &SalesTable) {
        self.categories = MultiSelect::new(table.categories());
        self.regions = MultiSelect::new(table.regions());
        self.customers = MultiSelect::new(table.customers());
        self.date_span = table.date_span();
        self.settings.date_from.clear();
        self.settings.date_to.clear();
        self.data_loaded = true;
    }

    /// Build filter criteria from the current controls. Blank date inputs are
    /// open bounds; an unparseable date is reported as an error.
    pub fn criteria(&self) -> Result<FilterCriteria, String> {
        let parse = |label: &str, text: &str| -> Result<Option<NaiveDate>, String> {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            parse_date(text)
                .map(Some)
                .ok_or_else(|| format!("{label} date '{text}' is not a valid date"))
        };

        let from = parse("Start", &self.settings.date_from)?;
        let to = parse("End", &self.settings.date_to)?;

        let mut criteria = FilterCriteria::new();
        if from.is_some() || to.is_some() {
            criteria = criteria.with_date_range(
                from.unwrap_or(NaiveDate::MIN),
                to.unwrap_or(NaiveDate::MAX),
            );
        }
        if let Some(categories) = self.categories.restriction() {
            criteria = criteria.with_categories(categories);
        }
        if let Some(regions) = self.regions.restriction() {
            criteria = criteria.with_regions(regions);
        }
        if let Some(customers) = self.customers.restriction() {
            criteria = criteria.with_customers(customers);
        }
        Ok(criteria)
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, busy: bool) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Sales Analytics")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Visualize and analyze your sales data")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("🔧 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.radio_value(&mut self.settings.source_mode, SourceMode::Upload, "Local File");
            ui.radio_value(&mut self.settings.source_mode, SourceMode::Drive, "Google Drive");
        });
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| match self.settings.source_mode {
                SourceMode::Upload => {
                    ui.horizontal(|ui| {
                        let path_text = self
                            .settings
                            .file_path
                            .as_ref()
                            .and_then(|p| p.file_name())
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_else(|| "No file selected".to_string());

                        ui.label(RichText::new(&path_text).size(12.0).color(
                            if self.settings.file_path.is_some() {
                                Color32::WHITE
                            } else {
                                Color32::GRAY
                            },
                        ));

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.add_enabled_ui(!busy, |ui| {
                                if ui.button("📂 Browse").clicked() {
                                    action = ControlPanelAction::BrowseFile;
                                }
                            });
                        });
                    });
                }
                SourceMode::Drive => {
                    ui.label("File ID or shareable link:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.settings.drive_input)
                            .hint_text("1ABC123xyz456")
                            .desired_width(f32::INFINITY),
                    );
                    ui.label(
                        RichText::new("The file must be shared with \"Anyone with the link\".")
                            .size(10.0)
                            .color(Color32::GRAY),
                    );
                    ui.add_space(4.0);
                    ui.add_enabled_ui(!busy, |ui| {
                        if ui.button("⬇ Load Data").clicked() {
                            action = ControlPanelAction::LoadDrive;
                        }
                    });
                }
            });

        if !self.data_loaded {
            ui.add_space(15.0);
            self.show_status(ui);
            return action;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Filters Section =====
        ui.label(RichText::new("🔍 Filters").size(14.0).strong());
        ui.add_space(8.0);

        ui.checkbox(&mut self.settings.show_raw, "Show Raw Data");
        ui.add_space(5.0);

        let label_width = 80.0;
        let (hint_from, hint_to) = self
            .date_span
            .map(|(a, b)| (a.format("%Y-%m-%d").to_string(), b.format("%Y-%m-%d").to_string()))
            .unwrap_or_default();

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Start date:"));
            ui.add(
                egui::TextEdit::singleline(&mut self.settings.date_from)
                    .hint_text(hint_from)
                    .desired_width(120.0),
            );
        });
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("End date:"));
            ui.add(
                egui::TextEdit::singleline(&mut self.settings.date_to)
                    .hint_text(hint_to)
                    .desired_width(120.0),
            );
        });

        ui.add_space(8.0);
        ui.label("Categories:");
        self.categories.show(ui, "category_filter");

        if !self.regions.options.is_empty() {
            ui.add_space(8.0);
            ui.label("Regions:");
            self.regions.show(ui, "region_filter");
        }

        if !self.customers.options.is_empty() {
            ui.add_space(8.0);
            ui.label("Customers:");
            self.customers.show(ui, "customer_filter");
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Trend by:");
            for period in Period::ALL {
                ui.radio_value(&mut self.settings.period, period, period.to_string());
            }
        });
        ui.add(
            egui::Slider::new(&mut self.settings.top_n, TOP_N_MIN..=TOP_N_MAX)
                .text("Top N products"),
        );

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.label(RichText::new("💾 Export Data").size(14.0).strong());
        ui.add_space(5.0);

        ui.vertical_centered(|ui| {
            let button = |text: &str| {
                egui::Button::new(RichText::new(text).size(14.0)).min_size(egui::vec2(220.0, 28.0))
            };
            if ui.add(button("📥 Download Filtered Data (CSV)")).clicked() {
                action = ControlPanelAction::ExportCsv;
            }
            if ui.add(button("📊 Download Summary Statistics")).clicked() {
                action = ControlPanelAction::ExportSummary;
            }
            if ui.add(button("🖼 Save Charts (PNG)")).clicked() {
                action = ControlPanelAction::ExportCharts;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        self.show_status(ui);
        action
    }

    fn show_status(&self, ui: &mut egui::Ui) {
        ui.label(RichText::new("📈 Status").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.progress >= 100.0 {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }

    pub fn set_error(&mut self, message: &str) {
        self.set_progress(0.0, &format!("Error: {message}"));
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseFile,
    LoadDrive,
    ExportCsv,
    ExportSummary,
    ExportCharts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SalesRecord;
    use rust_decimal::Decimal;

    #[test]
    fn full_selection_is_unrestricted() {
        let mut select = MultiSelect::new(vec!["A".into(), "B".into()]);
        assert_eq!(select.restriction(), None);
        select.selected[1] = false;
        assert_eq!(select.restriction(), Some(vec!["A".to_string()]));
        select.selected[0] = false;
        assert_eq!(select.restriction(), Some(Vec::new()));
    }

    #[test]
    fn open_ended_date_inputs() {
        let mut panel = ControlPanel::new();
        panel.settings.date_from = "2024-01-15".into();
        let criteria = panel.criteria().unwrap();
        let (start, end) = criteria.date_range.unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(end, NaiveDate::MAX);

        panel.settings.date_to = "garbage".into();
        assert!(panel.criteria().is_err());
    }

    #[test]
    fn customer_selection_narrows_criteria() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let table = SalesTable::from_records(vec![
            SalesRecord::new(day, Decimal::from(10), "A").with_customer("Acme"),
            SalesRecord::new(day, Decimal::from(20), "A").with_customer("Globex"),
            SalesRecord::new(day, Decimal::from(5), "B"),
        ]);

        let mut panel = ControlPanel::new();
        panel.update_options(&table);
        assert_eq!(panel.customers.options, vec!["Acme", "Globex"]);
        assert_eq!(panel.criteria().unwrap().customers, None);

        panel.customers.selected[1] = false;
        let criteria = panel.criteria().unwrap();
        let kept = criteria.apply(&table);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.records()[0].customer.as_deref(), Some("Acme"));
    }
}
