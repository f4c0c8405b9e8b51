//! Sales Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::{ChartData, StaticChartRenderer};
use crate::config::LoadOptions;
use crate::data::{DataLoader, DriveSource, FilterCriteria, SalesTable, SchemaValidator, SourceRef, Validated};
use crate::export::DataExporter;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::stats::Period;
use anyhow::Context;
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;

const PNG_WIDTH: u32 = 1400;
const PNG_HEIGHT: u32 = 1000;

/// Loading result from background thread
enum LoadResult {
    Progress(f32, String),
    Complete(Validated),
    Error(String),
}

/// The inputs the current charts were built from.
#[derive(Clone, PartialEq)]
struct ViewKey {
    criteria: FilterCriteria,
    period: Period,
    top_n: usize,
}

/// Main application window.
pub struct DashboardApp {
    options: LoadOptions,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    table: Option<SalesTable>,
    filtered: Option<SalesTable>,
    view: Option<ViewKey>,
    filter_error: Option<String>,

    // Async loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_options(LoadOptions::default())
    }

    pub fn with_options(options: LoadOptions) -> Self {
        Self {
            options,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            table: None,
            filtered: None,
            view: None,
            filter_error: None,
            load_rx: None,
            is_loading: false,
        }
    }

    /// Handle file selection
    fn handle_browse_file(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Sales data", &["csv", "xlsx", "xls"])
            .add_filter("CSV Files", &["csv"])
            .add_filter("Excel Files", &["xlsx", "xls"])
            .pick_file()
        {
            self.control_panel.settings.file_path = Some(path.clone());
            self.start_load(SourceRef::Local(path));
        }
    }

    fn handle_load_drive(&mut self) {
        if self.is_loading {
            return;
        }
        match DriveSource::new(&self.control_panel.settings.drive_input) {
            Ok(drive) => self.start_load(SourceRef::Drive(drive)),
            Err(e) => self.control_panel.set_error(&e.to_string()),
        }
    }

    /// Load and validate in a background thread; one load at a time.
    fn start_load(&mut self, source: SourceRef) {
        self.chart_viewer.clear();
        self.table = None;
        self.filtered = None;
        self.view = None;
        self.control_panel.data_loaded = false;
        self.control_panel
            .set_progress(5.0, &format!("Loading {}...", source.describe()));
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        let options = self.options.clone();

        thread::spawn(move || Self::run_load(tx, source, options));
    }

    /// Run the load (called from background thread)
    fn run_load(tx: Sender<LoadResult>, source: SourceRef, options: LoadOptions) {
        let _ = tx.send(LoadResult::Progress(10.0, format!("Reading {}...", source.describe())));

        let raw = match DataLoader::load(&source, &options) {
            Ok(raw) => raw,
            Err(e) => {
                let _ = tx.send(LoadResult::Error(e.to_string()));
                return;
            }
        };

        let _ = tx.send(LoadResult::Progress(
            60.0,
            format!("Validating {} rows...", raw.get_row_count()),
        ));

        match SchemaValidator::validate(&raw, options.policy) {
            Ok(validated) => {
                let _ = tx.send(LoadResult::Complete(validated));
            }
            Err(e) => {
                let _ = tx.send(LoadResult::Error(e.to_string()));
            }
        }
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            loop {
                let result = match rx.try_recv() {
                    Ok(result) => result,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        // Worker exited without a final result
                        self.control_panel.set_error("Load failed unexpectedly");
                        self.is_loading = false;
                        should_keep_receiver = false;
                        break;
                    }
                };
                match result {
                    LoadResult::Progress(progress, status) => {
                        self.control_panel.set_progress(progress, &status);
                    }
                    LoadResult::Complete(validated) => {
                        let Validated { table, report } = validated;
                        let mut status = format!("Complete! Loaded {} rows", report.kept_rows());
                        if !report.dropped.is_empty() {
                            status.push_str(&format!(", dropped {} invalid", report.dropped.len()));
                        }
                        self.control_panel.update_options(&table);
                        self.control_panel.set_progress(100.0, &status);
                        self.chart_viewer.total_rows = table.len();
                        self.table = Some(table);
                        self.is_loading = false;
                        should_keep_receiver = false;
                        break;
                    }
                    LoadResult::Error(error) => {
                        self.control_panel.set_error(&error);
                        self.is_loading = false;
                        should_keep_receiver = false;
                        break;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Rebuild the filtered table and charts when the controls changed.
    fn refresh_view(&mut self) {
        let Some(table) = &self.table else {
            return;
        };

        let criteria = match self.control_panel.criteria() {
            Ok(criteria) => criteria,
            Err(message) => {
                if self.filter_error.as_deref() != Some(message.as_str()) {
                    self.control_panel.set_error(&message);
                    self.filter_error = Some(message);
                }
                return;
            }
        };
        self.filter_error = None;

        let key = ViewKey {
            criteria,
            period: self.control_panel.settings.period,
            top_n: self.control_panel.settings.top_n,
        };
        if self.view.as_ref() == Some(&key) {
            return;
        }

        let filtered = key.criteria.apply(table);
        self.chart_viewer
            .set_view(ChartData::build(&filtered, key.period, key.top_n), &filtered);
        self.control_panel.set_progress(
            100.0,
            &format!("Complete! Showing {} of {} rows", filtered.len(), table.len()),
        );
        self.filtered = Some(filtered);
        self.view = Some(key);
    }

    fn save_dialog(filter: &str, extensions: &[&str], file_name: &str) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .add_filter(filter, extensions)
            .set_file_name(file_name)
            .save_file()
    }

    fn export_csv(&self) -> anyhow::Result<Option<String>> {
        let table = self.filtered.as_ref().context("No data loaded")?;
        let today = chrono::Local::now().date_naive();
        let Some(path) = Self::save_dialog("CSV", &["csv"], &DataExporter::default_file_name(today)) else {
            return Ok(None);
        };
        DataExporter::save_csv(table, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(Some(format!("Exported {} rows to {}", table.len(), path.display())))
    }

    fn export_summary(&self) -> anyhow::Result<Option<String>> {
        let table = self.filtered.as_ref().context("No data loaded")?;
        let Some(path) = Self::save_dialog("Summary", &["csv", "json"], "sales_summary.csv") else {
            return Ok(None);
        };
        DataExporter::save_summary(table, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(Some(format!("Summary saved to {}", path.display())))
    }

    fn export_charts(&self) -> anyhow::Result<Option<String>> {
        let data = self.chart_viewer.chart_data.as_ref().context("No charts to export")?;
        let Some(path) = Self::save_dialog("PNG Image", &["png"], "sales_charts.png") else {
            return Ok(None);
        };
        StaticChartRenderer::render_png(data, &path, PNG_WIDTH, PNG_HEIGHT)
            .with_context(|| format!("Failed to render {}", path.display()))?;
        if let Err(e) = open::that(&path) {
            eprintln!("Could not open {}: {}", path.display(), e);
        }
        Ok(Some(format!("Charts saved to {}", path.display())))
    }

    fn report_export(&mut self, result: anyhow::Result<Option<String>>) {
        match result {
            Ok(Some(status)) => self.control_panel.set_progress(100.0, &status),
            Ok(None) => {}
            Err(e) => self.control_panel.set_error(&format!("{e:#}")),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui, self.is_loading);

                    match action {
                        ControlPanelAction::BrowseFile => self.handle_browse_file(),
                        ControlPanelAction::LoadDrive => self.handle_load_drive(),
                        ControlPanelAction::ExportCsv => {
                            let result = self.export_csv();
                            self.report_export(result);
                        }
                        ControlPanelAction::ExportSummary => {
                            let result = self.export_summary();
                            self.report_export(result);
                        }
                        ControlPanelAction::ExportCharts => {
                            let result = self.export_charts();
                            self.report_export(result);
                        }
                        ControlPanelAction::None => {}
                    }
                });
            });

        self.refresh_view();

        // Central panel - Chart Viewer
        let show_raw = self.control_panel.settings.show_raw;
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, show_raw);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loading_app() -> (DashboardApp, Sender<LoadResult>) {
        let mut app = DashboardApp::with_options(LoadOptions::default());
        let (tx, rx) = channel();
        app.load_rx = Some(rx);
        app.is_loading = true;
        (app, tx)
    }

    #[test]
    fn worker_exit_without_result_ends_loading() {
        let (mut app, tx) = loading_app();
        tx.send(LoadResult::Progress(10.0, "Reading...".to_string())).unwrap();
        drop(tx);

        app.check_load_results();
        assert!(!app.is_loading);
        assert!(app.load_rx.is_none());
        assert_eq!(app.control_panel.status, "Error: Load failed unexpectedly");
    }

    #[test]
    fn pending_load_keeps_receiver() {
        let (mut app, tx) = loading_app();
        tx.send(LoadResult::Progress(60.0, "Validating 5 rows...".to_string())).unwrap();

        app.check_load_results();
        assert!(app.is_loading);
        assert!(app.load_rx.is_some());
        assert_eq!(app.control_panel.status, "Validating 5 rows...");
    }
}
