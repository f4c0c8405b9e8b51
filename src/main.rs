//! Sales Analytics Dashboard
//!
//! Desktop dashboard for exploring sales data from CSV/Excel files or Google Drive.

use eframe::egui;
use sales_dashboard::gui::DashboardApp;

fn main() -> eframe::Result<()> {
    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Sales Analytics Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Analytics Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc)))),
    )
}
