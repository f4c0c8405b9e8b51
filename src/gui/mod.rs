//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;

pub use app::DashboardApp;
pub use chart_viewer::{ChartTab, ChartViewer};
pub use control_panel::{ControlPanel, ControlPanelAction, MultiSelect, SourceMode, UserSettings};
