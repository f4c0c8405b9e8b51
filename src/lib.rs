//! Sales Analytics Dashboard
//!
//! Loads sales data from CSV/Excel files or link-shared Google Drive files,
//! validates it against a small column contract, and provides filtering,
//! aggregation, statistics, charts and exports for the dashboard UI.
//!
//! ```no_run
//! use sales_dashboard::config::LoadOptions;
//! use sales_dashboard::data::{load_sales, FilterCriteria, SourceRef};
//! use sales_dashboard::stats::{Aggregator, GroupKey};
//!
//! let source = SourceRef::Local("sales.csv".into());
//! let validated = load_sales(&source, &LoadOptions::default()).unwrap();
//! let filtered = FilterCriteria::new()
//!     .with_categories(["Laptops"])
//!     .apply(&validated.table);
//! let by_region = Aggregator::aggregate(&filtered, GroupKey::Region);
//! println!("{}", by_region.total());
//! ```

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod gui;
pub mod stats;

pub use error::{DashboardError, Result};
