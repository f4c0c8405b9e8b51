//! Constants and load-time options.

use std::time::Duration;

/// Direct-download endpoint for link-shared Google Drive files.
pub const DRIVE_DOWNLOAD_URL: &str = "https://drive.google.com/uc?export=download&id=";

/// Default timeout for the single remote download attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Date layouts accepted by the validator, tried in order.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Date-time layouts; only the date part is kept.
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date layout used for exports and chart labels.
pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Histogram bin count for the sales distribution chart.
pub const HISTOGRAM_BINS: usize = 30;

/// Bounds and default of the "top N products" slider.
pub const TOP_N_MIN: usize = 5;
pub const TOP_N_MAX: usize = 20;
pub const TOP_N_DEFAULT: usize = 10;

/// Slices shown in the share breakdown before the remainder is folded into "Other".
pub const SHARE_SLICES: usize = 8;

/// Rows drawn in the raw data grid.
pub const RAW_GRID_MAX_ROWS: usize = 500;

/// Largest accepted absolute sale amount. Any realistic number of rows at
/// this size still sums inside `Decimal` range.
pub const MAX_ABS_AMOUNT: i64 = 1_000_000_000_000_000;

/// Largest accepted quantity on a single row.
pub const MAX_QUANTITY: u64 = 1_000_000_000;

/// Group label for records with no value in an optional grouping column.
pub const UNSPECIFIED_LABEL: &str = "(unspecified)";

/// How the validator treats cells it cannot coerce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoercionPolicy {
    /// Drop offending rows and report them.
    #[default]
    DropInvalid,
    /// Fail the whole load on the first offending cell.
    Strict,
}

/// Options for a single load call.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub timeout: Duration,
    /// Worksheet name or 0-based index; the first sheet when unset.
    pub sheet: Option<String>,
    pub policy: CoercionPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            sheet: None,
            policy: CoercionPolicy::default(),
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP timeout for remote sources.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Select the worksheet read from spreadsheet sources.
    pub fn sheet<S: Into<String>>(mut self, sheet: S) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn policy(mut self, policy: CoercionPolicy) -> Self {
        self.policy = policy;
        self
    }
}
