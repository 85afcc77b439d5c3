//! Marketing performance dashboard.
//!
//! Turns one uploaded CSV or XLSX file of ad performance rows (date, channel,
//! campaign, creative, spend, revenue, orders) into KPI cards, time series,
//! grouped charts and ranked tables. See [`process_upload`] for the single
//! entry point.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use config::DashboardConfig;
pub use dashboard::{build_dashboard, process_upload, Dashboard, Section, View};
pub use error::{ReportError, Result};
pub use loader::{load_upload, LoadReport, UploadFormat};
pub use types::{KpiSummary, Record};
