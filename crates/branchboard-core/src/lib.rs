//! Comparison pivots and report breakdowns for the branch dashboard
//!
//! Reports are fetched per branch through a [`ReportFetcher`], flattened
//! into [`PivotRow`]s keyed by time label and held by a [`ComparisonView`]
//! that discards responses superseded by a newer filter.

pub mod directory;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod pivot;
pub mod products;
pub mod reports;
pub mod time;
pub mod types;
pub mod view;

pub use directory::Directory;
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger, ErrorSeverity};
pub use fetcher::{fetch_comparison, DirectorySource, FetcherRef, ReportFetcher};
pub use models::{Branch, Breakdown, Category, ReportEntry, ReportTotals};
pub use pivot::{pivot, series_names, PivotRow, PivotSettings};
pub use products::{product_table, ProductQuery, ProductReport, ProductTable, SortField, SortOrder};
pub use reports::{
    BreakdownSection, DailyReport, DetailFigures, MonthlyCategoryReport, MonthlyReport,
    PeriodBreakdown, ReportShape, WeeklyReport,
};
pub use time::{month_weeks, DateRange, WeekRange};
pub use types::{ComparisonFilter, ComparisonRequest, ViewMode};
pub use view::{ComparisonView, RefreshOutcome, ViewSnapshot};

pub use branchboard_config::{Frequency, Metric};
