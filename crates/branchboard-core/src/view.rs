//! Comparison view: filter state, fetch phases and the current chart rows
//!
//! Every refresh recomputes the rows from scratch and replaces them whole.
//! Refreshes are numbered; a completion whose number is no longer the latest
//! is discarded so a slow, stale response never overwrites newer data.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use branchboard_config::LabelConfig;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::directory::Directory;
use crate::error::{CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::fetcher::{fetch_comparison, DirectorySource, FetcherRef};
use crate::models::ReportEntry;
use crate::pivot::{pivot, series_names, PivotRow, PivotSettings};
use crate::types::{ComparisonFilter, ComparisonRequest, ViewMode};

/// What happened to a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// Rows were replaced
    Applied { generation: u64, rows: usize },
    /// A newer refresh started while this one was in flight
    Discarded { generation: u64, latest: u64 },
}

/// Current output of the view
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewSnapshot {
    pub generation: u64,
    pub filter: ComparisonFilter,
    pub rows: Vec<PivotRow>,
    pub series: Vec<String>,
}

pub struct ComparisonView {
    fetcher: FetcherRef,
    directory: RwLock<Directory>,
    state: RwLock<ViewSnapshot>,
    generation: AtomicU64,
    logger: Arc<dyn ErrorLogger>,
}

impl ComparisonView {
    pub fn new(fetcher: FetcherRef, labels: LabelConfig) -> Self {
        Self {
            fetcher,
            directory: RwLock::new(Directory::new(labels)),
            state: RwLock::new(ViewSnapshot::default()),
            generation: AtomicU64::new(0),
            logger: Arc::new(DefaultErrorLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Load the branch and category directory.
    ///
    /// A failing list is logged and left empty; labels then fall back to
    /// `"<prefix> <id>"`.
    pub async fn initialize(&self, source: &dyn DirectorySource) {
        let (branches, categories) = futures::join!(source.branches(), source.categories());
        let context = ErrorContext::new("directory_load");

        let branches = branches.unwrap_or_else(|e| {
            self.logger.log_warning(&format!("branch list unavailable: {}", e), &context);
            Vec::new()
        });
        let categories = categories.unwrap_or_else(|e| {
            self.logger.log_warning(&format!("category list unavailable: {}", e), &context);
            Vec::new()
        });

        log::info!(
            "Directory loaded: {} branches, {} categories",
            branches.len(),
            categories.len()
        );

        let mut directory = self.directory.write().await;
        *directory = directory.clone().with_entries(branches, categories);
    }

    pub async fn directory(&self) -> Directory {
        self.directory.read().await.clone()
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        self.state.read().await.clone()
    }

    pub async fn rows(&self) -> Vec<PivotRow> {
        self.state.read().await.rows.clone()
    }

    /// Latest generation handed out
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Recompute the rows for `filter`.
    ///
    /// An incomplete filter (no branch, or a missing date) yields an empty
    /// result without fetching. A fetch failure clears the rows and is
    /// returned to the caller.
    pub async fn refresh(&self, filter: ComparisonFilter) -> CoreResult<RefreshOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(request) = filter.request() else {
            log::debug!("Generation {}: incomplete filter, clearing rows", generation);
            return Ok(self.apply(generation, filter, Vec::new()).await);
        };

        match self.compute(&filter, &request).await {
            Ok(rows) => Ok(self.apply(generation, filter, rows).await),
            Err(error) => {
                let latest = self.generation();
                if latest != generation {
                    log::warn!(
                        "Generation {} failed after generation {} started; ignoring: {}",
                        generation,
                        latest,
                        error
                    );
                    return Ok(RefreshOutcome::Discarded { generation, latest });
                }
                let context = ErrorContext::new("comparison_refresh")
                    .with_generation(generation)
                    .with_data("branches", serde_json::json!(request.branch_ids))
                    .with_data("frequency", serde_json::json!(request.frequency));
                self.logger.log_error(&error, &context);
                self.apply(generation, filter, Vec::new()).await;
                Err(error)
            }
        }
    }

    async fn compute(
        &self,
        filter: &ComparisonFilter,
        request: &ComparisonRequest,
    ) -> CoreResult<Vec<PivotRow>> {
        let entries = self.fetch_phases(filter.mode, request).await?;

        let directory = self.directory.read().await;
        let settings = PivotSettings {
            metric: filter.metric,
            categories: &filter.categories,
            frequency: request.frequency,
        };
        Ok(pivot(filter.mode, &entries, &directory, settings))
    }

    /// Continuous mode fetches once. Non-continuous mode fetches the display
    /// resolution first and, once that succeeded, the finer sub-buckets the
    /// pivot runs on.
    async fn fetch_phases(
        &self,
        mode: ViewMode,
        request: &ComparisonRequest,
    ) -> CoreResult<Vec<ReportEntry>> {
        let display = fetch_comparison(self.fetcher.as_ref(), request).await?;
        if mode == ViewMode::Continuous {
            return Ok(display);
        }

        log::debug!(
            "Display phase returned {} {} buckets; fetching {} sub-buckets",
            display.len(),
            request.frequency,
            request.frequency.finer()
        );
        let fine = request.at_frequency(request.frequency.finer());
        fetch_comparison(self.fetcher.as_ref(), &fine).await
    }

    async fn apply(
        &self,
        generation: u64,
        filter: ComparisonFilter,
        rows: Vec<PivotRow>,
    ) -> RefreshOutcome {
        let mut state = self.state.write().await;

        // Checked under the write lock so two completions cannot interleave
        let latest = self.generation();
        if latest != generation {
            log::warn!(
                "Discarding stale generation {} (latest is {})",
                generation,
                latest
            );
            return RefreshOutcome::Discarded { generation, latest };
        }

        let count = rows.len();
        *state = ViewSnapshot {
            generation,
            series: series_names(&rows),
            filter,
            rows,
        };
        log::info!("Generation {} applied: {} rows", generation, count);

        RefreshOutcome::Applied {
            generation,
            rows: count,
        }
    }
}
