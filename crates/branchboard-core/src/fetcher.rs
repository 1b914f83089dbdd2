//! Seams to the reporting API: report entries and the branch/category directory

use async_trait::async_trait;
use branchboard_config::Frequency;
use chrono::NaiveDate;
use futures::future::try_join_all;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::models::{Branch, Category, ReportEntry};
use crate::types::ComparisonRequest;

/// Source of per-branch report entries
#[async_trait]
pub trait ReportFetcher: Send + Sync {
    /// Entries of one branch covering `[start, end]` at `frequency`
    async fn fetch_branch(
        &self,
        branch_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        frequency: Frequency,
    ) -> CoreResult<Vec<ReportEntry>>;
}

/// Source of the id/name directory
#[async_trait]
pub trait DirectorySource: Send + Sync {
    async fn branches(&self) -> CoreResult<Vec<Branch>>;
    async fn categories(&self) -> CoreResult<Vec<Category>>;
}

/// Fetcher reference type
pub type FetcherRef = Arc<dyn ReportFetcher>;

/// Fetch every requested branch concurrently and flatten the result.
///
/// Entries are tagged with their source branch and returned in branch order.
/// The first failing branch fails the whole request; no partial data is
/// returned.
pub async fn fetch_comparison(
    fetcher: &dyn ReportFetcher,
    request: &ComparisonRequest,
) -> CoreResult<Vec<ReportEntry>> {
    let fetches = request.branch_ids.iter().map(|&branch_id| async move {
        let entries = fetcher
            .fetch_branch(branch_id, request.start_date, request.end_date, request.frequency)
            .await
            .map_err(|e| with_branch(e, branch_id))?;
        Ok::<_, CoreError>(
            entries
                .into_iter()
                .map(|entry| entry.tagged(branch_id, request.frequency))
                .collect::<Vec<_>>(),
        )
    });

    let per_branch = try_join_all(fetches).await?;
    let entries: Vec<ReportEntry> = per_branch.into_iter().flatten().collect();

    log::debug!(
        "Fetched {} {} entries for {} branches",
        entries.len(),
        request.frequency,
        request.branch_ids.len()
    );

    Ok(entries)
}

fn with_branch(error: CoreError, branch_id: i64) -> CoreError {
    match error {
        CoreError::Fetch { branch_id: None, message } => CoreError::Fetch {
            branch_id: Some(branch_id),
            message,
        },
        other => other,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory fetcher used by the view and pivot tests

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    pub struct FakeFetcher {
        pub entries: HashMap<(i64, Frequency), Vec<ReportEntry>>,
        pub failing: Vec<(i64, Frequency)>,
        pub delays: HashMap<i64, Duration>,
        pub calls: Mutex<Vec<(i64, Frequency)>>,
    }

    impl FakeFetcher {
        pub fn with(mut self, branch: i64, frequency: Frequency, entries: Vec<ReportEntry>) -> Self {
            self.entries.insert((branch, frequency), entries);
            self
        }

        pub fn failing(mut self, branch: i64, frequency: Frequency) -> Self {
            self.failing.push((branch, frequency));
            self
        }

        pub fn delayed(mut self, branch: i64, delay: Duration) -> Self {
            self.delays.insert(branch, delay);
            self
        }

        pub fn calls(&self) -> Vec<(i64, Frequency)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReportFetcher for FakeFetcher {
        async fn fetch_branch(
            &self,
            branch_id: i64,
            _start: NaiveDate,
            _end: NaiveDate,
            frequency: Frequency,
        ) -> CoreResult<Vec<ReportEntry>> {
            self.calls.lock().unwrap().push((branch_id, frequency));
            if let Some(delay) = self.delays.get(&branch_id) {
                tokio::time::sleep(*delay).await;
            }
            if self.failing.contains(&(branch_id, frequency)) {
                return Err(CoreError::fetch(None, "HTTP 500"));
            }
            Ok(self
                .entries
                .get(&(branch_id, frequency))
                .cloned()
                .unwrap_or_default())
        }
    }

    pub fn entry(date: &str, sales: f64) -> ReportEntry {
        ReportEntry {
            start_date: date.to_string(),
            totals: crate::models::ReportTotals {
                total_sales: sales,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
