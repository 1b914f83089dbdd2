//! Filter and request types for comparison views

use branchboard_config::{ComparisonConfig, Frequency, Metric};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time::DateRange;

/// How buckets are laid out on the chart's time axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// One continuous calendar axis
    Continuous,
    /// Each coarse bucket becomes its own series over a shared axis
    NonContinuous,
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::NonContinuous
    }
}

impl ViewMode {
    pub fn from_toggle(continuous: bool) -> Self {
        if continuous {
            ViewMode::Continuous
        } else {
            ViewMode::NonContinuous
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::Continuous => write!(f, "continuous"),
            ViewMode::NonContinuous => write!(f, "non_continuous"),
        }
    }
}

/// Request shape consumed by a report fetcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRequest {
    pub branch_ids: Vec<i64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub frequency: Frequency,
}

impl ComparisonRequest {
    /// Same branches and range at another frequency
    pub fn at_frequency(&self, frequency: Frequency) -> Self {
        Self {
            frequency,
            ..self.clone()
        }
    }
}

/// Everything a comparison chart depends on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonFilter {
    pub branches: Vec<i64>,
    pub categories: Vec<i64>,
    pub range: DateRange,
    pub frequency: Frequency,
    pub metric: Metric,
    pub mode: ViewMode,
}

impl ComparisonFilter {
    /// Empty selection with the configured defaults
    pub fn from_config(config: &ComparisonConfig) -> Self {
        Self {
            frequency: config.frequency,
            metric: config.metric,
            mode: ViewMode::from_toggle(config.continuous),
            ..Default::default()
        }
    }

    /// Select a branch, or deselect it when already selected
    pub fn toggle_branch(&mut self, id: i64) {
        toggle(&mut self.branches, id);
    }

    /// Select a category, or deselect it when already selected
    pub fn toggle_category(&mut self, id: i64) {
        toggle(&mut self.categories, id);
    }

    /// The fetch this filter needs, or `None` when no branch is selected
    /// or a date bound is missing.
    pub fn request(&self) -> Option<ComparisonRequest> {
        if self.branches.is_empty() {
            return None;
        }
        let (start_date, end_date) = self.range.bounds()?;
        Some(ComparisonRequest {
            branch_ids: self.branches.clone(),
            start_date,
            end_date,
            frequency: self.frequency,
        })
    }
}

fn toggle(ids: &mut Vec<i64>, id: i64) {
    if let Some(pos) = ids.iter().position(|&existing| existing == id) {
        ids.remove(pos);
    } else {
        ids.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn july() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 31).unwrap(),
        )
    }

    #[test]
    fn test_request_requires_branches_and_dates() {
        let mut filter = ComparisonFilter::default();
        filter.range = july();
        assert!(filter.request().is_none());

        filter.toggle_branch(4);
        let request = filter.request().unwrap();
        assert_eq!(request.branch_ids, vec![4]);
        assert_eq!(request.frequency, Frequency::Weekly);

        filter.range.end = None;
        assert!(filter.request().is_none());
    }

    #[test]
    fn test_toggle_branch() {
        let mut filter = ComparisonFilter::default();
        filter.toggle_branch(1);
        filter.toggle_branch(2);
        filter.toggle_branch(1);
        assert_eq!(filter.branches, vec![2]);
        filter.toggle_category(5);
        assert_eq!(filter.categories, vec![5]);
    }

    #[test]
    fn test_from_config() {
        let config = ComparisonConfig {
            frequency: Frequency::Monthly,
            metric: Metric::Quantity,
            continuous: true,
        };
        let filter = ComparisonFilter::from_config(&config);
        assert_eq!(filter.mode, ViewMode::Continuous);
        assert_eq!(filter.metric, Metric::Quantity);
        assert!(filter.branches.is_empty());
    }

    #[test]
    fn test_request_at_frequency() {
        let request = ComparisonRequest {
            branch_ids: vec![1, 2],
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            frequency: Frequency::Yearly,
        };
        let finer = request.at_frequency(request.frequency.finer());
        assert_eq!(finer.frequency, Frequency::Monthly);
        assert_eq!(finer.branch_ids, request.branch_ids);
    }
}
