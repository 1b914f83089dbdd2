//! Branch and category name lookup

use branchboard_config::LabelConfig;

use crate::models::{Branch, Category};

/// Id-to-name directory loaded once per view session.
///
/// Lookups never fail: unknown ids resolve to `"<prefix> <id>"`.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    branches: Vec<Branch>,
    categories: Vec<Category>,
    labels: LabelConfig,
}

impl Directory {
    pub fn new(labels: LabelConfig) -> Self {
        Self {
            branches: Vec::new(),
            categories: Vec::new(),
            labels,
        }
    }

    pub fn with_entries(mut self, branches: Vec<Branch>, categories: Vec<Category>) -> Self {
        self.branches = branches;
        self.categories = categories;
        self
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn branch_name(&self, id: i64) -> String {
        self.branches
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| format!("{} {}", self.labels.branch_prefix, id))
    }

    pub fn category_name(&self, id: i64) -> String {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("{} {}", self.labels.category_prefix, id))
    }
}
