//! Case Store Port - read access to case records owned elsewhere.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::case::Case;
use crate::domain::foundation::CaseId;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Errors from case store operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaseStoreError {
    #[error("Case not found: {0}")]
    NotFound(CaseId),

    #[error("Case store unavailable: {0}")]
    Unavailable(String),
}

/// Filter and paging for case lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseFilter {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub scenario: Option<String>,
    /// Case-insensitive match on id, member, provider and status.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

impl CaseFilter {
    /// 1-based page, defaulting to the first.
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size, defaulting to 10 and capped at 100.
    pub fn page_size(&self) -> usize {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// True when the case passes the status, scenario and search filters.
    pub fn matches(&self, case: &Case) -> bool {
        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            if !case.status.eq_ignore_ascii_case(status) {
                return false;
            }
        }
        if let Some(scenario) = self.scenario.as_deref().filter(|s| !s.is_empty()) {
            if case.scenario_key().as_deref() != Some(scenario) {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let haystacks = [
                Some(case.id.as_str()),
                case.member.as_deref(),
                case.provider.as_deref(),
                Some(case.status.as_str()),
            ];
            if !haystacks
                .iter()
                .flatten()
                .any(|h| h.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }
}

/// One page of cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CasePage {
    pub items: Vec<Case>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl CasePage {
    /// Slices the requested page out of all matching cases.
    pub fn paginate(matching: Vec<Case>, filter: &CaseFilter) -> Self {
        let total = matching.len();
        let page = filter.page();
        let page_size = filter.page_size();
        let total_pages = total.div_ceil(page_size);
        let items = matching
            .into_iter()
            .skip(page.saturating_sub(1).saturating_mul(page_size))
            .take(page_size)
            .collect();
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

#[async_trait]
pub trait CaseStore: Send + Sync {
    async fn get_by_id(&self, id: &CaseId) -> Result<Case, CaseStoreError>;

    async fn list(&self, filter: &CaseFilter) -> Result<CasePage, CaseStoreError>;
}
