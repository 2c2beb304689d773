//! Request and response shapes for case endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::case::Case;
use crate::ports::{CaseFilter, CasePage};

/// Query string of `GET /cases`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCasesQuery {
    pub status: Option<String>,
    pub scenario: Option<String>,
    pub search: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl From<ListCasesQuery> for CaseFilter {
    fn from(q: ListCasesQuery) -> Self {
        CaseFilter {
            status: q.status,
            scenario: q.scenario,
            search: q.search,
            page: q.page,
            page_size: q.page_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseListResponse {
    pub cases: Vec<Case>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl From<CasePage> for CaseListResponse {
    fn from(page: CasePage) -> Self {
        Self {
            cases: page.items,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        }
    }
}
