//! In-Memory Case Store Adapter
//!
//! Holds cases in insertion order. Seeded with sample cases for local runs
//! and tests.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::case::Case;
use crate::domain::foundation::CaseId;
use crate::ports::{CaseFilter, CasePage, CaseStore, CaseStoreError};

const SAMPLE_CASES: &str = include_str!("sample_cases.json");

#[derive(Debug, Clone, Default)]
pub struct InMemoryCaseStore {
    cases: Arc<RwLock<Vec<Case>>>,
}

impl InMemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cases(cases: Vec<Case>) -> Self {
        Self {
            cases: Arc::new(RwLock::new(cases)),
        }
    }

    /// Store seeded with the bundled sample cases.
    pub fn seeded() -> Result<Self, CaseStoreError> {
        let cases: Vec<Case> = serde_json::from_str(SAMPLE_CASES)
            .map_err(|e| CaseStoreError::Unavailable(format!("invalid sample cases: {}", e)))?;
        Ok(Self::with_cases(cases))
    }

    /// Inserts a case, replacing any case with the same id.
    pub async fn upsert(&self, case: Case) {
        let mut cases = self.cases.write().await;
        match cases.iter_mut().find(|c| c.id == case.id) {
            Some(existing) => *existing = case,
            None => cases.push(case),
        }
    }

    pub async fn len(&self) -> usize {
        self.cases.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cases.read().await.is_empty()
    }
}

#[async_trait]
impl CaseStore for InMemoryCaseStore {
    async fn get_by_id(&self, id: &CaseId) -> Result<Case, CaseStoreError> {
        self.cases
            .read()
            .await
            .iter()
            .find(|c| c.id == *id)
            .cloned()
            .ok_or_else(|| CaseStoreError::NotFound(id.clone()))
    }

    async fn list(&self, filter: &CaseFilter) -> Result<CasePage, CaseStoreError> {
        let matching: Vec<Case> = self
            .cases
            .read()
            .await
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        Ok(CasePage::paginate(matching, filter))
    }
}
