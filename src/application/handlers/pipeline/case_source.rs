//! Where a pipeline command gets its case from.

use serde::{Deserialize, Serialize};

use crate::domain::case::Case;
use crate::domain::foundation::{CaseId, DomainError, ErrorCode, ValidationError};
use crate::domain::screening::ScreeningError;
use crate::ports::{CaseStore, CaseStoreError};

/// A stored case by id, or a case supplied inline by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaseSource {
    Stored(CaseId),
    Inline(Box<Case>),
}

impl CaseSource {
    /// Loads and validates the case.
    pub async fn resolve(self, store: &dyn CaseStore) -> Result<Case, PipelineError> {
        let case = match self {
            CaseSource::Stored(id) => store.get_by_id(&id).await?,
            CaseSource::Inline(case) => *case,
        };
        case.validate()?;
        Ok(case)
    }
}

impl From<Case> for CaseSource {
    fn from(case: Case) -> Self {
        CaseSource::Inline(Box::new(case))
    }
}

impl From<CaseId> for CaseSource {
    fn from(id: CaseId) -> Self {
        CaseSource::Stored(id)
    }
}

/// Errors raised before a pipeline run starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid case: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] CaseStoreError),
}

impl From<ScreeningError> for PipelineError {
    fn from(err: ScreeningError) -> Self {
        match err {
            ScreeningError::Validation(v) => PipelineError::Validation(v),
        }
    }
}

impl From<&PipelineError> for DomainError {
    fn from(err: &PipelineError) -> Self {
        match err {
            PipelineError::Validation(v) => DomainError::validation(v.field(), err.to_string()),
            PipelineError::Store(CaseStoreError::NotFound(id)) => {
                DomainError::new(ErrorCode::CaseNotFound, err.to_string()).with_detail("caseId", id.as_str())
            }
            PipelineError::Store(CaseStoreError::Unavailable(_)) => {
                DomainError::new(ErrorCode::StoreUnavailable, err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::case_store::InMemoryCaseStore;

    #[tokio::test]
    async fn stored_case_is_loaded() {
        let store = InMemoryCaseStore::seeded().unwrap();
        let case = CaseSource::from(CaseId::new("CLM-1001").unwrap())
            .resolve(&store)
            .await
            .unwrap();
        assert_eq!(case.id.as_str(), "CLM-1001");
    }

    #[tokio::test]
    async fn unknown_case_maps_to_not_found() {
        let store = InMemoryCaseStore::new();
        let err = CaseSource::from(CaseId::new("CLM-404").unwrap())
            .resolve(&store)
            .await
            .unwrap_err();
        let domain: DomainError = (&err).into();
        assert_eq!(domain.code, ErrorCode::CaseNotFound);
        assert_eq!(domain.code.http_status(), 404);
    }

    #[tokio::test]
    async fn inline_case_is_validated() {
        let store = InMemoryCaseStore::new();
        let case = Case::new(CaseId::new("CLM-1").unwrap(), " ");
        let err = CaseSource::from(case).resolve(&store).await.unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }
}
