//! HTTP adapter for the reasoning, chat and reconciliation endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AnalysisResultDto, AnalyzeFrame, AnalyzeRequest, CaseRef, ChatFrame, ChatRequest,
    ChatResultDto, HistoryEntry, ReconcileRequest,
};
pub use handlers::reconcile;
pub use routes::ai_routes;
