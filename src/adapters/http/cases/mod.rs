//! HTTP adapter for case endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{CaseListResponse, ListCasesQuery};
pub use routes::case_routes;
