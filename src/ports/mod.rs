//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SopCatalog` - Read-only scenario and status SOP lookup
//! - `CaseStore` - Case records by id and filtered, paginated lists
//! - `AIProvider` - LLM completions, streaming and non-streaming
//! - `ReasoningAgent` - One agent of the reasoning trace

mod ai_provider;
mod case_store;
mod reasoning_agent;
mod sop_catalog;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, CompletionStream, FinishReason,
    Message, MessageRole, ProviderInfo, RequestMetadata, StreamChunk, TokenUsage,
};
pub use case_store::{CaseFilter, CasePage, CaseStore, CaseStoreError, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use reasoning_agent::ReasoningAgent;
pub use sop_catalog::SopCatalog;
