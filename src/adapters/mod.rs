//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - AI providers (OpenAI, mock) and the provider-backed agents
//! - `case_store` - In-memory case records seeded with sample cases
//! - `catalog` - YAML-backed SOP catalog
//! - `http` - axum routes and SSE framing

pub mod ai;
pub mod case_store;
pub mod catalog;
pub mod http;

pub use case_store::InMemoryCaseStore;
pub use catalog::{CatalogError, InMemorySopCatalog};
