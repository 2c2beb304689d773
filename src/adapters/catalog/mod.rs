//! SOP catalog adapters.

mod in_memory;

pub use in_memory::{CatalogError, InMemorySopCatalog};
