//! Case records as consumed by the reasoning pipeline.
//!
//! A `Case` is owned by an external case system and is immutable for the
//! duration of a run. Domain-specific fields that vary between case types
//! (claims, appeals, loans) live in the free-form `attributes` map and are
//! read through the typed accessors below.

mod record;

pub use record::{Case, LineItem};
