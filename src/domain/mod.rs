//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, confidence, timestamps, errors)
//! - `case` - The case record under review
//! - `sop` - Standard Operating Procedure documents and denial codes
//! - `recommendation` - Actions and recommendations
//! - `transparency` - Per-run log of what was called and how long it took
//! - `screening` - Rule-based pre-screening engine and check library
//! - `reasoning` - Multi-agent reasoning orchestrator
//! - `chat` - Follow-up questions against a reasoning trace
//! - `reconciliation` - Agreement between the rule-based and AI recommendations

pub mod case;
pub mod chat;
pub mod foundation;
pub mod reasoning;
pub mod recommendation;
pub mod reconciliation;
pub mod screening;
pub mod sop;
pub mod transparency;
