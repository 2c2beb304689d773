//! Case Reasoning - rule-based pre-screening and multi-agent reasoning for
//! case review.
//!
//! A case is first screened by deterministic SOP checks, then walked through
//! four reasoning agents (analysis, SOP match, risk assessment,
//! recommendation). The two recommendations are reconciled, and a chat
//! assistant answers follow-up questions about the case and its trace.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
