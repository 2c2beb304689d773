//! Standard operating procedure documents.
//!
//! An SOP is human-authored: a title, ordered steps, the denial codes it
//! may apply and the pages it cites. The executable checks that walk a case
//! through an SOP live in the screening module.

use serde::{Deserialize, Serialize};

/// A short coded denial reason.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DenialCode {
    pub code: String,
    pub description: String,
}

impl DenialCode {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }
}

/// An SOP document as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SopDocument {
    pub title: String,
    #[serde(default = "all_states")]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub denial_codes: Vec<DenialCode>,
    #[serde(default)]
    pub document_references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

fn all_states() -> String {
    "All".to_string()
}

impl SopDocument {
    /// Creates a document with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            state: all_states(),
            page: None,
            steps: Vec::new(),
            denial_codes: Vec::new(),
            document_references: Vec::new(),
            link: None,
            category: None,
            effective_date: None,
            revision: None,
        }
    }

    /// Short reference to cite: the page when the SOP names one, else the title.
    pub fn reference(&self) -> String {
        match &self.page {
            Some(page) if !page.trim().is_empty() && page != "N/A" => page.clone(),
            _ => self.title.clone(),
        }
    }

    /// True when the SOP applies in the given state. "All" applies everywhere.
    pub fn applies_in(&self, state: &str) -> bool {
        self.state.eq_ignore_ascii_case("all") || self.state.eq_ignore_ascii_case(state)
    }

    /// Looks up one of the SOP's denial codes.
    pub fn denial_code(&self, code: &str) -> Option<&DenialCode> {
        self.denial_codes.iter().find(|d| d.code.eq_ignore_ascii_case(code))
    }
}
