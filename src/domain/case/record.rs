use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::foundation::{CaseId, ValidationError};

/// One billed line on a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    #[serde(default = "default_units")]
    pub units: u32,
}

fn default_units() -> u32 {
    1
}

impl LineItem {
    pub fn new(code: impl Into<String>, amount: f64) -> Self {
        Self {
            code: code.into(),
            description: String::new(),
            amount,
            units: 1,
        }
    }
}

/// A case under review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: CaseId,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

impl Case {
    /// Creates a case with the given id and status and no other data.
    pub fn new(id: CaseId, status: impl Into<String>) -> Self {
        Self {
            id,
            status: status.into(),
            scenario: None,
            amount: 0.0,
            member: None,
            provider: None,
            state: None,
            line_items: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_line_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Checks that the case can enter a run.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_blank() {
            return Err(ValidationError::empty_field("id"));
        }
        if self.status.trim().is_empty() {
            return Err(ValidationError::empty_field("status"));
        }
        if !self.amount.is_finite() {
            return Err(ValidationError::invalid_format("amount", "must be a finite number"));
        }
        if let Some(scenario) = &self.scenario {
            if scenario.trim().is_empty() {
                return Err(ValidationError::empty_field("scenario"));
            }
        }
        Ok(())
    }

    /// Scenario key for this case: the explicit one, else one inferred from
    /// its attributes.
    pub fn scenario_key(&self) -> Option<String> {
        self.scenario.clone().or_else(|| self.infer_scenario().map(String::from))
    }

    /// Infers a scenario from well-known attributes.
    ///
    /// Order matters: day-limit data wins over coordination-of-benefits data,
    /// which wins over precertification markers.
    pub fn infer_scenario(&self) -> Option<&'static str> {
        if self.has("build_days") && self.has("authorized_days") {
            return Some("build-days");
        }
        if self.has("ssn") || self.has("cob") {
            return Some("cob");
        }
        if self.number("admission_type") == Some(1.0)
            || self.has("revenue_codes")
            || self.has("surgery_type")
        {
            return Some("precertification");
        }
        None
    }

    /// Raw attribute lookup.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// True when the attribute exists and carries a meaningful value.
    pub fn has(&self, key: &str) -> bool {
        match self.attributes.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Bool(b)) => *b,
            Some(_) => true,
        }
    }

    /// Reads a boolean attribute; accepts JSON booleans and yes/no strings.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.attributes.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" => Some(true),
                "false" | "no" | "n" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Reads a numeric attribute; accepts JSON numbers and numeric strings.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.attributes.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Reads a string attribute.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Reads a list-of-strings attribute. A single string counts as a
    /// one-element list.
    pub fn texts(&self, key: &str) -> Vec<String> {
        match self.attributes.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// Sum of line item amounts.
    pub fn line_item_total(&self) -> f64 {
        self.line_items.iter().map(|item| item.amount).sum()
    }

    /// One-paragraph plain text description used in prompts.
    pub fn summary(&self) -> String {
        let mut parts = vec![
            format!("Case {}", self.id),
            format!("status: {}", self.status),
            format!("amount: {:.2}", self.amount),
        ];
        if let Some(scenario) = self.scenario_key() {
            parts.push(format!("scenario: {}", scenario));
        }
        if let Some(member) = &self.member {
            parts.push(format!("member: {}", member));
        }
        if let Some(provider) = &self.provider {
            parts.push(format!("provider: {}", provider));
        }
        if let Some(state) = &self.state {
            parts.push(format!("state: {}", state));
        }
        if !self.line_items.is_empty() {
            let codes: Vec<&str> = self.line_items.iter().map(|i| i.code.as_str()).collect();
            parts.push(format!("line items: {}", codes.join(", ")));
        }
        for (key, value) in &self.attributes {
            parts.push(format!("{}: {}", key, value));
        }
        parts.join("; ")
    }
}
