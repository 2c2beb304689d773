//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::ai::{AgentSettings, OpenAIConfig};
use crate::domain::chat::ChatConfig;

/// AI provider configuration
#[derive(Debug, Deserialize)]
pub struct AiConfig {
    /// Which provider backs the agents and the chat assistant
    #[serde(default)]
    pub provider: AiProvider,

    /// OpenAI API key
    pub openai_api_key: Option<Secret<String>>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Override for OpenAI-compatible endpoints
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Sampling temperature for chat answers
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Token limit for chat answers
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

/// AI provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// Canned responses, no network
    #[default]
    Mock,
    OpenAI,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        self.openai_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// OpenAI client settings, when a key is present.
    pub fn openai(&self) -> Option<OpenAIConfig> {
        let key = self.openai_api_key.as_ref().filter(|_| self.has_openai())?;
        let mut config = OpenAIConfig::new(key.expose_secret().clone())
            .with_model(self.model.clone())
            .with_timeout(self.timeout())
            .with_max_retries(self.max_retries);
        if let Some(url) = self.base_url.as_ref().filter(|u| !u.is_empty()) {
            config = config.with_base_url(url.clone());
        }
        Some(config)
    }

    pub fn chat(&self) -> ChatConfig {
        ChatConfig {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            ..ChatConfig::default()
        }
    }

    pub fn agents(&self) -> AgentSettings {
        AgentSettings::default()
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if self.provider == AiProvider::OpenAI && !self.has_openai() {
            errors.push(ValidationError::MissingRequired("OPENAI_API_KEY"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            errors.push(ValidationError::InvalidTimeout);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            errors.push(ValidationError::InvalidTemperature);
        }
        if self.max_tokens == 0 {
            errors.push(ValidationError::InvalidMaxTokens);
        }
        ValidationError::collect(errors)
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            openai_api_key: None,
            model: default_model(),
            base_url: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.provider, AiProvider::Mock);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_retries, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AiConfig {
            timeout_secs: 45,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(45));
    }

    #[test]
    fn test_openai_requires_key() {
        let config = AiConfig {
            provider: AiProvider::OpenAI,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("OPENAI_API_KEY"))
        );
        assert!(config.openai().is_none());
    }

    #[test]
    fn test_blank_key_is_not_configured() {
        let config = AiConfig {
            openai_api_key: Some(Secret::new("   ".to_string())),
            ..Default::default()
        };
        assert!(!config.has_openai());
    }

    #[test]
    fn test_openai_config_built_from_key() {
        let config = AiConfig {
            provider: AiProvider::OpenAI,
            openai_api_key: Some(Secret::new("sk-xxx".to_string())),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.openai().is_some());
    }

    #[test]
    fn test_reports_every_violation() {
        let config = AiConfig {
            temperature: 3.0,
            max_tokens: 0,
            ..Default::default()
        };
        match config.validate() {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected multiple errors, got {:?}", other),
        }
    }

    #[test]
    fn test_key_is_redacted_in_debug() {
        let config = AiConfig {
            openai_api_key: Some(Secret::new("sk-secret".to_string())),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("sk-secret"));
    }
}
