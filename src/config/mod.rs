//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `CASE_REASONING`
//! prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use case_reasoning::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod catalog;
mod error;
mod pipeline;
mod screening;
mod server;

pub use ai::{AiConfig, AiProvider};
pub use catalog::CatalogConfig;
pub use error::{ConfigError, ValidationError};
pub use pipeline::PipelineConfig;
pub use screening::ScreeningConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// mock-backed server. Load using [`AppConfig::load()`].
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, CORS)
    #[serde(default)]
    pub server: ServerConfig,

    /// AI provider configuration (mock or OpenAI)
    #[serde(default)]
    pub ai: AiConfig,

    /// Reasoning run delivery
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Pre-screening confidences and thresholds
    #[serde(default)]
    pub screening: ScreeningConfig,

    /// SOP catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CASE_REASONING` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `CASE_REASONING__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CASE_REASONING__PIPELINE__STREAMING=true` -> `pipeline.streaming = true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CASE_REASONING")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values, reporting every violation at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let results = [
            self.server.validate(),
            self.ai.validate(),
            self.screening.validate(),
            self.catalog.validate(),
        ];
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(()) => {}
                Err(ValidationError::Multiple(inner)) => errors.extend(inner),
                Err(e) => errors.push(e),
            }
        }
        ValidationError::collect(errors)
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 7] = [
        "CASE_REASONING__SERVER__PORT",
        "CASE_REASONING__SERVER__ENVIRONMENT",
        "CASE_REASONING__AI__PROVIDER",
        "CASE_REASONING__AI__OPENAI_API_KEY",
        "CASE_REASONING__PIPELINE__STREAMING",
        "CASE_REASONING__PIPELINE__AGENT_TIMEOUT_SECS",
        "CASE_REASONING__SCREENING__REVIEW_CONFIDENCE",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.ai.provider, AiProvider::Mock);
        assert!(!config.pipeline.streaming);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("CASE_REASONING__SERVER__PORT", "3000");
        env::set_var("CASE_REASONING__PIPELINE__STREAMING", "true");
        env::set_var("CASE_REASONING__PIPELINE__AGENT_TIMEOUT_SECS", "5");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        let run = config.pipeline.run_config();
        assert!(run.streaming);
        assert_eq!(run.agent_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("CASE_REASONING__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn test_openai_key_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("CASE_REASONING__AI__PROVIDER", "openai");
        env::set_var("CASE_REASONING__AI__OPENAI_API_KEY", "sk-test");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.provider, AiProvider::OpenAI);
        assert!(config.ai.has_openai());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_collects_all_sections() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("CASE_REASONING__AI__PROVIDER", "openai");
        env::set_var("CASE_REASONING__SCREENING__REVIEW_CONFIDENCE", "0.99");
        let result = AppConfig::load();
        clear_env();

        match result.unwrap().validate() {
            Err(ValidationError::Multiple(errors)) => {
                assert!(errors.contains(&ValidationError::MissingRequired("OPENAI_API_KEY")));
                assert!(errors.contains(&ValidationError::ReviewAboveDecision));
            }
            other => panic!("expected multiple errors, got {:?}", other),
        }
    }
}
