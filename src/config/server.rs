//! HTTP listener, transport and logging settings.

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use super::error::ValidationError;
use crate::adapters::http::HttpSettings;

const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Production switches logs to JSON.
    #[serde(default)]
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds a handler may take to produce its response head. Analysis
    /// and chat streams are not cut off once their SSE headers are sent.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Seconds between SSE keep-alive comments on idle streams.
    #[serde(default = "default_keep_alive")]
    pub sse_keep_alive_secs: u64,

    /// Comma-separated allowed origins. Unset or `*` allows any.
    pub cors_origins: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Allowed origins with blanks dropped.
    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Router settings derived from this section.
    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            cors_origins: self.cors_origins_list(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            keep_alive: Duration::from_secs(self.sse_keep_alive_secs),
        }
    }

    /// Reports every invalid setting at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if self.port == 0 {
            errors.push(ValidationError::InvalidPort);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            errors.push(ValidationError::InvalidTimeout);
        }
        if self.sse_keep_alive_secs == 0 {
            errors.push(ValidationError::InvalidKeepAlive);
        }
        if let Err(e) = EnvFilter::try_new(&self.log_level) {
            errors.push(ValidationError::InvalidLogFilter(e.to_string()));
        }
        ValidationError::collect(errors)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
            request_timeout_secs: default_request_timeout(),
            sse_keep_alive_secs: default_keep_alive(),
            cors_origins: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info,case_reasoning=debug,tower_http=info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_keep_alive() -> u64 {
    15
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_serve_on_all_interfaces() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn http_settings_carry_timeouts_and_origins() {
        let config = ServerConfig {
            cors_origins: Some("http://localhost:5173, ,http://localhost:3000".to_string()),
            request_timeout_secs: 45,
            sse_keep_alive_secs: 5,
            ..Default::default()
        };

        let settings = config.http_settings();

        assert_eq!(
            settings.cors_origins,
            vec!["http://localhost:5173", "http://localhost:3000"]
        );
        assert_eq!(settings.request_timeout, Duration::from_secs(45));
        assert_eq!(settings.keep_alive, Duration::from_secs(5));
    }

    #[test]
    fn unset_origins_allow_any() {
        assert!(ServerConfig::default().http_settings().cors_origins.is_empty());
    }

    #[test]
    fn bad_log_filter_is_rejected() {
        let config = ServerConfig {
            log_level: "case_reasoning=loud".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidLogFilter(_))
        ));
    }

    #[test]
    fn every_violation_is_reported() {
        let config = ServerConfig {
            port: 0,
            request_timeout_secs: 500,
            sse_keep_alive_secs: 0,
            ..Default::default()
        };

        let Err(ValidationError::Multiple(errors)) = config.validate() else {
            panic!("expected several violations");
        };
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidPort,
                ValidationError::InvalidTimeout,
                ValidationError::InvalidKeepAlive,
            ]
        );
    }
}
