//! Reasoning run configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::reasoning::RunConfig;

/// How reasoning runs deliver their steps
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Type each step out before delivering it
    #[serde(default)]
    pub streaming: bool,

    /// Milliseconds between typed characters
    #[serde(default = "default_typing_delay")]
    pub typing_delay_ms: u64,

    /// Upper bound on one agent call in seconds; 0 disables it
    #[serde(default = "default_agent_timeout")]
    pub agent_timeout_secs: u64,
}

impl PipelineConfig {
    pub fn run_config(&self) -> RunConfig {
        let agent_timeout =
            (self.agent_timeout_secs > 0).then(|| Duration::from_secs(self.agent_timeout_secs));
        RunConfig {
            streaming: self.streaming,
            typing_delay: Duration::from_millis(self.typing_delay_ms),
            agent_timeout,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            streaming: false,
            typing_delay_ms: default_typing_delay(),
            agent_timeout_secs: default_agent_timeout(),
        }
    }
}

fn default_typing_delay() -> u64 {
    20
}

fn default_agent_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_run_config() {
        assert_eq!(PipelineConfig::default().run_config(), RunConfig::default());
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let config = PipelineConfig {
            streaming: true,
            typing_delay_ms: 5,
            agent_timeout_secs: 0,
        };
        let run = config.run_config();
        assert!(run.streaming);
        assert_eq!(run.typing_delay, Duration::from_millis(5));
        assert_eq!(run.agent_timeout, None);
    }
}
