//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port, and the reasoning agents built
//! on top of it.
//!
//! ## Available Adapters
//!
//! - `MockAIProvider` - Configurable mock for testing and offline demos
//! - `OpenAIProvider` - OpenAI-compatible chat completions
//! - `ProviderAgent` - A reasoning agent that prompts any AIProvider

mod agents;
mod mock_provider;
mod openai_provider;

pub use agents::{default_roster, AgentSettings, ProviderAgent};
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
