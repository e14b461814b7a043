//! Agent endpoint integration for generative UI conversations
//!
//! This crate implements:
//! - The declarative UI tree the model answers with ([`UiNode`])
//! - The context entries sent along with each prompt
//! - A common interface for agent backends via the [`AgentClient`] trait
//! - An Azure OpenAI chat-completions backend and an offline playback backend
//! - Connection settings, layered loading and validation


pub mod utils;

pub mod azure_openai;
pub mod config;
pub mod playback;
pub mod system_prompt;
pub mod types;
pub mod ui_node;

pub use azure_openai::AzureOpenAIClient;
pub use config::{AgentConnectionConfig, ConfigField, ConfigValidationError, McpServerConfig};
pub use playback::PlaybackClient;
pub use types::*;
pub use ui_node::{ComponentKind, PropValue, UiNode};

use anyhow::Result;
use async_trait::async_trait;

/// Trait for the model endpoint that turns prompts into UI trees
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Establish (and verify) a connection with the given settings
    async fn connect(&mut self, config: &AgentConnectionConfig) -> Result<()>;

    /// Ask the agent for the next UI, given the prompt and all prior turns
    async fn generate_response(&mut self, prompt: &str, history: &[ContextEntry]) -> Result<UiNode>;

    /// Forget the active connection
    fn disconnect(&mut self) {}
}
