//! Offline agent that replays UI trees from a file.
//!
//! The file is a JSON array of nodes; each `generate_response` call returns
//! the next one. Prompts received are recorded so a demo run can be
//! inspected afterwards.

use crate::config::AgentConnectionConfig;
use crate::types::ContextEntry;
use crate::ui_node::UiNode;
use crate::AgentClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// A prompt as the playback client received it
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedPrompt {
    pub prompt: String,
    pub history_len: usize,
}

pub struct PlaybackClient {
    responses: VecDeque<UiNode>,
    received: Arc<Mutex<Vec<ReceivedPrompt>>>,
}

impl PlaybackClient {
    pub fn new(responses: Vec<UiNode>) -> Self {
        Self {
            responses: responses.into(),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read playback file: {}", path.display()))?;
        let responses: Vec<UiNode> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse playback file: {}", path.display()))?;
        Ok(Self::new(responses))
    }

    pub fn remaining(&self) -> usize {
        self.responses.len()
    }

    /// Shared handle to the prompts received so far
    pub fn received_prompts(&self) -> Arc<Mutex<Vec<ReceivedPrompt>>> {
        self.received.clone()
    }
}

#[async_trait]
impl AgentClient for PlaybackClient {
    async fn connect(&mut self, config: &AgentConnectionConfig) -> Result<()> {
        debug!(
            "Playback client accepts connection to '{}'",
            config.deployment_name
        );
        Ok(())
    }

    async fn generate_response(&mut self, prompt: &str, history: &[ContextEntry]) -> Result<UiNode> {
        if let Ok(mut received) = self.received.lock() {
            received.push(ReceivedPrompt {
                prompt: prompt.to_string(),
                history_len: history.len(),
            });
        }
        self.responses
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("No more recorded responses"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_replays_in_order_then_fails() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"[{{"type":"text","props":{{"content":"one"}}}},{{"type":"text","props":{{"content":"two"}}}}]"#
        )?;

        let mut client = PlaybackClient::from_file(file.path())?;
        let received = client.received_prompts();
        assert_eq!(client.remaining(), 2);

        let first = client.generate_response("a", &[]).await?;
        let second = client
            .generate_response("b", &[ContextEntry::user("a")])
            .await?;
        assert_eq!(first, UiNode::text("one"));
        assert_eq!(second, UiNode::text("two"));
        assert!(client.generate_response("c", &[]).await.is_err());

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 3);
        assert_eq!(received[1].history_len, 1);
        Ok(())
    }
}
