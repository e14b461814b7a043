use crate::config::AgentConnectionConfig;
use crate::system_prompt::UI_SYSTEM_PROMPT;
use crate::types::{ContextEntry, ContextRole};
use crate::ui_node::UiNode;
use crate::{utils, AgentClient, ApiError};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_API_VERSION: &str = "2024-08-01-preview";

/// Trait for providing authentication headers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn get_auth_headers(&self) -> Result<Vec<(String, String)>>;
}

/// Azure resource key authentication (`api-key` header)
pub struct ApiKeyAuth {
    api_key: String,
}

impl ApiKeyAuth {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }
}

#[async_trait]
impl AuthProvider for ApiKeyAuth {
    async fn get_auth_headers(&self) -> Result<Vec<(String, String)>> {
        Ok(vec![("api-key".to_string(), self.api_key.clone())])
    }
}

#[derive(Debug, Serialize, Clone)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize, Clone)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Active deployment after a successful `connect`
struct Deployment {
    config: AgentConnectionConfig,
    auth: Box<dyn AuthProvider>,
}

/// Agent client for Azure OpenAI chat completions deployments
pub struct AzureOpenAIClient {
    client: Client,
    deployment: Option<Deployment>,
    system_prompt: String,
    temperature: Option<f32>,
}

impl Default for AzureOpenAIClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AzureOpenAIClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            deployment: None,
            system_prompt: UI_SYSTEM_PROMPT.to_string(),
            temperature: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// `temperature` is only sent when set
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn is_connected(&self) -> bool {
        self.deployment.is_some()
    }

    fn chat_url(config: &AgentConnectionConfig) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            config.base_url(),
            config.deployment_name.trim()
        )
    }

    /// System prompt, prior turns, then the new prompt
    fn build_messages(&self, prompt: &str, history: &[ContextEntry]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::new("system", self.system_prompt.as_str()));
        messages.extend(history.iter().map(|entry| {
            let role = match entry.role {
                ContextRole::User => "user",
                ContextRole::Model => "assistant",
            };
            ChatMessage::new(role, entry.text())
        }));
        messages.push(ChatMessage::new("user", prompt));
        messages
    }

    async fn post_chat(
        &self,
        deployment: &Deployment,
        request: &ChatRequest,
    ) -> Result<ChatResponse> {
        let mut request_builder = self
            .client
            .post(Self::chat_url(&deployment.config))
            .query(&[("api-version", deployment.config.api_version.trim())]);

        for (key, value) in deployment.auth.get_auth_headers().await? {
            request_builder = request_builder.header(key, value);
        }

        let response = request_builder
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        let response = utils::check_response_error(response).await?;

        let response_text = response
            .text()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        let chat_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| ApiError::Unknown(format!("Failed to parse response: {e}")))?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "Token usage: {} prompt, {} completion",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat_response)
    }
}

#[async_trait]
impl AgentClient for AzureOpenAIClient {
    async fn connect(&mut self, config: &AgentConnectionConfig) -> Result<()> {
        if let Err(e) = config.validate() {
            return Err(ApiError::InvalidRequest(e.to_string()).into());
        }

        if let Some(servers) = &config.mcp_servers {
            // Chat completions has no MCP tool type; the servers stay part of the config only
            warn!(
                "{} MCP server(s) configured; they are not forwarded by the chat completions API",
                servers.len()
            );
        }

        let deployment = Deployment {
            config: config.clone(),
            auth: Box::new(ApiKeyAuth::new(config.api_key.trim().to_string())),
        };

        // Cheapest request that proves endpoint, key and deployment are usable
        let ping = ChatRequest {
            messages: vec![ChatMessage::new("user", "ping")],
            temperature: None,
            max_tokens: Some(1),
            response_format: None,
        };
        self.post_chat(&deployment, &ping).await?;

        debug!(
            "Connected to deployment '{}' at {}",
            config.deployment_name,
            config.base_url()
        );
        self.deployment = Some(deployment);
        Ok(())
    }

    async fn generate_response(&mut self, prompt: &str, history: &[ContextEntry]) -> Result<UiNode> {
        let deployment = self.deployment.as_ref().ok_or(ApiError::NotConnected)?;

        let request = ChatRequest {
            messages: self.build_messages(prompt, history),
            temperature: self.temperature,
            max_tokens: None,
            response_format: Some(ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        };
        debug!(
            "Sending prompt with {} prior turns to '{}'",
            history.len(),
            deployment.config.deployment_name
        );

        let response = self.post_chat(deployment, &request).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ApiError::InvalidResponse("reply has no content".to_string()))?;

        Ok(utils::parse_ui_response(&content)?)
    }

    fn disconnect(&mut self) {
        self.deployment = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages_maps_roles_in_order() {
        let client = AzureOpenAIClient::new().with_system_prompt("sys");
        let history = vec![
            ContextEntry::user("hello"),
            ContextEntry::model(r#"{"type":"text"}"#),
        ];

        let messages = client.build_messages("next", &history);
        assert_eq!(
            messages,
            vec![
                ChatMessage::new("system", "sys"),
                ChatMessage::new("user", "hello"),
                ChatMessage::new("assistant", r#"{"type":"text"}"#),
                ChatMessage::new("user", "next"),
            ]
        );
    }

    #[test]
    fn test_chat_url_trims_endpoint() {
        let config = AgentConnectionConfig {
            endpoint: "https://res.openai.azure.com/".to_string(),
            api_key: "k".to_string(),
            deployment_name: "gpt-4o".to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            mcp_servers: None,
        };
        assert_eq!(
            AzureOpenAIClient::chat_url(&config),
            "https://res.openai.azure.com/openai/deployments/gpt-4o/chat/completions"
        );
    }
}
