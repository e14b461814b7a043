use serde::{Deserialize, Serialize};

/// Author of a context entry as seen by the model
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContextRole {
    User,
    Model,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ContextPart {
    pub text: String,
}

/// One prior turn as sent to the agent: `{role, parts: [{text}]}`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ContextEntry {
    pub role: ContextRole,
    pub parts: Vec<ContextPart>,
}

impl ContextEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ContextRole::User,
            parts: vec![ContextPart { text: text.into() }],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ContextRole::Model,
            parts: vec![ContextPart { text: text.into() }],
        }
    }

    /// All parts joined, in order
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Common error types for the agent endpoint
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Agent is not connected")]
    NotConnected,

    #[error("Model reply is not a UI description: {0}")]
    InvalidResponse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
