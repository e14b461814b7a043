//! Connection lifecycle of the agent endpoint.

use crate::events::{EventBus, SessionEvent};
use crate::session::{ConversationSession, SharedAgentClient};
use agent_client::{AgentConnectionConfig, ComponentKind, ConfigValidationError, UiNode};
use derive_more::IsVariant;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, IsVariant)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Validation(#[from] ConfigValidationError),
    #[error("A connection attempt is already in progress")]
    AlreadyConnecting,
    #[error("Connection failed: {0:#}")]
    Agent(anyhow::Error),
}

pub struct ConnectionSession {
    agent: SharedAgentClient,
    state: Mutex<ConnectionState>,
    config: Mutex<Option<AgentConnectionConfig>>,
    events: EventBus,
}

impl ConnectionSession {
    pub fn new(agent: SharedAgentClient, events: EventBus) -> Self {
        Self {
            agent,
            state: Mutex::new(ConnectionState::default()),
            config: Mutex::new(None),
            events,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ConnectionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_config(&self) -> MutexGuard<'_, Option<AgentConnectionConfig>> {
        self.config
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> ConnectionState {
        *self.lock_state()
    }

    /// Settings of the last successful connection
    pub fn config(&self) -> Option<AgentConnectionConfig> {
        self.lock_config().clone()
    }

    fn set_state(&self, state: ConnectionState) {
        *self.lock_state() = state;
        self.events
            .emit(&SessionEvent::ConnectionStateChanged(state));
    }

    /// Validate `config`, connect the agent client and acknowledge the
    /// connection in the conversation.
    ///
    /// Invalid settings are rejected before anything else happens; the state
    /// stays as it was.
    pub async fn connect(
        &self,
        config: AgentConnectionConfig,
        conversation: &ConversationSession,
    ) -> Result<(), ConnectionError> {
        if let Err(e) = config.validate() {
            warn!("Rejected connection settings: {e}");
            return Err(e.into());
        }

        {
            let mut state = self.lock_state();
            if state.is_connecting() {
                return Err(ConnectionError::AlreadyConnecting);
            }
            *state = ConnectionState::Connecting;
        }
        self.events
            .emit(&SessionEvent::ConnectionStateChanged(ConnectionState::Connecting));

        debug!(
            "Connecting to deployment {} at {}",
            config.deployment_name,
            config.base_url()
        );
        let result = {
            let mut agent = self.agent.lock().await;
            agent.connect(&config).await
        };

        match result {
            Ok(()) => {
                info!("Connected to deployment {}", config.deployment_name);
                let acknowledgement = acknowledgement_ui(&config);
                *self.lock_config() = Some(config);
                self.set_state(ConnectionState::Connected);
                conversation.append_model_turn(acknowledgement);
                Ok(())
            }
            Err(e) => {
                error!("Connection to {} failed: {e:#}", config.base_url());
                self.set_state(ConnectionState::Error);
                Err(ConnectionError::Agent(e))
            }
        }
    }

    pub async fn disconnect(&self) {
        self.agent.lock().await.disconnect();
        *self.lock_config() = None;
        self.set_state(ConnectionState::Disconnected);
        info!("Disconnected");
    }
}

/// Model turn shown after a successful connect. Never includes the key.
fn acknowledgement_ui(config: &AgentConnectionConfig) -> UiNode {
    let mut card = UiNode::new(ComponentKind::Card)
        .with_prop("title", "Connected")
        .with_child(UiNode::new(ComponentKind::Badge).with_prop("label", "connected"))
        .with_child(UiNode::text(format!(
            "Connected to deployment {} at {} (API version {}).",
            config.deployment_name,
            config.base_url(),
            config.api_version
        )));

    if let Some(servers) = config.mcp_servers.as_deref().filter(|s| !s.is_empty()) {
        let names: Vec<&str> = servers.iter().map(|server| server.name.as_str()).collect();
        card = card.with_child(UiNode::text(format!(
            "MCP servers: {}",
            names.join(", ")
        )));
    }

    card.with_child(UiNode::text("Describe what you need and I will build the interface for it."))
}
