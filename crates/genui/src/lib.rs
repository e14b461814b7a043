//! Conversation and state engine for generative UI.
//!
//! The model answers every prompt with a UI tree. This crate keeps the
//! conversation history, collects the values of the displayed form, turns UI
//! actions into the next prompt and manages the connection to the agent. A
//! terminal renderer and the `genui` binary sit on top.

pub mod actions;
pub mod app;
pub mod cli;
pub mod config;
pub mod connection;
pub mod events;
pub mod form_state;
pub mod history;
pub mod logging;
pub mod serializer;
pub mod session;
pub mod ui;


use agent_client::AgentClient;
use connection::ConnectionSession;
use events::EventBus;
use session::{share_client, ConversationSession};
use std::sync::Arc;

/// Both sessions wired to one agent client and one event bus
pub struct GenUi {
    pub events: EventBus,
    pub conversation: Arc<ConversationSession>,
    pub connection: Arc<ConnectionSession>,
}

impl GenUi {
    pub fn new(client: Box<dyn AgentClient>) -> Self {
        let agent = share_client(client);
        let events = EventBus::new();
        Self {
            conversation: Arc::new(ConversationSession::new(agent.clone(), events.clone())),
            connection: Arc::new(ConnectionSession::new(agent, events.clone())),
            events,
        }
    }
}
