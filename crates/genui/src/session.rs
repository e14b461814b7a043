//! The conversation session: history, form state and the single in-flight
//! request.
//!
//! All writes to history and form state go through this type. Each write
//! commits, releases its lock and then notifies subscribers on the
//! [`EventBus`].

use crate::actions::{self, DispatchOutcome};
use crate::events::{EventBus, SessionEvent, UiEffect};
use crate::form_state::{ActiveFormData, FormStateAggregator};
use crate::history::{ChatTurn, ConversationHistory};
use crate::serializer::serialize_history;
use agent_client::{AgentClient, ContextEntry, UiNode};
use derive_more::IsVariant;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error};

/// Agent client shared by the conversation and connection sessions
pub type SharedAgentClient = Arc<tokio::sync::Mutex<Box<dyn AgentClient>>>;

pub fn share_client(client: Box<dyn AgentClient>) -> SharedAgentClient {
    Arc::new(tokio::sync::Mutex::new(client))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum SessionState {
    Idle,
    Sending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum SkipReason {
    EmptyPrompt,
    /// Another request is in flight; the new one is dropped, not queued
    AlreadySending,
}

#[derive(Debug, Clone, PartialEq, Eq, IsVariant)]
pub enum SendOutcome {
    Skipped(SkipReason),
    Answered,
    /// The user turn stays in history without an answer
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, IsVariant)]
pub enum ActionOutcome {
    OpenSettings,
    Sent(SendOutcome),
}

/// Clears the sending flag when the send finishes, however it finishes.
struct SendingGuard<'a> {
    session: &'a ConversationSession,
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.session.sending.store(false, Ordering::Release);
        self.session
            .events
            .emit(&SessionEvent::SendingChanged(false));
    }
}

pub struct ConversationSession {
    agent: SharedAgentClient,
    history: Mutex<ConversationHistory>,
    form: FormStateAggregator,
    input: Mutex<String>,
    sending: AtomicBool,
    events: EventBus,
}

impl ConversationSession {
    pub fn new(agent: SharedAgentClient, events: EventBus) -> Self {
        Self {
            agent,
            history: Mutex::new(ConversationHistory::new()),
            form: FormStateAggregator::new(),
            input: Mutex::new(String::new()),
            sending: AtomicBool::new(false),
            events,
        }
    }

    fn lock_history(&self) -> MutexGuard<'_, ConversationHistory> {
        self.history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_input(&self) -> MutexGuard<'_, String> {
        self.input
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn set_input(&self, text: impl Into<String>) {
        *self.lock_input() = text.into();
    }

    pub fn input(&self) -> String {
        self.lock_input().clone()
    }

    pub fn state(&self) -> SessionState {
        if self.is_sending() {
            SessionState::Sending
        } else {
            SessionState::Idle
        }
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Snapshot of the history; later appends do not show up in it
    pub fn history(&self) -> ConversationHistory {
        self.lock_history().clone()
    }

    /// The context a send would attach right now
    pub fn context(&self) -> serde_json::Result<Vec<ContextEntry>> {
        serialize_history(&self.lock_history())
    }

    pub fn on_field_change(&self, id: impl Into<String>, value: impl Into<String>, is_valid: bool) {
        self.form.on_field_change(id, value, is_valid);
    }

    pub fn form_snapshot(&self) -> Arc<ActiveFormData> {
        self.form.snapshot()
    }

    /// Append a model turn, replacing the UI the user was filling in
    pub fn append_model_turn(&self, ui: UiNode) {
        // Field values belong to the form that was on screen; a new UI replaces it
        let abandoned = self.form.read_and_clear();
        if !abandoned.is_empty() {
            debug!("Discarding {} field value(s) of the replaced form", abandoned.len());
        }
        let appended = self.lock_history().append(ChatTurn::model(ui));
        self.notify_appended(appended);
    }

    fn notify_appended(&self, (index, turn): (usize, Arc<ChatTurn>)) {
        self.events
            .emit(&SessionEvent::TurnAppended { index, turn });
        self.events.defer(UiEffect::ScrollToLatest);
    }

    fn begin_sending(&self) -> Option<SendingGuard<'_>> {
        self.sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        self.events.emit(&SessionEvent::SendingChanged(true));
        Some(SendingGuard { session: self })
    }

    /// Send a prompt to the agent and append its answer.
    ///
    /// Without `prompt` the current free-text input is sent and cleared.
    /// `display` is what the conversation shows for the user turn and
    /// defaults to the prompt.
    pub async fn send_message(&self, prompt: Option<String>, display: Option<String>) -> SendOutcome {
        let from_input = prompt.is_none();
        let prompt = prompt.unwrap_or_else(|| self.input());
        if prompt.trim().is_empty() {
            debug!("Ignoring empty prompt");
            return SendOutcome::Skipped(SkipReason::EmptyPrompt);
        }

        let Some(_guard) = self.begin_sending() else {
            debug!("Ignoring prompt while a request is in flight");
            return SendOutcome::Skipped(SkipReason::AlreadySending);
        };
        if from_input {
            self.lock_input().clear();
        }

        let display = display.unwrap_or_else(|| prompt.clone());
        let user_turn = ChatTurn::user(display, Some(prompt.clone()));

        // The context covers only the turns before this prompt
        let (context, appended) = {
            let mut history = self.lock_history();
            let context = serialize_history(&history);
            (context, history.append(user_turn))
        };
        self.notify_appended(appended);

        let result = match context {
            Ok(context) => {
                debug!(
                    "Sending prompt ({} chars) with {} context entries",
                    prompt.len(),
                    context.len()
                );
                let mut agent = self.agent.lock().await;
                agent.generate_response(&prompt, &context).await
            }
            Err(e) => Err(anyhow::Error::new(e).context("Failed to serialize conversation history")),
        };

        match result {
            Ok(ui) => {
                self.append_model_turn(ui);
                SendOutcome::Answered
            }
            Err(e) => {
                error!("Agent request failed: {e:#}");
                SendOutcome::Failed(format!("{e:#}"))
            }
        }
    }

    /// Run an action triggered in the rendered UI.
    pub async fn handle_action(&self, action_id: &str) -> ActionOutcome {
        debug!("Action triggered: {action_id}");
        match actions::dispatch(action_id, &self.form) {
            Ok(DispatchOutcome::OpenSettings) => {
                self.events.emit(&SessionEvent::SettingsRequested);
                ActionOutcome::OpenSettings
            }
            Ok(DispatchOutcome::Send(composed)) => ActionOutcome::Sent(
                self.send_message(Some(composed.prompt), Some(composed.display))
                    .await,
            ),
            Err(e) => {
                error!("Failed to compose prompt for action {action_id}: {e}");
                ActionOutcome::Sent(SendOutcome::Failed(e.to_string()))
            }
        }
    }
}
