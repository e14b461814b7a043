//! Append-only conversation log.

use agent_client::UiNode;
use chrono::{DateTime, Utc};
use derive_more::IsVariant;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum ChatRole {
    User,
    Model,
}

/// What a turn carries; the role follows from the variant
#[derive(Debug, Clone, PartialEq)]
pub enum TurnPayload {
    User {
        /// Text shown in the conversation
        content: String,
        /// Text actually sent to the model, when it differs from `content`
        prompt_content: Option<String>,
    },
    Model {
        ui: UiNode,
    },
}

/// One entry of the conversation. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub timestamp: DateTime<Utc>,
    pub payload: TurnPayload,
}

impl ChatTurn {
    /// User turn; `prompt_content` is dropped when equal to the display text
    pub fn user(content: impl Into<String>, prompt_content: Option<String>) -> Self {
        let content = content.into();
        let prompt_content = prompt_content.filter(|prompt| *prompt != content);
        Self {
            timestamp: Utc::now(),
            payload: TurnPayload::User {
                content,
                prompt_content,
            },
        }
    }

    pub fn model(ui: UiNode) -> Self {
        Self {
            timestamp: Utc::now(),
            payload: TurnPayload::Model { ui },
        }
    }

    pub fn role(&self) -> ChatRole {
        match self.payload {
            TurnPayload::User { .. } => ChatRole::User,
            TurnPayload::Model { .. } => ChatRole::Model,
        }
    }

    /// Display text of a user turn
    pub fn content(&self) -> Option<&str> {
        match &self.payload {
            TurnPayload::User { content, .. } => Some(content),
            TurnPayload::Model { .. } => None,
        }
    }

    /// What the model was technically asked: `prompt_content`, else `content`
    pub fn technical_text(&self) -> Option<&str> {
        match &self.payload {
            TurnPayload::User {
                content,
                prompt_content,
            } => Some(prompt_content.as_deref().unwrap_or(content)),
            TurnPayload::Model { .. } => None,
        }
    }

    pub fn ui(&self) -> Option<&UiNode> {
        match &self.payload {
            TurnPayload::Model { ui } => Some(ui),
            TurnPayload::User { .. } => None,
        }
    }
}

/// Ordered turns of one session. Only the owning session appends.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    turns: Vec<Arc<ChatTurn>>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, turn: ChatTurn) -> (usize, Arc<ChatTurn>) {
        let turn = Arc::new(turn);
        self.turns.push(turn.clone());
        (self.turns.len() - 1, turn)
    }

    pub fn turns(&self) -> &[Arc<ChatTurn>] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Arc<ChatTurn>> {
        self.turns.last()
    }

    /// Most recent model turn's UI, i.e. what the renderer currently shows
    pub fn latest_ui(&self) -> Option<&UiNode> {
        self.turns.iter().rev().find_map(|turn| turn.ui())
    }

    pub fn count_role(&self, role: ChatRole) -> usize {
        self.turns.iter().filter(|turn| turn.role() == role).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_client::ComponentKind;

    #[test]
    fn test_user_turn_prefers_prompt_content() {
        let turn = ChatTurn::user(
            "Triggered Action: go",
            Some("User triggered action: go.".to_string()),
        );
        assert!(turn.role().is_user());
        assert_eq!(turn.content(), Some("Triggered Action: go"));
        assert_eq!(turn.technical_text(), Some("User triggered action: go."));
        assert!(turn.ui().is_none());
    }

    #[test]
    fn test_identical_prompt_is_not_duplicated() {
        let turn = ChatTurn::user("hello", Some("hello".to_string()));
        assert_eq!(
            turn.payload,
            TurnPayload::User {
                content: "hello".to_string(),
                prompt_content: None
            }
        );
        assert_eq!(turn.technical_text(), Some("hello"));
    }

    #[test]
    fn test_model_turn_has_no_content() {
        let turn = ChatTurn::model(UiNode::text("hi"));
        assert!(turn.role().is_model());
        assert!(turn.content().is_none());
        assert!(turn.technical_text().is_none());
        assert_eq!(turn.ui(), Some(&UiNode::text("hi")));
    }

    #[test]
    fn test_history_appends_in_order() {
        let mut history = ConversationHistory::new();
        assert!(history.latest_ui().is_none());

        let (first, _) = history.append(ChatTurn::user("a", None));
        let (second, _) = history.append(ChatTurn::model(UiNode::new(ComponentKind::Card)));
        history.append(ChatTurn::user("b", None));

        assert_eq!((first, second), (0, 1));
        assert_eq!(history.len(), 3);
        assert_eq!(history.count_role(ChatRole::User), 2);
        assert_eq!(
            history.latest_ui().map(|ui| &ui.kind),
            Some(&ComponentKind::Card)
        );
        assert_eq!(history.last().and_then(|t| t.content()), Some("b"));
    }
}
