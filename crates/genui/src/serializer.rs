//! Turns the conversation history into the context sent with each prompt.
//!
//! User turns contribute what was technically asked (never the cosmetic
//! display text). Model turns contribute the canonical JSON of the UI they
//! rendered, so the model sees its own previous interface on the next turn.

use crate::history::{ChatTurn, ConversationHistory, TurnPayload};
use agent_client::ContextEntry;

pub fn serialize_turn(turn: &ChatTurn) -> serde_json::Result<ContextEntry> {
    Ok(match &turn.payload {
        TurnPayload::User {
            content,
            prompt_content,
        } => ContextEntry::user(prompt_content.as_deref().unwrap_or(content)),
        TurnPayload::Model { ui } => ContextEntry::model(ui.to_canonical_json()?),
    })
}

/// One context entry per turn, in history order
pub fn serialize_history(history: &ConversationHistory) -> serde_json::Result<Vec<ContextEntry>> {
    history
        .turns()
        .iter()
        .map(|turn| serialize_turn(turn))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_client::{ComponentKind, ContextRole, UiNode};

    fn sample_history() -> ConversationHistory {
        let mut history = ConversationHistory::new();
        history.append(ChatTurn::user("Show an order form", None));
        history.append(ChatTurn::model(
            UiNode::new(ComponentKind::Form)
                .with_prop("title", "Order")
                .with_child(UiNode::new(ComponentKind::Input).with_prop("id", "name"))
                .with_child(UiNode::button("Submit", "submit_order")),
        ));
        history.append(ChatTurn::user(
            "Triggered Action: submit_order (with submitted data)",
            Some("User triggered action: submit_order.".to_string()),
        ));
        history
    }

    #[test]
    fn test_one_entry_per_turn_with_roles() {
        let context = serialize_history(&sample_history()).unwrap();
        let roles: Vec<ContextRole> = context.iter().map(|e| e.role).collect();
        assert_eq!(
            roles,
            vec![ContextRole::User, ContextRole::Model, ContextRole::User]
        );
        assert!(context.iter().all(|e| e.parts.len() == 1));
    }

    #[test]
    fn test_user_entry_uses_technical_text() {
        let context = serialize_history(&sample_history()).unwrap();
        assert_eq!(context[0].text(), "Show an order form");
        assert_eq!(context[2].text(), "User triggered action: submit_order.");
    }

    #[test]
    fn test_model_entry_is_canonical_json_in_layout_order() {
        let context = serialize_history(&sample_history()).unwrap();
        assert_eq!(
            context[1].text(),
            r#"{"type":"form","props":{"title":"Order"},"children":[{"type":"input","props":{"id":"name"}},{"type":"button","props":{"actionId":"submit_order","label":"Submit"}}]}"#
        );
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let history = sample_history();
        assert_eq!(
            serialize_history(&history).unwrap(),
            serialize_history(&history).unwrap()
        );
    }

    #[test]
    fn test_empty_history_gives_empty_context() {
        assert!(serialize_history(&ConversationHistory::new())
            .unwrap()
            .is_empty());
    }
}
