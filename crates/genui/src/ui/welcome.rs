use crate::actions::{DEMO_PROMPTS, OPEN_SETTINGS_ACTION};
use agent_client::{ComponentKind, UiNode};

/// Start screen shown while the conversation is empty. It is a regular UI
/// tree, so its buttons go through the normal action path.
pub fn welcome_screen() -> UiNode {
    let demos = UiNode::new(ComponentKind::Card)
        .with_prop("title", "Try a demo")
        .with_children(
            DEMO_PROMPTS
                .iter()
                .map(|demo| UiNode::button(demo.label, demo.action_id)),
        );

    UiNode::new(ComponentKind::Container)
        .with_child(
            UiNode::new(ComponentKind::Heading)
                .with_prop("content", "Generative UI")
                .with_prop("level", 1i64),
        )
        .with_child(
            UiNode::text("Describe the interface you need and the agent will build it.")
                .with_prop("tone", "muted"),
        )
        .with_child(demos)
        .with_child(
            UiNode::button("Connection settings", OPEN_SETTINGS_ACTION)
                .with_prop("variant", "secondary"),
        )
}
