//! Turns UI actions into next-turn prompts.
//!
//! A composed prompt has two faces: the technical text the model receives
//! and the short text shown in the conversation.

use crate::form_state::{ActiveFormData, FormStateAggregator};
use derive_more::IsVariant;

/// Action id that opens the connection settings instead of prompting
pub const OPEN_SETTINGS_ACTION: &str = "open_settings";

const SUBMITTED_DATA_MARKER: &str = " (with submitted data)";
const INVALID_FIELDS_MARKER: &str = " [contains invalid fields]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    /// Sent to the model
    pub prompt: String,
    /// Shown to the user
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, IsVariant)]
pub enum DispatchOutcome {
    /// The caller should show the configuration surface
    OpenSettings,
    Send(ComposedPrompt),
}

/// Canned prompt for a demo button on the welcome screen
#[derive(Debug, Clone, Copy)]
pub struct DemoPrompt {
    pub action_id: &'static str,
    pub label: &'static str,
    pub display: &'static str,
    pub prompt: &'static str,
}

pub const DEMO_PROMPTS: &[DemoPrompt] = &[
    DemoPrompt {
        action_id: "demo_servicenow",
        label: "ServiceNow change request",
        display: "Create a ServiceNow change request",
        prompt: "Create a ServiceNow change request form. Include fields for short description, \
                 change type (standard, normal, emergency), risk level, assignment group, \
                 planned start date, planned end date and a justification text area. \
                 Add a submit button with actionId submit_change_request and a cancel button.",
    },
    DemoPrompt {
        action_id: "demo_flight_booking",
        label: "Flight booking",
        display: "Book a flight",
        prompt: "Show a flight booking form with origin, destination, departure date, \
                 return date, number of passengers and cabin class, and a search button \
                 with actionId search_flights.",
    },
    DemoPrompt {
        action_id: "demo_dashboard",
        label: "Status dashboard",
        display: "Show the project status dashboard",
        prompt: "Show a project status dashboard with cards for open incidents, deployments \
                 this week and SLA compliance. Give each card a badge for its status and add \
                 a refresh button with actionId refresh_dashboard.",
    },
    DemoPrompt {
        action_id: "demo_feedback_form",
        label: "Feedback form",
        display: "Give feedback",
        prompt: "Show a short customer feedback form with name, email, a rating from 1 to 5 \
                 and a comment field, plus a submit button with actionId submit_feedback.",
    },
];

pub fn demo_prompt(action_id: &str) -> Option<&'static DemoPrompt> {
    DEMO_PROMPTS.iter().find(|demo| demo.action_id == action_id)
}

/// Build the prompt for `action_id` from already collected form data.
pub fn compose(action_id: &str, form_data: &ActiveFormData) -> serde_json::Result<ComposedPrompt> {
    if form_data.is_empty() {
        return Ok(match demo_prompt(action_id) {
            Some(demo) => ComposedPrompt {
                prompt: demo.prompt.to_string(),
                display: demo.display.to_string(),
            },
            None => ComposedPrompt {
                prompt: format!("User triggered action: {action_id}."),
                display: format!("Triggered Action: {action_id}"),
            },
        });
    }

    let values = serde_json::to_string_pretty(&form_data.values())?;
    let mut prompt = format!(
        "User triggered action: {action_id}.\n\nSubmitted Form Data:\n{values}"
    );
    let mut display = format!("Triggered Action: {action_id}{SUBMITTED_DATA_MARKER}");

    let invalid_fields = form_data.invalid_fields();
    if !invalid_fields.is_empty() {
        prompt.push_str(&format!(
            "\n\nWARNING: The following fields were marked invalid by the form: {}. \
             Ask the user to correct them before proceeding.",
            invalid_fields.join(", ")
        ));
        display.push_str(INVALID_FIELDS_MARKER);
    }

    Ok(ComposedPrompt { prompt, display })
}

/// Resolve an action against the live form state.
///
/// Every action except [`OPEN_SETTINGS_ACTION`] consumes and clears the form
/// state, whether or not it had any data.
pub fn dispatch(action_id: &str, form: &FormStateAggregator) -> serde_json::Result<DispatchOutcome> {
    if action_id == OPEN_SETTINGS_ACTION {
        return Ok(DispatchOutcome::OpenSettings);
    }

    let form_data = form.read_and_clear();
    compose(action_id, &form_data).map(DispatchOutcome::Send)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submitted_form_data() {
        let form = FormStateAggregator::new();
        form.on_field_change("name", "foo", true);

        let outcome = dispatch("submit_order", &form).unwrap();
        let DispatchOutcome::Send(composed) = outcome else {
            panic!("expected a prompt");
        };

        assert_eq!(
            composed.prompt,
            "User triggered action: submit_order.\n\nSubmitted Form Data:\n{\n  \"name\": \"foo\"\n}"
        );
        assert!(composed.display.starts_with("Triggered Action: submit_order"));
        assert!(composed.display.ends_with(SUBMITTED_DATA_MARKER));
        assert!(form.snapshot().is_empty());
    }

    #[test]
    fn test_invalid_fields_add_warning_and_marker() {
        let form = FormStateAggregator::new();
        form.on_field_change("email", "bad", false);
        form.on_field_change("name", "ok", true);
        form.on_field_change("zip", "", false);

        let DispatchOutcome::Send(composed) = dispatch("register", &form).unwrap() else {
            panic!("expected a prompt");
        };

        assert!(composed.prompt.contains(
            "WARNING: The following fields were marked invalid by the form: email, zip."
        ));
        assert!(composed.display.contains(SUBMITTED_DATA_MARKER));
        assert!(composed.display.ends_with(INVALID_FIELDS_MARKER));
        // Invalid values are still forwarded
        assert!(composed.prompt.contains("\"email\": \"bad\""));
    }

    #[test]
    fn test_canned_demo_prompt_without_form_data() {
        let form = FormStateAggregator::new();
        let DispatchOutcome::Send(composed) = dispatch("demo_servicenow", &form).unwrap() else {
            panic!("expected a prompt");
        };

        let demo = demo_prompt("demo_servicenow").unwrap();
        assert_eq!(composed.prompt, demo.prompt);
        assert_eq!(composed.display, demo.display);
        assert!(composed.prompt.contains("ServiceNow change request"));
    }

    #[test]
    fn test_form_data_takes_precedence_over_demo_table() {
        let form = FormStateAggregator::new();
        form.on_field_change("q", "x", true);

        let DispatchOutcome::Send(composed) = dispatch("demo_servicenow", &form).unwrap() else {
            panic!("expected a prompt");
        };
        assert!(composed
            .prompt
            .starts_with("User triggered action: demo_servicenow."));
    }

    #[test]
    fn test_unknown_action_without_form_data() {
        let composed = compose("refresh", &ActiveFormData::default()).unwrap();
        assert_eq!(composed.prompt, "User triggered action: refresh.");
        assert_eq!(composed.display, "Triggered Action: refresh");
    }

    #[test]
    fn test_open_settings_does_not_touch_form_state() {
        let form = FormStateAggregator::new();
        form.on_field_change("name", "kept", true);

        let outcome = dispatch(OPEN_SETTINGS_ACTION, &form).unwrap();
        assert!(outcome.is_open_settings());
        assert_eq!(form.snapshot().len(), 1);
    }

    #[test]
    fn test_every_other_dispatch_clears_form_state() {
        let form = FormStateAggregator::new();
        form.on_field_change("stale", "value", true);
        dispatch("anything", &form).unwrap();

        let DispatchOutcome::Send(composed) = dispatch("demo_dashboard", &form).unwrap() else {
            panic!("expected a prompt");
        };
        assert!(!composed.prompt.contains("stale"));
    }
}
