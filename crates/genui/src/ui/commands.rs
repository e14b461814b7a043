use agent_client::config::PartialConnectionConfig;

/// Result of processing one line of terminal input
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Blank line
    Empty,
    /// Free text to send as a prompt
    Message(String),
    /// Trigger an action id as if its button was pressed
    Action(String),
    /// Report a field change
    SetField { id: String, value: String },
    /// Show the collected form values
    ShowForm,
    /// Connect, with settings overriding the resolved ones
    Connect(PartialConnectionConfig),
    Disconnect,
    Status,
    /// Show the context the next prompt would carry
    ShowContext,
    Help(String),
    Quit,
    InvalidCommand(String),
}

/// Parse a line typed into the terminal
pub fn process_command(input: &str) -> CommandResult {
    let input = input.trim();
    if input.is_empty() {
        return CommandResult::Empty;
    }
    let Some(command_line) = input.strip_prefix('/') else {
        return CommandResult::Message(input.to_string());
    };

    let (name, rest) = match command_line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command_line, ""),
    };

    match name.to_lowercase().as_str() {
        "" | "help" | "h" => CommandResult::Help(help_text().to_string()),
        "action" | "a" => {
            if rest.is_empty() || rest.contains(char::is_whitespace) {
                CommandResult::InvalidCommand("Usage: /action <id>".to_string())
            } else {
                CommandResult::Action(rest.to_string())
            }
        }
        "set" | "s" => {
            let (id, value) = match rest.split_once(char::is_whitespace) {
                Some((id, value)) => (id, value.trim()),
                None => (rest, ""),
            };
            if id.is_empty() {
                CommandResult::InvalidCommand("Usage: /set <id> <value>".to_string())
            } else {
                CommandResult::SetField {
                    id: id.to_string(),
                    value: value.to_string(),
                }
            }
        }
        "form" | "f" => CommandResult::ShowForm,
        "connect" => match parse_connect_args(rest) {
            Ok(overrides) => CommandResult::Connect(overrides),
            Err(message) => CommandResult::InvalidCommand(message),
        },
        "disconnect" => CommandResult::Disconnect,
        "status" => CommandResult::Status,
        "context" => CommandResult::ShowContext,
        "quit" | "q" | "exit" => CommandResult::Quit,
        _ => CommandResult::InvalidCommand(format!("Unknown command: /{name}")),
    }
}

/// `key=value` pairs of `/connect`
pub fn parse_connect_args(args: &str) -> Result<PartialConnectionConfig, String> {
    let mut overrides = PartialConnectionConfig::default();

    for pair in args.split_whitespace() {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(format!("Expected key=value, got '{pair}'"));
        };
        let value = Some(value.to_string());
        match key {
            "endpoint" => overrides.endpoint = value,
            "api_key" | "key" => overrides.api_key = value,
            "deployment" | "deployment_name" => overrides.deployment_name = value,
            "api_version" | "version" => overrides.api_version = value,
            _ => {
                return Err(format!(
                    "Unknown connection setting '{key}'. Use endpoint, api_key, deployment or api_version."
                ))
            }
        }
    }

    Ok(overrides)
}

pub fn help_text() -> &'static str {
    concat!(
        "Type a request to have the agent build an interface, or use a command:\n",
        "/action <id>        - Trigger a button's action\n",
        "/set <id> <value>   - Fill in a form field\n",
        "/form               - Show the values collected so far\n",
        "/connect [k=v ..]   - Connect (endpoint, api_key, deployment, api_version)\n",
        "/disconnect         - Drop the connection\n",
        "/status             - Show connection and session state\n",
        "/context            - Show the context sent with the next prompt\n",
        "/help, /h           - Show this help\n",
        "/quit, /q           - Leave\n",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(
            process_command("  show me a form "),
            CommandResult::Message("show me a form".to_string())
        );
        assert_eq!(process_command("   "), CommandResult::Empty);
    }

    #[test]
    fn test_action_and_set() {
        assert_eq!(
            process_command("/action submit_order"),
            CommandResult::Action("submit_order".to_string())
        );
        assert!(matches!(
            process_command("/action"),
            CommandResult::InvalidCommand(_)
        ));
        assert_eq!(
            process_command("/set notes two words here"),
            CommandResult::SetField {
                id: "notes".to_string(),
                value: "two words here".to_string()
            }
        );
        assert_eq!(
            process_command("/set name"),
            CommandResult::SetField {
                id: "name".to_string(),
                value: String::new()
            }
        );
    }

    #[test]
    fn test_connect_overrides() {
        let CommandResult::Connect(overrides) =
            process_command("/connect endpoint=https://x.openai.azure.com deployment=gpt-4o")
        else {
            panic!("expected connect");
        };
        assert_eq!(
            overrides.endpoint.as_deref(),
            Some("https://x.openai.azure.com")
        );
        assert_eq!(overrides.deployment_name.as_deref(), Some("gpt-4o"));
        assert!(overrides.api_key.is_none());

        assert_eq!(
            process_command("/connect"),
            CommandResult::Connect(PartialConnectionConfig::default())
        );
        assert!(matches!(
            process_command("/connect model=gpt"),
            CommandResult::InvalidCommand(_)
        ));
        assert!(matches!(
            process_command("/connect endpoint"),
            CommandResult::InvalidCommand(_)
        ));
    }

    #[test]
    fn test_other_commands() {
        assert_eq!(process_command("/QUIT"), CommandResult::Quit);
        assert_eq!(process_command("/status"), CommandResult::Status);
        assert_eq!(process_command("/context"), CommandResult::ShowContext);
        assert!(matches!(process_command("/"), CommandResult::Help(_)));
        assert_eq!(
            process_command("/frobnicate"),
            CommandResult::InvalidCommand("Unknown command: /frobnicate".to_string())
        );
    }
}
