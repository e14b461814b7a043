//! Terminal front end: reads commands, drives the sessions and renders
//! whatever they report.

use crate::cli::Args;
use crate::config::resolve_connection_settings;
use crate::events::{SessionEvent, UiEffect};
use crate::session::{ActionOutcome, SendOutcome, SkipReason};
use crate::ui::commands::{help_text, process_command, CommandResult};
use crate::ui::render::field_validity;
use crate::ui::terminal::TerminalRenderer;
use crate::ui::UIError;
use crate::GenUi;
use agent_client::config::PartialConnectionConfig;
use agent_client::playback::ReceivedPrompt;
use agent_client::{AgentClient, AzureOpenAIClient, PlaybackClient};
use anyhow::{Context, Result};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

pub async fn run(args: Args) -> Result<()> {
    let mut settings =
        resolve_connection_settings(args.connection_overrides(), args.config.as_deref())?;

    let mut replayed_prompts = None;
    let client: Box<dyn AgentClient> = match &args.playback {
        Some(path) => {
            let client = PlaybackClient::from_file(path)
                .context("Failed to initialize playback client")?;
            info!("Replaying {} recorded responses", client.remaining());
            replayed_prompts = Some(client.received_prompts());
            Box::new(client)
        }
        None => {
            let mut client = AzureOpenAIClient::new();
            if let Some(temperature) = args.temperature {
                client = client.with_temperature(temperature);
            }
            Box::new(client)
        }
    };

    let app = GenUi::new(client);
    let renderer = Arc::new(TerminalRenderer::new().context("Failed to set up terminal")?);
    subscribe_renderer(&app, renderer.clone());

    renderer.render_welcome()?;
    renderer.show_info(&format!("Type /help for commands. Logs: {}", log_destination(&args)))?;

    if replayed_prompts.is_some() {
        renderer.show_info("Playback mode: answers come from the recording.")?;
    } else if settings.clone().into_config().validate().is_ok() {
        connect(&app, &renderer, &mut settings, PartialConnectionConfig::default()).await?;
    } else {
        renderer.show_info("Not connected. Use /connect or /action open_settings.")?;
    }

    loop {
        let line = {
            let renderer = renderer.clone();
            tokio::task::spawn_blocking(move || renderer.read_line()).await?
        };
        let line = match line {
            Ok(line) => line,
            Err(UIError::Interrupted) | Err(UIError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        match process_command(&line) {
            CommandResult::Empty => {}
            CommandResult::Message(text) => {
                app.conversation.set_input(text);
                let outcome = app.conversation.send_message(None, None).await;
                report_send(&renderer, outcome)?;
            }
            CommandResult::Action(action_id) => {
                match app.conversation.handle_action(&action_id).await {
                    ActionOutcome::OpenSettings => show_settings(&renderer, &settings)?,
                    ActionOutcome::Sent(outcome) => report_send(&renderer, outcome)?,
                }
            }
            CommandResult::SetField { id, value } => set_field(&app, &renderer, &id, &value)?,
            CommandResult::ShowForm => renderer.render_form(&app.conversation.form_snapshot())?,
            CommandResult::Connect(overrides) => {
                connect(&app, &renderer, &mut settings, overrides).await?
            }
            CommandResult::Disconnect => app.connection.disconnect().await,
            CommandResult::Status => show_status(&app, &renderer, replayed_prompts.as_ref())?,
            CommandResult::ShowContext => {
                let context = app.conversation.context()?;
                renderer.show_info(&serde_json::to_string_pretty(&context)?)?;
            }
            CommandResult::Help(text) => renderer.show_info(&text)?,
            CommandResult::Quit => break,
            CommandResult::InvalidCommand(message) => renderer.show_error(&message)?,
        }

        for effect in app.events.drain_effects() {
            match effect {
                UiEffect::ScrollToLatest => renderer.scroll_to_latest()?,
            }
        }
    }

    info!("Terminal session ended");
    Ok(())
}

fn subscribe_renderer(app: &GenUi, renderer: Arc<TerminalRenderer>) {
    app.events.subscribe(move |event| {
        let result = match event {
            SessionEvent::TurnAppended { turn, .. } => renderer.render_turn(turn),
            SessionEvent::SendingChanged(sending) => renderer.show_sending(*sending),
            SessionEvent::ConnectionStateChanged(state) => renderer.show_connection_state(*state),
            SessionEvent::SettingsRequested => Ok(()),
        };
        if let Err(e) = result {
            warn!("Failed to render session event: {e}");
        }
    });
}

fn log_destination(args: &Args) -> String {
    if args.log_stderr {
        "stderr".to_string()
    } else {
        crate::logging::terminal_log_path().display().to_string()
    }
}

async fn connect(
    app: &GenUi,
    renderer: &TerminalRenderer,
    settings: &mut PartialConnectionConfig,
    overrides: PartialConnectionConfig,
) -> Result<(), UIError> {
    let merged = overrides.or(settings.clone());
    match app
        .connection
        .connect(merged.clone().into_config(), &app.conversation)
        .await
    {
        Ok(()) => {
            *settings = merged;
            Ok(())
        }
        Err(e) => renderer.show_error(&e.to_string()),
    }
}

fn report_send(renderer: &TerminalRenderer, outcome: SendOutcome) -> Result<(), UIError> {
    match outcome {
        SendOutcome::Answered | SendOutcome::Skipped(SkipReason::EmptyPrompt) => Ok(()),
        SendOutcome::Skipped(SkipReason::AlreadySending) => {
            renderer.show_info("Still waiting for the previous answer.")
        }
        SendOutcome::Failed(message) => {
            renderer.show_error(&format!("The agent did not answer: {message}"))
        }
    }
}

fn set_field(app: &GenUi, renderer: &TerminalRenderer, id: &str, value: &str) -> Result<(), UIError> {
    let history = app.conversation.history();
    let Some(field) = history.latest_ui().and_then(|ui| ui.find_field(id)) else {
        return renderer.show_error(&format!("No field '{id}' in the current interface"));
    };

    let is_valid = field_validity(field, value);
    app.conversation.on_field_change(id, value, is_valid);
    if is_valid {
        Ok(())
    } else {
        renderer.show_info(&format!("'{id}' does not look valid yet"))
    }
}

fn show_settings(renderer: &TerminalRenderer, settings: &PartialConnectionConfig) -> Result<(), UIError> {
    let value_or_unset = |value: &Option<String>| value.clone().unwrap_or_else(|| "(not set)".to_string());
    let api_key = if settings.api_key.is_some() {
        "(set)".to_string()
    } else {
        "(not set)".to_string()
    };

    renderer.show_info(&format!(
        "Connection settings:\n  endpoint     {}\n  deployment   {}\n  api_version  {}\n  api_key      {}\n\n{}",
        value_or_unset(&settings.endpoint),
        value_or_unset(&settings.deployment_name),
        value_or_unset(&settings.api_version),
        api_key,
        help_text()
            .lines()
            .find(|line| line.starts_with("/connect"))
            .unwrap_or_default()
    ))
}

fn show_status(
    app: &GenUi,
    renderer: &TerminalRenderer,
    replayed_prompts: Option<&Arc<Mutex<Vec<ReceivedPrompt>>>>,
) -> Result<(), UIError> {
    let history = app.conversation.history();
    let deployment = app
        .connection
        .config()
        .map(|config| config.deployment_name)
        .unwrap_or_else(|| "-".to_string());

    let mut status = format!(
        "Connection: {} (deployment {deployment})\nTurns: {}\nSending: {}\nForm fields: {}",
        app.connection.state(),
        history.len(),
        app.conversation.is_sending(),
        app.conversation.form_snapshot().len()
    );
    if let Some(received) = replayed_prompts {
        let received = received
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        status.push('\n');
        status.push_str(&playback_summary(&received));
    }
    renderer.show_info(&status)
}

const PROMPT_PREVIEW_CHARS: usize = 60;

/// Prompts the playback client has answered, most recent last
fn playback_summary(received: &[ReceivedPrompt]) -> String {
    let mut summary = format!("Playback prompts received: {}", received.len());
    for entry in received.iter().rev().take(3).rev() {
        let first_line = entry.prompt.lines().next().unwrap_or_default();
        let mut preview: String = first_line.chars().take(PROMPT_PREVIEW_CHARS).collect();
        if first_line.chars().count() > PROMPT_PREVIEW_CHARS {
            preview.push_str("...");
        }
        summary.push_str(&format!(
            "\n  [{} prior turns] {preview}",
            entry.history_len
        ));
    }
    summary
}
