use super::render::render_lines;
use super::welcome::welcome_screen;
use super::UIError;
use crate::connection::ConnectionState;
use crate::form_state::ActiveFormData;
use crate::history::{ChatTurn, TurnPayload};
use crossterm::style::{self, Color, Stylize};
use rustyline::{error::ReadlineError, history::DefaultHistory, Config, Editor};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

pub struct TerminalRenderer {
    line_editor: Arc<Mutex<Editor<(), DefaultHistory>>>,
    // Only set in tests
    writer: Option<Arc<Mutex<Box<dyn Write + Send>>>>,
}

impl TerminalRenderer {
    pub fn new() -> Result<Self, UIError> {
        Ok(Self {
            line_editor: Arc::new(Mutex::new(Self::create_editor()?)),
            writer: None,
        })
    }

    #[cfg(test)]
    pub fn with_test_writer(writer: Box<dyn Write + Send>) -> Result<Self, UIError> {
        Ok(Self {
            line_editor: Arc::new(Mutex::new(Self::create_editor()?)),
            writer: Some(Arc::new(Mutex::new(writer))),
        })
    }

    fn create_editor() -> Result<Editor<(), DefaultHistory>, UIError> {
        let config = Config::builder()
            .edit_mode(rustyline::EditMode::Emacs)
            .build();
        Ok(Editor::with_config(config)?)
    }

    fn write_lines<I, S>(&self, lines: I) -> Result<(), UIError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stdout = io::stdout().lock();
        let mut test_writer = self
            .writer
            .as_ref()
            .map(|w| w.lock().unwrap_or_else(|poisoned| poisoned.into_inner()));
        let writer: &mut dyn Write = match test_writer.as_mut() {
            Some(w) => &mut ***w,
            None => &mut stdout,
        };

        for line in lines {
            writeln!(writer, "{}", line.as_ref())?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn render_turn(&self, turn: &ChatTurn) -> Result<(), UIError> {
        match &turn.payload {
            TurnPayload::User { content, .. } => self.write_lines([
                String::new(),
                format!("{} {}", "›".with(Color::Green), content.as_str().bold()),
            ]),
            TurnPayload::Model { ui } => {
                self.write_lines(std::iter::once(String::new()).chain(render_lines(ui)))
            }
        }
    }

    pub fn render_welcome(&self) -> Result<(), UIError> {
        self.write_lines(render_lines(&welcome_screen()))
    }

    pub fn show_info(&self, message: &str) -> Result<(), UIError> {
        self.write_lines(message.lines().map(|line| format!("{}", line.dark_grey())))
    }

    pub fn show_error(&self, message: &str) -> Result<(), UIError> {
        self.write_lines([format!("{} {message}", "✗".with(Color::Red))])
    }

    pub fn show_sending(&self, sending: bool) -> Result<(), UIError> {
        if sending {
            self.write_lines([format!("{}", "⋯ waiting for the agent".dark_grey())])
        } else {
            Ok(())
        }
    }

    pub fn show_connection_state(&self, state: ConnectionState) -> Result<(), UIError> {
        let color = match state {
            ConnectionState::Connected => Color::Green,
            ConnectionState::Connecting => Color::Yellow,
            ConnectionState::Error => Color::Red,
            ConnectionState::Disconnected => Color::DarkGrey,
        };
        self.write_lines([format!("● {}", state.to_string().with(color))])
    }

    pub fn render_form(&self, form: &ActiveFormData) -> Result<(), UIError> {
        if form.is_empty() {
            return self.show_info("No form values collected.");
        }
        self.write_lines(form.iter().map(|field| {
            let marker = if field.is_valid {
                "✓".with(Color::Green)
            } else {
                "✗".with(Color::Red)
            };
            format!("{marker} {} = {}", field.id.as_str().cyan(), field.value)
        }))
    }

    /// Called once the latest turn is drawn
    pub fn scroll_to_latest(&self) -> Result<(), UIError> {
        // A terminal is always at its bottom; make sure the drawn turn is out
        io::stdout().flush()?;
        Ok(())
    }

    /// Blocking read of one line
    pub fn read_line(&self) -> Result<String, UIError> {
        let mut editor = self
            .line_editor
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let colored_prompt = format!("{}{} ", ">".with(Color::Green), style::ResetColor);

        match editor.readline(&colored_prompt) {
            Ok(line) => {
                let _ = editor.add_history_entry(line.as_str());
                Ok(line.trim().to_string())
            }
            Err(ReadlineError::Interrupted) => Err(UIError::Interrupted),
            Err(ReadlineError::Eof) => Err(UIError::Eof),
            Err(e) => Err(e.into()),
        }
    }
}
