//! Tests for the terminal renderer output

use super::terminal::TerminalRenderer;
use crate::form_state::{ActiveFormData, FieldState};
use crate::history::ChatTurn;
use agent_client::{ComponentKind, UiNode};
use std::io::Write;
use std::sync::{Arc, Mutex};

// Mock stdout to capture output
struct TestWriter {
    buffer: Vec<u8>,
}

impl TestWriter {
    fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    fn get_output(&self) -> String {
        String::from_utf8_lossy(&self.buffer).to_string()
    }
}

impl Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn create_test_renderer() -> (TerminalRenderer, Arc<Mutex<TestWriter>>) {
    let writer = Arc::new(Mutex::new(TestWriter::new()));

    struct WriterWrapper(Arc<Mutex<TestWriter>>);

    impl Write for WriterWrapper {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.0.lock().unwrap().flush()
        }
    }

    let renderer = TerminalRenderer::with_test_writer(Box::new(WriterWrapper(writer.clone())))
        .expect("Failed to create renderer");
    (renderer, writer)
}

#[test]
fn test_user_turn_shows_display_text_only() {
    let (renderer, writer) = create_test_renderer();
    let turn = ChatTurn::user(
        "Triggered Action: go",
        Some("User triggered action: go.".to_string()),
    );

    renderer.render_turn(&turn).unwrap();

    let output = writer.lock().unwrap().get_output();
    assert!(output.contains("Triggered Action: go"));
    assert!(!output.contains("User triggered action"));
}

#[test]
fn test_model_turn_renders_tree() {
    let (renderer, writer) = create_test_renderer();
    let ui = UiNode::new(ComponentKind::Card)
        .with_prop("title", "Booking")
        .with_child(
            UiNode::new(ComponentKind::Input)
                .with_prop("id", "origin")
                .with_prop("label", "From"),
        )
        .with_child(UiNode::button("Search", "search_flights"));

    renderer.render_turn(&ChatTurn::model(ui)).unwrap();

    let output = writer.lock().unwrap().get_output();
    assert!(output.contains("Booking"));
    assert!(output.contains("(/set origin <value>)"));
    assert!(output.contains("/action search_flights"));
}

#[test]
fn test_welcome_lists_demo_actions() {
    let (renderer, writer) = create_test_renderer();
    renderer.render_welcome().unwrap();

    let output = writer.lock().unwrap().get_output();
    assert!(output.contains("/action demo_servicenow"));
    assert!(output.contains("/action open_settings"));
}

#[test]
fn test_form_values_with_validity() {
    let (renderer, writer) = create_test_renderer();
    let form: ActiveFormData = [
        FieldState {
            id: "email".to_string(),
            value: "bad".to_string(),
            is_valid: false,
        },
        FieldState {
            id: "name".to_string(),
            value: "Ada".to_string(),
            is_valid: true,
        },
    ]
    .into_iter()
    .collect();

    renderer.render_form(&form).unwrap();
    renderer.render_form(&ActiveFormData::default()).unwrap();

    let output = writer.lock().unwrap().get_output();
    assert!(output.contains("= bad"));
    assert!(output.contains("= Ada"));
    assert!(output.contains("No form values collected."));
}

#[test]
fn test_error_output() {
    let (renderer, writer) = create_test_renderer();
    renderer.show_error("Connection failed").unwrap();

    let output = writer.lock().unwrap().get_output();
    assert!(output.contains("Connection failed"));
}
