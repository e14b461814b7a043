//! Text rendering of UI trees for the terminal.
//!
//! Every node becomes one or more lines. Interactive nodes show the slash
//! command that drives them, since a terminal has no pointer.

use agent_client::{ComponentKind, UiNode};
use crossterm::style::{Color, Stylize};

const INDENT: &str = "  ";
const DIVIDER_WIDTH: usize = 40;

pub fn render_lines(node: &UiNode) -> Vec<String> {
    let mut lines = Vec::new();
    render_into(node, 0, &mut lines);
    lines
}

fn tone_color(tone: Option<&str>) -> Option<Color> {
    match tone? {
        "muted" => Some(Color::DarkGrey),
        "success" => Some(Color::Green),
        "warning" => Some(Color::Yellow),
        "danger" | "error" => Some(Color::Red),
        _ => None,
    }
}

fn text_content(node: &UiNode) -> &str {
    node.prop_str("content")
        .or_else(|| node.prop_str("text"))
        .or_else(|| node.prop_str("label"))
        .unwrap_or_default()
}

fn render_children(node: &UiNode, depth: usize, lines: &mut Vec<String>) {
    for child in &node.children {
        render_into(child, depth, lines);
    }
}

fn render_into(node: &UiNode, depth: usize, lines: &mut Vec<String>) {
    let indent = INDENT.repeat(depth);

    match &node.kind {
        ComponentKind::Container => render_children(node, depth, lines),
        ComponentKind::Form => {
            if let Some(title) = node.prop_str("title") {
                lines.push(format!("{indent}{}", title.bold()));
            }
            render_children(node, depth + 1, lines);
        }
        ComponentKind::Card => {
            let title = node.prop_str("title").unwrap_or_default();
            lines.push(format!("{indent}┌ {}", title.bold()));
            if let Some(subtitle) = node.prop_str("subtitle") {
                lines.push(format!("{indent}│ {}", subtitle.dark_grey()));
            }
            let mut inner = Vec::new();
            render_children(node, 0, &mut inner);
            lines.extend(inner.into_iter().map(|line| format!("{indent}│ {line}")));
            lines.push(format!("{indent}└"));
        }
        ComponentKind::Heading => {
            let content = text_content(node);
            let styled = if node.prop("level").and_then(|l| l.as_f64()) == Some(1.0) {
                content.to_uppercase().bold()
            } else {
                content.to_string().bold()
            };
            lines.push(format!("{indent}{styled}"));
        }
        ComponentKind::Text => {
            let content = text_content(node);
            match tone_color(node.prop_str("tone")) {
                Some(color) => lines.push(format!("{indent}{}", content.with(color))),
                None => lines.push(format!("{indent}{content}")),
            }
        }
        ComponentKind::Badge => {
            let label = format!("‹{}›", text_content(node));
            let color = tone_color(node.prop_str("tone")).unwrap_or(Color::Cyan);
            lines.push(format!("{indent}{}", label.with(color)));
        }
        ComponentKind::Divider => {
            lines.push(format!("{indent}{}", "─".repeat(DIVIDER_WIDTH).dark_grey()));
        }
        ComponentKind::List => {
            for child in &node.children {
                let mut item = Vec::new();
                render_into(child, depth + 1, &mut item);
                for (i, line) in item.into_iter().enumerate() {
                    if i == 0 {
                        lines.push(format!("{indent}• {}", line.trim_start()));
                    } else {
                        lines.push(line);
                    }
                }
            }
        }
        ComponentKind::Image => {
            let description = node
                .prop_str("alt")
                .or_else(|| node.prop_str("src"))
                .unwrap_or("image");
            lines.push(format!("{indent}{}", format!("[image: {description}]").dark_grey()));
        }
        ComponentKind::Input | ComponentKind::TextArea | ComponentKind::Select => {
            lines.push(format!("{indent}{}", field_line(node)));
        }
        ComponentKind::Button => lines.push(format!("{indent}{}", button_line(node))),
        ComponentKind::Other(tag) => {
            // Unknown component: show what we got instead of dropping it
            let props: Vec<String> = node
                .props
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            let fallback = if props.is_empty() {
                format!("<{tag}>")
            } else {
                format!("<{tag} {}>", props.join(" "))
            };
            lines.push(format!("{indent}{}", fallback.dark_grey()));
            render_children(node, depth + 1, lines);
        }
    }
}

fn field_line(node: &UiNode) -> String {
    let id = node.prop_str("id");
    let label = node
        .prop_str("label")
        .or_else(|| node.prop_str("placeholder"))
        .or(id)
        .unwrap_or(node.kind.as_str());

    let mut line = label.to_string();
    if node.prop_bool("required") == Some(true) {
        line.push('*');
    }
    if let Some(input_type) = node.prop_str("inputType").filter(|t| *t != "text") {
        line.push_str(&format!(" [{input_type}]"));
    }
    if let Some(options) = node.prop_str("options") {
        line.push_str(&format!(" ({})", split_options(options).join(" | ")));
    }

    match id {
        Some(id) => format!("{line} {}", format!("(/set {id} <value>)").dark_grey()),
        None => format!("{line} {}", "(no id, cannot be filled)".dark_grey()),
    }
}

fn button_line(node: &UiNode) -> String {
    let label = format!("[{}]", text_content(node));
    match node.prop_str("actionId") {
        Some(action_id) => {
            let styled = if node.prop_str("variant") == Some("secondary") {
                label.blue()
            } else {
                label.bold().blue()
            };
            format!("{styled} → /action {action_id}")
        }
        None => format!("{}", label.dark_grey()),
    }
}

pub fn split_options(options: &str) -> Vec<&str> {
    options
        .split(',')
        .map(str::trim)
        .filter(|option| !option.is_empty())
        .collect()
}

/// Whether `value` is acceptable for the rendered field `field`
pub fn field_validity(field: &UiNode, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return field.prop_bool("required") != Some(true);
    }

    if field.kind == ComponentKind::Select {
        if let Some(options) = field.prop_str("options") {
            let options = split_options(options);
            if !options.is_empty()
                && !options
                    .iter()
                    .any(|option| option.eq_ignore_ascii_case(value))
            {
                return false;
            }
        }
    }

    match field.prop_str("inputType") {
        Some("email") => is_plausible_email(value),
        Some("number") => value.parse::<f64>().is_ok(),
        _ => true,
    }
}

fn is_plausible_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}
