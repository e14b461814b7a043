//! Declarative UI tree exchanged between the model and the renderer.
//!
//! A [`UiNode`] is pure data: a component kind, a flat map of primitive props
//! and an ordered list of children. The set of kinds is open; tags this crate
//! does not know are kept verbatim in [`ComponentKind::Other`] so renderers can
//! fall back gracefully instead of failing to parse a reply.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Component discriminator (`type` on the wire)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Container,
    Card,
    Text,
    Heading,
    Button,
    Divider,
    Badge,
    Input,
    TextArea,
    Select,
    Form,
    List,
    Image,
    /// Any tag not listed above, preserved as received
    Other(String),
}

impl ComponentKind {
    pub fn as_str(&self) -> &str {
        match self {
            ComponentKind::Container => "container",
            ComponentKind::Card => "card",
            ComponentKind::Text => "text",
            ComponentKind::Heading => "heading",
            ComponentKind::Button => "button",
            ComponentKind::Divider => "divider",
            ComponentKind::Badge => "badge",
            ComponentKind::Input => "input",
            ComponentKind::TextArea => "textarea",
            ComponentKind::Select => "select",
            ComponentKind::Form => "form",
            ComponentKind::List => "list",
            ComponentKind::Image => "image",
            ComponentKind::Other(tag) => tag,
        }
    }

    /// Kinds that produce field-change events in a renderer
    pub fn is_field(&self) -> bool {
        matches!(
            self,
            ComponentKind::Input | ComponentKind::TextArea | ComponentKind::Select
        )
    }
}

impl From<&str> for ComponentKind {
    fn from(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "container" => ComponentKind::Container,
            "card" => ComponentKind::Card,
            "text" => ComponentKind::Text,
            "heading" => ComponentKind::Heading,
            "button" => ComponentKind::Button,
            "divider" => ComponentKind::Divider,
            "badge" => ComponentKind::Badge,
            "input" => ComponentKind::Input,
            "textarea" => ComponentKind::TextArea,
            "select" => ComponentKind::Select,
            "form" => ComponentKind::Form,
            "list" => ComponentKind::List,
            "image" => ComponentKind::Image,
            _ => ComponentKind::Other(tag.to_string()),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ComponentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ComponentKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(ComponentKind::from(tag.as_str()))
    }
}

/// Primitive prop value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(PropValue::Bool(b)),
            serde_json::Value::Number(n) => Some(PropValue::Number(n)),
            serde_json::Value::String(s) => Some(PropValue::Text(s)),
            // Nested structures are not part of the prop model; keep them as text
            other => Some(PropValue::Text(other.to_string())),
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::Number(n) => write!(f, "{n}"),
            PropValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Number(value.into())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(PropValue::Number)
            .unwrap_or_else(|| PropValue::Text(value.to_string()))
    }
}

/// One node of a generative UI tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiNode {
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "deserialize_props"
    )]
    pub props: BTreeMap<String, PropValue>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_children"
    )]
    pub children: Vec<UiNode>,
}

fn deserialize_props<'de, D>(deserializer: D) -> Result<BTreeMap<String, PropValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| PropValue::from_json(value).map(|v| (key, v)))
        .collect())
}

fn deserialize_children<'de, D>(deserializer: D) -> Result<Vec<UiNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<UiNode>>::deserialize(deserializer)?.unwrap_or_default())
}

impl UiNode {
    pub fn new(kind: impl Into<ComponentKind>) -> Self {
        Self {
            kind: kind.into(),
            props: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Shorthand for a `text` node with a `content` prop
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(ComponentKind::Text).with_prop("content", content.into())
    }

    /// Shorthand for a `button` node bound to an action id
    pub fn button(label: impl Into<String>, action_id: impl Into<String>) -> Self {
        Self::new(ComponentKind::Button)
            .with_prop("label", label.into())
            .with_prop("actionId", action_id.into())
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: UiNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = UiNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn prop(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.prop(key).and_then(PropValue::as_str)
    }

    pub fn prop_bool(&self, key: &str) -> Option<bool> {
        self.prop(key).and_then(PropValue::as_bool)
    }

    /// Depth-first, pre-order traversal in layout order
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Field nodes that carry an `id`, in layout order
    pub fn input_fields(&self) -> Vec<&UiNode> {
        self.walk()
            .filter(|node| node.kind.is_field() && node.prop_str("id").is_some())
            .collect()
    }

    /// Find the field node rendered with the given id
    pub fn find_field(&self, id: &str) -> Option<&UiNode> {
        self.walk()
            .find(|node| node.kind.is_field() && node.prop_str("id") == Some(id))
    }

    /// Action ids of all buttons, in layout order
    pub fn action_ids(&self) -> Vec<&str> {
        self.walk()
            .filter(|node| node.kind == ComponentKind::Button)
            .filter_map(|node| node.prop_str("actionId"))
            .collect()
    }

    /// Deterministic compact JSON: fixed field order, props sorted by key.
    pub fn to_canonical_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

pub struct Walk<'a> {
    stack: Vec<&'a UiNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a UiNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
