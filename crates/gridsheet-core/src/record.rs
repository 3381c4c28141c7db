//! Plain storable records of nodes.

use crate::grid::CellRect;
use crate::node::{ListItem, Node, NodeContent, NodeKind};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Record decoding errors.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("content does not match node type {0}")]
    ContentMismatch(&'static str),
    #[error("invalid size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
}

/// The storable form of a node.
///
/// `content` is type-dependent: a string for text and number nodes,
/// `{items, checkboxes_active}` for lists, `{die_size}` for dice, `{src}` for
/// images and `{checked}` for checkboxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub title_active: bool,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub width: i32,
    pub height: i32,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub controls_active: bool,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub content: Value,
}

fn default_font_size() -> u32 {
    crate::node::DEFAULT_FONT_SIZE
}

#[derive(Serialize, Deserialize)]
struct ListContent {
    #[serde(default)]
    items: Vec<ListItem>,
    #[serde(default)]
    checkboxes_active: bool,
}

#[derive(Serialize, Deserialize)]
struct DieContent {
    die_size: u32,
}

#[derive(Serialize, Deserialize)]
struct ImageContent {
    #[serde(default)]
    src: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct CheckboxContent {
    #[serde(default)]
    checked: bool,
}

fn encode_content(content: &NodeContent) -> Value {
    match content {
        NodeContent::Text(text) | NodeContent::Number(text) => Value::String(text.clone()),
        NodeContent::List {
            items,
            checkboxes_active,
        } => json!({ "items": items, "checkboxes_active": checkboxes_active }),
        NodeContent::Die { die_size } => json!({ "die_size": die_size }),
        NodeContent::Image { src } => json!({ "src": src }),
        NodeContent::Checkbox { checked } => json!({ "checked": checked }),
    }
}

fn decode_content(kind: NodeKind, value: &Value) -> Result<NodeContent, RecordError> {
    if value.is_null() {
        return Ok(NodeContent::empty(kind));
    }
    let content = match kind {
        NodeKind::Text | NodeKind::Number => {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) if kind == NodeKind::Number => n.to_string(),
                _ => return Err(RecordError::ContentMismatch(kind.as_str())),
            };
            if kind == NodeKind::Text {
                NodeContent::Text(text)
            } else {
                NodeContent::Number(text)
            }
        }
        NodeKind::List => {
            let list: ListContent = from_value(kind, value)?;
            NodeContent::List {
                items: list.items,
                checkboxes_active: list.checkboxes_active,
            }
        }
        NodeKind::Die => {
            let die: DieContent = from_value(kind, value)?;
            NodeContent::Die {
                die_size: die.die_size,
            }
        }
        NodeKind::Image => {
            let image: ImageContent = from_value(kind, value)?;
            NodeContent::Image { src: image.src }
        }
        NodeKind::Checkbox => {
            let checkbox: CheckboxContent = from_value(kind, value)?;
            NodeContent::Checkbox {
                checked: checkbox.checked,
            }
        }
    };
    Ok(content)
}

fn from_value<T: serde::de::DeserializeOwned>(kind: NodeKind, value: &Value) -> Result<T, RecordError> {
    if !value.is_object() {
        return Err(RecordError::ContentMismatch(kind.as_str()));
    }
    Ok(T::deserialize(value)?)
}

impl NodeRecord {
    /// Capture a node.
    pub fn from_node(node: &Node) -> Self {
        let rect = node.rect();
        Self {
            title: node.title.clone(),
            title_active: node.title_active,
            kind: node.kind(),
            width: rect.width,
            height: rect.height,
            x: rect.x,
            y: rect.y,
            controls_active: node.controls_active,
            font_size: node.font_size(),
            locked: node.locked,
            content: encode_content(&node.content),
        }
    }

    /// Rebuild a node at the recorded cells. The result is not snapped; the
    /// sheet snaps it when it is restored.
    pub fn to_node(&self) -> Result<Node, RecordError> {
        if self.width < 1 || self.height < 1 {
            return Err(RecordError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        let content = decode_content(self.kind, &self.content)?;
        let mut node = Node::with_content(content, CellRect::new(self.x, self.y, self.width, self.height));
        node.title = self.title.clone();
        node.title_active = self.title_active;
        node.controls_active = self.controls_active;
        node.locked = self.locked;
        node.set_font_size(self.font_size);
        Ok(node)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_keeps_geometry() {
        let mut node = Node::new(NodeKind::Number, CellRect::new(4, 7, 2, 1));
        node.locked = true;
        node.title = "HP".to_string();
        node.title_active = true;
        node.set_font_size(20);

        let record = NodeRecord::from_node(&node);
        let json = record.to_json().unwrap();
        let restored = NodeRecord::from_json(&json).unwrap().to_node().unwrap();

        assert_eq!(restored.rect(), node.rect());
        assert_eq!(restored.kind(), NodeKind::Number);
        assert!(restored.locked);
        assert_eq!(restored.title, "HP");
        assert_eq!(restored.font_size(), 20);
        assert_ne!(restored.id(), node.id());
    }

    #[test]
    fn test_record_field_names() {
        let node = Node::new(NodeKind::Die, CellRect::new(1, 2, 1, 1));
        let value = serde_json::to_value(NodeRecord::from_node(&node)).unwrap();
        assert_eq!(value["type"], "die");
        assert_eq!(value["content"]["die_size"], 6);
        assert_eq!(value["x"], 1);
        assert_eq!(value["y"], 2);
    }

    #[test]
    fn test_list_content() {
        let json = r#"{
            "title": "Inventory", "title_active": true, "type": "list",
            "width": 3, "height": 4, "x": 2, "y": 2,
            "controls_active": false, "font_size": 14, "locked": false,
            "content": {
                "items": [{"content": "rope", "checkbox_checked": true}, {"content": "torch"}],
                "checkboxes_active": true
            }
        }"#;
        let node = NodeRecord::from_json(json).unwrap().to_node().unwrap();
        let NodeContent::List {
            items,
            checkboxes_active,
        } = &node.content
        else {
            panic!("expected list content");
        };
        assert!(*checkboxes_active);
        assert_eq!(items.len(), 2);
        assert!(items[0].checkbox_checked);
        assert!(!items[1].checkbox_checked);
    }

    #[test]
    fn test_content_mismatch() {
        let json = r#"{"type": "die", "width": 1, "height": 1, "x": 1, "y": 1, "content": "d20"}"#;
        let record = NodeRecord::from_json(json).unwrap();
        assert!(matches!(record.to_node(), Err(RecordError::ContentMismatch("die"))));
    }

    #[test]
    fn test_missing_content_uses_empty_payload() {
        let json = r#"{"type": "checkbox", "width": 1, "height": 1, "x": 3, "y": 3}"#;
        let node = NodeRecord::from_json(json).unwrap().to_node().unwrap();
        assert_eq!(node.content, NodeContent::Checkbox { checked: false });
        assert_eq!(node.font_size(), crate::node::DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_invalid_size_and_unknown_type() {
        let json = r#"{"type": "text", "width": 0, "height": 1, "x": 1, "y": 1, "content": ""}"#;
        let record = NodeRecord::from_json(json).unwrap();
        assert!(matches!(record.to_node(), Err(RecordError::InvalidSize { .. })));

        let json = r#"{"type": "slider", "width": 1, "height": 1, "x": 1, "y": 1}"#;
        assert!(matches!(NodeRecord::from_json(json), Err(RecordError::Json(_))));
    }
}
