//! Nodes: typed content panels placed on the grid.

use crate::grid::{CellRect, GridEntity};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for nodes.
pub type NodeId = Uuid;

/// Default font size for new nodes, in points.
pub const DEFAULT_FONT_SIZE: u32 = 16;

/// Default die size for new die nodes.
pub const DEFAULT_DIE_SIZE: u32 = 6;

/// The closed set of node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Text,
    Number,
    List,
    Die,
    Image,
    Checkbox,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Text,
        NodeKind::Number,
        NodeKind::List,
        NodeKind::Die,
        NodeKind::Image,
        NodeKind::Checkbox,
    ];

    /// Type tag used in stored records.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Text => "text",
            NodeKind::Number => "number",
            NodeKind::List => "list",
            NodeKind::Die => "die",
            NodeKind::Image => "image",
            NodeKind::Checkbox => "checkbox",
        }
    }

    /// Parse a stored type tag.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }

    /// Cell span a freshly placed node of this kind occupies.
    pub fn default_size(self) -> (i32, i32) {
        match self {
            NodeKind::Text => (3, 2),
            NodeKind::Number => (2, 1),
            NodeKind::List => (3, 4),
            NodeKind::Die => (1, 1),
            NodeKind::Image => (3, 3),
            NodeKind::Checkbox => (1, 1),
        }
    }
}

/// One row of a list node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListItem {
    pub content: String,
    #[serde(default)]
    pub checkbox_checked: bool,
}

impl ListItem {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            checkbox_checked: false,
        }
    }
}

/// Type-specific payload. The variant decides the node's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    Text(String),
    Number(String),
    List {
        items: Vec<ListItem>,
        checkboxes_active: bool,
    },
    Die {
        die_size: u32,
    },
    Image {
        src: Option<String>,
    },
    Checkbox {
        checked: bool,
    },
}

impl NodeContent {
    /// Empty payload for a kind.
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Text => NodeContent::Text(String::new()),
            NodeKind::Number => NodeContent::Number("0".to_string()),
            NodeKind::List => NodeContent::List {
                items: Vec::new(),
                checkboxes_active: false,
            },
            NodeKind::Die => NodeContent::Die {
                die_size: DEFAULT_DIE_SIZE,
            },
            NodeKind::Image => NodeContent::Image { src: None },
            NodeKind::Checkbox => NodeContent::Checkbox { checked: false },
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeContent::Text(_) => NodeKind::Text,
            NodeContent::Number(_) => NodeKind::Number,
            NodeContent::List { .. } => NodeKind::List,
            NodeContent::Die { .. } => NodeKind::Die,
            NodeContent::Image { .. } => NodeKind::Image,
            NodeContent::Checkbox { .. } => NodeKind::Checkbox,
        }
    }
}

/// A positioned panel on the grid.
///
/// The node owns its own cell rectangle and never refers to siblings. While
/// it is being dragged it carries a free pixel position that the next snap
/// converts back into cells.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    rect: CellRect,
    free_position: Option<Point>,
    /// Type-specific payload.
    pub content: NodeContent,
    /// Suppresses editing and resize affordances.
    pub locked: bool,
    pub title: String,
    /// Whether the title bar is shown.
    pub title_active: bool,
    font_size: u32,
    /// Whether the content controls are shown.
    pub controls_active: bool,
    lifted: bool,
}

impl Node {
    /// Create a node of the given kind with an empty payload.
    pub fn new(kind: NodeKind, rect: CellRect) -> Self {
        Self::with_content(NodeContent::empty(kind), rect)
    }

    pub fn with_content(content: NodeContent, rect: CellRect) -> Self {
        Self {
            id: Uuid::new_v4(),
            rect: CellRect {
                width: rect.width.max(1),
                height: rect.height.max(1),
                ..rect
            },
            free_position: None,
            content,
            locked: false,
            title: String::new(),
            title_active: false,
            font_size: DEFAULT_FONT_SIZE,
            controls_active: false,
            lifted: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.content.kind()
    }

    pub fn rect(&self) -> CellRect {
        self.rect
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    /// Set the font size. Zero is ignored.
    pub fn set_font_size(&mut self, font_size: u32) -> bool {
        if font_size == 0 {
            return false;
        }
        self.font_size = font_size;
        true
    }

    /// Set the cell span. Non-positive values are ignored.
    pub fn set_size(&mut self, width: i32, height: i32) -> bool {
        if width < 1 || height < 1 {
            log::debug!("rejected size {width}x{height} for node {}", self.id);
            return false;
        }
        self.rect.width = width;
        self.rect.height = height;
        true
    }

    /// Whether the node is detached from the flow by an ongoing group drag.
    pub fn is_lifted(&self) -> bool {
        self.lifted
    }

    pub(crate) fn set_lifted(&mut self, lifted: bool) {
        self.lifted = lifted;
    }

    /// Move a list row to another index. Returns false for non-list nodes or
    /// out-of-range indices.
    pub fn move_list_row(&mut self, from: usize, to: usize) -> bool {
        let NodeContent::List { items, .. } = &mut self.content else {
            return false;
        };
        if from >= items.len() || to >= items.len() {
            return false;
        }
        let item = items.remove(from);
        items.insert(to, item);
        true
    }

    /// Number of list rows (zero for other kinds).
    pub fn list_len(&self) -> usize {
        match &self.content {
            NodeContent::List { items, .. } => items.len(),
            _ => 0,
        }
    }
}

impl GridEntity for Node {
    fn cell_rect(&self) -> CellRect {
        self.rect
    }

    fn set_cell_rect(&mut self, rect: CellRect) {
        self.rect = rect;
    }

    fn free_position(&self) -> Option<Point> {
        self.free_position
    }

    fn set_free_position(&mut self, position: Option<Point>) {
        self.free_position = position;
    }
}

/// What the add-node tool places on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTemplate {
    pub kind: NodeKind,
    pub width: i32,
    pub height: i32,
}

impl NodeTemplate {
    /// Template with the kind's default span.
    pub fn new(kind: NodeKind) -> Self {
        let (width, height) = kind.default_size();
        Self {
            kind,
            width,
            height,
        }
    }

    /// Template with an explicit span (clamped to at least one cell).
    pub fn sized(kind: NodeKind, width: i32, height: i32) -> Self {
        Self {
            kind,
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Build a node at a top-left cell.
    pub fn instantiate(&self, x: i32, y: i32) -> Node {
        Node::new(self.kind, CellRect::new(x, y, self.width, self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(NodeKind::parse("slider"), None);
    }

    #[test]
    fn test_kind_follows_content() {
        let mut node = Node::new(NodeKind::Text, CellRect::new(1, 1, 2, 2));
        assert_eq!(node.kind(), NodeKind::Text);
        node.content = NodeContent::empty(NodeKind::Die);
        assert_eq!(node.kind(), NodeKind::Die);
    }

    #[test]
    fn test_set_size_rejects_non_positive() {
        let mut node = Node::new(NodeKind::Number, CellRect::new(1, 1, 2, 1));
        assert!(!node.set_size(0, 3));
        assert!(!node.set_size(2, -1));
        assert_eq!(node.rect(), CellRect::new(1, 1, 2, 1));
        assert!(node.set_size(4, 3));
        assert_eq!(node.rect(), CellRect::new(1, 1, 4, 3));
    }

    #[test]
    fn test_font_size_rejects_zero() {
        let mut node = Node::new(NodeKind::Text, CellRect::new(1, 1, 1, 1));
        assert!(!node.set_font_size(0));
        assert_eq!(node.font_size(), DEFAULT_FONT_SIZE);
        assert!(node.set_font_size(24));
        assert_eq!(node.font_size(), 24);
    }

    #[test]
    fn test_new_node_clamps_span() {
        let node = Node::new(NodeKind::Die, CellRect::new(3, 3, 0, -2));
        assert_eq!(node.rect().width, 1);
        assert_eq!(node.rect().height, 1);
    }

    #[test]
    fn test_move_list_row() {
        let mut node = Node::with_content(
            NodeContent::List {
                items: vec![ListItem::new("a"), ListItem::new("b"), ListItem::new("c")],
                checkboxes_active: false,
            },
            CellRect::new(1, 1, 3, 3),
        );
        assert!(node.move_list_row(0, 2));
        let NodeContent::List { items, .. } = &node.content else {
            panic!("expected list content");
        };
        let order: Vec<_> = items.iter().map(|i| i.content.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert!(!node.move_list_row(0, 3));

        let mut text = Node::new(NodeKind::Text, CellRect::new(1, 1, 1, 1));
        assert!(!text.move_list_row(0, 0));
    }

    #[test]
    fn test_template_instantiate() {
        let template = NodeTemplate::new(NodeKind::List);
        let node = template.instantiate(4, 5);
        assert_eq!(node.kind(), NodeKind::List);
        assert_eq!(node.rect(), CellRect::new(4, 5, 3, 4));
        assert!(node.free_position().is_none());
    }
}
