//! Virtual containers that move every node inside them together.

use crate::grid::{CellRect, GridEntity};
use crate::node::{Node, NodeId};
use kurbo::Point;
use uuid::Uuid;

/// Unique identifier for groups.
pub type GroupId = Uuid;

/// A node a group currently moves, with its offset from the group's top-left
/// corner at collection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedNode {
    pub id: NodeId,
    pub dx: i32,
    pub dy: i32,
}

/// A transient arrangement aid over a rectangle of cells.
///
/// A group holds no references to nodes between drags. Membership is
/// recollected from geometry at the start of every drag, so anything that
/// lies inside the group at that moment moves with it. Managed entries are
/// looked up by id and silently skipped if the node is gone.
#[derive(Debug, Clone)]
pub struct NodeGroup {
    pub(crate) id: GroupId,
    rect: CellRect,
    free_position: Option<Point>,
    managed: Vec<ManagedNode>,
}

impl NodeGroup {
    pub fn new(rect: CellRect) -> Self {
        Self {
            id: Uuid::new_v4(),
            rect: CellRect {
                width: rect.width.max(1),
                height: rect.height.max(1),
                ..rect
            },
            free_position: None,
            managed: Vec::new(),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn rect(&self) -> CellRect {
        self.rect
    }

    pub fn managed(&self) -> &[ManagedNode] {
        &self.managed
    }

    /// Rebuild the managed list from every node fully inside the group.
    pub fn collect_nodes<'a>(&mut self, nodes: impl IntoIterator<Item = &'a Node>) -> &[ManagedNode] {
        let rect = self.rect;
        self.managed = nodes
            .into_iter()
            .filter(|node| rect.contains(&node.rect()))
            .map(|node| ManagedNode {
                id: node.id(),
                dx: node.rect().x - rect.x,
                dy: node.rect().y - rect.y,
            })
            .collect();
        log::debug!("group {} collected {} nodes", self.id, self.managed.len());
        &self.managed
    }

    /// Top-left cell each managed node should move to, given the group's
    /// current position.
    pub fn placements(&self) -> impl Iterator<Item = (NodeId, i32, i32)> + '_ {
        self.managed
            .iter()
            .map(|m| (m.id, self.rect.x + m.dx, self.rect.y + m.dy))
    }

    /// Forget the managed nodes, returning them.
    pub fn release(&mut self) -> Vec<ManagedNode> {
        std::mem::take(&mut self.managed)
    }
}

impl GridEntity for NodeGroup {
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
