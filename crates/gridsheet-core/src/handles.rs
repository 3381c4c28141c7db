//! Drag handles on nodes and groups.

use crate::grid::GridTransform;
use crate::group::{GroupId, NodeGroup};
use crate::node::{Node, NodeId};
use kurbo::{Point, Rect};

/// Handle size in pixels.
pub const HANDLE_SIZE: f64 = 16.0;

/// Which dimension a resize handle changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeAxis {
    Width,
    Height,
}

/// The kind of handle - determines which drag it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandleKind {
    /// Moves the node.
    Move(NodeId),
    /// Resizes the node along one axis.
    Resize(NodeId, ResizeAxis),
    /// Moves the group and everything inside it.
    Group(GroupId),
    /// Reorders a list row. Row geometry belongs to the content renderer, so
    /// the row height travels with the handle.
    ListRow {
        node: NodeId,
        row: usize,
        row_height: f64,
    },
}

/// A handle and the pixel area that grabs it.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    pub kind: HandleKind,
    pub area: Rect,
}

impl Handle {
    pub fn new(kind: HandleKind, area: Rect) -> Self {
        Self { kind, area }
    }

    pub fn hit_test(&self, point: Point) -> bool {
        self.area.contains(point)
    }
}

fn square_at(center: Point) -> Rect {
    Rect::from_center_size(center, (HANDLE_SIZE, HANDLE_SIZE))
}

/// Handles of a node: a move grip in the top-left corner, plus width and
/// height grips on the right and bottom edges unless the node is locked.
pub fn node_handles(node: &Node, transform: &GridTransform) -> Vec<Handle> {
    let bounds = transform.rect_px(node.rect());
    let mut handles = vec![Handle::new(
        HandleKind::Move(node.id()),
        Rect::new(bounds.x0, bounds.y0, bounds.x0 + HANDLE_SIZE, bounds.y0 + HANDLE_SIZE),
    )];
    if !node.locked {
        let center = bounds.center();
        handles.push(Handle::new(
            HandleKind::Resize(node.id(), ResizeAxis::Width),
            square_at(Point::new(bounds.x1, center.y)),
        ));
        handles.push(Handle::new(
            HandleKind::Resize(node.id(), ResizeAxis::Height),
            square_at(Point::new(center.x, bounds.y1)),
        ));
    }
    handles
}

/// The group grip sits just outside the group's top-left corner so it never
/// covers a member's own move grip.
pub fn group_handle(group: &NodeGroup, transform: &GridTransform) -> Handle {
    let bounds = transform.rect_px(group.rect());
    Handle::new(
        HandleKind::Group(group.id()),
        Rect::new(bounds.x0 - HANDLE_SIZE, bounds.y0 - HANDLE_SIZE, bounds.x0, bounds.y0),
    )
}

/// First handle hit at a point.
pub fn hit_test_handles(handles: &[Handle], point: Point) -> Option<HandleKind> {
    handles.iter().find(|h| h.hit_test(point)).map(|h| h.kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellRect, GridConfig};
    use crate::node::NodeKind;

    #[test]
    fn test_node_handles() {
        let t = GridTransform::new(GridConfig::default());
        let node = Node::new(NodeKind::Text, CellRect::new(1, 1, 2, 2));
        let handles = node_handles(&node, &t);
        assert_eq!(handles.len(), 3);

        // Node covers [50, 140] on both axes.
        assert_eq!(
            hit_test_handles(&handles, Point::new(55.0, 55.0)),
            Some(HandleKind::Move(node.id()))
        );
        assert_eq!(
            hit_test_handles(&handles, Point::new(140.0, 95.0)),
            Some(HandleKind::Resize(node.id(), ResizeAxis::Width))
        );
        assert_eq!(
            hit_test_handles(&handles, Point::new(95.0, 141.0)),
            Some(HandleKind::Resize(node.id(), ResizeAxis::Height))
        );
        assert_eq!(hit_test_handles(&handles, Point::new(95.0, 95.0)), None);
    }

    #[test]
    fn test_locked_node_has_no_resize_handles() {
        let t = GridTransform::new(GridConfig::default());
        let mut node = Node::new(NodeKind::Text, CellRect::new(1, 1, 2, 2));
        node.locked = true;
        let handles = node_handles(&node, &t);
        assert_eq!(handles.len(), 1);
        assert!(matches!(handles[0].kind, HandleKind::Move(_)));
    }

    #[test]
    fn test_group_handle_outside_corner() {
        let t = GridTransform::new(GridConfig::default());
        let group = NodeGroup::new(CellRect::new(2, 2, 3, 3));
        let handle = group_handle(&group, &t);
        assert!(handle.hit_test(Point::new(95.0, 95.0)));
        assert!(!handle.hit_test(Point::new(105.0, 105.0)));
    }
}
