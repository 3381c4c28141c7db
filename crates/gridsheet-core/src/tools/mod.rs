//! Placement and grouping tools.

use crate::canvas::Canvas;
use crate::ghost::Ghost;
use crate::grid::{CellPoint, CellRect};
use crate::input::{ListenerOwner, ListenerRegistry, Phase};
use crate::node::{Node, NodeTemplate};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    /// Places a new node under the pointer.
    AddNode,
    /// Selects a rectangle of cells and turns it into a group.
    Group,
}

impl ToolKind {
    pub const ALL: [ToolKind; 2] = [ToolKind::AddNode, ToolKind::Group];
}

/// Icon/cursor state of a tool button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolIcon {
    #[default]
    Idle,
    Armed,
}

/// State of the active tool.
#[derive(Debug, Clone)]
pub enum ToolSession {
    AddNode { template: NodeTemplate, ghost: Ghost },
    Group { ghost: Ghost },
}

impl ToolSession {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolSession::AddNode { .. } => ToolKind::AddNode,
            ToolSession::Group { .. } => ToolKind::Group,
        }
    }

    pub fn ghost(&self) -> &Ghost {
        match self {
            ToolSession::AddNode { ghost, .. } | ToolSession::Group { ghost } => ghost,
        }
    }

    fn ghost_mut(&mut self) -> &mut Ghost {
        match self {
            ToolSession::AddNode { ghost, .. } | ToolSession::Group { ghost } => ghost,
        }
    }
}

/// What a click with the active tool produced.
#[derive(Debug, Clone)]
pub enum ToolCommit {
    /// A node to place, already positioned at the ghost's cells.
    PlaceNode(Node),
    /// The rectangle a new group should cover.
    CreateGroup(CellRect),
}

const TOOL_PHASES: [Phase; 3] = [Phase::PointerMove, Phase::PointerDown, Phase::KeyDown];

/// Keeps at most one tool active.
///
/// Starting a tool first ends every other one through the same path a
/// manual toggle-off or Escape takes, so listener cleanup always happens.
#[derive(Debug, Clone, Default)]
pub struct ToolController {
    session: Option<ToolSession>,
}

impl ToolController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&ToolSession> {
        self.session.as_ref()
    }

    pub fn active_tool(&self) -> Option<ToolKind> {
        self.session.as_ref().map(ToolSession::kind)
    }

    pub fn is_active(&self, kind: ToolKind) -> bool {
        self.active_tool() == Some(kind)
    }

    pub fn icon(&self, kind: ToolKind) -> ToolIcon {
        if self.is_active(kind) {
            ToolIcon::Armed
        } else {
            ToolIcon::Idle
        }
    }

    /// The ghost of the active tool, if any.
    pub fn ghost(&self) -> Option<&Ghost> {
        self.session.as_ref().map(ToolSession::ghost)
    }

    /// Activate the add-node tool with a template.
    pub fn start_add(&mut self, template: NodeTemplate, listeners: &mut ListenerRegistry) {
        let ghost = Ghost::new(template.width, template.height);
        self.start(ToolSession::AddNode { template, ghost }, listeners);
    }

    /// Activate the group tool.
    pub fn start_group(&mut self, listeners: &mut ListenerRegistry) {
        self.start(
            ToolSession::Group {
                ghost: Ghost::new(1, 1),
            },
            listeners,
        );
    }

    fn start(&mut self, session: ToolSession, listeners: &mut ListenerRegistry) {
        self.end_all(listeners);
        let kind = session.kind();
        for phase in TOOL_PHASES {
            listeners.register(ListenerOwner::Tool(kind), phase);
        }
        self.session = Some(session);
        log::debug!("tool started: {kind:?}");
    }

    /// End a tool. Ending a tool that is not active does nothing.
    pub fn end(&mut self, kind: ToolKind, listeners: &mut ListenerRegistry) -> bool {
        if !self.is_active(kind) {
            return false;
        }
        if let Some(mut session) = self.session.take() {
            session.ghost_mut().reset();
        }
        listeners.remove_owner(ListenerOwner::Tool(kind));
        log::debug!("tool ended: {kind:?}");
        true
    }

    /// End every tool.
    pub fn end_all(&mut self, listeners: &mut ListenerRegistry) {
        for kind in ToolKind::ALL {
            self.end(kind, listeners);
        }
    }

    /// Toggle the add-node tool.
    pub fn toggle_add(&mut self, template: NodeTemplate, listeners: &mut ListenerRegistry) {
        if !self.end(ToolKind::AddNode, listeners) {
            self.start_add(template, listeners);
        }
    }

    /// Toggle the group tool.
    pub fn toggle_group(&mut self, listeners: &mut ListenerRegistry) {
        if !self.end(ToolKind::Group, listeners) {
            self.start_group(listeners);
        }
    }

    /// Cancel whatever tool is active (Escape). Returns the cancelled tool.
    pub fn cancel(&mut self, listeners: &mut ListenerRegistry) -> Option<ToolKind> {
        let kind = self.active_tool()?;
        self.end(kind, listeners);
        Some(kind)
    }

    /// Follow the pointer with the active tool's ghost.
    pub fn pointer_moved(&mut self, canvas: &Canvas, pointer: Point) {
        let t = canvas.transform();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session {
            ToolSession::AddNode { ghost, .. } => {
                if !canvas.contains_pointer(pointer) {
                    ghost.hide();
                    return;
                }
                let rect = ghost.rect();
                let anchor = canvas.clamp_rect(rect.with_origin(
                    t.pointer_to_anchor(pointer.x, rect.width),
                    t.pointer_to_anchor(pointer.y, rect.height),
                ));
                ghost.track(anchor.top_left());
            }
            ToolSession::Group { ghost } => {
                let cell = pointer_cell(canvas, pointer);
                if ghost.is_pinned() {
                    ghost.stretch_to(cell);
                } else if canvas.contains_pointer(pointer) {
                    ghost.track(cell);
                } else {
                    ghost.hide();
                }
            }
        }
        log::trace!("ghost at {:?}", session.ghost().rect());
    }

    /// Handle a click on the canvas with the active tool.
    ///
    /// The add tool commits immediately. The group tool pins on the first
    /// click and commits on the second. The caller applies the commit and
    /// then ends the tool.
    pub fn clicked(&mut self, canvas: &Canvas, pointer: Point) -> Option<ToolCommit> {
        self.pointer_moved(canvas, pointer);
        match self.session.as_mut()? {
            ToolSession::AddNode { template, ghost } => {
                if !ghost.is_visible() {
                    return None;
                }
                let anchor = ghost.rect().top_left();
                Some(ToolCommit::PlaceNode(template.instantiate(anchor.x, anchor.y)))
            }
            ToolSession::Group { ghost } => {
                if ghost.is_pinned() {
                    ghost.commit().map(ToolCommit::CreateGroup)
                } else {
                    ghost.pin_at(pointer_cell(canvas, pointer));
                    None
                }
            }
        }
    }
}

/// Cell under the pointer, kept inside the canvas.
fn pointer_cell(canvas: &Canvas, pointer: Point) -> CellPoint {
    let t = canvas.transform();
    let cell = CellRect::new(t.pointer_to_cell(pointer.x), t.pointer_to_cell(pointer.y), 1, 1);
    canvas.clamp_rect(cell).top_left()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SheetConfig;
    use crate::node::NodeKind;

    /// Pixel centre of a cell with the default grid.
    fn centre(x: i32, y: i32) -> Point {
        Point::new(f64::from(x) * 50.0 + 20.0, f64::from(y) * 50.0 + 20.0)
    }

    #[test]
    fn test_tool_exclusivity() {
        let mut listeners = ListenerRegistry::new();
        let mut tools = ToolController::new();

        tools.start_add(NodeTemplate::new(NodeKind::Text), &mut listeners);
        assert!(tools.is_active(ToolKind::AddNode));

        tools.start_group(&mut listeners);
        assert!(tools.is_active(ToolKind::Group));
        assert!(!tools.is_active(ToolKind::AddNode));
        assert_eq!(listeners.len(), TOOL_PHASES.len());
        assert_eq!(
            listeners.owners_for(Phase::PointerMove),
            vec![ListenerOwner::Tool(ToolKind::Group)]
        );
    }

    #[test]
    fn test_end_inactive_tool_is_noop() {
        let mut listeners = ListenerRegistry::new();
        let mut tools = ToolController::new();
        assert!(!tools.end(ToolKind::Group, &mut listeners));

        tools.start_group(&mut listeners);
        assert!(!tools.end(ToolKind::AddNode, &mut listeners));
        assert!(tools.is_active(ToolKind::Group));
    }

    #[test]
    fn test_toggle_and_icon() {
        let mut listeners = ListenerRegistry::new();
        let mut tools = ToolController::new();
        assert_eq!(tools.icon(ToolKind::Group), ToolIcon::Idle);

        tools.toggle_group(&mut listeners);
        assert_eq!(tools.icon(ToolKind::Group), ToolIcon::Armed);

        tools.toggle_group(&mut listeners);
        assert_eq!(tools.icon(ToolKind::Group), ToolIcon::Idle);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_cancel_removes_listeners() {
        let mut listeners = ListenerRegistry::new();
        let mut tools = ToolController::new();
        tools.start_add(NodeTemplate::new(NodeKind::Die), &mut listeners);
        assert_eq!(tools.cancel(&mut listeners), Some(ToolKind::AddNode));
        assert!(listeners.is_empty());
        assert_eq!(tools.cancel(&mut listeners), None);
    }

    #[test]
    fn test_add_ghost_follows_pointer() {
        let canvas = Canvas::new(&SheetConfig::default());
        let mut listeners = ListenerRegistry::new();
        let mut tools = ToolController::new();
        tools.start_add(NodeTemplate::sized(NodeKind::Die, 1, 1), &mut listeners);

        tools.pointer_moved(&canvas, centre(4, 6));
        let ghost = tools.ghost().unwrap();
        assert!(ghost.is_visible());
        assert_eq!(ghost.rect(), CellRect::new(4, 6, 1, 1));

        tools.pointer_moved(&canvas, Point::new(5.0, 5.0));
        assert!(!tools.ghost().unwrap().is_visible());
    }

    #[test]
    fn test_add_click_commits_node() {
        let canvas = Canvas::new(&SheetConfig::default());
        let mut listeners = ListenerRegistry::new();
        let mut tools = ToolController::new();
        tools.start_add(NodeTemplate::sized(NodeKind::Text, 3, 3), &mut listeners);

        let commit = tools.clicked(&canvas, centre(5, 5));
        let Some(ToolCommit::PlaceNode(node)) = commit else {
            panic!("expected a node");
        };
        assert_eq!(node.rect(), CellRect::new(4, 4, 3, 3));
    }

    #[test]
    fn test_group_two_click_rubber_band() {
        let canvas = Canvas::new(&SheetConfig::default());
        let mut listeners = ListenerRegistry::new();
        let mut tools = ToolController::new();
        tools.start_group(&mut listeners);

        assert!(tools.clicked(&canvas, centre(5, 5)).is_none());
        assert_eq!(tools.ghost().unwrap().pin(), Some(CellPoint::new(5, 5)));

        tools.pointer_moved(&canvas, centre(3, 3));
        assert_eq!(tools.ghost().unwrap().rect(), CellRect::new(3, 3, 3, 3));

        tools.pointer_moved(&canvas, centre(7, 7));
        assert_eq!(tools.ghost().unwrap().rect(), CellRect::new(5, 5, 3, 3));

        let commit = tools.clicked(&canvas, centre(8, 6));
        let Some(ToolCommit::CreateGroup(rect)) = commit else {
            panic!("expected a group rectangle");
        };
        assert_eq!(rect, CellRect::new(5, 5, 4, 2));
        assert!(!tools.ghost().unwrap().is_pinned());
    }
}
