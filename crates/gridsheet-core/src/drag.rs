//! Pointer-drag state machine shared by every drag interaction.

use crate::group::GroupId;
use crate::handles::ResizeAxis;
use crate::input::{ListenerOwner, ListenerRegistry, Phase};
use crate::node::NodeId;
use kurbo::{Point, Vec2};

/// What a drag session acts on. Per-kind progress lives in the variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragKind {
    /// Free pixel move of a node, snapped on release.
    MoveNode(NodeId),
    /// One-axis resize. `length` is the tracked pixel length of that axis.
    ResizeNode {
        id: NodeId,
        axis: ResizeAxis,
        length: f64,
    },
    /// Move of a group and its managed nodes.
    MoveGroup(GroupId),
    /// Vertical reorder of a list row. `offset` is the pointer travel not yet
    /// turned into row swaps.
    ReorderRow {
        id: NodeId,
        row: usize,
        row_height: f64,
        offset: f64,
    },
}

/// An active drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub kind: DragKind,
    /// Pointer position at the previous move event.
    last_pointer: Point,
    /// Sum of every delta so far.
    pub total: Vec2,
}

/// State of a drag controller.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Drives one drag at a time: press, moves, release.
///
/// Each move yields the delta since the previous move, so deltas compose
/// additively. The controller owns its move and release listeners: `begin`
/// registers them and `finish` removes them, exactly once per session.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut DragSession> {
        match &mut self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Start a drag. Returns false if one is already running.
    pub fn begin(&mut self, kind: DragKind, pointer: Point, listeners: &mut ListenerRegistry) -> bool {
        if self.is_dragging() {
            log::debug!("ignoring drag start, a drag is already active");
            return false;
        }
        listeners.register(ListenerOwner::Drag, Phase::PointerMove);
        listeners.register(ListenerOwner::Drag, Phase::PointerUp);
        self.state = DragState::Dragging(DragSession {
            kind,
            last_pointer: pointer,
            total: Vec2::ZERO,
        });
        log::debug!("drag started: {kind:?}");
        true
    }

    /// Feed a move event. Returns the delta since the previous move, or
    /// `None` when idle.
    pub fn update(&mut self, pointer: Point) -> Option<Vec2> {
        let session = self.session_mut()?;
        let delta = pointer - session.last_pointer;
        session.last_pointer = pointer;
        session.total += delta;
        log::trace!("drag delta ({}, {})", delta.x, delta.y);
        Some(delta)
    }

    /// End the drag, detach its listeners and hand back the finished
    /// session. Calling it again is a no-op.
    pub fn finish(&mut self, listeners: &mut ListenerRegistry) -> Option<DragSession> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => {
                listeners.remove_owner(ListenerOwner::Drag);
                log::debug!("drag finished: {:?}", session.kind);
                Some(session)
            }
            DragState::Idle => None,
        }
    }
}
