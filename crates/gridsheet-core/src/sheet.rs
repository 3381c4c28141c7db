//! The sheet editor: nodes, groups, tools and drags on one canvas.

use crate::canvas::Canvas;
use crate::config::SheetConfig;
use crate::drag::{DragController, DragKind};
use crate::grid::{CellRect, GridEntity, GridTransform};
use crate::group::{GroupId, NodeGroup};
use crate::handles::{HandleKind, ResizeAxis, group_handle, hit_test_handles, node_handles};
use crate::input::{
    ESCAPE, InputState, KeyEvent, ListenerOwner, ListenerRegistry, MouseButton, Phase, PointerEvent,
    PointerTarget,
};
use crate::node::{Node, NodeId, NodeTemplate};
use crate::record::{NodeRecord, RecordError};
use crate::render::RendererRegistry;
use crate::tools::{ToolCommit, ToolController, ToolKind};
use kurbo::{Point, Size, Vec2};
use std::collections::HashMap;

/// The nodes of a sheet, in placement order.
#[derive(Debug, Clone, Default)]
pub struct SheetDocument {
    pub title: String,
    nodes: HashMap<NodeId, Node>,
    order: Vec<NodeId>,
}

impl SheetDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Nodes in placement order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let id = node.id();
        self.order.push(id);
        self.nodes.insert(id, node);
        id
    }

    fn remove(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        self.order.retain(|other| *other != id);
        Some(node)
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.order.clear();
    }

    /// Last column and row covered by any node, `(0, 0)` when empty.
    pub fn content_extent(&self) -> (i32, i32) {
        self.nodes()
            .map(Node::rect)
            .fold((0, 0), |(w, h), r| (w.max(r.x2()), h.max(r.y2())))
    }
}

/// Something a pointer event changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetEvent {
    /// The add tool placed a node.
    NodePlaced(NodeId),
    /// The group tool created a group.
    GroupCreated(GroupId),
    /// A drag ended and its result was applied.
    DragFinished(DragKind),
}

/// The editor.
///
/// Every input goes through [`Sheet::handle_pointer_event`] and
/// [`Sheet::handle_key_event`], which route it to whichever controllers hold
/// listeners for that phase.
#[derive(Debug)]
pub struct Sheet {
    document: SheetDocument,
    canvas: Canvas,
    groups: HashMap<GroupId, NodeGroup>,
    group_order: Vec<GroupId>,
    tools: ToolController,
    drag: DragController,
    listeners: ListenerRegistry,
    input: InputState,
    renderers: RendererRegistry,
    resize_preview: Option<CellRect>,
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new("Untitled", &SheetConfig::default())
    }
}

impl Sheet {
    pub fn new(title: impl Into<String>, config: &SheetConfig) -> Self {
        Self {
            document: SheetDocument::new(title),
            canvas: Canvas::new(config),
            groups: HashMap::new(),
            group_order: Vec::new(),
            tools: ToolController::new(),
            drag: DragController::new(),
            listeners: ListenerRegistry::new(),
            input: InputState::new(),
            renderers: RendererRegistry::new(),
            resize_preview: None,
        }
    }

    pub fn document(&self) -> &SheetDocument {
        &self.document
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn tools(&self) -> &ToolController {
        &self.tools
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn renderers_mut(&mut self) -> &mut RendererRegistry {
        &mut self.renderers
    }

    /// Number of global listeners currently registered.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.document.node(id)
    }

    /// Mutable access for settings edits that don't touch geometry.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.document.node_mut(id)
    }

    pub fn group(&self, id: GroupId) -> Option<&NodeGroup> {
        self.groups.get(&id)
    }

    /// Groups in creation order.
    pub fn groups(&self) -> impl Iterator<Item = &NodeGroup> {
        self.group_order.iter().filter_map(|id| self.groups.get(id))
    }

    /// Span preview of the resize in progress.
    pub fn resize_preview(&self) -> Option<CellRect> {
        self.resize_preview
    }

    // --- Nodes and groups ---

    /// Add a node at its own cells, growing the canvas to fit.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let rect = node.rect();
        self.insert_at(node, rect)
    }

    /// Add a node at its own cells, or the nearest free slot: further right
    /// on the same row if there is room, otherwise on the next row down.
    pub fn place_node(&mut self, node: Node) -> NodeId {
        let slot = self.free_slot(node.rect());
        self.insert_at(node, slot)
    }

    fn insert_at(&mut self, mut node: Node, rect: CellRect) -> NodeId {
        self.canvas.ensure_width(rect.x2());
        self.canvas.snap(&mut node, Some(rect.x), Some(rect.y));
        self.renderers.attach(&node);
        log::debug!("node {} ({}) at {:?}", node.id(), node.kind().as_str(), node.rect());
        self.document.insert(node)
    }

    fn free_slot(&self, rect: CellRect) -> CellRect {
        let mut candidate = rect.with_origin(rect.x.max(1), rect.y.max(1));
        loop {
            let blocker = self
                .document
                .nodes()
                .map(Node::rect)
                .find(|other| other.intersects(&candidate));
            let Some(blocker) = blocker else {
                return candidate;
            };
            let next_x = blocker.x2().saturating_add(1);
            if next_x.saturating_add(candidate.width - 1) <= self.canvas.width() {
                candidate.x = next_x;
            } else {
                candidate = candidate.with_origin(rect.x.max(1), candidate.y.saturating_add(1));
            }
        }
    }

    /// Delete a node.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.document.remove(id)?;
        self.renderers.detach(node.kind(), id);
        log::debug!("node {id} removed");
        Some(node)
    }

    /// Create a group over a rectangle of cells.
    pub fn create_group(&mut self, rect: CellRect) -> GroupId {
        let mut group = NodeGroup::new(rect);
        self.canvas.snap(&mut group, Some(rect.x), Some(rect.y));
        let id = group.id();
        log::debug!("group {id} at {:?}", group.rect());
        self.groups.insert(id, group);
        self.group_order.push(id);
        id
    }

    /// Delete a group. Nodes it was moving drop back to their cells.
    pub fn remove_group(&mut self, id: GroupId) -> Option<NodeGroup> {
        let mut group = self.groups.remove(&id)?;
        self.group_order.retain(|other| *other != id);
        for managed in group.release() {
            if let Some(node) = self.document.node_mut(managed.id) {
                node.set_lifted(false);
                node.set_free_position(None);
            }
        }
        log::debug!("group {id} removed");
        Some(group)
    }

    // --- Tools ---

    pub fn start_add_tool(&mut self, template: NodeTemplate) {
        self.tools.start_add(template, &mut self.listeners);
    }

    pub fn start_group_tool(&mut self) {
        self.tools.start_group(&mut self.listeners);
    }

    pub fn toggle_add_tool(&mut self, template: NodeTemplate) {
        self.tools.toggle_add(template, &mut self.listeners);
    }

    pub fn toggle_group_tool(&mut self) {
        self.tools.toggle_group(&mut self.listeners);
    }

    pub fn end_tool(&mut self, kind: ToolKind) -> bool {
        self.tools.end(kind, &mut self.listeners)
    }

    pub fn cancel_tool(&mut self) -> Option<ToolKind> {
        self.tools.cancel(&mut self.listeners)
    }

    fn tool_listening(&self, phase: Phase) -> bool {
        self.listeners
            .owners_for(phase)
            .iter()
            .any(|owner| matches!(owner, ListenerOwner::Tool(_)))
    }

    fn tool_clicked(&mut self, pointer: Point) -> Option<SheetEvent> {
        let kind = self.tools.active_tool()?;
        let event = match self.tools.clicked(&self.canvas, pointer)? {
            ToolCommit::PlaceNode(node) => SheetEvent::NodePlaced(self.place_node(node)),
            ToolCommit::CreateGroup(rect) => SheetEvent::GroupCreated(self.create_group(rect)),
        };
        self.tools.end(kind, &mut self.listeners);
        Some(event)
    }

    // --- Drags ---

    /// Start the drag a handle stands for.
    pub fn begin_handle_drag(&mut self, handle: HandleKind, pointer: Point) -> bool {
        match handle {
            HandleKind::Move(id) => self.begin_move(id, pointer),
            HandleKind::Resize(id, axis) => self.begin_resize(id, axis, pointer),
            HandleKind::Group(id) => self.begin_group_move(id, pointer),
            HandleKind::ListRow { node, row, row_height } => {
                self.begin_list_reorder(node, row, row_height, pointer)
            }
        }
    }

    /// Start dragging a node freely.
    pub fn begin_move(&mut self, id: NodeId, pointer: Point) -> bool {
        if self.drag.is_dragging() || self.document.node(id).is_none() {
            return false;
        }
        self.drag.begin(DragKind::MoveNode(id), pointer, &mut self.listeners)
    }

    /// Start resizing a node along one axis. Locked nodes can't be resized.
    pub fn begin_resize(&mut self, id: NodeId, axis: ResizeAxis, pointer: Point) -> bool {
        if self.drag.is_dragging() {
            return false;
        }
        let Some(node) = self.document.node(id) else {
            return false;
        };
        if node.locked {
            log::debug!("node {id} is locked, not resizing");
            return false;
        }
        let rect = node.rect();
        let span = match axis {
            ResizeAxis::Width => rect.width,
            ResizeAxis::Height => rect.height,
        };
        let length = self.canvas.transform().cell_span_px(span);
        let started = self.drag.begin(
            DragKind::ResizeNode { id, axis, length },
            pointer,
            &mut self.listeners,
        );
        if started {
            self.resize_preview = Some(rect);
        }
        started
    }

    /// Start moving a group. Whatever lies inside it right now moves with it.
    pub fn begin_group_move(&mut self, id: GroupId, pointer: Point) -> bool {
        if self.drag.is_dragging() {
            return false;
        }
        let Some(group) = self.groups.get_mut(&id) else {
            return false;
        };
        let managed: Vec<NodeId> = group
            .collect_nodes(self.document.nodes())
            .iter()
            .map(|m| m.id)
            .collect();
        for node_id in managed {
            if let Some(node) = self.document.node_mut(node_id) {
                node.set_lifted(true);
            }
        }
        self.drag.begin(DragKind::MoveGroup(id), pointer, &mut self.listeners)
    }

    /// Start dragging a list row up or down.
    pub fn begin_list_reorder(&mut self, id: NodeId, row: usize, row_height: f64, pointer: Point) -> bool {
        if self.drag.is_dragging() || row_height <= 0.0 {
            return false;
        }
        let Some(node) = self.document.node(id) else {
            return false;
        };
        if row >= node.list_len() {
            return false;
        }
        self.drag.begin(
            DragKind::ReorderRow {
                id,
                row,
                row_height,
                offset: 0.0,
            },
            pointer,
            &mut self.listeners,
        )
    }

    fn drag_moved(&mut self, pointer: Point) {
        let Some(delta) = self.drag.update(pointer) else {
            return;
        };
        let t = self.canvas.transform();
        let Some(session) = self.drag.session_mut() else {
            return;
        };
        let total = session.total;
        match &mut session.kind {
            DragKind::MoveNode(id) => match self.document.node_mut(*id) {
                Some(node) => nudge(node, &t, delta),
                None => log::warn!("dragged node {id} is gone"),
            },
            DragKind::ResizeNode { id, axis, length } => {
                let Some(node) = self.document.node(*id) else {
                    log::warn!("resized node {id} is gone");
                    self.resize_preview = None;
                    return;
                };
                let step = match axis {
                    ResizeAxis::Width => delta.x,
                    ResizeAxis::Height => delta.y,
                };
                *length = (*length + step).max(t.cell_size());
                self.resize_preview = Some(resized(node.rect(), *axis, *length, total, &t));
            }
            DragKind::MoveGroup(id) => {
                let Some(group) = self.groups.get_mut(id) else {
                    log::warn!("dragged group {id} is gone");
                    return;
                };
                nudge(group, &t, delta);
                for managed in group.managed() {
                    if let Some(node) = self.document.node_mut(managed.id) {
                        nudge(node, &t, delta);
                    }
                }
            }
            DragKind::ReorderRow {
                id,
                row,
                row_height,
                offset,
            } => {
                let Some(node) = self.document.node_mut(*id) else {
                    log::warn!("reordered node {id} is gone");
                    return;
                };
                *offset += delta.y;
                let half = *row_height / 2.0;
                while *offset >= half && *row + 1 < node.list_len() {
                    node.move_list_row(*row, *row + 1);
                    *row += 1;
                    *offset -= *row_height;
                }
                while *offset <= -half && *row > 0 {
                    node.move_list_row(*row, *row - 1);
                    *row -= 1;
                    *offset += *row_height;
                }
            }
        }
    }

    fn finish_drag(&mut self) -> Option<SheetEvent> {
        let session = self.drag.finish(&mut self.listeners)?;
        self.resize_preview = None;
        let t = self.canvas.transform();
        match session.kind {
            DragKind::MoveNode(id) => match self.document.node_mut(id) {
                Some(node) => {
                    self.canvas.snap(node, None, None);
                    self.renderers.relayout(node);
                }
                None => log::warn!("dragged node {id} is gone"),
            },
            DragKind::ResizeNode { id, axis, length } => match self.document.node_mut(id) {
                Some(node) => {
                    let rect = node.rect();
                    let target = resized(rect, axis, length, session.total, &t);
                    node.set_size(target.width, target.height);
                    self.canvas.ensure_width(node.rect().x2());
                    self.canvas.snap(node, Some(rect.x), Some(rect.y));
                    self.renderers.relayout(node);
                }
                None => log::warn!("resized node {id} is gone"),
            },
            DragKind::MoveGroup(id) => match self.groups.get_mut(&id) {
                Some(group) => {
                    self.canvas.snap(group, None, None);
                    let placements: Vec<_> = group.placements().collect();
                    group.release();
                    for (node_id, x, y) in placements {
                        let Some(node) = self.document.node_mut(node_id) else {
                            log::warn!("grouped node {node_id} is gone");
                            continue;
                        };
                        let rect = node.rect().with_origin(x, y);
                        node.set_cell_rect(rect);
                        node.set_free_position(None);
                        node.set_lifted(false);
                        self.renderers.relayout(node);
                    }
                }
                None => log::warn!("dragged group {id} is gone"),
            },
            DragKind::ReorderRow { id, .. } => {
                if let Some(node) = self.document.node(id) {
                    self.renderers.relayout(node);
                }
            }
        }
        Some(SheetEvent::DragFinished(session.kind))
    }

    // --- Input ---

    /// Route a pointer event to the controllers listening for it.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) -> Option<SheetEvent> {
        self.input.handle_pointer_event(event);
        match *event {
            PointerEvent::Down {
                position,
                button,
                target,
            } => {
                if button != MouseButton::Left {
                    return None;
                }
                if let PointerTarget::Handle(handle) = target {
                    self.begin_handle_drag(handle, position);
                    return None;
                }
                if target.is_canvas() && self.tool_listening(Phase::PointerDown) {
                    return self.tool_clicked(position);
                }
                None
            }
            PointerEvent::Move { position } => {
                for owner in self.listeners.owners_for(Phase::PointerMove) {
                    match owner {
                        ListenerOwner::Drag => self.drag_moved(position),
                        ListenerOwner::Tool(_) => self.tools.pointer_moved(&self.canvas, position),
                    }
                }
                None
            }
            PointerEvent::Up { button, .. } => {
                if button == MouseButton::Left
                    && self.listeners.is_registered(ListenerOwner::Drag, Phase::PointerUp)
                {
                    return self.finish_drag();
                }
                None
            }
        }
    }

    /// Route a key event. Escape cancels the active tool.
    pub fn handle_key_event(&mut self, event: &KeyEvent) -> Option<ToolKind> {
        self.input.handle_key_event(event);
        match event {
            KeyEvent::Pressed(key) if key == ESCAPE && self.tool_listening(Phase::KeyDown) => {
                self.cancel_tool()
            }
            _ => None,
        }
    }

    /// What lies under a pointer: handles first, then node bodies (topmost
    /// first), then the bare canvas.
    pub fn hit_test(&self, point: Point) -> PointerTarget {
        let t = self.canvas.transform();
        let group_handles: Vec<_> = self.groups().map(|g| group_handle(g, &t)).collect();
        if let Some(handle) = hit_test_handles(&group_handles, point) {
            return PointerTarget::Handle(handle);
        }
        for node in self.document.nodes().collect::<Vec<_>>().into_iter().rev() {
            if let Some(handle) = hit_test_handles(&node_handles(node, &t), point) {
                return PointerTarget::Handle(handle);
            }
            if t.rect_px(node.rect()).contains(point) {
                return PointerTarget::Node(node.id());
            }
        }
        if self.canvas.contains_pointer(point) {
            PointerTarget::Canvas
        } else {
            PointerTarget::Outside
        }
    }

    // --- Settings ---

    /// Change a node's span. Non-positive values are ignored.
    pub fn set_node_size(&mut self, id: NodeId, width: i32, height: i32) -> bool {
        let Some(node) = self.document.node_mut(id) else {
            return false;
        };
        if !node.set_size(width, height) {
            return false;
        }
        let rect = node.rect();
        self.canvas.ensure_width(rect.x2());
        self.canvas.snap(node, Some(rect.x), Some(rect.y));
        self.renderers.relayout(node);
        true
    }

    /// Change the cell size. Out-of-range values are ignored.
    pub fn set_cell_size(&mut self, cell_size: i32) -> bool {
        let changed = self.canvas.set_cell_size(cell_size);
        if changed {
            self.relayout_all();
        }
        changed
    }

    /// Change the gap. Out-of-range values are ignored.
    pub fn set_gap(&mut self, gap: i32) -> bool {
        let changed = self.canvas.set_gap(gap);
        if changed {
            self.relayout_all();
        }
        changed
    }

    /// Re-snap everything at its current cells after the pixel geometry changed.
    fn relayout_all(&mut self) {
        let (width, height) = self.document.content_extent();
        self.canvas.resize(width, height);
        for id in self.document.order.clone() {
            if let Some(node) = self.document.nodes.get_mut(&id) {
                let rect = node.rect();
                self.canvas.snap(node, Some(rect.x), Some(rect.y));
                self.renderers.relayout(node);
            }
        }
        for group in self.groups.values_mut() {
            let rect = group.rect();
            self.canvas.snap(group, Some(rect.x), Some(rect.y));
        }
    }

    /// Report a new viewport size.
    pub fn set_viewport(&mut self, viewport: Size) {
        let (_, height) = self.document.content_extent();
        self.canvas.set_viewport(viewport, height);
    }

    // --- Records ---

    /// Records of every node, in placement order.
    pub fn to_records(&self) -> Vec<NodeRecord> {
        self.document.nodes().map(NodeRecord::from_node).collect()
    }

    /// Rebuild a node from a record and snap it at the recorded cells.
    pub fn restore_record(&mut self, record: &NodeRecord) -> Result<NodeId, RecordError> {
        let node = record.to_node()?;
        Ok(self.add_node(node))
    }

    /// Replace the sheet's contents with a set of records. Records that fail
    /// to decode are skipped. Returns how many nodes were restored.
    pub fn load_records(&mut self, records: &[NodeRecord]) -> usize {
        self.drag.finish(&mut self.listeners);
        self.resize_preview = None;
        self.tools.end_all(&mut self.listeners);
        for id in self.group_order.clone() {
            self.remove_group(id);
        }
        for id in self.document.order.clone() {
            self.remove_node(id);
        }
        self.document.clear();

        let mut restored = 0;
        for record in records {
            match self.restore_record(record) {
                Ok(_) => restored += 1,
                Err(e) => log::warn!("skipping record: {e}"),
            }
        }
        log::debug!("loaded {restored} of {} records", records.len());
        restored
    }
}

/// Span a resize lands on. A drag with no net travel on its axis keeps the
/// node's span.
fn resized(rect: CellRect, axis: ResizeAxis, length: f64, total: Vec2, t: &GridTransform) -> CellRect {
    let mut target = rect;
    match axis {
        ResizeAxis::Width if total.x != 0.0 => target.width = t.span_for_length(length),
        ResizeAxis::Height if total.y != 0.0 => target.height = t.span_for_length(length),
        _ => {}
    }
    target
}

/// Shift an entity's free pixel position, starting from its cells if it has
/// none yet.
fn nudge<E: GridEntity + ?Sized>(entity: &mut E, t: &GridTransform, delta: Vec2) {
    let origin = entity
        .free_position()
        .unwrap_or_else(|| t.cell_point_px(entity.cell_rect().top_left()));
    entity.set_free_position(Some(origin + delta));
}
