//! Content-renderer interface.
//!
//! The engine only lays nodes out. Whatever draws and edits a node's payload
//! plugs in here, one renderer per node kind.

use crate::node::{Node, NodeId, NodeKind};
use std::collections::HashMap;

/// Attaches and detaches the interactive surface for a node's content.
pub trait ContentRenderer {
    /// Called once when a node appears on the sheet.
    fn attach(&mut self, node: &Node);

    /// Called after a node's span or the grid geometry changed.
    fn relayout(&mut self, _node: &Node) {}

    /// Called when a node leaves the sheet.
    fn detach(&mut self, id: NodeId);
}

/// Renderer that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl ContentRenderer for NullRenderer {
    fn attach(&mut self, _node: &Node) {}

    fn detach(&mut self, _id: NodeId) {}
}

/// Renderers keyed by node kind, with a fallback for unregistered kinds.
pub struct RendererRegistry {
    renderers: HashMap<NodeKind, Box<dyn ContentRenderer>>,
    fallback: Box<dyn ContentRenderer>,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self {
            renderers: HashMap::new(),
            fallback: Box::new(NullRenderer),
        }
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("kinds", &self.renderers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a renderer for a kind, replacing any previous one.
    pub fn register(&mut self, kind: NodeKind, renderer: Box<dyn ContentRenderer>) {
        self.renderers.insert(kind, renderer);
    }

    pub fn has_renderer(&self, kind: NodeKind) -> bool {
        self.renderers.contains_key(&kind)
    }

    fn renderer_for(&mut self, kind: NodeKind) -> &mut dyn ContentRenderer {
        match self.renderers.get_mut(&kind) {
            Some(renderer) => renderer.as_mut(),
            None => self.fallback.as_mut(),
        }
    }

    pub fn attach(&mut self, node: &Node) {
        self.renderer_for(node.kind()).attach(node);
    }

    pub fn relayout(&mut self, node: &Node) {
        self.renderer_for(node.kind()).relayout(node);
    }

    pub fn detach(&mut self, kind: NodeKind, id: NodeId) {
        self.renderer_for(kind).detach(id);
    }
}
