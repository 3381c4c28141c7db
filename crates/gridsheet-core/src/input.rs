//! Input events and the listener dispatch table.

use crate::handles::HandleKind;
use crate::node::NodeId;
use crate::tools::ToolKind;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// What a press landed on, as resolved by hit testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerTarget {
    /// A drag handle of a node or group.
    Handle(HandleKind),
    /// The body of a node.
    Node(NodeId),
    /// Empty canvas.
    Canvas,
    /// Anywhere outside the canvas.
    Outside,
}

impl PointerTarget {
    /// Whether a press here counts as a click on the canvas surface.
    pub fn is_canvas(&self) -> bool {
        matches!(self, PointerTarget::Canvas | PointerTarget::Node(_))
    }
}

/// Pointer event, positions in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        target: PointerTarget,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Key name that cancels the active tool.
pub const ESCAPE: &str = "Escape";

/// Event phase a listener is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    PointerDown,
    PointerMove,
    PointerUp,
    KeyDown,
}

/// Controller that owns a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerOwner {
    /// The active drag session.
    Drag,
    /// A placement or grouping tool.
    Tool(ToolKind),
}

/// Dispatch table of global listeners, keyed by owner and phase.
///
/// Controllers register what they need when they activate and remove all of
/// their entries in one call when they end. The table never holds closures,
/// so an entry that outlives its controller is visible as a count.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    entries: Vec<(ListenerOwner, Phase)>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns false if it was already registered.
    pub fn register(&mut self, owner: ListenerOwner, phase: Phase) -> bool {
        if self.is_registered(owner, phase) {
            return false;
        }
        self.entries.push((owner, phase));
        true
    }

    /// Remove every listener of an owner. Returns how many were removed.
    pub fn remove_owner(&mut self, owner: ListenerOwner) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(o, _)| *o != owner);
        before - self.entries.len()
    }

    pub fn is_registered(&self, owner: ListenerOwner, phase: Phase) -> bool {
        self.entries.contains(&(owner, phase))
    }

    /// Owners listening for a phase, in registration order.
    pub fn owners_for(&self, phase: Phase) -> Vec<ListenerOwner> {
        self.entries
            .iter()
            .filter(|(_, p)| *p == phase)
            .map(|(o, _)| *o)
            .collect()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tracks the current pointer and key state.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Current pointer position in canvas pixels.
    pub pointer_position: Point,
    /// Pointer position before the last event.
    pub previous_pointer_position: Point,
    pressed_buttons: HashSet<MouseButton>,
    pressed_keys: HashSet<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        self.previous_pointer_position = self.pointer_position;
        match *event {
            PointerEvent::Down {
                position, button, ..
            } => {
                self.pointer_position = position;
                self.pressed_buttons.insert(button);
            }
            PointerEvent::Up { position, button } => {
                self.pointer_position = position;
                self.pressed_buttons.remove(&button);
            }
            PointerEvent::Move { position } => {
                self.pointer_position = position;
            }
        }
    }

    /// Process a key event.
    pub fn handle_key_event(&mut self, event: &KeyEvent) {
        match event {
            KeyEvent::Pressed(key) => {
                self.pressed_keys.insert(key.clone());
            }
            KeyEvent::Released(key) => {
                self.pressed_keys.remove(key);
            }
        }
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    /// Pointer movement caused by the last event.
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_position - self.previous_pointer_position
    }
}
