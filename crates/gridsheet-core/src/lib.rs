//! GridSheet Core Library
//!
//! Spatial layout and interaction engine for a grid-based sheet editor:
//! coordinate transforms, snapping, drags, placement previews and groups.

pub mod canvas;
pub mod config;
pub mod drag;
pub mod ghost;
pub mod grid;
pub mod group;
pub mod handles;
pub mod input;
pub mod node;
pub mod record;
pub mod render;
pub mod sheet;
pub mod storage;
pub mod tools;

pub use canvas::Canvas;
pub use config::SheetConfig;
pub use drag::{DragController, DragKind, DragState};
pub use ghost::Ghost;
pub use grid::{CellPoint, CellRect, GridConfig, GridEntity, GridTransform};
pub use group::{GroupId, NodeGroup};
pub use handles::{Handle, HandleKind, ResizeAxis};
pub use input::{InputState, KeyEvent, ListenerRegistry, MouseButton, PointerEvent, PointerTarget};
pub use node::{Node, NodeContent, NodeId, NodeKind, NodeTemplate};
pub use record::{NodeRecord, RecordError};
pub use render::{ContentRenderer, NullRenderer, RendererRegistry};
pub use sheet::{Sheet, SheetDocument, SheetEvent};
pub use storage::{MemoryStorage, SavedSheet, Storage, StorageError, StorageResult};
pub use tools::{ToolController, ToolKind};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
