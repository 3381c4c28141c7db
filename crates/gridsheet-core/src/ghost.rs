//! Transient placement and selection preview.

use crate::grid::{CellPoint, CellRect};

/// A rectangular preview shown while a tool is active.
///
/// Never persisted. In placement mode it follows the pointer; in rubber-band
/// mode it spans the rectangle between a pinned corner and the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ghost {
    rect: CellRect,
    pin: Option<CellPoint>,
    visible: bool,
}

impl Ghost {
    /// A hidden ghost with the given span.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            rect: CellRect::new(1, 1, width.max(1), height.max(1)),
            pin: None,
            visible: false,
        }
    }

    pub fn rect(&self) -> CellRect {
        self.rect
    }

    pub fn pin(&self) -> Option<CellPoint> {
        self.pin
    }

    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show the ghost with its top-left at `anchor`, keeping its span.
    pub fn track(&mut self, anchor: CellPoint) {
        self.rect = self.rect.with_origin(anchor.x, anchor.y);
        self.visible = true;
    }

    /// Start a rubber-band selection at `cell`.
    pub fn pin_at(&mut self, cell: CellPoint) {
        self.pin = Some(cell);
        self.rect = CellRect::new(cell.x, cell.y, 1, 1);
        self.visible = true;
    }

    /// Stretch a pinned ghost so it covers both the pin and `current`.
    /// Does nothing if no pin is set.
    pub fn stretch_to(&mut self, current: CellPoint) {
        if let Some(pin) = self.pin {
            self.rect = CellRect::from_corners(pin, current);
            self.visible = true;
        }
    }

    /// Finish a rubber-band selection: returns the covered rectangle, clears
    /// the pin and hides the ghost.
    pub fn commit(&mut self) -> Option<CellRect> {
        self.pin.take()?;
        self.visible = false;
        Some(self.rect)
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Hide and forget any pin.
    pub fn reset(&mut self) {
        self.pin = None;
        self.visible = false;
    }
}
