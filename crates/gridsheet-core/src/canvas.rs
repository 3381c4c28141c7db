//! The canvas: grid dimensions, growth and snapping.

use crate::config::SheetConfig;
use crate::grid::{CellRect, GridConfig, GridEntity, GridTransform};
use kurbo::{Point, Rect, Size};

/// Largest number of columns or rows a canvas grows to. Entities are kept
/// inside this range when they snap.
pub const MAX_CANVAS_CELLS: i32 = 10_000;

/// The grid surface nodes live on.
///
/// Owns the grid configuration; every coordinate transform is derived from
/// it. Width and height are counted in cells and only grow as a side effect
/// of placing content. Cells never stretch: a cell is always `cell_size`
/// pixels wide however large the canvas gets.
#[derive(Debug, Clone)]
pub struct Canvas {
    grid: GridConfig,
    toolbar_width: f64,
    min_height: i32,
    viewport: Size,
    width: i32,
    height: i32,
    /// Pixel size of the laid-out grid, gutter included.
    pixel_size: Size,
    /// Bumped on every re-layout.
    layout_generation: u64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(&SheetConfig::default())
    }
}

impl Canvas {
    /// Create a canvas sized to the configured viewport.
    pub fn new(config: &SheetConfig) -> Self {
        let mut canvas = Self {
            grid: config.grid,
            toolbar_width: config.toolbar_width,
            min_height: config.min_canvas_height.max(1),
            viewport: config.viewport,
            width: 1,
            height: 1,
            pixel_size: Size::ZERO,
            layout_generation: 0,
        };
        canvas.resize(0, 0);
        canvas
    }

    /// Number of columns.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn grid(&self) -> GridConfig {
        self.grid
    }

    pub fn transform(&self) -> GridTransform {
        GridTransform::new(self.grid)
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn pixel_size(&self) -> Size {
        self.pixel_size
    }

    pub fn layout_generation(&self) -> u64 {
        self.layout_generation
    }

    /// Refit the canvas to the viewport, keeping at least the given size.
    pub fn resize(&mut self, min_width: i32, min_height: i32) {
        let pitch = f64::from(self.grid.pitch());
        let fit_width = ((self.viewport.width - self.toolbar_width) / pitch).floor() as i32;
        let fit_height = (self.viewport.height / pitch).floor() as i32 - 1;

        self.width = min_width.max(fit_width).clamp(1, MAX_CANVAS_CELLS);
        self.height = min_height
            .max(fit_height)
            .max(self.min_height)
            .min(MAX_CANVAS_CELLS);
        self.relayout();
    }

    /// Recompute the pixel geometry of every track.
    fn relayout(&mut self) {
        let t = self.transform();
        // Gutter track plus the cell tracks.
        self.pixel_size = Size::new(
            t.pitch() + t.cell_span_px(self.width),
            t.pitch() + t.cell_span_px(self.height),
        );
        self.layout_generation += 1;
        log::trace!(
            "canvas laid out at {}x{} cells ({}x{} px)",
            self.width,
            self.height,
            self.pixel_size.width,
            self.pixel_size.height
        );
    }

    /// Report a new viewport size. Width may shrink to fit; height keeps at
    /// least `content_height` rows.
    pub fn set_viewport(&mut self, viewport: Size, content_height: i32) {
        self.viewport = viewport;
        self.resize(0, content_height);
    }

    /// Change the cell size. Out-of-range values are ignored.
    pub fn set_cell_size(&mut self, cell_size: i32) -> bool {
        self.grid.set_cell_size(cell_size)
    }

    /// Change the gap. Out-of-range values are ignored.
    pub fn set_gap(&mut self, gap: i32) -> bool {
        self.grid.set_gap(gap)
    }

    /// Grow the width to at least `columns`. Used by the explicit placement
    /// and resize paths; snapping alone never widens the canvas.
    pub fn ensure_width(&mut self, columns: i32) {
        let columns = columns.min(MAX_CANVAS_CELLS);
        if columns > self.width {
            log::debug!("canvas width {} -> {}", self.width, columns);
            self.resize(columns, self.height);
        }
    }

    /// Pixel bounds of the cell area (gutter excluded).
    pub fn cells_px(&self) -> Rect {
        let t = self.transform();
        t.rect_px(CellRect::new(1, 1, self.width, self.height))
    }

    /// Whether a pointer position lies over the cell area.
    pub fn contains_pointer(&self, pointer: Point) -> bool {
        self.cells_px().contains(pointer)
    }

    /// Move a rectangle inside the current bounds without growing anything.
    pub fn clamp_rect(&self, rect: CellRect) -> CellRect {
        let max_x = (self.width - rect.width + 1).max(1);
        let max_y = (self.height - rect.height + 1).max(1);
        rect.with_origin(rect.x.clamp(1, max_x), rect.y.clamp(1, max_y))
    }

    /// Snap an entity onto the grid.
    ///
    /// Missing coordinates are derived from the entity's free pixel position
    /// (or its current cells if it has none). Coordinates are clamped to at
    /// least 1 and to `MAX_CANVAS_CELLS`, the canvas grows downward to fit,
    /// and the entity is pushed left until it fits the current width. The
    /// free position is cleared.
    pub fn snap<E: GridEntity + ?Sized>(
        &mut self,
        entity: &mut E,
        x: Option<i32>,
        y: Option<i32>,
    ) -> CellRect {
        let t = self.transform();
        let rect = entity.cell_rect();
        let raw = entity
            .free_position()
            .unwrap_or_else(|| t.cell_point_px(rect.top_left()));

        let width = rect.width.clamp(1, MAX_CANVAS_CELLS);
        let height = rect.height.clamp(1, MAX_CANVAS_CELLS);

        let x = x
            .unwrap_or_else(|| t.pixel_to_cell(raw.x, 0.0))
            .clamp(1, MAX_CANVAS_CELLS - width + 1);
        let y = y
            .unwrap_or_else(|| t.pixel_to_cell(raw.y, 0.0))
            .clamp(1, MAX_CANVAS_CELLS - height + 1);

        if y + height - 1 > self.height {
            let grown = y + height;
            log::debug!("canvas height {} -> {}", self.height, grown);
            self.resize(self.width, grown);
        }
        // Push left until the right edge fits, stopping at column 1.
        let x = x.min(self.width - width + 1).max(1);

        let snapped = CellRect::new(x, y, width, height);
        entity.set_cell_rect(snapped);
        entity.set_free_position(None);
        snapped
    }
}
