//! Grid geometry: configuration, cell rectangles and pixel/cell transforms.
//!
//! Pixel offsets are measured from the canvas origin. Track 0 on each axis is
//! a gutter one pitch wide, so the leading edge of cell `k` (1-based) sits at
//! `k * (cell_size + gap)` pixels.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Smallest accepted cell size in pixels.
pub const MIN_CELL_SIZE: i32 = 10;
/// Largest accepted cell size in pixels.
pub const MAX_CELL_SIZE: i32 = 100;
/// Smallest accepted gap in pixels.
pub const MIN_GAP: i32 = 5;
/// Largest accepted gap in pixels.
pub const MAX_GAP: i32 = 25;
/// Default cell size in pixels.
pub const DEFAULT_CELL_SIZE: i32 = 40;
/// Default gap between cells in pixels.
pub const DEFAULT_GAP: i32 = 10;

/// Cell size and gap shared by every coordinate transform.
///
/// Values outside the accepted bounds never make it into a config: setters
/// leave the previous value in place and deserialization falls back to the
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GridConfigRepr")]
pub struct GridConfig {
    cell_size: i32,
    gap: i32,
}

#[derive(Deserialize)]
struct GridConfigRepr {
    #[serde(default = "default_cell_size")]
    cell_size: i32,
    #[serde(default = "default_gap")]
    gap: i32,
}

fn default_cell_size() -> i32 {
    DEFAULT_CELL_SIZE
}

fn default_gap() -> i32 {
    DEFAULT_GAP
}

impl From<GridConfigRepr> for GridConfig {
    fn from(repr: GridConfigRepr) -> Self {
        let mut config = GridConfig::default();
        config.set_cell_size(repr.cell_size);
        config.set_gap(repr.gap);
        config
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            gap: DEFAULT_GAP,
        }
    }
}

impl GridConfig {
    /// Create a config, or `None` if either value is out of bounds.
    pub fn new(cell_size: i32, gap: i32) -> Option<Self> {
        let mut config = Self::default();
        (config.set_cell_size(cell_size) && config.set_gap(gap)).then_some(config)
    }

    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    pub fn gap(&self) -> i32 {
        self.gap
    }

    /// Set the cell size. Returns false (and keeps the old value) if out of bounds.
    pub fn set_cell_size(&mut self, cell_size: i32) -> bool {
        if !(MIN_CELL_SIZE..=MAX_CELL_SIZE).contains(&cell_size) {
            log::debug!("rejected cell size {cell_size}");
            return false;
        }
        self.cell_size = cell_size;
        true
    }

    /// Set the gap. Returns false (and keeps the old value) if out of bounds.
    pub fn set_gap(&mut self, gap: i32) -> bool {
        if !(MIN_GAP..=MAX_GAP).contains(&gap) {
            log::debug!("rejected gap {gap}");
            return false;
        }
        self.gap = gap;
        true
    }

    /// Distance in pixels between the leading edges of adjacent cells.
    pub fn pitch(&self) -> i32 {
        self.cell_size + self.gap
    }
}

/// A 1-based cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPoint {
    pub x: i32,
    pub y: i32,
}

impl CellPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An integer-aligned rectangle of cells. `x`/`y` is the top-left cell,
/// `width`/`height` the span in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl CellRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning two inclusive corner cells, in either order.
    pub fn from_corners(a: CellPoint, b: CellPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs() + 1,
            height: (a.y - b.y).abs() + 1,
        }
    }

    pub fn top_left(&self) -> CellPoint {
        CellPoint::new(self.x, self.y)
    }

    /// Last column covered (inclusive).
    pub fn x2(&self) -> i32 {
        self.x.saturating_add(self.width.saturating_sub(1))
    }

    /// Last row covered (inclusive).
    pub fn y2(&self) -> i32 {
        self.y.saturating_add(self.height.saturating_sub(1))
    }

    /// Whether `other` lies fully inside this rectangle on both axes.
    pub fn contains(&self, other: &CellRect) -> bool {
        self.x <= other.x && self.x2() >= other.x2() && self.y <= other.y && self.y2() >= other.y2()
    }

    /// Whether the two rectangles share at least one cell.
    pub fn intersects(&self, other: &CellRect) -> bool {
        self.x <= other.x2() && other.x <= self.x2() && self.y <= other.y2() && other.y <= self.y2()
    }

    pub fn with_origin(self, x: i32, y: i32) -> Self {
        Self { x, y, ..self }
    }
}

/// Anything that occupies a cell rectangle and can be dragged free of the
/// grid and snapped back onto it.
pub trait GridEntity {
    /// The cell-space bounding box.
    fn cell_rect(&self) -> CellRect;

    /// Replace the cell-space bounding box.
    fn set_cell_rect(&mut self, rect: CellRect);

    /// Free-form pixel position while dragged, `None` when aligned to cells.
    fn free_position(&self) -> Option<Point>;

    fn set_free_position(&mut self, position: Option<Point>);
}

/// Pixel/cell conversions for one grid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTransform {
    cell_size: i32,
    gap: i32,
}

impl From<GridConfig> for GridTransform {
    fn from(config: GridConfig) -> Self {
        Self::new(config)
    }
}

impl GridTransform {
    pub fn new(config: GridConfig) -> Self {
        Self {
            cell_size: config.cell_size(),
            gap: config.gap(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        f64::from(self.cell_size)
    }

    pub fn gap(&self) -> f64 {
        f64::from(self.gap)
    }

    pub fn pitch(&self) -> f64 {
        f64::from(self.cell_size + self.gap)
    }

    /// Pixel length of a `k`-cell span: internal gaps included, edge gaps not.
    pub fn cell_span_px(&self, k: i32) -> f64 {
        f64::from(k) * self.cell_size() + (f64::from(k) - 1.0) * self.gap()
    }

    /// Round a pixel offset to a cell index. `delta` biases the rounding in
    /// cell units.
    pub fn pixel_to_cell(&self, offset_px: f64, delta: f64) -> i32 {
        (offset_px / self.pitch() + delta).round() as i32
    }

    /// Pixel offset of the leading edge of cell `k`.
    pub fn cell_origin_px(&self, k: i32) -> f64 {
        f64::from(k) * self.pitch()
    }

    /// Pixel position of the top-left corner of a cell.
    pub fn cell_point_px(&self, cell: CellPoint) -> Point {
        Point::new(self.cell_origin_px(cell.x), self.cell_origin_px(cell.y))
    }

    /// Pixel rectangle covered by a cell rectangle.
    pub fn rect_px(&self, rect: CellRect) -> Rect {
        let x0 = self.cell_origin_px(rect.x);
        let y0 = self.cell_origin_px(rect.y);
        Rect::new(
            x0,
            y0,
            x0 + self.cell_span_px(rect.width),
            y0 + self.cell_span_px(rect.height),
        )
    }

    /// Cell under a pointer offset on one axis.
    pub fn pointer_to_cell(&self, pointer_px: f64) -> i32 {
        self.pixel_to_cell(pointer_px, -0.5)
    }

    /// Leading cell of a `span`-cell ghost centred under a pointer offset.
    ///
    /// Odd spans centre on a cell rather than on a grid line, which needs the
    /// half-cell bias; for a single cell this is the cell under the pointer.
    pub fn pointer_to_anchor(&self, pointer_px: f64, span: i32) -> i32 {
        let leading = pointer_px - f64::from(span / 2) * self.pitch();
        let delta = if span % 2 == 1 { -0.5 } else { 0.0 };
        self.pixel_to_cell(leading, delta)
    }

    /// Whole number of pitches closest to a pixel length, at least one.
    pub fn span_for_length(&self, length_px: f64) -> i32 {
        (length_px / self.pitch()).round().max(1.0) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform() -> GridTransform {
        GridTransform::new(GridConfig::default())
    }

    #[test]
    fn test_config_rejects_out_of_bounds() {
        let mut config = GridConfig::default();
        assert!(!config.set_cell_size(9));
        assert!(!config.set_cell_size(101));
        assert_eq!(config.cell_size(), DEFAULT_CELL_SIZE);
        assert!(!config.set_gap(4));
        assert!(!config.set_gap(26));
        assert_eq!(config.gap(), DEFAULT_GAP);

        assert!(config.set_cell_size(100));
        assert!(config.set_gap(5));
        assert_eq!(config.pitch(), 105);
        assert!(GridConfig::new(5, 10).is_none());
    }

    #[test]
    fn test_config_deserialize_falls_back() {
        let config: GridConfig = serde_json::from_str(r#"{"cell_size": 500, "gap": 12}"#).unwrap();
        assert_eq!(config.cell_size(), DEFAULT_CELL_SIZE);
        assert_eq!(config.gap(), 12);

        let config: GridConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GridConfig::default());
    }

    #[test]
    fn test_cell_span_formula() {
        let t = transform();
        assert!((t.cell_span_px(1) - 40.0).abs() < f64::EPSILON);
        for k in 1..20 {
            let expected = f64::from(k * 40 + (k - 1) * 10);
            assert!((t.cell_span_px(k) - expected).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_pixel_to_cell_rounds() {
        let t = transform();
        assert_eq!(t.pixel_to_cell(100.0, 0.0), 2);
        assert_eq!(t.pixel_to_cell(124.0, 0.0), 2);
        assert_eq!(t.pixel_to_cell(126.0, 0.0), 3);
        assert_eq!(t.pixel_to_cell(126.0, -0.5), 2);
    }

    #[test]
    fn test_cell_origin_round_trips() {
        let t = transform();
        for k in 1..30 {
            assert_eq!(t.pixel_to_cell(t.cell_origin_px(k), 0.0), k);
        }
    }

    #[test]
    fn test_single_cell_anchor_centres_under_pointer() {
        let t = transform();
        // Cell 3 covers [150, 190).
        assert_eq!(t.pointer_to_anchor(151.0, 1), 3);
        assert_eq!(t.pointer_to_anchor(170.0, 1), 3);
        assert_eq!(t.pointer_to_anchor(189.0, 1), 3);
        assert_eq!(t.pointer_to_cell(189.0), 3);
    }

    #[test]
    fn test_odd_and_even_anchor() {
        let t = transform();
        // Pointer in the middle of cell 5: a 3-wide ghost covers 4..=6.
        assert_eq!(t.pointer_to_anchor(270.0, 3), 4);
        // Pointer on the line between cells 4 and 5: a 2-wide ghost covers 4..=5.
        assert_eq!(t.pointer_to_anchor(245.0, 2), 4);
    }

    #[test]
    fn test_span_for_length() {
        let t = transform();
        for k in 1..10 {
            assert_eq!(t.span_for_length(t.cell_span_px(k)), k);
        }
        assert_eq!(t.span_for_length(0.0), 1);
        assert_eq!(t.span_for_length(60.0), 1);
        assert_eq!(t.span_for_length(80.0), 2);
        assert_eq!(t.span_for_length(170.0), 3);

        // Wide gaps round a span's own length down.
        let wide_gap = GridTransform::new(GridConfig::new(10, 25).unwrap());
        assert_eq!(wide_gap.span_for_length(wide_gap.cell_span_px(3)), 2);
    }

    #[test]
    fn test_large_coordinates_do_not_overflow() {
        let t = transform();
        let far = CellRect::new(60_000_000, i32::MAX, 3, 2);
        assert_eq!(far.x2(), 60_000_002);
        assert_eq!(far.y2(), i32::MAX);
        assert!(t.cell_span_px(60_000_000) > 2.9e9);
        assert!(t.rect_px(far).width() > 0.0);
    }

    #[test]
    fn test_rect_px() {
        let t = transform();
        let r = t.rect_px(CellRect::new(2, 1, 2, 1));
        assert!((r.x0 - 100.0).abs() < f64::EPSILON);
        assert!((r.y0 - 50.0).abs() < f64::EPSILON);
        assert!((r.width() - 90.0).abs() < f64::EPSILON);
        assert!((r.height() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cell_rect_containment() {
        let group = CellRect::new(2, 2, 4, 4);
        let a = CellRect::new(2, 2, 2, 2);
        let b = CellRect::new(4, 2, 3, 2);
        assert!(group.contains(&a));
        assert!(!group.contains(&b));
        assert!(group.intersects(&b));
        assert!(!a.intersects(&CellRect::new(4, 4, 1, 1)));
    }

    #[test]
    fn test_from_corners_is_symmetric() {
        let pin = CellPoint::new(5, 5);
        assert_eq!(
            CellRect::from_corners(pin, CellPoint::new(3, 3)),
            CellRect::new(3, 3, 3, 3)
        );
        assert_eq!(
            CellRect::from_corners(pin, CellPoint::new(7, 7)),
            CellRect::new(5, 5, 3, 3)
        );
    }
}
