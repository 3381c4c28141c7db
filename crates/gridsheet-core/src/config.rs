//! Editor configuration.

use crate::grid::GridConfig;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Default width of the toolbar column, in pixels.
pub const DEFAULT_TOOLBAR_WIDTH: f64 = 60.0;

/// Canvas height never drops below this many rows.
pub const MIN_CANVAS_HEIGHT: i32 = 20;

/// Default viewport used until the host reports a real one.
pub const DEFAULT_VIEWPORT: Size = Size::new(1280.0, 800.0);

/// Settings for a sheet editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Cell size and gap.
    pub grid: GridConfig,
    /// Horizontal space taken by the toolbar, in pixels.
    pub toolbar_width: f64,
    /// Lower bound for the canvas height, in rows.
    pub min_canvas_height: i32,
    /// Initial viewport size, in pixels.
    pub viewport: Size,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            toolbar_width: DEFAULT_TOOLBAR_WIDTH,
            min_canvas_height: MIN_CANVAS_HEIGHT,
            viewport: DEFAULT_VIEWPORT,
        }
    }
}

impl SheetConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
