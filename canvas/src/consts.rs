//! Shared numeric constants for the canvas crate.

// ── Hit-testing ─────────────────────────────────────────────────

/// Pixel distance within which a click grabs an existing vertex.
pub const HIT_RADIUS_PX: f64 = 10.0;

// ── Rendering ───────────────────────────────────────────────────

/// Radius of the dot drawn on every zone vertex.
pub const POINT_RADIUS_PX: f64 = 6.0;

/// Outline width for zone polygons.
pub const ZONE_STROKE_WIDTH_PX: f64 = 2.0;

/// Minimum number of points for a zone to count as a closed polygon.
pub const MIN_CLOSED_POINTS: usize = 3;

// ── Palette ─────────────────────────────────────────────────────

pub const ACTIVE_FILL: &str = "rgba(255, 87, 34, 0.3)";
pub const ACTIVE_STROKE: &str = "#FF5722";
pub const INACTIVE_FILL: &str = "rgba(33, 150, 243, 0.2)";
pub const INACTIVE_STROKE: &str = "#2196F3";
pub const HOVER_FILL: &str = "rgba(33, 150, 243, 0.32)";
pub const POINT_FILL: &str = "#FFFFFF";
pub const SELECTED_POINT_FILL: &str = "#FFEB3B";
pub const PREVIEW_STROKE: &str = "rgba(255, 87, 34, 0.8)";
pub const PLACEHOLDER_BG: &str = "#1F1A17";
pub const PLACEHOLDER_TEXT: &str = "#E0E0E0";
pub const LABEL_TEXT: &str = "#FFFFFF";
