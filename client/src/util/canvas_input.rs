//! Pointer and keyboard mapping from DOM events to engine input.

#[cfg(test)]
#[path = "canvas_input_test.rs"]
mod canvas_input_test;

#[cfg(feature = "hydrate")]
use zone_canvas::geom::Point as CanvasPoint;
use zone_canvas::input::Key as CanvasKey;

/// Keys the editor consumes; the browser default (history back on
/// Backspace, form submit on Enter) must not run for them.
pub fn should_prevent_default_key(key: &str) -> bool {
    matches!(key, "Delete" | "Backspace" | "Escape" | "Enter")
}

pub fn map_key(key: &str) -> CanvasKey {
    CanvasKey(key.to_owned())
}

/// Pointer position relative to the canvas, in CSS pixels.
#[cfg(feature = "hydrate")]
pub fn pointer_point(ev: &leptos::ev::PointerEvent) -> CanvasPoint {
    CanvasPoint::new(f64::from(ev.offset_x()), f64::from(ev.offset_y()))
}
