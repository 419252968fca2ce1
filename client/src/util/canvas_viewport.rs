//! Viewport synchronisation between the DOM canvas and the engine.

#[cfg(test)]
#[path = "canvas_viewport_test.rs"]
mod canvas_viewport_test;

#[cfg(feature = "hydrate")]
use leptos::prelude::*;
#[cfg(feature = "hydrate")]
use zone_canvas::engine::Engine;

/// CSS size and device pixel ratio for the engine, each at least 1 so a
/// collapsed or detached container never yields an empty backing store.
pub fn viewport_metrics(client_width: i32, client_height: i32, device_pixel_ratio: f64) -> (f64, f64, f64) {
    (
        f64::from(client_width).max(1.0),
        f64::from(client_height).max(1.0),
        device_pixel_ratio.max(1.0),
    )
}

/// Sync the engine viewport to the canvas element's CSS size and DPR.
///
/// Called before every redraw so container resizes are picked up.
#[cfg(feature = "hydrate")]
pub fn sync_viewport(engine: &mut Engine, canvas_ref: &NodeRef<leptos::html::Canvas>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(canvas) = canvas_ref.get_untracked() else {
        return;
    };
    let (width, height, dpr) =
        viewport_metrics(canvas.client_width(), canvas.client_height(), window.device_pixel_ratio());
    engine.set_viewport(width, height, dpr);
}
