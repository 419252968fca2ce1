//! Rendering: draws the full zone-editor scene to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives a read-only view of editor state and produces pixels; it does
//! not mutate any application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::consts::{
    ACTIVE_FILL, ACTIVE_STROKE, HOVER_FILL, INACTIVE_FILL, INACTIVE_STROKE, LABEL_TEXT, PLACEHOLDER_BG,
    PLACEHOLDER_TEXT, POINT_FILL, POINT_RADIUS_PX, PREVIEW_STROKE, SELECTED_POINT_FILL, ZONE_STROKE_WIDTH_PX,
};
use crate::doc::Zone;
use crate::engine::{EngineCore, ImageStatus};
use crate::geom::{Point, fit_image};

/// Dash pattern for the rubber-band preview, in pixels.
const PREVIEW_DASH_PX: [f64; 2] = [6.0, 4.0];

/// Offset of a zone label from its first vertex.
const LABEL_OFFSET_PX: f64 = 8.0;

pub(crate) const LOADING_MESSAGE: &str = "Loading camera image...";
pub(crate) const FAILED_MESSAGE: &str = "Camera image unavailable";

/// Fill and stroke colours for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneStyle {
    pub fill: &'static str,
    pub stroke: &'static str,
}

/// Active zones use the accent palette; hover brightens an inactive fill.
#[must_use]
pub fn zone_style(is_active: bool, is_hovered: bool) -> ZoneStyle {
    match (is_active, is_hovered) {
        (true, _) => ZoneStyle { fill: ACTIVE_FILL, stroke: ACTIVE_STROKE },
        (false, true) => ZoneStyle { fill: HOVER_FILL, stroke: INACTIVE_STROKE },
        (false, false) => ZoneStyle { fill: INACTIVE_FILL, stroke: INACTIVE_STROKE },
    }
}

#[must_use]
pub fn point_fill(is_selected: bool) -> &'static str {
    if is_selected { SELECTED_POINT_FILL } else { POINT_FILL }
}

/// Placeholder text for image states that block the scene.
#[must_use]
pub fn placeholder_message(status: ImageStatus) -> Option<&'static str> {
    match status {
        ImageStatus::Loading => Some(LOADING_MESSAGE),
        ImageStatus::Failed => Some(FAILED_MESSAGE),
        ImageStatus::Ready { .. } => None,
    }
}

/// Draw the full scene: background image, zones, vertices, and the drawing preview.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(ctx: &CanvasRenderingContext2d, core: &EngineCore, image: Option<&HtmlImageElement>) -> Result<(), JsValue> {
    let (w, h) = (core.viewport_width, core.viewport_height);

    // Layer 1: clear at device pixel ratio.
    ctx.set_transform(core.dpr, 0.0, 0.0, core.dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, w, h);

    if let Some(message) = placeholder_message(core.image) {
        return draw_placeholder(ctx, w, h, message);
    }

    // Layer 2: letterboxed camera still.
    if let (Some(img), ImageStatus::Ready { width, height }) = (image, core.image) {
        if let Some(fit) = fit_image(w, h, width, height) {
            ctx.draw_image_with_html_image_element_and_dw_and_dh(img, fit.x, fit.y, fit.width, fit.height)?;
        }
    }

    // Layer 3: zones, then their vertices on top.
    let active = core.active_zone();
    let selected = core.selected_point();
    for (i, zone) in core.zones().iter().enumerate() {
        let style = zone_style(active == Some(i), core.ui.hovered_zone == Some(i));
        draw_zone(ctx, zone, style)?;
    }
    for (i, zone) in core.zones().iter().enumerate() {
        let style = zone_style(active == Some(i), false);
        for (j, p) in zone.points.iter().enumerate() {
            draw_vertex(ctx, Point::from(*p), style.stroke, selected == Some((i, j)))?;
        }
    }

    // Layer 4: rubber band.
    if let Some((from, to)) = core.preview_segment() {
        draw_preview(ctx, from, to)?;
    }

    Ok(())
}

fn draw_placeholder(ctx: &CanvasRenderingContext2d, w: f64, h: f64, message: &str) -> Result<(), JsValue> {
    ctx.set_fill_style_str(PLACEHOLDER_BG);
    ctx.fill_rect(0.0, 0.0, w, h);
    ctx.set_fill_style_str(PLACEHOLDER_TEXT);
    ctx.set_font("14px sans-serif");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text(message, w / 2.0, h / 2.0)
}

fn draw_zone(ctx: &CanvasRenderingContext2d, zone: &Zone, style: ZoneStyle) -> Result<(), JsValue> {
    let Some((first, rest)) = zone.points.split_first() else {
        return Ok(());
    };

    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    if zone.is_closed() {
        ctx.close_path();
        ctx.set_fill_style_str(style.fill);
        ctx.fill();
    }
    ctx.set_stroke_style_str(style.stroke);
    ctx.set_line_width(ZONE_STROKE_WIDTH_PX);
    ctx.stroke();

    if zone.is_closed() && !zone.name.is_empty() {
        ctx.set_fill_style_str(LABEL_TEXT);
        ctx.set_font("12px sans-serif");
        ctx.set_text_align("left");
        ctx.set_text_baseline("bottom");
        ctx.fill_text(&zone.name, first.x + LABEL_OFFSET_PX, first.y - LABEL_OFFSET_PX)?;
    }
    Ok(())
}

fn draw_vertex(ctx: &CanvasRenderingContext2d, p: Point, stroke: &str, is_selected: bool) -> Result<(), JsValue> {
    ctx.begin_path();
    ctx.arc(p.x, p.y, POINT_RADIUS_PX, 0.0, 2.0 * PI)?;
    ctx.set_fill_style_str(point_fill(is_selected));
    ctx.fill();
    ctx.set_stroke_style_str(stroke);
    ctx.set_line_width(1.5);
    ctx.stroke();
    Ok(())
}

fn draw_preview(ctx: &CanvasRenderingContext2d, from: Point, to: Point) -> Result<(), JsValue> {
    let dash = js_sys::Array::of2(&JsValue::from_f64(PREVIEW_DASH_PX[0]), &JsValue::from_f64(PREVIEW_DASH_PX[1]));
    ctx.set_line_dash(&dash)?;
    ctx.begin_path();
    ctx.move_to(from.x, from.y);
    ctx.line_to(to.x, to.y);
    ctx.set_stroke_style_str(PREVIEW_STROKE);
    ctx.set_line_width(ZONE_STROKE_WIDTH_PX);
    ctx.stroke();
    ctx.set_line_dash(&js_sys::Array::new())
}
