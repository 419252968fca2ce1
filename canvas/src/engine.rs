use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::doc::{Zone, ZonePoint, ZoneSet};
use crate::geom::Point;
use crate::hit;
use crate::input::{EditorUi, Key, Mode};
use crate::render;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The zone set changed; carries the full set for persistence.
    ZonesChanged(Vec<Zone>),
    RenderNeeded,
}

/// Load state of the background camera image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ImageStatus {
    #[default]
    Loading,
    /// Natural size of the loaded image in pixels.
    Ready { width: f64, height: f64 },
    Failed,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub zones: ZoneSet,
    pub ui: EditorUi,
    pub mode: Mode,
    pub image_url: String,
    pub image: ImageStatus,
    pub read_only: bool,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
    /// Last zone set reported to (or seeded by) the host.
    emitted: Vec<Zone>,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            zones: ZoneSet::new(),
            ui: EditorUi::default(),
            mode: Mode::Idle,
            image_url: String::new(),
            image: ImageStatus::Loading,
            read_only: false,
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
            emitted: Vec::new(),
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Lifecycle ---

    /// Reset the editor for a camera: seed zones, start loading `image_url`.
    ///
    /// Emits nothing. The seeded set becomes the baseline for change detection,
    /// so an untouched editor never reports its initial zones back.
    pub fn initialize(&mut self, image_url: impl Into<String>, initial_zones: Vec<Zone>, read_only: bool) {
        self.zones = ZoneSet::from_zones(initial_zones);
        self.emitted = self.zones.zones().to_vec();
        self.ui = EditorUi::default();
        self.mode = Mode::Idle;
        self.image_url = image_url.into();
        self.image = ImageStatus::Loading;
        self.read_only = read_only;
    }

    /// The background image finished loading.
    pub fn image_loaded(&mut self, width: f64, height: f64) -> Vec<Action> {
        self.image = ImageStatus::Ready { width, height };
        vec![Action::RenderNeeded]
    }

    /// The background image failed to load. Editing stays disabled until re-initialized.
    pub fn image_failed(&mut self) -> Vec<Action> {
        self.image = ImageStatus::Failed;
        self.mode = Mode::Idle;
        self.ui.selected = None;
        vec![Action::RenderNeeded]
    }

    /// Whether input may mutate zones.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        !self.read_only && matches!(self.image, ImageStatus::Ready { .. })
    }

    // --- Pointer input ---

    /// Grab a vertex under the pointer, else add a point to the active zone
    /// (drawing) or start a new zone (idle).
    pub fn on_pointer_down(&mut self, pt: Point) -> Vec<Action> {
        self.ui.pointer = Some(pt);
        if !self.can_edit() {
            return Vec::new();
        }
        if self.mode.is_dragging() {
            self.mode = self.mode.after_drag();
        }

        if let Some(hit) = hit::hit_test_points(pt, &self.zones) {
            if let Some((zone_index, _)) = hit.resolve(&self.zones) {
                self.ui.active_zone = zone_index;
                self.ui.selected = Some(hit.clone());
                self.mode = Mode::Dragging { point: hit, resume: self.mode.resume_target() };
                return vec![Action::RenderNeeded];
            }
        }

        self.ui.selected = None;
        let active = self.ui.active_zone;
        let target = if self.mode.is_drawing() { self.zones.get_mut(active) } else { None };
        match target {
            Some(zone) => zone.points.push(pt.into()),
            None => self.start_zone_with(pt),
        }
        self.commit()
    }

    /// Move the dragged vertex, if any. Always tracks the pointer for preview and hover.
    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        self.ui.pointer = Some(pt);
        let hovered = hit::zone_at(pt, &self.zones);
        let hover_changed = hovered != self.ui.hovered_zone;
        self.ui.hovered_zone = hovered;

        let drag_target = match &self.mode {
            Mode::Dragging { point, .. } if self.can_edit() => Some(point.resolve(&self.zones)),
            _ => None,
        };
        match drag_target {
            Some(Some((zone_index, point_index))) => {
                if let Some(zone) = self.zones.get_mut(zone_index) {
                    zone.points[point_index] = ZonePoint::from(pt);
                }
                return self.commit();
            }
            Some(None) => {
                self.mode = self.mode.after_drag();
                self.ui.selected = None;
            }
            None => {}
        }

        if self.mode.is_drawing() || hover_changed { vec![Action::RenderNeeded] } else { Vec::new() }
    }

    /// End a drag. The vertex stays selected; nothing is deleted or finalized.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        if !self.mode.is_dragging() {
            return Vec::new();
        }
        self.mode = self.mode.after_drag();
        vec![Action::RenderNeeded]
    }

    /// The pointer left the surface: forget its position so no preview is drawn.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.ui.pointer = None;
        self.ui.hovered_zone = None;
        vec![Action::RenderNeeded]
    }

    // --- Keyboard input ---

    /// `Delete`/`Backspace` remove the selected vertex, `Escape` cancels
    /// drawing and selection, `Enter` finishes the current zone.
    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        if !self.can_edit() {
            return Vec::new();
        }
        if key.is_delete() {
            return self.delete_selected_point();
        }
        if key.is_escape() {
            self.mode = Mode::Idle;
            self.ui.selected = None;
            return vec![Action::RenderNeeded];
        }
        if key.0 == "Enter" {
            return self.finish_drawing();
        }
        Vec::new()
    }

    fn delete_selected_point(&mut self) -> Vec<Action> {
        let Some(selected) = self.ui.selected.take() else {
            return Vec::new();
        };
        let Some((zone_index, point_index)) = selected.resolve(&self.zones) else {
            return vec![Action::RenderNeeded];
        };
        self.mode = self.mode.after_drag();

        let now_empty = self.zones.get_mut(zone_index).is_some_and(|zone| {
            zone.points.remove(point_index);
            zone.points.is_empty()
        });
        if now_empty {
            self.zones.remove(zone_index);
            if self.ui.active_zone == zone_index {
                self.mode = Mode::Idle;
            }
            self.ui.active_zone = self.zones.len().saturating_sub(1);
        }
        self.clamp_active_zone();
        self.commit()
    }

    // --- Explicit affordances ---

    /// Leave drawing mode once the active zone is a closed polygon.
    ///
    /// With fewer than three points this is a no-op and drawing continues.
    pub fn finish_drawing(&mut self) -> Vec<Action> {
        if !self.can_edit() || self.mode != Mode::Drawing {
            return Vec::new();
        }
        if !self.zones.get(self.ui.active_zone).is_some_and(Zone::is_closed) {
            return Vec::new();
        }
        self.mode = Mode::Idle;
        vec![Action::RenderNeeded]
    }

    /// Re-enter drawing mode on the active zone; later clicks append to it.
    pub fn begin_drawing(&mut self) -> Vec<Action> {
        if !self.can_edit() || self.zones.get(self.ui.active_zone).is_none() || self.mode.is_dragging() {
            return Vec::new();
        }
        self.mode = Mode::Drawing;
        vec![Action::RenderNeeded]
    }

    /// Push an empty zone, make it active, and enter drawing mode.
    pub fn add_new_zone(&mut self) -> Vec<Action> {
        if !self.can_edit() {
            return Vec::new();
        }
        let zone = Zone::new(self.zones.next_ordinal());
        self.ui.active_zone = self.zones.push(zone);
        self.ui.selected = None;
        self.mode = Mode::Drawing;
        self.commit()
    }

    /// Remove the zone at `index`; the previous zone becomes active.
    pub fn delete_zone(&mut self, index: usize) -> Vec<Action> {
        if !self.can_edit() || index >= self.zones.len() {
            return Vec::new();
        }
        let was_active = self.ui.active_zone == index;
        self.zones.remove(index);
        self.ui.active_zone = index.saturating_sub(1);
        self.clamp_active_zone();

        if self.ui.selected.as_ref().is_some_and(|s| s.resolve(&self.zones).is_none()) {
            self.ui.selected = None;
        }
        let drag_lost = matches!(&self.mode, Mode::Dragging { point, .. } if point.resolve(&self.zones).is_none());
        if drag_lost {
            self.mode = self.mode.after_drag();
        }
        if was_active && self.mode.is_drawing() {
            self.mode = Mode::Idle;
        }
        self.commit()
    }

    /// Make the zone at `index` active.
    pub fn select_zone(&mut self, index: usize) -> Vec<Action> {
        if index >= self.zones.len() || index == self.ui.active_zone {
            return Vec::new();
        }
        if self.mode.is_drawing() {
            self.mode = Mode::Idle;
        }
        self.ui.active_zone = index;
        self.ui.selected = None;
        vec![Action::RenderNeeded]
    }

    /// Change a zone's display label.
    pub fn rename_zone(&mut self, index: usize, name: impl Into<String>) -> Vec<Action> {
        if !self.can_edit() {
            return Vec::new();
        }
        let Some(zone) = self.zones.get_mut(index) else {
            return Vec::new();
        };
        zone.name = name.into();
        self.commit()
    }

    // --- Queries ---

    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        self.zones.zones()
    }

    /// Index of the active zone, or `None` when there are no zones.
    #[must_use]
    pub fn active_zone(&self) -> Option<usize> {
        (self.ui.active_zone < self.zones.len()).then_some(self.ui.active_zone)
    }

    /// The selected vertex as `(zone_index, point_index)`, validated against the current set.
    #[must_use]
    pub fn selected_point(&self) -> Option<(usize, usize)> {
        self.ui.selected.as_ref().and_then(|s| s.resolve(&self.zones))
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.mode.is_drawing()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.mode.is_dragging()
    }

    #[must_use]
    pub fn image_status(&self) -> ImageStatus {
        self.image
    }

    /// Rubber-band segment from the last committed point of the active zone to the pointer.
    #[must_use]
    pub fn preview_segment(&self) -> Option<(Point, Point)> {
        if self.mode != Mode::Drawing {
            return None;
        }
        let last = self.zones.get(self.ui.active_zone)?.points.last()?;
        let pointer = self.ui.pointer?;
        Some(((*last).into(), pointer))
    }

    // --- Internals ---

    fn start_zone_with(&mut self, pt: Point) {
        let mut zone = Zone::new(self.zones.next_ordinal());
        zone.points.push(pt.into());
        self.ui.active_zone = self.zones.push(zone);
        self.mode = Mode::Drawing;
    }

    fn clamp_active_zone(&mut self) {
        self.ui.active_zone = self.ui.active_zone.min(self.zones.len().saturating_sub(1));
    }

    /// Report the zone set if it differs from the last report, and request a redraw.
    fn commit(&mut self) -> Vec<Action> {
        let mut actions = Vec::with_capacity(2);
        if self.zones.zones() != self.emitted.as_slice() {
            self.emitted = self.zones.zones().to_vec();
            actions.push(Action::ZonesChanged(self.emitted.clone()));
        }
        actions.push(Action::RenderNeeded);
        actions
    }
}

/// The full zone editor. Wraps `EngineCore` and owns the browser canvas and image elements.
pub struct Engine {
    canvas: HtmlCanvasElement,
    image: Option<HtmlImageElement>,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas, image: None, core: EngineCore::new() }
    }

    /// Reset for a camera. The host loads `image_url` and reports back through
    /// [`Engine::image_ready`] or [`Engine::image_failed`].
    pub fn initialize(&mut self, image_url: impl Into<String>, initial_zones: Vec<Zone>, read_only: bool) {
        self.image = None;
        self.core.initialize(image_url, initial_zones, read_only);
    }

    /// Attach the loaded background image.
    pub fn image_ready(&mut self, image: HtmlImageElement) -> Vec<Action> {
        let width = f64::from(image.natural_width());
        let height = f64::from(image.natural_height());
        self.image = Some(image);
        self.core.image_loaded(width, height)
    }

    pub fn image_failed(&mut self) -> Vec<Action> {
        self.image = None;
        self.core.image_failed()
    }

    // --- Viewport ---

    /// Update viewport dimensions (CSS pixels) and device pixel ratio, resizing the backing store.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.viewport_width = width_css;
        self.core.viewport_height = height_css;
        self.core.dpr = dpr;
        let backing_w = (width_css * dpr).round().max(1.0) as u32;
        let backing_h = (height_css * dpr).round().max(1.0) as u32;
        if self.canvas.width() != backing_w {
            self.canvas.set_width(backing_w);
        }
        if self.canvas.height() != backing_h {
            self.canvas.set_height(backing_h);
        }
    }

    // --- Delegated input ---

    pub fn on_pointer_down(&mut self, pt: Point) -> Vec<Action> {
        self.core.on_pointer_down(pt)
    }

    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        self.core.on_pointer_move(pt)
    }

    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        self.core.on_pointer_up()
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.core.on_pointer_leave()
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        self.core.on_key_down(key)
    }

    pub fn finish_drawing(&mut self) -> Vec<Action> {
        self.core.finish_drawing()
    }

    pub fn begin_drawing(&mut self) -> Vec<Action> {
        self.core.begin_drawing()
    }

    pub fn add_new_zone(&mut self) -> Vec<Action> {
        self.core.add_new_zone()
    }

    pub fn delete_zone(&mut self, index: usize) -> Vec<Action> {
        self.core.delete_zone(index)
    }

    pub fn select_zone(&mut self, index: usize) -> Vec<Action> {
        self.core.select_zone(index)
    }

    pub fn rename_zone(&mut self, index: usize, name: impl Into<String>) -> Vec<Action> {
        self.core.rename_zone(index, name)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a drawing call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        render::draw(&ctx, &self.core, self.image.as_ref())
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        self.core.zones()
    }

    #[must_use]
    pub fn active_zone(&self) -> Option<usize> {
        self.core.active_zone()
    }

    #[must_use]
    pub fn selected_point(&self) -> Option<(usize, usize)> {
        self.core.selected_point()
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.core.is_drawing()
    }
}
