//! Snapshot of the zone editor that drives the side panel.
//!
//! The engine is imperative and lives outside the reactive graph. After each
//! batch of engine actions the host rebuilds this view and stores it in a
//! signal, so the panel only re-renders when something it shows changed.

#[cfg(test)]
#[path = "zone_editor_test.rs"]
mod zone_editor_test;

use zone_canvas::doc::ZoneId;
use zone_canvas::engine::{EngineCore, ImageStatus};

/// One row of the zone list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneSummary {
    pub id: ZoneId,
    pub name: String,
    pub point_count: usize,
    pub closed: bool,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ZoneEditorView {
    pub zones: Vec<ZoneSummary>,
    pub active_zone: Option<usize>,
    pub drawing: bool,
    pub editable: bool,
    pub status: ImageStatus,
}

impl ZoneEditorView {
    #[must_use]
    pub fn from_core(core: &EngineCore) -> Self {
        Self {
            zones: core
                .zones()
                .iter()
                .map(|z| ZoneSummary {
                    id: z.id.clone(),
                    name: z.name.clone(),
                    point_count: z.points.len(),
                    closed: z.is_closed(),
                })
                .collect(),
            active_zone: core.active_zone(),
            drawing: core.is_drawing(),
            editable: core.can_edit(),
            status: core.image_status(),
        }
    }

    /// "Finish" is offered only while drawing a zone that already closes.
    #[must_use]
    pub fn can_finish(&self) -> bool {
        self.drawing && self.active_zone.and_then(|i| self.zones.get(i)).is_some_and(|z| z.closed)
    }

    /// "Continue drawing" re-opens the active zone for more points.
    #[must_use]
    pub fn can_continue(&self) -> bool {
        self.editable && !self.drawing && self.active_zone.is_some()
    }

    #[must_use]
    pub fn can_delete_zone(&self) -> bool {
        self.editable && self.active_zone.is_some()
    }

    #[must_use]
    pub fn hint(&self) -> &'static str {
        match self.status {
            ImageStatus::Loading => "Loading camera image...",
            ImageStatus::Failed => "Camera image unavailable.",
            ImageStatus::Ready { .. } if !self.editable => "Zones are read-only.",
            ImageStatus::Ready { .. } if self.drawing => "Click to add points. Press Enter or Finish to close the zone.",
            ImageStatus::Ready { .. } => "Click to start a zone. Drag points to adjust, Delete removes the selected point.",
        }
    }
}
